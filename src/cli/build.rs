//! # build 子命令 CLI 定义
//!
//! 轨迹帧 -> 计算目录 (POSCAR + 带 MAGMOM 的 INCAR + 共享输入链接)
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/build.rs`

use super::{MomentArgs, RootArgs};
use crate::models::{IntensityBand, OrderingMode};
use clap::Args;
use std::path::PathBuf;

/// build 子命令参数
#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Extended XYZ trajectory file
    #[arg(short, long)]
    pub input: PathBuf,

    #[command(flatten)]
    pub root: RootArgs,

    /// Magnetic ordering modes (comma-separated)
    #[arg(short, long = "mode", value_enum, value_delimiter = ',', required = true)]
    pub modes: Vec<OrderingMode>,

    /// Moment intensity bands (comma-separated)
    #[arg(long = "intensity", value_enum, value_delimiter = ',', required = true)]
    pub intensities: Vec<IntensityBand>,

    /// Frames to convert, 1-based (e.g., '1-10,15'); default: all frames
    #[arg(short, long)]
    pub frames: Option<String>,

    #[command(flatten)]
    pub moments: MomentArgs,

    /// Write a CSV manifest of the generated structures
    #[arg(long)]
    pub manifest: Option<PathBuf>,

    /// Do not link shared KPOINTS/POTCAR/submit_vasp.sh
    #[arg(long, default_value_t = false)]
    pub no_link: bool,

    /// Abort on the first failing frame
    #[arg(long, default_value_t = false)]
    pub fail_fast: bool,

    /// Only read the trajectory and summarize the selected frames
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
