//! # magmom 子命令 CLI 定义
//!
//! 为已有结构目录重新生成 INCAR 中的 MAGMOM
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/magmom.rs`

use super::{MomentArgs, RootArgs};
use clap::Args;

/// magmom 子命令参数
#[derive(Args, Debug)]
pub struct MagmomArgs {
    #[command(flatten)]
    pub root: RootArgs,

    #[command(flatten)]
    pub moments: MomentArgs,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Do not link shared KPOINTS/POTCAR/submit_vasp.sh
    #[arg(long, default_value_t = false)]
    pub no_link: bool,

    /// List the directories that would be updated without writing
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
