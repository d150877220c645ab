//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。
//!
//! ## 命令结构
//! - `build`: 轨迹 -> POSCAR + INCAR(MAGMOM) 计算目录
//! - `magmom`: 为已有结构目录重新生成 MAGMOM
//! - `submit`: 批量 sbatch 提交
//! - `clean`: 清理结构目录中的计算产物
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: build, magmom, submit, clean

pub mod build;
pub mod clean;
pub mod magmom;
pub mod submit;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// magprep - 磁性构型采样输入准备工具
#[derive(Parser)]
#[command(name = "magprep")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(
    about = "Prepare VASP magnetic-moment sampling inputs from extended XYZ trajectories",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Convert trajectory frames into POSCAR/INCAR calculation directories
    Build(build::BuildArgs),

    /// Regenerate MAGMOM for existing structure directories
    Magmom(magmom::MagmomArgs),

    /// Submit every prepared structure directory to Slurm
    Submit(submit::SubmitArgs),

    /// Remove calculation outputs from structure directories
    Clean(clean::CleanArgs),
}

/// 多个子命令共用的目录参数
#[derive(Args, Debug, Clone)]
pub struct RootArgs {
    /// Sampling root directory holding the calculation-set folders
    #[arg(long, env = "MAGPREP_ROOT")]
    pub root: PathBuf,

    /// Directory with the base INCAR and shared KPOINTS/POTCAR/submit_vasp.sh
    /// [default: <ROOT>/0.common_inputs]
    #[arg(long)]
    pub common_inputs: Option<PathBuf>,
}

impl RootArgs {
    pub fn common_inputs_dir(&self) -> PathBuf {
        self.common_inputs
            .clone()
            .unwrap_or_else(|| self.root.join(crate::batch::layout::COMMON_INPUTS_DIR))
    }
}

/// 磁矩生成参数
#[derive(Args, Debug, Clone)]
pub struct MomentArgs {
    /// Random seed for reproducible moments (default: OS entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// CSV file (intensity,species,min,max) extending the built-in moment ranges
    #[arg(long)]
    pub ranges: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{IntensityBand, OrderingMode};
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_build_lists() {
        let cli = Cli::try_parse_from([
            "magprep",
            "build",
            "--input",
            "traj.xyz",
            "--root",
            "/tmp/run",
            "--mode",
            "FM,random",
            "--intensity",
            "high",
            "--frames",
            "1-10",
        ])
        .unwrap();

        match cli.command {
            Commands::Build(args) => {
                assert_eq!(args.modes, vec![OrderingMode::Fm, OrderingMode::Random]);
                assert_eq!(args.intensities, vec![IntensityBand::High]);
                assert_eq!(args.frames.as_deref(), Some("1-10"));
                assert_eq!(
                    args.root.common_inputs_dir(),
                    PathBuf::from("/tmp/run/0.common_inputs")
                );
            }
            _ => panic!("expected build"),
        }
    }

    #[test]
    fn test_reject_unknown_mode() {
        let result = Cli::try_parse_from([
            "magprep", "build", "--input", "t.xyz", "--root", "/tmp", "--mode", "AFM3",
            "--intensity", "low",
        ]);
        assert!(result.is_err());
    }
}
