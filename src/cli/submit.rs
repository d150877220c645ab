//! # submit 子命令 CLI 定义
//!
//! 对每个结构目录执行 sbatch
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/submit.rs`

use clap::Args;
use std::path::PathBuf;

/// submit 子命令参数
#[derive(Args, Debug)]
pub struct SubmitArgs {
    /// Sampling root directory holding the calculation-set folders
    #[arg(long, env = "MAGPREP_ROOT")]
    pub root: PathBuf,

    /// Submission script name inside each structure directory
    #[arg(long, default_value = "submit_vasp.sh")]
    pub script: String,

    /// Only list the jobs, do not call sbatch
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
