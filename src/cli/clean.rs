//! # clean 子命令 CLI 定义
//!
//! 清除结构目录中除输入文件之外的所有内容
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/clean.rs`

use clap::Args;
use std::path::PathBuf;

/// clean 子命令参数
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Sampling root directory holding the calculation-set folders
    #[arg(long, env = "MAGPREP_ROOT")]
    pub root: PathBuf,

    /// Extra glob patterns of files to keep (comma-separated, e.g. 'OUTCAR,*.log')
    #[arg(long, value_delimiter = ',')]
    pub keep: Vec<String>,

    /// Number of parallel jobs (0 = auto)
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Print what would be removed without deleting
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}
