//! # submit 命令实现
//!
//! 在每个含提交脚本的结构目录中执行 `sbatch`。
//!
//! ## 功能
//! - 扫描 root 下的所有结构目录
//! - 逐个提交，失败时报告并继续
//! - `--dry-run` 仅列出将要提交的目录
//!
//! ## 依赖关系
//! - 使用 `cli/submit.rs` 定义的参数
//! - 使用 `batch/layout.rs`, `utils/slurm.rs`, `utils/output.rs`

use crate::batch::layout::{self, StructureDir};
use crate::cli::submit::SubmitArgs;
use crate::error::{MagprepError, Result};
use crate::utils::{output, slurm};

/// 执行 submit 命令
pub fn execute(args: SubmitArgs) -> Result<()> {
    output::print_header("Batch Job Submission");

    let dirs = layout::find_structure_dirs(&args.root)?;
    let (ready, missing): (Vec<StructureDir>, Vec<StructureDir>) = dirs
        .into_iter()
        .partition(|d| d.path.join(&args.script).is_file());

    for dir in &missing {
        output::print_skip(&format!("{}: no {}", dir.label(), args.script));
    }
    output::print_info(&format!("{} directories ready to submit", ready.len()));

    let mut submitted = 0usize;
    let mut failed = 0usize;

    for dir in &ready {
        if args.dry_run {
            output::print_info(&format!("[DRY] sbatch {} in {}", args.script, dir.label()));
            continue;
        }

        match slurm::sbatch(&args.script, &dir.path) {
            Ok(stdout) => {
                submitted += 1;
                match slurm::job_id(&stdout) {
                    Some(id) => output::print_success(&format!("{}: job {}", dir.label(), id)),
                    None => output::print_success(&format!("{}: {}", dir.label(), stdout)),
                }
            }
            // 找不到 sbatch 时后续提交都会失败
            Err(e @ MagprepError::CommandNotFound { .. }) => return Err(e),
            Err(e) => {
                failed += 1;
                output::print_error(&format!("{}: {}", dir.label(), e));
            }
        }
    }

    output::print_separator();
    output::print_done(&format!(
        "{} directories, submitted {} jobs, {} failed, {} skipped",
        ready.len() + missing.len(),
        submitted,
        failed,
        missing.len()
    ));

    Ok(())
}
