//! # Slurm 提交工具
//!
//! 在指定目录中调用 `sbatch` 提交脚本。
//!
//! ## 依赖关系
//! - 被 `commands/submit.rs` 使用
//! - 无外部模块依赖

use crate::error::{MagprepError, Result};
use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

/// 在 `workdir` 中执行 `sbatch <script>`，返回 sbatch 的标准输出
pub fn sbatch(script: &str, workdir: &Path) -> Result<String> {
    let output = Command::new("sbatch")
        .arg(script)
        .current_dir(workdir)
        .output()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => MagprepError::CommandNotFound {
                command: "sbatch".to_string(),
            },
            _ => MagprepError::CommandFailed {
                command: format!("sbatch {}", script),
                stderr: e.to_string(),
            },
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    } else {
        Err(MagprepError::CommandFailed {
            command: format!("sbatch {}", script),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        })
    }
}

/// 从 sbatch 输出中提取作业号 ("Submitted batch job 123456")
pub fn job_id(stdout: &str) -> Option<u64> {
    stdout
        .split_whitespace()
        .filter_map(|w| w.parse().ok())
        .last()
}
