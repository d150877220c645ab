//! # clean 命令实现
//!
//! 删除结构目录中除输入文件之外的所有条目，便于重新计算。
//!
//! 默认保留 INCAR, POSCAR, POTCAR, KPOINTS, submit_vasp.sh，
//! 另可通过 `--keep` 追加 glob 模式。
//!
//! ## 依赖关系
//! - 使用 `cli/clean.rs` 定义的参数
//! - 使用 `batch/`, `utils/output.rs`
//! - 使用 `glob` 匹配保留模式

use crate::batch::layout;
use crate::batch::{BatchRunner, ProcessResult};
use crate::cli::clean::CleanArgs;
use crate::error::{MagprepError, Result};
use crate::utils::output;

use glob::Pattern;
use std::fs;
use std::path::{Path, PathBuf};

/// 始终保留的文件
const KEEP_FILES: [&str; 5] = [
    layout::INCAR,
    layout::POSCAR,
    "POTCAR",
    "KPOINTS",
    "submit_vasp.sh",
];

/// 保留规则：固定文件名 + 用户 glob
struct KeepRules {
    patterns: Vec<Pattern>,
}

impl KeepRules {
    fn new(extra: &[String]) -> Result<Self> {
        let patterns = extra
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|e| {
                    MagprepError::InvalidArgument(format!("Invalid keep pattern '{}': {}", p, e))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(KeepRules { patterns })
    }

    fn keeps(&self, name: &str) -> bool {
        KEEP_FILES.contains(&name) || self.patterns.iter().any(|p| p.matches(name))
    }
}

/// 执行 clean 命令
pub fn execute(args: CleanArgs) -> Result<()> {
    output::print_header("Cleaning Structure Directories");

    let rules = KeepRules::new(&args.keep)?;
    let dirs = layout::find_structure_dirs(&args.root)?;
    output::print_info(&format!("Scanning {} structure directories", dirs.len()));

    let mut targets = Vec::new();
    for dir in &dirs {
        targets.extend(removal_targets(&dir.path, &rules)?);
    }

    if targets.is_empty() {
        output::print_done("Nothing to remove");
        return Ok(());
    }

    if args.dry_run {
        for path in &targets {
            println!("REMOVE {}", path.display());
        }
        output::print_separator();
        output::print_done(&format!("{} items would be removed (dry run)", targets.len()));
        return Ok(());
    }

    let runner = BatchRunner::new(args.jobs);
    let result = runner.run(targets, "Removing", |path: PathBuf| {
        let name = path.display().to_string();
        match remove_entry(&path) {
            Ok(()) => ProcessResult::Success(name),
            Err(e) => ProcessResult::Failed(name, e.to_string()),
        }
    })?;

    for (name, err) in &result.failures {
        output::print_error(&format!("{}: {}", name, err));
    }

    output::print_separator();
    output::print_done(&format!(
        "Removed {} items from {} directories ({} failed)",
        result.success,
        dirs.len(),
        result.failed
    ));

    Ok(())
}

/// 目录中应删除的条目（按名称排序）
fn removal_targets(dir: &Path, rules: &KeepRules) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| MagprepError::FileReadError {
        path: dir.display().to_string(),
        source: e,
    })?;

    let mut targets: Vec<PathBuf> = entries
        .filter_map(|e| e.ok())
        .filter(|e| !rules.keeps(&e.file_name().to_string_lossy()))
        .map(|e| e.path())
        .collect();
    targets.sort();
    Ok(targets)
}

/// 目录递归删除；文件与符号链接直接删除
fn remove_entry(path: &Path) -> Result<()> {
    let is_dir = path
        .symlink_metadata()
        .map(|m| m.is_dir())
        .unwrap_or(false);

    let removed = if is_dir {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    removed.map_err(|e| MagprepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}
