//! # 文件系统工具
//!
//! 原子写入（临时文件 + rename）与共享输入文件的链接。
//!
//! ## 依赖关系
//! - 被 `parsers/poscar.rs`, `commands/` 使用
//! - 无外部模块依赖

use crate::error::{MagprepError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// 整体写入文件：先写同目录下的临时文件，再 rename 覆盖目标
pub fn write_atomic(path: &Path, content: &str) -> Result<()> {
    let tmp = temp_path(path);
    let write_err = |e| MagprepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    };

    if let Err(e) = fs::write(&tmp, content) {
        let _ = fs::remove_file(&tmp);
        return Err(write_err(e));
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        write_err(e)
    })
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "output".to_string());
    path.with_file_name(format!(".{}.tmp", name))
}

/// 读取文本文件为行序列
pub fn read_lines(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Err(MagprepError::FileNotFound {
            path: path.display().to_string(),
        });
    }
    let content = fs::read_to_string(path).map_err(|e| MagprepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(content.lines().map(|l| l.to_string()).collect())
}

/// 创建目录（含父目录）
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| MagprepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })
}

/// 在 `link` 处建立指向 `target` 的链接，已存在的文件或链接会被替换
///
/// 链接目标存为绝对路径（相对路径会相对链接所在目录解析）。
/// 非 unix 平台退化为复制。
pub fn ensure_link(target: &Path, link: &Path) -> Result<()> {
    let target = fs::canonicalize(target).map_err(|e| MagprepError::FileReadError {
        path: target.display().to_string(),
        source: e,
    })?;
    let link_err = |e| MagprepError::FileWriteError {
        path: link.display().to_string(),
        source: e,
    };

    if link.symlink_metadata().is_ok() {
        fs::remove_file(link).map_err(link_err)?;
    }

    #[cfg(unix)]
    {
        std::os::unix::fs::symlink(&target, link).map_err(link_err)
    }

    #[cfg(not(unix))]
    {
        fs::copy(&target, link).map(|_| ()).map_err(link_err)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::PathBuf;

    /// 当前工作目录下的相对临时目录
    pub fn relative_scratch_dir(name: &str) -> PathBuf {
        let dir = PathBuf::from("target").join(format!("magprep-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    /// 每个测试独立的临时目录
    pub fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("magprep-{}-{}", name, std::process::id()));
        let _ = std::fs::remove_dir_all(&dir);
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}
