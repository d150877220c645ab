//! # 扩展 XYZ 轨迹解析器
//!
//! 解析多帧 extended XYZ 轨迹文件。
//!
//! ## 格式说明
//! ```text
//! 2                                        # 原子数
//! Lattice="2 0 0 0 2 0 0 0 2" pbc="T T T"  # 注释行，必须含 Lattice
//! Fe 0.0 0.0 0.0                           # species x y z [...]
//! Ni 1.0 1.0 1.0
//!                                          # 帧之间允许空行
//! 2
//! ...
//! ```
//!
//! 任何一帧格式错误都会中止整个读取，不返回部分轨迹。
//!
//! ## 依赖关系
//! - 被 `commands/build.rs` 使用
//! - 使用 `models/structure.rs`

use crate::error::{MagprepError, Result};
use crate::models::{Atom, Frame, Lattice};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

fn lattice_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"Lattice="([^"]+)""#).expect("valid lattice regex"))
}

/// 读取轨迹文件
pub fn read_trajectory(path: &Path) -> Result<Vec<Frame>> {
    let content = fs::read_to_string(path).map_err(|e| MagprepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_trajectory_content(&content, &path.display().to_string())
}

/// 从字符串内容解析全部帧
pub fn parse_trajectory_content(content: &str, source: &str) -> Result<Vec<Frame>> {
    let lines: Vec<&str> = content.lines().collect();
    let fail = |line_no: usize, reason: String| MagprepError::ParseError {
        format: "xyz".to_string(),
        path: source.to_string(),
        reason: format!("line {}: {}", line_no, reason),
    };

    let mut frames = Vec::new();
    let mut idx = 0;

    while idx < lines.len() {
        let count_line = lines[idx].trim();
        if count_line.is_empty() {
            idx += 1;
            continue;
        }

        let atom_count: usize = count_line
            .parse()
            .map_err(|_| fail(idx + 1, format!("expected atom count, found '{}'", count_line)))?;

        let header = lines
            .get(idx + 1)
            .ok_or_else(|| fail(idx + 2, "missing header line".to_string()))?;
        let lattice = parse_lattice(header).map_err(|reason| fail(idx + 2, reason))?;

        let first_atom = idx + 2;
        let end = first_atom
            .checked_add(atom_count)
            .filter(|&end| end <= lines.len());
        let Some(end) = end else {
            return Err(fail(
                lines.len(),
                format!(
                    "frame declares {} atoms but only {} lines remain",
                    atom_count,
                    lines.len().saturating_sub(first_atom)
                ),
            ));
        };

        let mut atoms = Vec::with_capacity(atom_count);
        for (offset, line) in lines[first_atom..end].iter().enumerate() {
            let atom = parse_atom_line(line).map_err(|reason| fail(first_atom + offset + 1, reason))?;
            atoms.push(atom);
        }

        frames.push(Frame::new(lattice, atoms));
        idx = end;
    }

    Ok(frames)
}

/// 从注释行中提取 Lattice="..."
fn parse_lattice(header: &str) -> std::result::Result<Lattice, String> {
    let caps = lattice_regex()
        .captures(header)
        .ok_or_else(|| "missing Lattice=\"...\" in header line".to_string())?;

    let numbers = caps[1]
        .split_whitespace()
        .map(|s| s.parse::<f64>())
        .collect::<std::result::Result<Vec<f64>, _>>()
        .map_err(|e| format!("invalid lattice value: {}", e))?;

    let values: [f64; 9] = numbers
        .as_slice()
        .try_into()
        .map_err(|_| format!("Lattice should have 9 numbers, found {}", numbers.len()))?;

    Ok(Lattice::from_flat(&values))
}

/// 解析原子行: species x y z [...]
fn parse_atom_line(line: &str) -> std::result::Result<Atom, String> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() < 4 {
        return Err(format!("expected 'species x y z', found '{}'", line.trim()));
    }

    let mut position = [0.0; 3];
    for (k, token) in parts[1..4].iter().enumerate() {
        position[k] = token
            .parse()
            .map_err(|_| format!("invalid coordinate '{}'", token))?;
    }

    Ok(Atom::new(parts[0], position))
}
