//! # VASP INCAR 标签块处理
//!
//! 将 INCAR 切分为记录（赋值块 / 其他文本行），并替换指定标签（如 MAGMOM）
//! 的整块内容，其余行原样保留。
//!
//! ## 续行规则
//! - `KEY = ...` 赋值行总是开始新记录
//! - 上一物理行以 `\` 结尾，则下一行（非赋值行）属于同一赋值块
//! - 或：下一行非空、以空白开头、且不含 `=`
//! - 空行与顶格行结束当前块
//!
//! 被替换块之后紧跟的那一个空行随块一起删除。
//!
//! ## 依赖关系
//! - 被 `magmom/mod.rs` 使用
//! - 无外部模块依赖

use crate::error::{MagprepError, Result};

/// 每行 MAGMOM 向量数
pub const MAGMOM_PER_LINE: usize = 8;

/// 向量之间的分隔
const ITEM_SEPARATOR: &str = "   ";

/// INCAR 记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncarRecord {
    /// `KEY = value`，包含首行及全部续行
    Assignment { key: String, lines: Vec<String> },
    /// 空行、注释或无法识别的行
    Text(String),
}

impl IncarRecord {
    fn push_lines(self, out: &mut Vec<String>) {
        match self {
            IncarRecord::Assignment { lines, .. } => out.extend(lines),
            IncarRecord::Text(line) => out.push(line),
        }
    }
}

/// 若该行是 `KEY = ...` 赋值，返回 KEY
pub fn assignment_key(line: &str) -> Option<&str> {
    let body = line.trim_start();
    if body.starts_with('#') || body.starts_with('!') {
        return None;
    }

    let end = body
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(body.len());
    if end == 0 {
        return None;
    }

    body[end..]
        .trim_start()
        .starts_with('=')
        .then(|| &body[..end])
}

/// 切分 INCAR 行为记录序列
pub fn tokenize<S: AsRef<str>>(lines: &[S]) -> Vec<IncarRecord> {
    let mut records = Vec::new();
    let mut current: Option<(String, Vec<String>)> = None;

    for line in lines.iter().map(|l| l.as_ref()) {
        let line_key = assignment_key(line);

        if let Some((key, block)) = current.as_mut() {
            let explicit = block
                .last()
                .map(|l| l.trim_end().ends_with('\\'))
                .unwrap_or(false);
            let indented = line.starts_with(char::is_whitespace)
                && !line.trim().is_empty()
                && !line.contains('=');

            if line_key.is_none() && (explicit || indented) {
                block.push(line.to_string());
                continue;
            }

            records.push(IncarRecord::Assignment {
                key: std::mem::take(key),
                lines: std::mem::take(block),
            });
            current = None;
        }

        match line_key {
            Some(key) => current = Some((key.to_string(), vec![line.to_string()])),
            None => records.push(IncarRecord::Text(line.to_string())),
        }
    }

    if let Some((key, lines)) = current {
        records.push(IncarRecord::Assignment { key, lines });
    }

    records
}

/// 替换 `key` 对应的全部赋值块，并在末尾追加新块
///
/// `block` 为空时仅删除旧块。
pub fn merge_block<S: AsRef<str>>(base: &[S], key: &str, block: &[String]) -> Result<Vec<String>> {
    if let Some(first) = block.first() {
        let ok = assignment_key(first)
            .map(|k| k.eq_ignore_ascii_case(key))
            .unwrap_or(false);
        if !ok {
            return Err(MagprepError::MissingBlockMarker {
                key: key.to_string(),
            });
        }
    }

    let mut updated = Vec::with_capacity(base.len() + block.len() + 1);
    let mut after_removed = false;
    for record in tokenize(base) {
        match &record {
            IncarRecord::Assignment { key: k, .. } if k.eq_ignore_ascii_case(key) => {
                after_removed = true;
                continue;
            }
            IncarRecord::Text(line) if after_removed && line.trim().is_empty() => {
                after_removed = false;
                continue;
            }
            _ => after_removed = false,
        }
        record.push_lines(&mut updated);
    }

    if block.is_empty() {
        return Ok(updated);
    }

    if updated.last().map(|l| !l.trim().is_empty()).unwrap_or(false) {
        updated.push(String::new());
    }
    updated.extend(block.iter().cloned());

    Ok(updated)
}

/// 格式化多行数组标签
///
/// ```text
/// MAGMOM = 0.000 0.000 2.500   0.000 0.000 -2.500 ... \
///          0.000 0.000 2.500 ...
/// ```
pub fn format_block(key: &str, parts: &[String], per_line: usize) -> Vec<String> {
    let per_line = per_line.max(1);
    let head = format!("{} = ", key);
    let indent = " ".repeat(head.len());
    let n_chunks = parts.chunks(per_line).count();

    parts
        .chunks(per_line)
        .enumerate()
        .map(|(i, chunk)| {
            let prefix = if i == 0 { head.as_str() } else { indent.as_str() };
            let suffix = if i + 1 < n_chunks { " \\" } else { "" };
            format!("{}{}{}", prefix, chunk.join(ITEM_SEPARATOR), suffix)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_assignment_key() {
        assert_eq!(assignment_key("ENCUT = 520"), Some("ENCUT"));
        assert_eq!(assignment_key("  magmom=1 2"), Some("magmom"));
        assert_eq!(assignment_key("# ISPIN = 2"), None);
        assert_eq!(assignment_key("   1.0 2.0"), None);
        assert_eq!(assignment_key(""), None);
        assert_eq!(assignment_key("= 3"), None);
    }

    #[test]
    fn test_merge_example() {
        let base = lines(&["A = 1", "MAGMOM = 1.0 2.0", "B = 3"]);
        let block = lines(&["MAGMOM = 5.000   6.000"]);
        let merged = merge_block(&base, "MAGMOM", &block).unwrap();
        assert_eq!(merged, lines(&["A = 1", "B = 3", "", "MAGMOM = 5.000   6.000"]));
    }

    #[test]
    fn test_merge_idempotent() {
        let base = lines(&[
            "SYSTEM = FeNi",
            "ISPIN = 2",
            "MAGMOM = 1 1 \\",
            "         2 2",
            "",
            "ENCUT = 520",
        ]);
        let parts: Vec<String> = (0..20).map(|i| format!("0.000 0.000 {}.000", i)).collect();
        let block = format_block("MAGMOM", &parts, MAGMOM_PER_LINE);

        let once = merge_block(&base, "MAGMOM", &block).unwrap();
        let twice = merge_block(&once, "MAGMOM", &block).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_merge_removes_all_stray_occurrences() {
        let base = lines(&[
            "MAGMOM = 1 1",
            "A = 1",
            "  magmom = 2 2",
            "      3 3",
            "B = 2",
            "MagMom=4",
        ]);
        let block = lines(&["MAGMOM = 9.000"]);
        let merged = merge_block(&base, "MAGMOM", &block).unwrap();
        assert_eq!(merged, lines(&["A = 1", "B = 2", "", "MAGMOM = 9.000"]));

        let count = merged
            .iter()
            .filter(|l| assignment_key(l).map(|k| k.eq_ignore_ascii_case("MAGMOM")).unwrap_or(false))
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_merge_preserves_unrelated_content() {
        let base = lines(&[
            "# spin-polarized run",
            "ISPIN = 2",
            "MAGMOM = 3*2.0 \\",
            "   3*0.6",
            "ENCUT = 520   ! cutoff",
            "",
            "LORBIT = 11",
        ]);
        let merged = merge_block(&base, "MAGMOM", &lines(&["MAGMOM = 1.000"])).unwrap();
        let kept: Vec<&String> = merged.iter().take(5).collect();
        assert_eq!(
            kept,
            vec![
                "# spin-polarized run",
                "ISPIN = 2",
                "ENCUT = 520   ! cutoff",
                "",
                "LORBIT = 11",
            ]
        );
        assert_eq!(merged[5], "");
        assert_eq!(merged[6], "MAGMOM = 1.000");
    }

    #[test]
    fn test_non_indented_line_ends_block() {
        let base = lines(&["MAGMOM = 1 2", "NOTAKEY", "   indented"]);
        let records = tokenize(&base);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], IncarRecord::Text("NOTAKEY".to_string()));
    }

    #[test]
    fn test_explicit_continuation_onto_unindented_values() {
        // 续行由 `\` 决定，即使下一行顶格
        let base = lines(&["MAGMOM = 1 2 \\", "3 4", "ISPIN = 2"]);
        let records = tokenize(&base);
        assert_eq!(records.len(), 2);
        match &records[0] {
            IncarRecord::Assignment { key, lines } => {
                assert_eq!(key, "MAGMOM");
                assert_eq!(lines.len(), 2);
            }
            other => panic!("unexpected record: {:?}", other),
        }
    }

    #[test]
    fn test_backslash_does_not_swallow_next_assignment() {
        let base = lines(&["MAGMOM = 1 2 \\", "ISPIN = 2", "ENCUT = 520"]);
        let records = tokenize(&base);
        assert_eq!(records.len(), 3);

        let merged = merge_block(&base, "MAGMOM", &lines(&["MAGMOM = 9.000"])).unwrap();
        assert_eq!(
            merged,
            lines(&["ISPIN = 2", "ENCUT = 520", "", "MAGMOM = 9.000"])
        );
    }

    #[test]
    fn test_merge_drops_blank_line_closing_old_block() {
        let base = lines(&["A = 1", "MAGMOM = 1", "", "B = 2"]);
        let merged = merge_block(&base, "MAGMOM", &lines(&["MAGMOM = 9.000"])).unwrap();
        assert_eq!(merged, lines(&["A = 1", "B = 2", "", "MAGMOM = 9.000"]));

        // 其他空行保持不变
        let base = lines(&["A = 1", "", "MAGMOM = 1", "", "", "B = 2"]);
        let merged = merge_block(&base, "MAGMOM", &[]).unwrap();
        assert_eq!(merged, lines(&["A = 1", "", "", "B = 2"]));
    }

    #[test]
    fn test_merge_into_empty_base() {
        let merged = merge_block::<String>(&[], "MAGMOM", &lines(&["MAGMOM = 1.000"])).unwrap();
        assert_eq!(merged, lines(&["MAGMOM = 1.000"]));
    }

    #[test]
    fn test_merge_empty_block_only_strips() {
        let base = lines(&["A = 1", "MAGMOM = 1"]);
        let merged = merge_block(&base, "MAGMOM", &[]).unwrap();
        assert_eq!(merged, lines(&["A = 1"]));
    }

    #[test]
    fn test_merge_rejects_foreign_block() {
        let base = lines(&["A = 1"]);
        let err = merge_block(&base, "MAGMOM", &lines(&["ISPIN = 2"])).unwrap_err();
        assert!(matches!(err, MagprepError::MissingBlockMarker { .. }));
    }

    #[test]
    fn test_format_block_wraps() {
        let parts: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
        let out = format_block("MAGMOM", &parts, 8);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], "MAGMOM = p0   p1   p2   p3   p4   p5   p6   p7 \\");
        assert_eq!(out[1], "         p8   p9");
    }

    #[test]
    fn test_format_block_exact_multiple() {
        let parts: Vec<String> = (0..8).map(|i| format!("p{}", i)).collect();
        let out = format_block("MAGMOM", &parts, 8);
        assert_eq!(out.len(), 1);
        assert!(!out[0].ends_with('\\'));
        assert!(format_block("MAGMOM", &[], 8).is_empty());
    }
}
