//! # 范围表达式解析
//!
//! 解析 "1-5,8,10-12" 形式的 1 起始编号列表，用于选择轨迹帧。
//!
//! ## 依赖关系
//! - 被 `commands/build.rs` 使用
//! - 无外部模块依赖

use crate::error::{MagprepError, Result};

/// 解析范围字符串，结果排序去重
pub fn parse_range(expr: &str) -> Result<Vec<usize>> {
    let mut items = Vec::new();
    let invalid = |chunk: &str| MagprepError::InvalidRange(chunk.to_string());

    for chunk in expr.split(',') {
        let chunk = chunk.trim();
        if chunk.is_empty() {
            continue;
        }

        if let Some((a, b)) = chunk.split_once('-') {
            let a: usize = a.trim().parse().map_err(|_| invalid(chunk))?;
            let b: usize = b.trim().parse().map_err(|_| invalid(chunk))?;
            if a < 1 || b < a {
                return Err(invalid(chunk));
            }
            items.extend(a..=b);
        } else {
            let v: usize = chunk.parse().map_err(|_| invalid(chunk))?;
            if v < 1 {
                return Err(invalid(chunk));
            }
            items.push(v);
        }
    }

    if items.is_empty() {
        return Err(invalid(expr));
    }

    items.sort_unstable();
    items.dedup();
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_range_mixed() {
        assert_eq!(parse_range("1-3,5, 8-9").unwrap(), vec![1, 2, 3, 5, 8, 9]);
    }

    #[test]
    fn test_parse_range_dedup() {
        assert_eq!(parse_range("3,1-4,2").unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_parse_range_invalid() {
        assert!(parse_range("0").is_err());
        assert!(parse_range("5-2").is_err());
        assert!(parse_range("a-b").is_err());
        assert!(parse_range(" , ").is_err());
    }
}
