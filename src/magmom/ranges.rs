//! # 磁矩大小范围表
//!
//! (强度档位, 元素) -> [min, max] 闭区间，单位 μB。
//! 内置 Fe/Ni 默认值，可通过 CSV 扩展或覆盖：
//!
//! ```text
//! intensity,species,min,max
//! high,Co,1.5,1.9
//! ```
//!
//! ## 依赖关系
//! - 被 `magmom/field.rs`, `commands/` 使用
//! - 使用 `models/magnetism.rs`

use crate::error::{MagprepError, Result};
use crate::models::IntensityBand;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

/// 闭区间 [min, max]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentRange {
    pub min: f64,
    pub max: f64,
}

impl MomentRange {
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) || min < 0.0 || min > max {
            return Err(MagprepError::InvalidArgument(format!(
                "Invalid moment range [{}, {}]",
                min, max
            )));
        }
        Ok(MomentRange { min, max })
    }
}

/// 内置范围 (band, species, min, max)
const DEFAULT_RANGES: &[(IntensityBand, &str, f64, f64)] = &[
    (IntensityBand::High, "Fe", 2.4, 2.8),
    (IntensityBand::High, "Ni", 0.6, 1.0),
    (IntensityBand::Medium, "Fe", 1.5, 2.2),
    (IntensityBand::Medium, "Ni", 0.3, 0.6),
    (IntensityBand::Low, "Fe", 0.6, 1.2),
    (IntensityBand::Low, "Ni", 0.05, 0.3),
];

/// CSV 行
#[derive(Debug, Deserialize)]
struct RangeRow {
    intensity: IntensityBand,
    species: String,
    min: f64,
    max: f64,
}

/// 磁矩范围表
#[derive(Debug, Clone)]
pub struct MomentRangeTable {
    entries: HashMap<(IntensityBand, String), MomentRange>,
}

impl Default for MomentRangeTable {
    fn default() -> Self {
        let entries = DEFAULT_RANGES
            .iter()
            .map(|&(band, sp, min, max)| ((band, sp.to_string()), MomentRange { min, max }))
            .collect();
        MomentRangeTable { entries }
    }
}

impl MomentRangeTable {
    /// 内置表 + 可选 CSV 覆盖
    pub fn load(overrides: Option<&Path>) -> Result<Self> {
        let mut table = Self::default();
        if let Some(path) = overrides {
            table.extend_from_csv(path)?;
        }
        Ok(table)
    }

    /// 添加或覆盖一个条目
    pub fn insert(&mut self, band: IntensityBand, species: impl Into<String>, range: MomentRange) {
        self.entries.insert((band, species.into()), range);
    }

    /// 查询；缺失时返回 `MissingRange`
    pub fn get(&self, band: IntensityBand, species: &str) -> Result<MomentRange> {
        self.entries
            .get(&(band, species.to_string()))
            .copied()
            .ok_or_else(|| MagprepError::MissingRange {
                intensity: band.to_string(),
                species: species.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 从 CSV 文件读取条目
    pub fn extend_from_csv(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            return Err(MagprepError::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        self.extend_from_reader(reader)
    }

    fn extend_from_reader<R: std::io::Read>(&mut self, mut reader: csv::Reader<R>) -> Result<()> {
        for row in reader.deserialize() {
            let row: RangeRow = row?;
            let range = MomentRange::new(row.min, row.max).map_err(|_| {
                MagprepError::InvalidArgument(format!(
                    "Invalid moment range for {} ({}): [{}, {}]",
                    row.species, row.intensity, row.min, row.max
                ))
            })?;
            self.insert(row.intensity, row.species, range);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_text(text: &str) -> Result<MomentRangeTable> {
        let mut table = MomentRangeTable::default();
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());
        table.extend_from_reader(reader)?;
        Ok(table)
    }

    #[test]
    fn test_default_table() {
        let table = MomentRangeTable::default();
        assert_eq!(table.len(), 6);

        let fe = table.get(IntensityBand::High, "Fe").unwrap();
        assert_eq!(fe, MomentRange { min: 2.4, max: 2.8 });

        let ni = table.get(IntensityBand::Low, "Ni").unwrap();
        assert!((ni.min - 0.05).abs() < 1e-12);
    }

    #[test]
    fn test_missing_species() {
        let table = MomentRangeTable::default();
        let err = table.get(IntensityBand::Medium, "Co").unwrap_err();
        match err {
            MagprepError::MissingRange { intensity, species } => {
                assert_eq!(intensity, "medium");
                assert_eq!(species, "Co");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_csv_extends_and_overrides() {
        let table = from_text("intensity,species,min,max\nhigh, Co ,1.5,1.9\nlow,Fe,0.5,0.7\n").unwrap();
        assert_eq!(table.len(), 7);
        assert_eq!(
            table.get(IntensityBand::High, "Co").unwrap(),
            MomentRange { min: 1.5, max: 1.9 }
        );
        assert_eq!(
            table.get(IntensityBand::Low, "Fe").unwrap(),
            MomentRange { min: 0.5, max: 0.7 }
        );
    }

    #[test]
    fn test_csv_rejects_inverted_range() {
        assert!(from_text("intensity,species,min,max\nhigh,Co,2.0,1.0\n").is_err());
        assert!(from_text("intensity,species,min,max\nhigh,Co,-1.0,1.0\n").is_err());
    }

    #[test]
    fn test_csv_rejects_unknown_band() {
        assert!(from_text("intensity,species,min,max\nextreme,Co,1.0,2.0\n").is_err());
    }

    #[test]
    fn test_range_validation() {
        let r = MomentRange::new(0.3, 0.6).unwrap();
        assert_eq!((r.min, r.max), (0.3, 0.6));
        assert!(MomentRange::new(0.5, 0.5).is_ok());
        assert!(MomentRange::new(1.0, 0.5).is_err());
        assert!(MomentRange::new(-0.1, 0.5).is_err());
    }
}
