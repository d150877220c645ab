//! # 磁性初始化数据模型
//!
//! 磁序模式、磁矩强度档位以及单原子磁矩向量。
//!
//! ## 依赖关系
//! - 被 `cli/`, `magmom/`, `batch/layout.rs` 使用
//! - 使用 `error.rs`

use crate::error::{MagprepError, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 磁序模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
pub enum OrderingMode {
    /// Ferromagnetic, all moments along +z
    #[value(name = "FM")]
    #[serde(rename = "FM")]
    Fm,
    /// Layered antiferromagnet, sign alternates along fractional z
    #[value(name = "AFM1")]
    #[serde(rename = "AFM1")]
    Afm1,
    /// Checkerboard antiferromagnet over fractional x, y
    #[value(name = "AFM2")]
    #[serde(rename = "AFM2")]
    Afm2,
    /// Uniformly random directions on the unit sphere
    #[value(name = "random")]
    #[serde(rename = "random")]
    Random,
}

impl OrderingMode {
    /// 目录编号顺序
    pub const ALL: [OrderingMode; 4] = [
        OrderingMode::Fm,
        OrderingMode::Afm1,
        OrderingMode::Afm2,
        OrderingMode::Random,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderingMode::Fm => "FM",
            OrderingMode::Afm1 => "AFM1",
            OrderingMode::Afm2 => "AFM2",
            OrderingMode::Random => "random",
        }
    }
}

impl fmt::Display for OrderingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderingMode {
    type Err = MagprepError;

    fn from_str(s: &str) -> Result<Self> {
        OrderingMode::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| {
                MagprepError::InvalidArgument(format!(
                    "Unknown ordering mode '{}' (expected FM, AFM1, AFM2 or random)",
                    s
                ))
            })
    }
}

/// 磁矩强度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntensityBand {
    High,
    Medium,
    Low,
}

impl IntensityBand {
    /// 目录编号顺序
    pub const ALL: [IntensityBand; 3] = [
        IntensityBand::High,
        IntensityBand::Medium,
        IntensityBand::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntensityBand::High => "high",
            IntensityBand::Medium => "medium",
            IntensityBand::Low => "low",
        }
    }
}

impl fmt::Display for IntensityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for IntensityBand {
    type Err = MagprepError;

    fn from_str(s: &str) -> Result<Self> {
        IntensityBand::ALL
            .into_iter()
            .find(|b| b.as_str() == s)
            .ok_or_else(|| {
                MagprepError::InvalidArgument(format!(
                    "Unknown intensity band '{}' (expected high, medium or low)",
                    s
                ))
            })
    }
}

/// 单原子磁矩向量 (μB)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MomentVector(pub [f64; 3]);

impl fmt::Display for MomentVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} {:.3} {:.3}", self.0[0], self.0[1], self.0[2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_str() {
        assert_eq!("FM".parse::<OrderingMode>().unwrap(), OrderingMode::Fm);
        assert_eq!("AFM2".parse::<OrderingMode>().unwrap(), OrderingMode::Afm2);
        assert_eq!(
            "random".parse::<OrderingMode>().unwrap(),
            OrderingMode::Random
        );
    }

    #[test]
    fn test_mode_rejects_unknown() {
        assert!("AFM3".parse::<OrderingMode>().is_err());
        assert!("fm".parse::<OrderingMode>().is_err());
        assert!("random_walk".parse::<OrderingMode>().is_err());
    }

    #[test]
    fn test_band_round_trip_names() {
        for band in IntensityBand::ALL {
            assert_eq!(band.as_str().parse::<IntensityBand>().unwrap(), band);
        }
        assert!("extreme".parse::<IntensityBand>().is_err());
    }

    #[test]
    fn test_moment_display() {
        let m = MomentVector([0.0, -0.0004, 2.45678]);
        assert_eq!(m.to_string(), "0.000 -0.000 2.457");
    }
}
