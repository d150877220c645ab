//! # 数据模型模块
//!
//! 定义轨迹帧、晶格与磁性初始化相关的数据模型。
//!
//! ## 依赖关系
//! - 被 `parsers/`, `magmom/` 和 `commands/` 使用
//! - 子模块: structure, magnetism

pub mod magnetism;
pub mod structure;

pub use magnetism::{IntensityBand, MomentVector, OrderingMode};
pub use structure::{cartesian, fractional, Atom, Frame, Lattice};
