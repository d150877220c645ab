//! # 解析器模块
//!
//! 提供轨迹、结构文件与 INCAR 模板的读写。
//!
//! ## 依赖关系
//! - 被 `magmom/` 和 `commands/` 模块使用
//! - 使用 `models/` 数据模型
//! - 子模块: xyz, poscar, incar

pub mod incar;
pub mod poscar;
pub mod xyz;
