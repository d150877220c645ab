//! # 批量处理模块
//!
//! 计算目录布局与并行批量执行。
//!
//! ## 功能
//! - 计算集 / 结构目录命名约定
//! - 查找已有结构目录、链接共享输入
//! - 并行处理与统计
//!
//! ## 依赖关系
//! - 被各命令模块使用
//! - 使用 `rayon` 进行并行处理, `walkdir` 遍历目录
//! - 使用 `indicatif` 显示进度

pub mod layout;
pub mod runner;

pub use runner::{BatchRunner, ProcessResult};
