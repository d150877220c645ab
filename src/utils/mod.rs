//! # 工具函数模块
//!
//! 提供美化输出、进度条、文件写入、范围解析与 Slurm 提交等工具。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 子模块: fsutil, output, progress, range, slurm

pub mod fsutil;
pub mod output;
pub mod progress;
pub mod range;
pub mod slurm;
