//! # magprep - 磁性构型采样输入准备工具
//!
//! 将分子动力学轨迹转换为 VASP 磁性计算目录，统一成单一可执行文件。
//!
//! ## 子命令
//! - `build`  - 轨迹帧 -> POSCAR + 带 MAGMOM 的 INCAR
//! - `magmom` - 为已有结构目录重新生成 MAGMOM
//! - `submit` - 批量提交作业到 Slurm
//! - `clean`  - 清理计算产物
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── parsers/   (XYZ / POSCAR / INCAR)
//!   │     ├── magmom/    (磁矩生成与范围表)
//!   │     ├── batch/     (目录布局与并行执行)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (工具函数)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod magmom;
mod models;
mod parsers;
mod utils;

use clap::Parser;
use cli::Cli;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();

    if let Err(e) = commands::run(cli.command) {
        utils::output::print_error(&format!("{}", e));
        std::process::exit(1);
    }
}
