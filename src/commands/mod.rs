//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `parsers/`, `magmom/`, `batch/`, `utils/`
//! - 子模块: build, magmom, submit, clean

pub mod build;
pub mod clean;
pub mod magmom;
pub mod submit;

use crate::cli::Commands;
use crate::error::Result;

/// 执行命令
pub fn run(cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Build(args) => build::execute(args),
        Commands::Magmom(args) => magmom::execute(args),
        Commands::Submit(args) => submit::execute(args),
        Commands::Clean(args) => clean::execute(args),
    }
}
