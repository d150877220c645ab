//! # 磁矩初始化模块
//!
//! 生成每原子磁矩并写入 INCAR 的 MAGMOM 标签。
//!
//! ## 依赖关系
//! - 被 `commands/build.rs`, `commands/magmom.rs` 使用
//! - 使用 `parsers/incar.rs`, `models/`
//! - 子模块: field, ranges

pub mod field;
pub mod ranges;

pub use ranges::MomentRangeTable;

use crate::error::Result;
use crate::models::{IntensityBand, OrderingMode};
use crate::parsers::incar::{self, MAGMOM_PER_LINE};
use crate::utils::output;
use rand::Rng;

/// INCAR 中的磁矩标签
pub const MAGMOM_KEY: &str = "MAGMOM";

/// 单个结构的磁矩设置
pub struct MagmomRequest<'a> {
    pub species: &'a [String],
    pub fractional: &'a [[f64; 3]],
    pub mode: OrderingMode,
    pub intensity: IntensityBand,
}

/// 生成磁矩并合并到 INCAR 模板，返回新的 INCAR 行
///
/// 没有原子时不写 MAGMOM，模板中的旧块也会被删除。
pub fn render_incar<R: Rng + ?Sized>(
    base: &[String],
    request: &MagmomRequest<'_>,
    table: &MomentRangeTable,
    rng: &mut R,
) -> Result<Vec<String>> {
    let moments = field::generate(
        request.species,
        request.fractional,
        request.mode,
        request.intensity,
        table,
        rng,
    )?;

    if moments.is_empty() {
        output::print_warning("Structure has no atoms, INCAR written without MAGMOM");
    }

    let parts: Vec<String> = moments.iter().map(|m| m.to_string()).collect();
    let block = incar::format_block(MAGMOM_KEY, &parts, MAGMOM_PER_LINE);
    incar::merge_block(base, MAGMOM_KEY, &block)
}

/// 行序列 -> 文件内容（末尾换行）
pub fn join_lines(lines: &[String]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}
