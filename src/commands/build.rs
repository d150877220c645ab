//! # build 命令实现
//!
//! 从扩展 XYZ 轨迹生成磁性采样计算目录。
//!
//! ## 功能
//! - 读取轨迹与基础 INCAR
//! - 每个 (模式, 强度) 计算集 × 每帧：写 POSCAR、生成 MAGMOM、写 INCAR
//! - 链接共享输入 (KPOINTS/POTCAR/submit_vasp.sh)
//! - 可选导出 CSV 清单
//!
//! ## 依赖关系
//! - 使用 `cli/build.rs` 定义的参数
//! - 使用 `parsers/`, `magmom/`, `batch/layout.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/range.rs`

use crate::batch::layout::{self, CalcSet};
use crate::cli::build::BuildArgs;
use crate::error::{MagprepError, Result};
use crate::magmom::{self, MagmomRequest, MomentRangeTable};
use crate::models::{Frame, IntensityBand, OrderingMode};
use crate::parsers::{poscar, xyz};
use crate::utils::{fsutil, output, progress, range};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use std::path::Path;
use tabled::{Table, Tabled};

/// dry-run 帧概览
#[derive(Debug, Clone, Tabled)]
struct FrameRow {
    #[tabled(rename = "Frame")]
    index: usize,
    #[tabled(rename = "Atoms")]
    atoms: usize,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Volume (Å³)")]
    volume: String,
}

/// 清单中的一行
#[derive(Debug, Clone, Serialize)]
struct ManifestRow {
    set: String,
    structure: String,
    frame: usize,
    atoms: usize,
    formula: String,
    mode: OrderingMode,
    intensity: IntensityBand,
}

/// 写入单个结构目录所需的共享上下文
struct BuildContext<'a> {
    root: &'a Path,
    common: &'a Path,
    base_incar: &'a [String],
    table: &'a MomentRangeTable,
    link: bool,
}

/// 执行 build 命令
pub fn execute(args: BuildArgs) -> Result<()> {
    output::print_header("Building Magnetic Sampling Inputs");

    let frames = xyz::read_trajectory(&args.input)?;
    output::print_info(&format!(
        "Loaded {} frames from {}",
        frames.len(),
        args.input.display()
    ));

    let selected = select_frames(args.frames.as_deref(), frames.len())?;

    if args.dry_run {
        print_frame_table(&frames, &selected);
        return Ok(());
    }

    let common = args.root.common_inputs_dir();
    let base_incar = fsutil::read_lines(&common.join(layout::INCAR))?;
    let table = MomentRangeTable::load(args.moments.ranges.as_deref())?;
    output::print_info(&format!("{} moment ranges loaded", table.len()));
    let mut rng = match args.moments.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let sets = CalcSet::product(&args.modes, &args.intensities);
    output::print_info(&format!(
        "{} calculation sets × {} frames",
        sets.len(),
        selected.len()
    ));

    let ctx = BuildContext {
        root: &args.root.root,
        common: &common,
        base_incar: &base_incar,
        table: &table,
        link: !args.no_link,
    };

    let pb = progress::create_progress_bar((sets.len() * selected.len()) as u64, "Writing");
    let mut manifest = Vec::new();
    let mut failed = 0usize;

    for set in &sets {
        for &index in &selected {
            match build_structure(&ctx, *set, index, &frames[index - 1], &mut rng) {
                Ok(row) => manifest.push(row),
                Err(e) => {
                    if args.fail_fast {
                        pb.finish_and_clear();
                        return Err(e);
                    }
                    failed += 1;
                    pb.suspend(|| {
                        output::print_error(&format!(
                            "{}/{}: {}",
                            set.dir_name(),
                            layout::structure_dir_name(index),
                            e
                        ));
                    });
                }
            }
            pb.inc(1);
        }
    }

    pb.finish_and_clear();

    for set in &sets {
        let written = manifest.iter().filter(|r| r.set == set.dir_name()).count();
        output::print_success(&format!("{}: {} structures", set.dir_name(), written));
    }

    if let Some(ref path) = args.manifest {
        write_manifest(path, &manifest)?;
        output::print_info(&format!("Manifest written to {}", path.display()));
    }

    output::print_separator();
    output::print_done(&format!(
        "Wrote {} structure directories, {} failed",
        manifest.len(),
        failed
    ));

    Ok(())
}

/// 选出的 1 起始帧编号；超出轨迹长度的编号给出警告并跳过
fn select_frames(expr: Option<&str>, total: usize) -> Result<Vec<usize>> {
    let requested = match expr {
        Some(expr) => range::parse_range(expr)?,
        None => (1..=total).collect(),
    };

    let (selected, beyond): (Vec<usize>, Vec<usize>) =
        requested.into_iter().partition(|&i| i <= total);

    if !beyond.is_empty() {
        output::print_warning(&format!(
            "Trajectory has {} frames, skipping {} requested frame(s) beyond it",
            total,
            beyond.len()
        ));
    }

    Ok(selected)
}

fn print_frame_table(frames: &[Frame], selected: &[usize]) {
    let rows: Vec<FrameRow> = selected
        .iter()
        .map(|&i| {
            let frame = &frames[i - 1];
            FrameRow {
                index: i,
                atoms: frame.atoms.len(),
                formula: frame.formula(),
                volume: format!("{:.3}", frame.lattice.volume()),
            }
        })
        .collect();

    println!("{}", Table::new(&rows));
    output::print_info(&format!("{} frames selected (dry run, nothing written)", rows.len()));
}

/// 写出一个结构目录：POSCAR + INCAR + 共享输入链接
fn build_structure<R: Rng + ?Sized>(
    ctx: &BuildContext<'_>,
    set: CalcSet,
    index: usize,
    frame: &Frame,
    rng: &mut R,
) -> Result<ManifestRow> {
    let dir = ctx
        .root
        .join(set.dir_name())
        .join(layout::structure_dir_name(index));
    fsutil::ensure_dir(&dir)?;

    // MAGMOM 顺序必须与 POSCAR 中的原子顺序一致
    let ordered = frame.grouped();
    poscar::write_poscar(&ordered, &dir.join(layout::POSCAR), &format!("structure_{}", index))?;

    let species = ordered.species();
    let frac = ordered.fractional_positions()?;
    let request = MagmomRequest {
        species: &species,
        fractional: &frac,
        mode: set.mode,
        intensity: set.intensity,
    };
    let incar = magmom::render_incar(ctx.base_incar, &request, ctx.table, rng)?;
    fsutil::write_atomic(&dir.join(layout::INCAR), &magmom::join_lines(&incar))?;

    if ctx.link {
        layout::link_shared_inputs(ctx.common, &dir)?;
    }

    Ok(ManifestRow {
        set: set.dir_name(),
        structure: layout::structure_dir_name(index),
        frame: index,
        atoms: frame.atoms.len(),
        formula: frame.formula(),
        mode: set.mode,
        intensity: set.intensity,
    })
}

fn write_manifest(path: &Path, rows: &[ManifestRow]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush().map_err(|e| MagprepError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(())
}
