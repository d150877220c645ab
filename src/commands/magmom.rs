//! # magmom 命令实现
//!
//! 为 root 下已有的结构目录重新生成 MAGMOM。
//!
//! 每个目录使用自身计算集的模式与强度，从 POSCAR 推导分数坐标。
//! 各目录的种子在并行执行前由主随机数生成器依次抽取，
//! 因此同一 `--seed` 的结果与线程数无关。
//!
//! ## 依赖关系
//! - 使用 `cli/magmom.rs` 定义的参数
//! - 使用 `batch/`, `parsers/poscar.rs`, `magmom/`
//! - 使用 `utils/output.rs`

use crate::batch::layout::{self, StructureDir};
use crate::batch::{BatchRunner, ProcessResult};
use crate::cli::magmom::MagmomArgs;
use crate::error::Result;
use crate::magmom::{self, MagmomRequest, MomentRangeTable};
use crate::parsers::poscar;
use crate::utils::{fsutil, output};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::path::Path;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Tabled)]
struct PlanRow {
    #[tabled(rename = "Directory")]
    directory: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Formula")]
    formula: String,
    #[tabled(rename = "Mode")]
    mode: String,
    #[tabled(rename = "Intensity")]
    intensity: String,
}

/// 执行 magmom 命令
pub fn execute(args: MagmomArgs) -> Result<()> {
    output::print_header("Regenerating MAGMOM");

    let dirs = layout::find_structure_dirs(&args.root.root)?;
    if dirs.is_empty() {
        output::print_warning(&format!(
            "No structure directories found under {}",
            args.root.root.display()
        ));
        return Ok(());
    }
    output::print_info(&format!("Found {} structure directories", dirs.len()));

    if args.dry_run {
        print_plan(&dirs);
        return Ok(());
    }

    let common = args.root.common_inputs_dir();
    let base_incar = fsutil::read_lines(&common.join(layout::INCAR))?;
    let table = MomentRangeTable::load(args.moments.ranges.as_deref())?;
    output::print_info(&format!("{} moment ranges loaded", table.len()));

    let mut master = match args.moments.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let items: Vec<(StructureDir, u64)> = dirs.into_iter().map(|d| (d, master.gen())).collect();

    let runner = BatchRunner::new(args.jobs);
    output::print_info(&format!("Using {} parallel jobs", runner.jobs()));

    let link = !args.no_link;
    let result = runner.run(items, "Writing INCAR", |(dir, seed)| {
        if !dir.path.join(layout::POSCAR).exists() {
            return ProcessResult::Skipped(dir.label());
        }
        let mut rng = StdRng::seed_from_u64(seed);
        match apply(&dir, &common, &base_incar, &table, link, &mut rng) {
            Ok(()) => ProcessResult::Success(dir.label()),
            Err(e) => ProcessResult::Failed(dir.label(), e.to_string()),
        }
    })?;

    for (name, err) in &result.failures {
        output::print_error(&format!("{}: {}", name, err));
    }
    if result.skipped > 0 {
        output::print_skip(&format!("{} directories without POSCAR", result.skipped));
    }

    output::print_separator();
    output::print_done(&format!(
        "Updated {} of {} directories ({} failed)",
        result.success,
        result.total(),
        result.failed
    ));

    Ok(())
}

/// 为单个目录重写 INCAR
fn apply<R: Rng + ?Sized>(
    dir: &StructureDir,
    common: &Path,
    base_incar: &[String],
    table: &MomentRangeTable,
    link: bool,
    rng: &mut R,
) -> Result<()> {
    let structure = poscar::parse_poscar_file(&dir.path.join(layout::POSCAR))?;
    let frac = structure.fractional_positions()?;
    let request = MagmomRequest {
        species: &structure.species,
        fractional: &frac,
        mode: dir.set.mode,
        intensity: dir.set.intensity,
    };

    let incar = magmom::render_incar(base_incar, &request, table, rng)?;
    fsutil::write_atomic(&dir.path.join(layout::INCAR), &magmom::join_lines(&incar))?;

    if link {
        layout::link_shared_inputs(common, &dir.path)?;
    }
    Ok(())
}

fn print_plan(dirs: &[StructureDir]) {
    let rows: Vec<PlanRow> = dirs
        .iter()
        .map(|dir| {
            let (title, formula) = match poscar::parse_poscar_file(&dir.path.join(layout::POSCAR)) {
                Ok(p) => (p.title.clone(), p.to_frame().formula()),
                Err(_) => ("-".to_string(), "(no POSCAR)".to_string()),
            };
            PlanRow {
                directory: dir.label(),
                title,
                formula,
                mode: dir.set.mode.to_string(),
                intensity: dir.set.intensity.to_string(),
            }
        })
        .collect();

    println!("{}", Table::new(&rows));
    output::print_info(&format!("{} INCAR files would be written (dry run)", rows.len()));
}
