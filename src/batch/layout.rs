//! # 计算目录布局
//!
//! 目录命名约定：
//! ```text
//! <root>/
//!   0.common_inputs/            INCAR KPOINTS POTCAR submit_vasp.sh
//!   1.FM_high/
//!     1.structure-1/            POSCAR INCAR -> 链接共享输入
//!     2.structure-2/
//!   ...
//!   12.random_low/
//! ```
//! 计算集编号按 FM, AFM1, AFM2, random × high, medium, low 顺序从 1 开始。
//!
//! ## 依赖关系
//! - 被 `commands/` 使用
//! - 使用 `models/magnetism.rs`, `utils/fsutil.rs`
//! - 使用 `walkdir` 遍历目录, `regex` 匹配目录名

use crate::error::{MagprepError, Result};
use crate::models::{IntensityBand, OrderingMode};
use crate::utils::{fsutil, output};

use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use walkdir::WalkDir;

/// 共享输入目录名
pub const COMMON_INPUTS_DIR: &str = "0.common_inputs";

/// 基础 INCAR 模板文件名
pub const INCAR: &str = "INCAR";

/// 结构文件名
pub const POSCAR: &str = "POSCAR";

/// 链接到每个结构目录的共享输入
pub const SHARED_INPUTS: [&str; 3] = ["KPOINTS", "POTCAR", "submit_vasp.sh"];

fn set_dir_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(\d+)\.(FM|AFM1|AFM2|random)_(high|medium|low)$").expect("valid set regex")
    })
}

fn structure_dir_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(\d+)\.structure-\d+$").expect("valid structure regex"))
}

/// 一个计算集：磁序模式 + 强度档位
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CalcSet {
    pub mode: OrderingMode,
    pub intensity: IntensityBand,
}

impl CalcSet {
    pub fn new(mode: OrderingMode, intensity: IntensityBand) -> Self {
        CalcSet { mode, intensity }
    }

    /// 模式 × 强度（按目录编号顺序，去重）
    pub fn product(modes: &[OrderingMode], intensities: &[IntensityBand]) -> Vec<CalcSet> {
        let mut sets: Vec<CalcSet> = modes
            .iter()
            .flat_map(|&m| intensities.iter().map(move |&i| CalcSet::new(m, i)))
            .collect();
        sets.sort_by_key(|s| s.index());
        sets.dedup();
        sets
    }

    /// 目录编号（1 起始）
    pub fn index(&self) -> usize {
        let m = OrderingMode::ALL
            .iter()
            .position(|&x| x == self.mode)
            .unwrap_or(0);
        let i = IntensityBand::ALL
            .iter()
            .position(|&x| x == self.intensity)
            .unwrap_or(0);
        m * IntensityBand::ALL.len() + i + 1
    }

    /// 如 "4.AFM1_high"
    pub fn dir_name(&self) -> String {
        format!("{}.{}", self.index(), self)
    }

    /// 解析计算集目录名；编号不必与标准编号一致
    pub fn parse_dir_name(name: &str) -> Option<CalcSet> {
        let caps = set_dir_regex().captures(name)?;
        let mode = caps[2].parse().ok()?;
        let intensity = caps[3].parse().ok()?;
        Some(CalcSet::new(mode, intensity))
    }
}

impl fmt::Display for CalcSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.mode, self.intensity)
    }
}

/// 结构目录名，如 "3.structure-3"
pub fn structure_dir_name(index: usize) -> String {
    format!("{}.structure-{}", index, index)
}

/// 已存在的结构目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureDir {
    pub path: PathBuf,
    pub set: CalcSet,
    /// 结构编号（目录名前缀）
    pub index: usize,
}

impl StructureDir {
    /// 用于输出的短名，如 "1.FM_high/2.structure-2"
    pub fn label(&self) -> String {
        let parent = self
            .path
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        format!("{}/{}", parent, name)
    }
}

/// 直接子目录（按名称排序）
fn child_dirs(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_dir())
        .map(|e| e.path().to_path_buf())
        .collect()
}

/// 查找 root 下所有结构目录，按计算集编号、结构编号排序
pub fn find_structure_dirs(root: &Path) -> Result<Vec<StructureDir>> {
    if !root.is_dir() {
        return Err(MagprepError::DirectoryNotFound {
            path: root.display().to_string(),
        });
    }

    let mut found = Vec::new();
    for set_path in child_dirs(root) {
        let set = match set_path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(CalcSet::parse_dir_name)
        {
            Some(set) => set,
            None => continue,
        };

        for path in child_dirs(&set_path) {
            let index = path
                .file_name()
                .and_then(|n| n.to_str())
                .and_then(|n| structure_dir_regex().captures(n))
                .and_then(|c| c[1].parse::<usize>().ok());
            if let Some(index) = index {
                found.push(StructureDir { path, set, index });
            }
        }
    }

    found.sort_by_key(|d| (d.set.index(), d.index));
    Ok(found)
}

/// 将共享输入链接到结构目录；缺失的共享文件只给出警告
///
/// 返回实际链接的文件数。
pub fn link_shared_inputs(common: &Path, dir: &Path) -> Result<usize> {
    let mut linked = 0;
    for name in SHARED_INPUTS {
        let target = common.join(name);
        if !target.exists() {
            output::print_warning(&format!(
                "Shared input '{}' not found, not linked into {}",
                target.display(),
                dir.display()
            ));
            continue;
        }
        fsutil::ensure_link(&target, &dir.join(name))?;
        linked += 1;
    }
    Ok(linked)
}
