//! # VASP POSCAR 格式读写
//!
//! 写出：将轨迹帧写为 POSCAR（笛卡尔坐标，元素按首次出现顺序分组）。
//! 读取：解析已有 POSCAR/CONTCAR，用于重新推导分数坐标。
//!
//! ## POSCAR 格式说明
//! ```text
//! Comment line (structure name)
//! 1.0                    # scaling factor
//! a1 a2 a3               # lattice vector a
//! b1 b2 b3               # lattice vector b
//! c1 c2 c3               # lattice vector c
//! Element1 Element2 ...  # element symbols (VASP 5+)
//! n1 n2 ...              # number of atoms per element
//! Selective dynamics     # optional
//! Direct/Cartesian       # coordinate type
//! x1 y1 z1               # atom positions
//! ...
//! ```
//!
//! ## 依赖关系
//! - 被 `commands/build.rs`, `commands/magmom.rs` 使用
//! - 使用 `models/structure.rs`, `utils/fsutil.rs`

use crate::error::{MagprepError, Result};
use crate::models::{cartesian, fractional, Atom, Frame, Lattice};
use crate::utils::fsutil;
use std::fs;
use std::path::Path;

/// 坐标类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateMode {
    Direct,
    Cartesian,
}

/// 解析后的 POSCAR
#[derive(Debug, Clone)]
pub struct Poscar {
    /// 注释行
    pub title: String,

    /// 已乘缩放因子的晶格
    pub lattice: Lattice,

    /// 每个原子的元素符号（按文件顺序展开）
    pub species: Vec<String>,

    /// 文件中的原始坐标（笛卡尔坐标已乘缩放因子）
    pub coords: Vec<[f64; 3]>,

    /// 坐标类型
    pub mode: CoordinateMode,
}

impl Poscar {
    /// 分数坐标：Direct 原样返回，Cartesian 通过晶格求逆得到
    pub fn fractional_positions(&self) -> Result<Vec<[f64; 3]>> {
        match self.mode {
            CoordinateMode::Direct => Ok(self.coords.clone()),
            CoordinateMode::Cartesian => fractional(&self.coords, &self.lattice),
        }
    }

    /// 转换为帧（笛卡尔坐标）
    pub fn to_frame(&self) -> Frame {
        let positions = match self.mode {
            CoordinateMode::Direct => cartesian(&self.coords, &self.lattice),
            CoordinateMode::Cartesian => self.coords.clone(),
        };
        let atoms = self
            .species
            .iter()
            .zip(positions)
            .map(|(sp, pos)| Atom::new(sp.clone(), pos))
            .collect();
        Frame::new(self.lattice, atoms)
    }
}

/// 解析 POSCAR/CONTCAR 文件
pub fn parse_poscar_file(path: &Path) -> Result<Poscar> {
    let content = fs::read_to_string(path).map_err(|e| MagprepError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_poscar_content(&content, &path.display().to_string())
}

/// 从字符串内容解析 POSCAR 格式
pub fn parse_poscar_content(content: &str, source: &str) -> Result<Poscar> {
    let lines: Vec<&str> = content.lines().collect();
    let fail = |reason: String| MagprepError::ParseError {
        format: "poscar".to_string(),
        path: source.to_string(),
        reason,
    };

    if lines.len() < 7 {
        return Err(fail("File too short".to_string()));
    }

    let title = lines[0].trim().to_string();

    // Line 1: Scaling factor（负值表示目标体积）
    let scale: f64 = lines[1]
        .split_whitespace()
        .next()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| fail(format!("Invalid scaling factor '{}'", lines[1].trim())))?;

    // Lines 2-4: Lattice vectors
    let mut matrix = [[0.0; 3]; 3];
    for (i, row) in matrix.iter_mut().enumerate() {
        let parts: Vec<f64> = lines[2 + i]
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(fail(format!("Invalid lattice vector at line {}", 3 + i)));
        }
        *row = [parts[0], parts[1], parts[2]];
    }
    let raw = Lattice::from_vectors(matrix);
    let scale = if scale < 0.0 {
        (scale.abs() / raw.volume()).cbrt()
    } else {
        scale
    };
    let lattice = raw.scaled(scale);

    // Line 5: Element symbols (VASP 5+) or atom counts (VASP 4)
    let line5_parts: Vec<&str> = lines[5].split_whitespace().collect();
    let is_vasp4 = line5_parts
        .first()
        .map(|s| s.parse::<usize>().is_ok())
        .unwrap_or(false);
    let (elements, counts, mut coord_line) = if is_vasp4 {
        let counts = parse_counts(&line5_parts).map_err(&fail)?;
        let elements: Vec<String> = (0..counts.len()).map(|i| format!("X{}", i + 1)).collect();
        (elements, counts, 6)
    } else {
        let elements: Vec<String> = line5_parts.iter().map(|s| s.to_string()).collect();
        let count_parts: Vec<&str> = lines[6].split_whitespace().collect();
        let counts = parse_counts(&count_parts).map_err(&fail)?;
        (elements, counts, 7)
    };

    if elements.len() != counts.len() {
        return Err(fail(format!(
            "{} element symbols but {} counts",
            elements.len(),
            counts.len()
        )));
    }

    // Check for "Selective dynamics" line
    if lines
        .get(coord_line)
        .map(|l| l.trim().to_lowercase().starts_with('s'))
        .unwrap_or(false)
    {
        coord_line += 1;
    }

    let coord_type = lines
        .get(coord_line)
        .ok_or_else(|| fail("Missing coordinate type line".to_string()))?
        .trim()
        .to_lowercase();
    let mode = if coord_type.starts_with('c') || coord_type.starts_with('k') {
        CoordinateMode::Cartesian
    } else {
        CoordinateMode::Direct
    };

    let total: usize = counts.iter().sum();
    let mut species = Vec::with_capacity(total);
    for (elem, &count) in elements.iter().zip(counts.iter()) {
        species.extend(std::iter::repeat(elem.clone()).take(count));
    }

    let mut coords = Vec::with_capacity(total);
    for i in 0..total {
        let line_no = coord_line + 1 + i;
        let line = lines
            .get(line_no)
            .ok_or_else(|| fail(format!("Expected {} positions, found {}", total, i)))?;
        let parts: Vec<f64> = line
            .split_whitespace()
            .take(3)
            .filter_map(|s| s.parse().ok())
            .collect();
        if parts.len() < 3 {
            return Err(fail(format!("Invalid position at line {}", line_no + 1)));
        }
        let pos = [parts[0], parts[1], parts[2]];
        coords.push(match mode {
            CoordinateMode::Cartesian => pos.map(|v| v * scale),
            CoordinateMode::Direct => pos,
        });
    }

    Ok(Poscar {
        title,
        lattice,
        species,
        coords,
        mode,
    })
}

fn parse_counts(parts: &[&str]) -> std::result::Result<Vec<usize>, String> {
    parts
        .iter()
        .map(|s| {
            s.parse::<usize>()
                .map_err(|_| format!("Invalid atom count '{}'", s))
        })
        .collect()
}

/// 将帧转换为 POSCAR 格式字符串（笛卡尔坐标）
pub fn to_poscar_string(frame: &Frame, title: &str) -> String {
    let groups = frame.species_groups();
    let mut result = String::new();

    // Line 0: Comment
    result.push_str(&format!("{}\n", title));

    // Line 1: Scale
    result.push_str("1.0\n");

    // Lines 2-4: Lattice
    for row in &frame.lattice.matrix {
        result.push_str(&format_vector(row));
    }

    // Line 5-6: Elements and counts
    result.push_str(&format!("{}\n", groups.symbols().join(" ")));
    let counts: Vec<String> = groups.counts().iter().map(|c| c.to_string()).collect();
    result.push_str(&format!("{}\n", counts.join(" ")));

    result.push_str("Cartesian\n");

    for (_, indices) in groups.iter() {
        for &i in indices {
            result.push_str(&format_vector(&frame.atoms[i].position));
        }
    }

    result
}

fn format_vector(v: &[f64; 3]) -> String {
    format!("{:.16} {:.16} {:.16}\n", v[0], v[1], v[2])
}

/// 写出 POSCAR 文件（原子写入）
pub fn write_poscar(frame: &Frame, dest: &Path, title: &str) -> Result<()> {
    fsutil::write_atomic(dest, &to_poscar_string(frame, title))
}
