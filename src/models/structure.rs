//! # 晶体结构数据模型
//!
//! 轨迹帧 (Frame) 的统一表示：晶格 + 原子列表（笛卡尔坐标）。
//! 同时提供笛卡尔坐标与分数坐标之间的转换。
//!
//! ## 依赖关系
//! - 被 `parsers/` 和 `magmom/` 使用
//! - 使用 `error.rs`

use crate::error::{MagprepError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 行列式绝对值小于该阈值时视为奇异晶格
const SINGULAR_EPS: f64 = 1e-10;

/// 晶格参数表示
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Lattice {
    /// 晶格向量矩阵 (3x3)，行向量表示 a, b, c
    /// [[a1, a2, a3], [b1, b2, b3], [c1, c2, c3]]
    pub matrix: [[f64; 3]; 3],
}

impl Lattice {
    /// 从晶格向量矩阵创建
    pub fn from_vectors(matrix: [[f64; 3]; 3]) -> Self {
        Lattice { matrix }
    }

    /// 从 9 个数（按行展开）创建
    pub fn from_flat(values: &[f64; 9]) -> Self {
        Lattice {
            matrix: [
                [values[0], values[1], values[2]],
                [values[3], values[4], values[5]],
                [values[6], values[7], values[8]],
            ],
        }
    }

    /// 整体缩放（POSCAR 缩放因子）
    pub fn scaled(&self, scale: f64) -> Self {
        let mut matrix = self.matrix;
        for row in matrix.iter_mut() {
            for v in row.iter_mut() {
                *v *= scale;
            }
        }
        Lattice { matrix }
    }

    /// 行列式
    pub fn determinant(&self) -> f64 {
        let [a, b, c] = self.matrix;
        a[0] * (b[1] * c[2] - b[2] * c[1]) - a[1] * (b[0] * c[2] - b[2] * c[0])
            + a[2] * (b[0] * c[1] - b[1] * c[0])
    }

    /// 晶胞体积 (Å³)
    pub fn volume(&self) -> f64 {
        self.determinant().abs()
    }

    /// 逆矩阵（伴随矩阵 / 行列式）
    pub fn inverse(&self) -> Result<[[f64; 3]; 3]> {
        let m = self.matrix;
        let det = self.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPS {
            return Err(MagprepError::SingularLattice { det });
        }

        Ok([
            [
                (m[1][1] * m[2][2] - m[1][2] * m[2][1]) / det,
                (m[0][2] * m[2][1] - m[0][1] * m[2][2]) / det,
                (m[0][1] * m[1][2] - m[0][2] * m[1][1]) / det,
            ],
            [
                (m[1][2] * m[2][0] - m[1][0] * m[2][2]) / det,
                (m[0][0] * m[2][2] - m[0][2] * m[2][0]) / det,
                (m[0][2] * m[1][0] - m[0][0] * m[1][2]) / det,
            ],
            [
                (m[1][0] * m[2][1] - m[1][1] * m[2][0]) / det,
                (m[0][1] * m[2][0] - m[0][0] * m[2][1]) / det,
                (m[0][0] * m[1][1] - m[0][1] * m[1][0]) / det,
            ],
        ])
    }
}

/// 行向量右乘矩阵: v · M
fn row_times(v: [f64; 3], m: &[[f64; 3]; 3]) -> [f64; 3] {
    [
        v[0] * m[0][0] + v[1] * m[1][0] + v[2] * m[2][0],
        v[0] * m[0][1] + v[1] * m[1][1] + v[2] * m[2][1],
        v[0] * m[0][2] + v[1] * m[1][2] + v[2] * m[2][2],
    ]
}

/// 笛卡尔坐标转分数坐标: frac = cart · L⁻¹
///
/// 晶格奇异时返回 `SingularLattice`。
pub fn fractional(cartesian: &[[f64; 3]], lattice: &Lattice) -> Result<Vec<[f64; 3]>> {
    let inv = lattice.inverse()?;
    Ok(cartesian.iter().map(|&c| row_times(c, &inv)).collect())
}

/// 分数坐标转笛卡尔坐标: cart = frac · L
pub fn cartesian(fractional: &[[f64; 3]], lattice: &Lattice) -> Vec<[f64; 3]> {
    fractional
        .iter()
        .map(|&f| row_times(f, &lattice.matrix))
        .collect()
}

/// 原子信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Atom {
    /// 元素符号
    pub species: String,

    /// 笛卡尔坐标 [x, y, z] (Å)
    pub position: [f64; 3],
}

impl Atom {
    pub fn new(species: impl Into<String>, position: [f64; 3]) -> Self {
        Atom {
            species: species.into(),
            position,
        }
    }
}

/// 轨迹中的一帧
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    /// 晶格
    pub lattice: Lattice,

    /// 原子列表（文件顺序）
    pub atoms: Vec<Atom>,
}

impl Frame {
    pub fn new(lattice: Lattice, atoms: Vec<Atom>) -> Self {
        Frame { lattice, atoms }
    }

    /// 元素符号列表（文件顺序）
    pub fn species(&self) -> Vec<String> {
        self.atoms.iter().map(|a| a.species.clone()).collect()
    }

    /// 笛卡尔坐标列表（文件顺序）
    pub fn positions(&self) -> Vec<[f64; 3]> {
        self.atoms.iter().map(|a| a.position).collect()
    }

    /// 分数坐标列表（文件顺序）
    pub fn fractional_positions(&self) -> Result<Vec<[f64; 3]>> {
        fractional(&self.positions(), &self.lattice)
    }

    /// 按元素首次出现顺序分组
    pub fn species_groups(&self) -> SpeciesGroups {
        SpeciesGroups::from_species(self.atoms.iter().map(|a| a.species.as_str()))
    }

    /// 按 POSCAR 写出顺序重排原子（同种元素相邻，组内保持原顺序）
    pub fn grouped(&self) -> Frame {
        let atoms = self
            .species_groups()
            .iter()
            .flat_map(|(_, idx)| idx.iter().map(|&i| self.atoms[i].clone()))
            .collect();
        Frame::new(self.lattice, atoms)
    }

    /// 化学式（元素按首次出现顺序）
    pub fn formula(&self) -> String {
        self.species_groups()
            .iter()
            .map(|(el, idx)| {
                if idx.len() == 1 {
                    el.to_string()
                } else {
                    format!("{}{}", el, idx.len())
                }
            })
            .collect::<Vec<_>>()
            .join("")
    }
}

/// 元素 -> 原子索引列表，保持元素首次出现顺序
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeciesGroups {
    groups: Vec<(String, Vec<usize>)>,
}

impl SpeciesGroups {
    /// 单次遍历构建分组
    pub fn from_species<'a, I>(species: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut slot: HashMap<&'a str, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

        for (i, sp) in species.into_iter().enumerate() {
            let g = *slot.entry(sp).or_insert_with(|| {
                groups.push((sp.to_string(), Vec::new()));
                groups.len() - 1
            });
            groups[g].1.push(i);
        }

        SpeciesGroups { groups }
    }

    /// 元素符号（首次出现顺序）
    pub fn symbols(&self) -> Vec<&str> {
        self.groups.iter().map(|(s, _)| s.as_str()).collect()
    }

    /// 每种元素的原子数
    pub fn counts(&self) -> Vec<usize> {
        self.groups.iter().map(|(_, idx)| idx.len()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups.iter().map(|(s, idx)| (s.as_str(), idx.as_slice()))
    }
}
