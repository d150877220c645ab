//! # 磁矩场生成
//!
//! 根据元素、分数坐标、磁序模式与强度档位为每个原子生成磁矩向量。
//!
//! - `FM`: 全部沿 +z
//! - `AFM1`: 沿 z 分层，层号 round(z·4)，偶数层 +z，奇数层 -z
//! - `AFM2`: xy 棋盘格，round(x·4) + round(y·4) 为偶数时 +z
//! - `random`: 单位球面均匀分布方向
//!
//! 随机源由调用方显式传入，给定种子即可复现。
//!
//! ## 依赖关系
//! - 被 `magmom/mod.rs` 使用
//! - 使用 `models/magnetism.rs`, `magmom/ranges.rs`

use super::ranges::MomentRangeTable;
use crate::error::{MagprepError, Result};
use crate::models::{IntensityBand, MomentVector, OrderingMode};
use rand::Rng;
use std::f64::consts::PI;

/// 每个晶格方向上的格点分辨率
const GRID_DIVISIONS: f64 = 4.0;

/// 生成全部原子的磁矩
pub fn generate<R: Rng + ?Sized>(
    species: &[String],
    fractional: &[[f64; 3]],
    mode: OrderingMode,
    intensity: IntensityBand,
    table: &MomentRangeTable,
    rng: &mut R,
) -> Result<Vec<MomentVector>> {
    if species.len() != fractional.len() {
        return Err(MagprepError::InvalidArgument(format!(
            "{} species but {} positions",
            species.len(),
            fractional.len()
        )));
    }

    species
        .iter()
        .zip(fractional)
        .map(|(sp, &pos)| -> Result<MomentVector> {
            let range = table.get(intensity, sp)?;
            let magnitude = rng.gen_range(range.min..=range.max);
            let dir = direction(mode, pos, &mut *rng);
            Ok(MomentVector(dir.map(|d| magnitude * d)))
        })
        .collect()
}

/// 单个原子的方向（单位向量）
pub fn direction<R: Rng + ?Sized>(mode: OrderingMode, frac: [f64; 3], rng: &mut R) -> [f64; 3] {
    match mode {
        OrderingMode::Fm => [0.0, 0.0, 1.0],
        OrderingMode::Afm1 => [0.0, 0.0, parity_sign(grid_index(frac[2]))],
        OrderingMode::Afm2 => {
            let ix = grid_index(frac[0]);
            let iy = grid_index(frac[1]);
            [0.0, 0.0, parity_sign(ix + iy)]
        }
        OrderingMode::Random => random_unit_vector(rng),
    }
}

/// 球面均匀分布：u ~ U(-1,1), φ ~ U(0,2π)
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> [f64; 3] {
    let u: f64 = rng.gen_range(-1.0..1.0);
    let phi: f64 = rng.gen_range(0.0..2.0 * PI);
    let sin_theta = (1.0 - u * u).sqrt();
    [sin_theta * phi.cos(), sin_theta * phi.sin(), u]
}

/// 格点编号，0.5 时向偶数取整
fn grid_index(x: f64) -> i64 {
    (x * GRID_DIVISIONS).round_ties_even() as i64
}

fn parity_sign(index: i64) -> f64 {
    if index.rem_euclid(2) == 0 {
        1.0
    } else {
        -1.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn fe(n: usize) -> Vec<String> {
        vec!["Fe".to_string(); n]
    }

    fn z_of(m: &MomentVector) -> f64 {
        m.0[2]
    }

    #[test]
    fn test_fm_all_up() {
        let mut rng = StdRng::seed_from_u64(1);
        let table = MomentRangeTable::default();
        let frac = vec![[0.0, 0.0, 0.0], [0.3, 0.7, 0.25], [0.9, 0.1, 0.5]];
        let moments = generate(&fe(3), &frac, OrderingMode::Fm, IntensityBand::High, &table, &mut rng).unwrap();

        for m in &moments {
            assert_eq!(m.0[0], 0.0);
            assert_eq!(m.0[1], 0.0);
            assert!(m.0[2] >= 2.4 && m.0[2] <= 2.8);
        }
    }

    #[test]
    fn test_afm1_layers() {
        let mut rng = StdRng::seed_from_u64(2);
        let table = MomentRangeTable::default();
        let frac = vec![
            [0.1, 0.2, 0.0],
            [0.1, 0.2, 0.25],
            [0.6, 0.4, 0.5],
            [0.0, 0.0, 0.75],
            [0.3, 0.3, 0.02],
        ];
        let m = generate(&fe(5), &frac, OrderingMode::Afm1, IntensityBand::Medium, &table, &mut rng).unwrap();

        // z 相差 0.25 -> 符号相反
        assert!(z_of(&m[0]) > 0.0);
        assert!(z_of(&m[1]) < 0.0);
        assert!(z_of(&m[2]) > 0.0);
        assert!(z_of(&m[3]) < 0.0);
        // 同一层 -> 同号
        assert!(z_of(&m[4]) > 0.0);
    }

    #[test]
    fn test_afm2_checkerboard() {
        let mut rng = StdRng::seed_from_u64(3);
        let table = MomentRangeTable::default();
        let frac = vec![
            [0.0, 0.0, 0.1],
            [0.25, 0.25, 0.6],
            [0.25, 0.0, 0.3],
            [0.0, 0.25, 0.9],
        ];
        let m = generate(&fe(4), &frac, OrderingMode::Afm2, IntensityBand::Low, &table, &mut rng).unwrap();

        assert!(z_of(&m[0]) > 0.0);
        assert!(z_of(&m[1]) > 0.0);
        assert!(z_of(&m[2]) < 0.0);
        assert!(z_of(&m[3]) < 0.0);
    }

    #[test]
    fn test_grid_index_ties_to_even() {
        assert_eq!(grid_index(0.125), 0);
        assert_eq!(grid_index(0.375), 2);
        assert_eq!(grid_index(-0.25), -1);
        assert_eq!(parity_sign(-1), -1.0);
        assert_eq!(parity_sign(-2), 1.0);
    }

    #[test]
    fn test_random_magnitudes_and_unit_directions() {
        let mut rng = StdRng::seed_from_u64(42);
        let table = MomentRangeTable::default();
        let species: Vec<String> = (0..2000)
            .map(|i| if i % 2 == 0 { "Fe" } else { "Ni" }.to_string())
            .collect();
        let frac = vec![[0.0, 0.0, 0.0]; species.len()];
        let m = generate(&species, &frac, OrderingMode::Random, IntensityBand::High, &table, &mut rng).unwrap();

        for (sp, v) in species.iter().zip(&m) {
            let range = table.get(IntensityBand::High, sp).unwrap();
            let norm = (v.0[0].powi(2) + v.0[1].powi(2) + v.0[2].powi(2)).sqrt();
            assert!(norm >= range.min - 1e-9 && norm <= range.max + 1e-9);
        }
    }

    #[test]
    fn test_random_directions_isotropic() {
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let mut sum = [0.0; 3];
        for _ in 0..n {
            let d = random_unit_vector(&mut rng);
            let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
            assert!((norm - 1.0).abs() < 1e-12);
            for k in 0..3 {
                sum[k] += d[k];
            }
        }

        // 每个分量方差 1/3，均值标准误差约 0.004
        for s in sum {
            assert!((s / n as f64).abs() < 0.03);
        }
    }

    #[test]
    fn test_missing_range_is_fatal() {
        let mut rng = StdRng::seed_from_u64(0);
        let table = MomentRangeTable::default();
        let species = vec!["Fe".to_string(), "Co".to_string()];
        let frac = vec![[0.0; 3]; 2];
        let err = generate(&species, &frac, OrderingMode::Fm, IntensityBand::High, &table, &mut rng).unwrap_err();
        assert!(matches!(err, MagprepError::MissingRange { .. }));
    }

    #[test]
    fn test_length_mismatch() {
        let mut rng = StdRng::seed_from_u64(0);
        let table = MomentRangeTable::default();
        let err = generate(&fe(2), &[[0.0; 3]], OrderingMode::Fm, IntensityBand::High, &table, &mut rng).unwrap_err();
        assert!(matches!(err, MagprepError::InvalidArgument(_)));
    }

    #[test]
    fn test_same_seed_same_moments() {
        let table = MomentRangeTable::default();
        let frac = vec![[0.1, 0.2, 0.3]; 5];
        let a = generate(&fe(5), &frac, OrderingMode::Random, IntensityBand::Low, &table, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = generate(&fe(5), &frac, OrderingMode::Random, IntensityBand::Low, &table, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }
}
