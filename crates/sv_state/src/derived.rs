// crates/sv_state/src/derived.rs

//! 派生场计算
//!
//! 把原始的边/界面数组转换为单元中心量：
//!
//! - 水平速度：单元三条边的法向通量平均
//! - 垂向速度：上下两个界面值各取一半
//! - 盐度扰动：`s - s0`
//! - 水柱高度：`h + depth`，过浅视为干单元

use sv_foundation::sentinel::combine;
use sv_foundation::{SentinelExt, SvError, SvResult, EMPTY};
use sv_mesh::{Partition, NFACES};

/// 干单元阈值：`(h + depth) / depth` 小于该值时水柱高度记为哨兵值
pub const SMALLHEIGHT: f64 = 0.001;

/// 单个分区的派生场计算器
#[derive(Debug, Clone, Copy)]
pub struct DerivedFieldBuilder<'a> {
    faces: &'a [[usize; NFACES]],
    depth: &'a [f64],
}

impl<'a> DerivedFieldBuilder<'a> {
    /// 基于分区的面映射和水深创建
    pub fn new(partition: &'a Partition) -> Self {
        Self {
            faces: &partition.faces,
            depth: &partition.depth,
        }
    }

    /// 直接由面映射和水深创建
    pub fn from_parts(faces: &'a [[usize; NFACES]], depth: &'a [f64]) -> Self {
        Self { faces, depth }
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.faces.len()
    }

    /// 把逐边数组平均到单元
    pub fn face_average(&self, edge_values: &[f64]) -> SvResult<Vec<f64>> {
        let n = NFACES as f64;
        self.faces
            .iter()
            .map(|face| {
                face.iter().try_fold(0.0, |acc, &e| -> SvResult<f64> {
                    let v = edge_values
                        .get(e)
                        .ok_or_else(|| SvError::index_out_of_bounds("edge", e, edge_values.len()))?;
                    Ok(acc + v / n)
                })
            })
            .collect()
    }

    /// 单层水平速度 `(u, v)`
    ///
    /// 背景盐度为哨兵值的单元两个分量都记为哨兵值。
    pub fn horizontal_velocity(
        &self,
        u_edges: &[f64],
        v_edges: &[f64],
        background: &[f64],
    ) -> SvResult<(Vec<f64>, Vec<f64>)> {
        SvError::check_size("background", self.n_cells(), background.len())?;
        let mut u = self.face_average(u_edges)?;
        let mut v = self.face_average(v_edges)?;
        for (j, &s0) in background.iter().enumerate() {
            if s0.is_sentinel() {
                u[j] = EMPTY;
                v[j] = EMPTY;
            }
        }
        Ok((u, v))
    }

    /// 单层垂向速度：第 `k` 与 `k+1` 个界面值的平均
    ///
    /// 盐度或背景盐度为哨兵值的单元记为哨兵值。
    pub fn vertical_velocity(
        &self,
        upper: &[f64],
        lower: &[f64],
        salinity: &[f64],
        background: &[f64],
    ) -> SvResult<Vec<f64>> {
        let nc = self.n_cells();
        SvError::check_size("w upper", nc, upper.len())?;
        SvError::check_size("w lower", nc, lower.len())?;
        SvError::check_size("salinity", nc, salinity.len())?;
        SvError::check_size("background", nc, background.len())?;
        Ok((0..nc)
            .map(|j| {
                if salinity[j].is_sentinel() || background[j].is_sentinel() {
                    EMPTY
                } else {
                    0.5 * upper[j] + 0.5 * lower[j]
                }
            })
            .collect())
    }

    /// 盐度扰动 `s - s0`，任一为哨兵值时结果为哨兵值
    pub fn perturbation(salinity: &[f64], background: &[f64]) -> SvResult<Vec<f64>> {
        SvError::check_size("background", salinity.len(), background.len())?;
        Ok(salinity
            .iter()
            .zip(background)
            .map(|(&s, &s0)| combine(s, s0, |a, b| a - b))
            .collect())
    }

    /// 水柱高度 `h + depth`
    ///
    /// 水深非正或相对水柱高度低于 [`SMALLHEIGHT`] 时为哨兵值。
    pub fn water_column(&self, free_surface: &[f64]) -> SvResult<Vec<f64>> {
        SvError::check_size("free surface", self.depth.len(), free_surface.len())?;
        Ok(free_surface
            .iter()
            .zip(self.depth)
            .map(|(&h, &d)| {
                if h.is_sentinel() || d <= 0.0 {
                    return EMPTY;
                }
                let hd = h + d;
                if hd / d < SMALLHEIGHT {
                    EMPTY
                } else {
                    hd
                }
            })
            .collect())
    }
}
