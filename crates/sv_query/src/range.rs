// crates/sv_query/src/range.rs

//! 色标范围与矢量幅值上限
//!
//! 哨兵值一律排除在统计之外。没有有效值或最小值等于最大值时，
//! 标量范围退化为固定的 `(0, 1)`。

use serde::Serialize;
use sv_foundation::SentinelExt;
use sv_mesh::PartitionScope;
use sv_state::{FieldKind, MeshPartitionStore};

use crate::context::QueryContext;
use crate::slice::SliceBuffer;

/// 退化时使用的默认范围
pub const DEFAULT_RANGE: ScalarRange = ScalarRange { min: 0.0, max: 1.0 };

/// 标量范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ScalarRange {
    /// 下界
    pub min: f64,
    /// 上界
    pub max: f64,
}

impl ScalarRange {
    /// 有效值的最小最大值，退化时返回 [`DEFAULT_RANGE`]
    pub fn of<I: IntoIterator<Item = f64>>(values: I) -> Self {
        let mut bounds: Option<(f64, f64)> = None;
        for v in values.into_iter().filter_map(SentinelExt::valid) {
            bounds = Some(match bounds {
                None => (v, v),
                Some((lo, hi)) => (lo.min(v), hi.max(v)),
            });
        }
        match bounds {
            Some((min, max)) if min != max => Self { min, max },
            _ => DEFAULT_RANGE,
        }
    }

    /// 宽度
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// 把值归一化到 `[0, 1]`（不截断）
    pub fn normalize(&self, value: f64) -> f64 {
        (value - self.min) / self.span()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MagnitudeKey {
    step: Option<usize>,
    layer: usize,
    scope: PartitionScope,
}

/// 色标范围与矢量幅值计算
#[derive(Debug, Clone, Default)]
pub struct RangeNormalizer {
    umag_cache: Option<(MagnitudeKey, f64)>,
}

impl RangeNormalizer {
    /// 创建
    pub fn new() -> Self {
        Self::default()
    }

    /// 丢弃缓存的幅值上限
    pub fn invalidate(&mut self) {
        self.umag_cache = None;
    }

    /// 标量范围
    ///
    /// 给出切片时统计切片网格，否则统计范围内各分区当前层的场值。
    pub fn compute_scalar_range(
        &self,
        store: &MeshPartitionStore,
        ctx: &QueryContext,
        slice: Option<&SliceBuffer>,
    ) -> ScalarRange {
        if let Some(slice) = slice {
            return ScalarRange::of(slice.data.iter().flatten().copied());
        }
        let snapshot = store.snapshot();
        let n = snapshot.n_partitions();
        ScalarRange::of(
            ctx.scope
                .partitions(n)
                .filter_map(|p| snapshot.values(ctx.field, p, ctx.layer))
                .flat_map(|values| values.into_owned()),
        )
    }

    /// 速度幅值上限 `max sqrt(u² + v²)`，从 0 开始，任一分量为哨兵值的点跳过
    ///
    /// 切片模式下使用沿线速度与垂向速度并且每次重新计算；
    /// 平面模式按 `(时间步, 层, 分区范围)` 缓存。
    pub fn compute_vector_magnitude_max(
        &mut self,
        store: &MeshPartitionStore,
        ctx: &QueryContext,
        slice: Option<&SliceBuffer>,
    ) -> f64 {
        if let Some(slice) = slice {
            return magnitude_max(
                slice
                    .along
                    .iter()
                    .zip(&slice.vertical)
                    .flat_map(|(a, w)| a.iter().copied().zip(w.iter().copied())),
            );
        }

        let snapshot = store.snapshot();
        let key = MagnitudeKey {
            step: snapshot.step(),
            layer: ctx.layer,
            scope: ctx.scope,
        };
        if let Some((cached, value)) = self.umag_cache {
            if cached == key {
                return value;
            }
        }

        let value = magnitude_max(ctx.scope.partitions(snapshot.n_partitions()).flat_map(|p| {
            let u = snapshot.stored_values(FieldKind::UVelocity, p, ctx.layer).unwrap_or(&[]);
            let v = snapshot.stored_values(FieldKind::VVelocity, p, ctx.layer).unwrap_or(&[]);
            u.iter().copied().zip(v.iter().copied())
        }));
        self.umag_cache = Some((key, value));
        value
    }
}

fn magnitude_max(pairs: impl Iterator<Item = (f64, f64)>) -> f64 {
    pairs
        .filter(|(a, b)| !a.is_sentinel() && !b.is_sentinel())
        .map(|(a, b)| a.hypot(b))
        .fold(0.0, f64::max)
}
