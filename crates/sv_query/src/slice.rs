// crates/sv_query/src/slice.rs

//! 垂向切片
//!
//! 分区之后没有全局连接关系，因此切片不沿拓扑追踪，而是对范围内每个单元做几何判断：
//!
//! 1. 两个端点先吸附到最近的单元中心，作为切线的实际端点
//! 2. 单元中心取顶点平均，容差半径取第一个顶点到中心的距离
//! 3. 中心在切线方向上的投影 `mag` 位于 `[0, mag0]`、
//!    到切线的垂距 `dist` 不超过容差半径时选中
//! 4. 选中单元按 `mag` 稳定排序，得到从起点到终点的采样顺序
//!
//! 端点不变时（例如切换场或时间步）只重新采样，不重新选取。

use serde::Serialize;
use sv_foundation::{Extent, Point2D, SentinelExt, SvError, SvResult, EMPTY};
use sv_mesh::{MeshTopology, NearestCellSearch, PartitionScope};
use sv_state::{FieldKind, MeshPartitionStore};
use tracing::{debug, warn};

use crate::context::QueryContext;

/// 默认的最大采样数
pub const NSLICEMAX: usize = 1000;
/// 有效切片的最少采样数
pub const NSLICEMIN: usize = 2;

/// 切片选项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SliceOptions {
    /// 采样数上限，`None` 表示不限
    pub max_samples: Option<usize>,
    /// 是否从沿线速度中减去深度平均值
    pub remove_depth_mean: bool,
}

impl Default for SliceOptions {
    fn default() -> Self {
        Self {
            max_samples: Some(NSLICEMAX),
            remove_depth_mean: false,
        }
    }
}

/// 切线几何
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliceLine {
    /// 起点（单元中心）
    pub start: Point2D,
    /// 终点（单元中心）
    pub end: Point2D,
    /// 单位方向
    pub direction: Point2D,
    /// 长度 `mag0`
    pub length: f64,
}

impl SliceLine {
    /// 由两个端点构造，长度为零时返回 `None`
    pub fn new(start: Point2D, end: Point2D) -> Option<Self> {
        let d = end - start;
        let length = d.length();
        if length == 0.0 || !length.is_finite() {
            return None;
        }
        Some(Self {
            start,
            end,
            direction: d * (1.0 / length),
            length,
        })
    }

    /// 点在切线上的投影位置和到切线的垂距
    pub fn project(&self, p: Point2D) -> (f64, f64) {
        let r = p - self.start;
        let mag = r.dot(&self.direction);
        let dist = (r.dot(&r) - mag * mag).max(0.0).sqrt();
        (mag, dist)
    }

    /// 中心为 `center`、容差半径为 `radius` 的单元是否被选中
    pub fn selects(&self, center: Point2D, radius: f64) -> Option<f64> {
        let (mag, dist) = self.project(center);
        (dist <= radius && mag >= 0.0 && mag <= self.length).then_some(mag)
    }
}

/// 一个采样点
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SliceSample {
    /// 分区
    pub partition: usize,
    /// 分区内单元
    pub cell: usize,
    /// 沿切线的位置
    pub position: f64,
}

/// 在给定范围内选取切线穿过的单元，按位置稳定排序
pub fn select_cells(
    topo: &MeshTopology,
    scope: PartitionScope,
    line: &SliceLine,
) -> Vec<SliceSample> {
    let mut samples: Vec<SliceSample> = topo
        .cells_in(scope)
        .filter_map(|(p, i)| {
            let center = topo.vertex_centroid(p, i);
            let radius = topo.equivalent_radius(p, i);
            line.selects(center, radius).map(|position| SliceSample {
                partition: p,
                cell: i,
                position,
            })
        })
        .collect();
    samples.sort_by(|a, b| a.position.total_cmp(&b.position));
    samples
}

/// 切片结果
///
/// 所有二维数组均为 `[采样][层]`。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SliceBuffer {
    /// 切线
    pub line: SliceLine,
    /// 有序采样
    pub samples: Vec<SliceSample>,
    /// 采样对应的场
    pub field: FieldKind,
    /// 采样对应的时间步
    pub step: Option<usize>,
    /// 自由面
    pub free_surface: Vec<f64>,
    /// 水深
    pub depth: Vec<f64>,
    /// 场值
    pub data: Vec<Vec<f64>>,
    /// 沿线水平速度
    pub along: Vec<Vec<f64>>,
    /// 垂向速度
    pub vertical: Vec<Vec<f64>>,
    /// 深度积分的沿线速度
    pub depth_integrated: Vec<f64>,
    /// 垂向层界面
    pub layer_interfaces: Vec<f64>,
}

impl SliceBuffer {
    /// 采样数
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// 是否没有采样
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// 各采样的位置
    pub fn positions(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.position)
    }

    /// 剖面图范围：`x ∈ [0, 最大位置]`，`z ∈ [-dmax, dmax]`
    pub fn extent(&self) -> Extent {
        let x_max = self.positions().fold(0.0, f64::max);
        let dmax = self.layer_interfaces.last().map_or(0.0, |z| -z);
        Extent::new(0.0, -dmax, x_max, dmax)
    }
}

/// 切片被拒绝的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SliceRejection {
    /// 两个端点吸附到同一个单元中心
    DegenerateLine,
    /// 选中单元不足
    TooFewSamples {
        /// 实际选中数
        found: usize,
    },
    /// 端点未变但没有可复用的选取
    NoPreviousSelection,
    /// 查询范围内没有单元
    EmptyScope,
}

/// 切片请求结果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SliceOutcome {
    /// 有效，附采样数
    Valid(usize),
    /// 无效，调用方应回到平面显示
    Invalid(SliceRejection),
}

impl SliceOutcome {
    /// 是否有效
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }
}

/// 切片引擎
#[derive(Debug, Clone, Default)]
pub struct SliceEngine {
    options: SliceOptions,
    buffer: Option<SliceBuffer>,
}

impl SliceEngine {
    /// 使用给定选项创建
    pub fn new(options: SliceOptions) -> Self {
        Self {
            options,
            buffer: None,
        }
    }

    /// 选项
    pub fn options(&self) -> &SliceOptions {
        &self.options
    }

    /// 当前切片
    pub fn buffer(&self) -> Option<&SliceBuffer> {
        self.buffer.as_ref()
    }

    /// 丢弃当前切片
    pub fn clear(&mut self) {
        self.buffer = None;
    }

    /// 按两个数据坐标点求切片
    ///
    /// 两点相同时复用上一次的选取并重新采样；没有可复用的选取时返回
    /// `Invalid` 且保留原状态。选中数超过上限时返回 `CapacityExceeded` 错误。
    pub fn get_slice<S: NearestCellSearch + ?Sized>(
        &mut self,
        store: &MeshPartitionStore,
        search: &S,
        start: Point2D,
        end: Point2D,
        ctx: &QueryContext,
    ) -> SvResult<SliceOutcome> {
        if start == end {
            return self.resample(store, ctx);
        }

        let (Some(a), Some(b)) = (
            search.find_nearest(start, ctx.scope),
            search.find_nearest(end, ctx.scope),
        ) else {
            warn!("切片范围 {:?} 内没有单元", ctx.scope);
            self.buffer = None;
            return Ok(SliceOutcome::Invalid(SliceRejection::EmptyScope));
        };

        let Some(line) = SliceLine::new(a.centroid, b.centroid) else {
            warn!("切片端点吸附到同一单元 ({}, {})", a.partition, a.cell);
            self.buffer = None;
            return Ok(SliceOutcome::Invalid(SliceRejection::DegenerateLine));
        };

        let samples = select_cells(store.topology(), ctx.scope, &line);
        if let Some(limit) = self.options.max_samples {
            if samples.len() > limit {
                return Err(SvError::capacity_exceeded("slice samples", limit, samples.len()));
            }
        }
        if samples.len() < NSLICEMIN {
            warn!("切片只选中 {} 个单元", samples.len());
            self.buffer = None;
            return Ok(SliceOutcome::Invalid(SliceRejection::TooFewSamples {
                found: samples.len(),
            }));
        }

        debug!(
            "切片 ({:.2},{:.2})-({:.2},{:.2}) 选中 {} 个单元",
            line.start.x,
            line.start.y,
            line.end.x,
            line.end.y,
            samples.len()
        );
        let buffer = sample(store, line, samples, ctx.field, &self.options)?;
        let n = buffer.len();
        self.buffer = Some(buffer);
        Ok(SliceOutcome::Valid(n))
    }

    /// 端点不变，按新的场或时间步重新采样
    pub fn resample(
        &mut self,
        store: &MeshPartitionStore,
        ctx: &QueryContext,
    ) -> SvResult<SliceOutcome> {
        let Some(prev) = self.buffer.as_ref().filter(|b| b.len() >= NSLICEMIN) else {
            return Ok(SliceOutcome::Invalid(SliceRejection::NoPreviousSelection));
        };
        let buffer = sample(store, prev.line, prev.samples.clone(), ctx.field, &self.options)?;
        let n = buffer.len();
        self.buffer = Some(buffer);
        Ok(SliceOutcome::Valid(n))
    }
}

/// 对已排序的选取逐层采样
fn sample(
    store: &MeshPartitionStore,
    line: SliceLine,
    samples: Vec<SliceSample>,
    field: FieldKind,
    options: &SliceOptions,
) -> SvResult<SliceBuffer> {
    let nk = store.n_layers();
    let snapshot = store.snapshot();
    let z = store.layer_interfaces();
    let dz = if z.len() > 1 { z[0] - z[1] } else { 0.0 };
    let source = match field {
        FieldKind::Salinity
        | FieldKind::SalinityPerturbation
        | FieldKind::BackgroundSalinity
        | FieldKind::UVelocity
        | FieldKind::VVelocity
        | FieldKind::WVelocity => field,
        _ => FieldKind::Mask,
    };

    let n = samples.len();
    let mut free_surface = Vec::with_capacity(n);
    let mut depth = Vec::with_capacity(n);
    let mut data = Vec::with_capacity(n);
    let mut along = Vec::with_capacity(n);
    let mut vertical = Vec::with_capacity(n);
    let mut depth_integrated = Vec::with_capacity(n);

    for s in &samples {
        let part = snapshot.partition(s.partition).ok_or_else(|| {
            SvError::index_out_of_bounds("partition", s.partition, snapshot.n_partitions())
        })?;
        SvError::check_index("cell", s.cell, part.n_cells())?;
        let d = part.depth[s.cell];
        free_surface.push(part.free_surface[s.cell]);
        depth.push(d);

        let mut ul: Vec<f64> = (0..nk)
            .map(|k| {
                let (u, v) = (part.u.get(k, s.cell), part.v.get(k, s.cell));
                if u.is_sentinel() || v.is_sentinel() {
                    EMPTY
                } else {
                    line.direction.x * u + line.direction.y * v
                }
            })
            .collect();
        let ubar: f64 = ul.iter().filter_map(|x| x.valid()).map(|x| x * dz).sum();
        if options.remove_depth_mean && d > 0.0 {
            for x in ul.iter_mut().filter(|x| !x.is_sentinel()) {
                *x -= ubar / d;
            }
        }
        along.push(ul);
        depth_integrated.push(ubar);
        vertical.push(part.w.column(s.cell).collect());
        data.push(
            (0..nk)
                .map(|k| part.value(source, k, s.cell).unwrap_or(EMPTY))
                .collect(),
        );
    }

    Ok(SliceBuffer {
        line,
        samples,
        field,
        step: snapshot.step(),
        free_surface,
        depth,
        data,
        along,
        vertical,
        depth_integrated,
        layer_interfaces: z.to_vec(),
    })
}
