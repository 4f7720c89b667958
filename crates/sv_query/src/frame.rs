// crates/sv_query/src/frame.rs

//! 绘制数据
//!
//! 每次重绘时会话把需要显示的全部数据打包为 [`RenderFrame`] 交给外部绘制端，
//! 本库本身不做任何绘制。

use serde::Serialize;
use sv_foundation::SvResult;
use sv_state::{FieldKind, FieldSnapshot};

use crate::range::ScalarRange;
use crate::slice::SliceBuffer;

/// 显示模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayMode {
    /// 平面图
    Plan,
    /// 垂向切片
    Slice,
    /// 平面图 + 单点取值
    Probe,
}

/// 单个分区当前层的标量
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanLayer {
    /// 分区
    pub partition: usize,
    /// 逐单元值
    pub values: Vec<f64>,
}

/// 单个分区当前层的速度
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlanVectors {
    /// 分区
    pub partition: usize,
    /// 东向分量
    pub u: Vec<f64>,
    /// 北向分量
    pub v: Vec<f64>,
}

/// 标量数据来源
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalarSource {
    /// 平面图：范围内各分区
    Plan {
        /// 各分区的值
        layers: Vec<PlanLayer>,
    },
    /// 切片网格 `[采样][层]`
    Slice {
        /// 采样位置
        positions: Vec<f64>,
        /// 场值
        grid: Vec<Vec<f64>>,
    },
}

/// 矢量数据来源
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum VectorSource {
    /// 平面速度
    Plan {
        /// 各分区的速度
        partitions: Vec<PlanVectors>,
    },
    /// 切片内的沿线速度与垂向速度
    Slice {
        /// 沿线分量
        along: Vec<Vec<f64>>,
        /// 垂向分量
        vertical: Vec<Vec<f64>>,
    },
}

/// 一次重绘所需的全部数据
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderFrame {
    /// 显示模式
    pub mode: DisplayMode,
    /// 场
    pub field: FieldKind,
    /// 时间步
    pub step: Option<usize>,
    /// 层
    pub layer: usize,
    /// 标量
    pub scalar: ScalarSource,
    /// 色标范围
    pub range: ScalarRange,
    /// 矢量
    pub vectors: VectorSource,
    /// 矢量幅值上限
    pub umag_max: f64,
    /// 垂向层界面
    pub layer_interfaces: Vec<f64>,
    /// 状态栏文字
    pub status: String,
}

impl ScalarSource {
    /// 平面图数据
    pub fn plan(
        snapshot: &FieldSnapshot,
        field: FieldKind,
        layer: usize,
        partitions: impl Iterator<Item = usize>,
    ) -> Self {
        let layers = partitions
            .filter_map(|p| {
                let fields = snapshot.partition(p)?;
                let values = fields.values(field, layer)?.into_owned();
                Some(PlanLayer {
                    partition: p,
                    values,
                })
            })
            .collect();
        Self::Plan { layers }
    }

    /// 切片数据
    pub fn slice(buffer: &SliceBuffer) -> Self {
        Self::Slice {
            positions: buffer.positions().collect(),
            grid: buffer.data.clone(),
        }
    }
}

impl VectorSource {
    /// 平面速度
    pub fn plan(
        snapshot: &FieldSnapshot,
        layer: usize,
        partitions: impl Iterator<Item = usize>,
    ) -> Self {
        let partitions = partitions
            .filter_map(|p| {
                let fields = snapshot.partition(p)?;
                (layer < fields.u.n_layers()).then(|| PlanVectors {
                    partition: p,
                    u: fields.u.layer(layer).to_vec(),
                    v: fields.v.layer(layer).to_vec(),
                })
            })
            .collect();
        Self::Plan { partitions }
    }

    /// 切片速度
    pub fn slice(buffer: &SliceBuffer) -> Self {
        Self::Slice {
            along: buffer.along.clone(),
            vertical: buffer.vertical.clone(),
        }
    }
}

/// 绘制端
pub trait RenderSink {
    /// 接收一帧数据
    fn render(&mut self, frame: &RenderFrame) -> SvResult<()>;
}

/// 只保留最后一帧的绘制端
#[derive(Debug, Default)]
pub struct LastFrame {
    /// 最近一帧
    pub frame: Option<RenderFrame>,
}

impl RenderSink for LastFrame {
    fn render(&mut self, frame: &RenderFrame) -> SvResult<()> {
        self.frame = Some(frame.clone());
        Ok(())
    }
}
