// crates/sv_query/src/context.rs

//! 查询上下文与屏幕坐标变换

use serde::{Deserialize, Serialize};
use sv_foundation::{Extent, Point2D, SvError, SvResult};
use sv_mesh::PartitionScope;
use sv_state::FieldKind;

/// 一次查询所需的全部视图状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryContext {
    /// 输出步（从 1 开始）
    pub step: usize,
    /// 垂向层（从 0 开始，0 为表层）
    pub layer: usize,
    /// 当前场
    pub field: FieldKind,
    /// 分区范围
    pub scope: PartitionScope,
}

impl QueryContext {
    /// 创建上下文
    pub fn new(step: usize, layer: usize, field: FieldKind, scope: PartitionScope) -> Self {
        Self {
            step,
            layer,
            field,
            scope,
        }
    }

    /// 替换场
    pub fn with_field(self, field: FieldKind) -> Self {
        Self { field, ..self }
    }

    /// 替换层
    pub fn with_layer(self, layer: usize) -> Self {
        Self { layer, ..self }
    }

    /// 替换分区范围
    pub fn with_scope(self, scope: PartitionScope) -> Self {
        Self { scope, ..self }
    }
}

/// 绘图区像素坐标到数据坐标的线性映射
///
/// 像素 `y` 向下增长，数据 `y` 向上增长。
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// 数据范围
    pub world: Extent,
    /// 绘图区宽度（像素）
    pub width: f64,
    /// 绘图区高度（像素）
    pub height: f64,
}

impl ViewTransform {
    /// 创建变换，绘图区尺寸必须为正
    pub fn new(world: Extent, width: f64, height: f64) -> SvResult<Self> {
        if !(width > 0.0 && height > 0.0) {
            return Err(SvError::invalid_input(format!(
                "绘图区尺寸必须为正: {}x{}",
                width, height
            )));
        }
        Ok(Self {
            world,
            width,
            height,
        })
    }

    /// 像素坐标 -> 数据坐标
    pub fn to_world(&self, px: f64, py: f64) -> Point2D {
        let w = &self.world;
        Point2D::new(
            w.min_x + px * w.width() / self.width,
            w.min_y + (self.height - py) * w.height() / self.height,
        )
    }
}
