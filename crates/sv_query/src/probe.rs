// crates/sv_query/src/probe.rs

//! 单点取值

use serde::Serialize;
use sv_foundation::{Point2D, SentinelExt};
use sv_mesh::NearestCellSearch;
use sv_state::MeshPartitionStore;

use crate::context::QueryContext;

/// 取值结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ProbeResult {
    /// 分区
    pub partition: usize,
    /// 分区内单元
    pub cell: usize,
    /// 层（二维场为 `None`）
    pub layer: Option<usize>,
    /// 场值（可能是哨兵值）
    pub value: f64,
    /// 单元中心
    pub centroid: Point2D,
}

impl ProbeResult {
    /// 状态栏文字
    ///
    /// `Proc: 0, value(i=12,k=3)=1.23e+01 (x,y)=(100.00,200.00)`
    pub fn message(&self) -> String {
        let index = match self.layer {
            Some(k) => format!("i={},k={}", self.cell, k),
            None => format!("i={}", self.cell),
        };
        let value = if self.value.is_sentinel() {
            "EMPTY".to_string()
        } else {
            format_exp(self.value, 2)
        };
        format!(
            "Proc: {}, value({})={} (x,y)=({:.2},{:.2})",
            self.partition, index, value, self.centroid.x, self.centroid.y
        )
    }
}

/// 取离 `point` 最近的单元在当前场、当前层的值
///
/// 范围内没有单元时返回 `None`。
pub fn probe<S: NearestCellSearch + ?Sized>(
    store: &MeshPartitionStore,
    search: &S,
    point: Point2D,
    ctx: &QueryContext,
) -> Option<ProbeResult> {
    let hit = search.find_nearest(point, ctx.scope)?;
    let value = store
        .snapshot()
        .value(ctx.field, hit.partition, ctx.layer, hit.cell)?;
    Some(ProbeResult {
        partition: hit.partition,
        cell: hit.cell,
        layer: ctx.field.is_layered().then_some(ctx.layer),
        value,
        centroid: hit.centroid,
    })
}

/// 指数记法，指数至少两位并带符号（`1.23e+01`、`-4.00e-03`）
pub fn format_exp(value: f64, precision: usize) -> String {
    let s = format!("{:.*e}", precision, value);
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(d) => ('-', d),
                None => ('+', exp),
            };
            format!("{}e{}{:0>2}", mantissa, sign, digits)
        }
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_foundation::EMPTY;

    #[test]
    fn test_format_exp() {
        assert_eq!(format_exp(12.3456, 2), "1.23e+01");
        assert_eq!(format_exp(-0.004, 2), "-4.00e-03");
        assert_eq!(format_exp(0.0, 2), "0.00e+00");
        assert_eq!(format_exp(1.5e120, 2), "1.50e+120");
    }

    #[test]
    fn test_message_layered_and_flat() {
        let mut r = ProbeResult {
            partition: 1,
            cell: 4,
            layer: Some(2),
            value: 33.5,
            centroid: Point2D::new(10.0, -2.5),
        };
        assert_eq!(r.message(), "Proc: 1, value(i=4,k=2)=3.35e+01 (x,y)=(10.00,-2.50)");
        r.layer = None;
        r.value = EMPTY;
        assert_eq!(r.message(), "Proc: 1, value(i=4)=EMPTY (x,y)=(10.00,-2.50)");
    }
}
