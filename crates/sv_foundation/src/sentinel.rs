// crates/sv_foundation/src/sentinel.rs

//! "无数据" 哨兵值
//!
//! 上游求解器在输出文件中用固定的浮点常量 [`EMPTY`] 标记干单元、
//! 地形以下的层以及其它无效位置。所有范围统计、排序和算术运算都必须
//! 把它当作"缺失"排除，而不是当作数值参与计算。

/// 无数据哨兵值
pub const EMPTY: f64 = 999999.0;

/// 哨兵值判断扩展
pub trait SentinelExt: Copy {
    /// 是否为哨兵值
    fn is_sentinel(self) -> bool;

    /// 有效值返回 `Some`，哨兵值返回 `None`
    fn valid(self) -> Option<f64>;
}

impl SentinelExt for f64 {
    #[inline]
    fn is_sentinel(self) -> bool {
        self == EMPTY
    }

    #[inline]
    fn valid(self) -> Option<f64> {
        if self == EMPTY {
            None
        } else {
            Some(self)
        }
    }
}

/// 对两个可能为哨兵的值做运算，任一为哨兵则结果为哨兵
#[inline]
pub fn combine(a: f64, b: f64, op: impl FnOnce(f64, f64) -> f64) -> f64 {
    match (a.valid(), b.valid()) {
        (Some(a), Some(b)) => op(a, b),
        _ => EMPTY,
    }
}

/// 遍历切片中的有效值
pub fn valid_values(values: &[f64]) -> impl Iterator<Item = f64> + '_ {
    values.iter().copied().filter_map(SentinelExt::valid)
}
