// crates/sv_foundation/src/geometry.rs

//! 平面几何基础类型
//!
//! 网格坐标均为投影坐标（米），因此只提供欧几里得运算。

use serde::{Deserialize, Serialize};
use std::ops::{Add, Mul, Sub};

/// 2D 点 / 向量
///
/// ```
/// use sv_foundation::geometry::Point2D;
///
/// let p1 = Point2D::new(500000.0, 4000000.0);
/// let p2 = Point2D::new(500100.0, 4000100.0);
/// let dist = p1.distance_to(&p2); // 约 141.4 米
/// assert!((dist - 141.42135623730951).abs() < 1e-9);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point2D {
    /// X 坐标
    pub x: f64,
    /// Y 坐标
    pub y: f64,
}

impl Point2D {
    /// 零点常量
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// 创建新的 2D 点
    #[inline]
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// 欧几里得距离
    #[inline]
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        self.distance_squared_to(other).sqrt()
    }

    /// 距离的平方
    #[inline]
    #[must_use]
    pub fn distance_squared_to(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// 点积
    #[inline]
    #[must_use]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y
    }

    /// 向量长度
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    /// 点集的算术平均
    ///
    /// 空集返回 `None`。
    #[must_use]
    pub fn mean(points: &[Point2D]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let n = points.len() as f64;
        let (sx, sy) = points
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.x / n, sy + p.y / n));
        Some(Self::new(sx, sy))
    }
}

impl Add for Point2D {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Self::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Point2D {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f64> for Point2D {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: f64) -> Self {
        Self::new(self.x * rhs, self.y * rhs)
    }
}

impl From<(f64, f64)> for Point2D {
    fn from((x, y): (f64, f64)) -> Self {
        Self::new(x, y)
    }
}

/// 轴对齐矩形范围
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extent {
    /// 最小 X 坐标
    pub min_x: f64,
    /// 最小 Y 坐标
    pub min_y: f64,
    /// 最大 X 坐标
    pub max_x: f64,
    /// 最大 Y 坐标
    pub max_y: f64,
}

impl Extent {
    /// 从边界坐标创建
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// 点集的包围盒，空集返回 `None`
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2D>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut extent = Self::new(first.x, first.y, first.x, first.y);
        for p in iter {
            extent.min_x = extent.min_x.min(p.x);
            extent.min_y = extent.min_y.min(p.y);
            extent.max_x = extent.max_x.max(p.x);
            extent.max_y = extent.max_y.max(p.y);
        }
        Some(extent)
    }

    /// 宽度
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// 高度
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// 闭区间包含判断
    #[inline]
    pub fn contains(&self, p: &Point2D) -> bool {
        p.x >= self.min_x && p.x <= self.max_x && p.y >= self.min_y && p.y <= self.max_y
    }
}
