// crates/sv_foundation/src/lib.rs

//! SunView Foundation Layer
//!
//! 基础层，为分区网格后处理提供最底层的公共抽象。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型 `SvError` / `SvResult`
//! - [`sentinel`]: "无数据" 哨兵值及其判断工具
//! - [`geometry`]: 平面点 `Point2D`
//!
//! # 示例
//!
//! ```
//! use sv_foundation::{Point2D, sentinel::{EMPTY, SentinelExt}};
//!
//! let a = Point2D::new(0.0, 0.0);
//! let b = Point2D::new(3.0, 4.0);
//! assert_eq!(a.distance_to(&b), 5.0);
//!
//! assert!(EMPTY.is_sentinel());
//! assert_eq!(1.5_f64.valid(), Some(1.5));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod geometry;
pub mod sentinel;

pub use error::{SvError, SvResult};
pub use geometry::{Extent, Point2D};
pub use sentinel::{SentinelExt, EMPTY};

/// Prelude 模块，包含常用类型
pub mod prelude {
    pub use crate::error::{SvError, SvResult};
    pub use crate::geometry::{Extent, Point2D};
    pub use crate::sentinel::{SentinelExt, EMPTY};
}
