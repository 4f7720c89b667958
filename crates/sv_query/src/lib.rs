// crates/sv_query/src/lib.rs

//! SunView 查询层
//!
//! 在 [`sv_state::MeshPartitionStore`] 之上提供只读查询：
//!
//! - [`slice`]: 两点之间的垂向切片
//! - [`probe`]: 最近单元取值
//! - [`range`]: 色标范围与速度幅值上限
//! - [`frame`]: 交给绘制端的一帧数据
//! - [`session`]: 把以上功能与导航状态组合起来的交互会话
//!
//! # 示例
//!
//! ```ignore
//! use sv_foundation::Point2D;
//! use sv_query::{SliceOptions, ViewerSession};
//!
//! let mut session = ViewerSession::new(store, SliceOptions::default())?;
//! session.slice_world(Point2D::new(0.0, 0.0), Point2D::new(15.0, 0.0))?;
//! let frame = session.frame();
//! ```

#![warn(clippy::all)]

pub mod context;
pub mod frame;
pub mod probe;
pub mod range;
pub mod session;
pub mod slice;

pub use context::{QueryContext, ViewTransform};
pub use frame::{
    DisplayMode, LastFrame, PlanLayer, PlanVectors, RenderFrame, RenderSink, ScalarSource,
    VectorSource,
};
pub use probe::{format_exp, probe, ProbeResult};
pub use range::{RangeNormalizer, ScalarRange, DEFAULT_RANGE};
pub use session::{ViewerSession, MSG_BAD_SLICE};
pub use slice::{
    select_cells, SliceBuffer, SliceEngine, SliceLine, SliceOptions, SliceOutcome,
    SliceRejection, SliceSample, NSLICEMAX, NSLICEMIN,
};
