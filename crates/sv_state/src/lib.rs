// crates/sv_state/src/lib.rs

//! SunView 状态层
//!
//! 负责把各分区的逐时间步二进制输出读入内存，并计算派生量。
//!
//! # 模块
//!
//! - [`field_kind`]: 可显示的场类型
//! - [`layered`]: 按层连续存储的单元场
//! - [`snapshot`]: 一个时间步的全部分区场
//! - [`binary`]: 定长 `f64` 记录文件读取
//! - [`derived`]: 面平均速度、垂向速度、水柱高度等派生量
//! - [`store`]: 拓扑 + 当前时间步的统一入口 [`MeshPartitionStore`]
//!
//! # 示例
//!
//! ```ignore
//! use sv_config::DataConfig;
//! use sv_state::{MeshPartitionStore, StepRequest};
//!
//! let config = DataConfig::load("data/")?;
//! let mut store = MeshPartitionStore::load(config, 4)?;
//! store.load_timestep(StepRequest::Output(1))?;
//! // 同一步再次请求不会触发任何文件读取
//! store.load_timestep(StepRequest::Output(1))?;
//! ```

#![warn(clippy::all)]

pub mod binary;
pub mod derived;
pub mod field_kind;
pub mod layered;
pub mod snapshot;
pub mod store;

pub use binary::RecordFile;
pub use derived::{DerivedFieldBuilder, SMALLHEIGHT};
pub use field_kind::FieldKind;
pub use layered::LayeredField;
pub use snapshot::{FieldSnapshot, PartitionFields};
pub use store::{MeshPartitionStore, StepRequest};
