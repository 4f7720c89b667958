// crates/sv_mesh/src/io/mod.rs

//! 网格 IO 模块
//!
//! 上游求解器输出的网格文件都是空白分隔的定长文本记录：
//!
//! - 全局顶点文件: `x y 标记`
//! - 单元文件 `<cells>.<p>`: 两个浮点占位、三个顶点编号、三个整数占位
//! - 边文件 `<edges>.<p>`: 两个顶点编号、三个整数占位
//! - 单元中心数据文件 `<celldata>.<p>`: `x y 占位 水深 占位 面0 面1 面2`，其后六个整数占位

pub mod text;

pub use text::{RecordReader, TopologyLoader};
