// crates/sv_mesh/src/lib.rs

//! SunView 网格模块
//!
//! 区域分解后的非结构三角网格没有全局单元编号：每个分区只知道自己的单元和边，
//! 但所有分区引用同一份全局顶点表。本模块把这些分区当作一个逻辑网格来访问。
//!
//! # 核心类型
//!
//! - [`Partition`]: 单个分区的连接关系和静态场
//! - [`GlobalPointSet`]: 所有分区共享的顶点表
//! - [`MeshTopology`]: 顶点表 + 全部分区
//! - [`PartitionScope`]: 查询范围（单个分区或全部分区）
//!
//! # 模块结构
//!
//! - [`io`]: 上游求解器固定格式文本文件的读取
//! - [`locator`]: 最近单元查询（线性扫描）
//! - [`spatial_index`]: 基于 R-Tree 的单元中心索引
//! - [`merge`]: 外部分布式合并子系统的接口约定
//!
//! # 示例
//!
//! ```rust
//! use sv_foundation::Point2D;
//! use sv_mesh::{GlobalPointSet, MeshTopology, NearestCellSearch, Partition, PartitionScope};
//!
//! let points = GlobalPointSet::new(vec![
//!     Point2D::new(0.0, 0.0),
//!     Point2D::new(1.0, 0.0),
//!     Point2D::new(0.0, 1.0),
//! ]);
//! let part = Partition::new(
//!     0,
//!     vec![[0, 1, 2]],
//!     vec![Point2D::new(0.3, 0.3)],
//!     vec![5.0],
//!     vec![[0, 1, 2]],
//!     vec![[0, 1], [1, 2], [2, 0]],
//! )
//! .unwrap();
//! let topo = MeshTopology::new(points, vec![part]).unwrap();
//!
//! let hit = topo.find_nearest(Point2D::new(0.0, 0.0), PartitionScope::All).unwrap();
//! assert_eq!((hit.partition, hit.cell), (0, 0));
//! ```

#![warn(clippy::all)]

pub mod io;
pub mod locator;
pub mod merge;
pub mod partition;
pub mod spatial_index;
pub mod topology;

pub use io::TopologyLoader;
pub use locator::{NearestCell, NearestCellSearch};
pub use merge::{merge_layers, CellMerge, MergeLayout};
pub use partition::{Partition, PartitionScope, NFACES};
pub use spatial_index::CentroidIndex;
pub use topology::{GlobalPointSet, MeshStatistics, MeshTopology};
