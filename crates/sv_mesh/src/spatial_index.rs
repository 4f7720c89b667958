// crates/sv_mesh/src/spatial_index.rs

//! 单元中心空间索引
//!
//! 基于 R-Tree 的最近单元查询，结果与 [`MeshTopology`] 的线性扫描一致：
//! 距离相等的候选按 `(分区, 单元)` 取最小者。
//!
//! # 示例
//!
//! ```ignore
//! use sv_mesh::{CentroidIndex, NearestCellSearch, PartitionScope};
//!
//! let index = CentroidIndex::build(&topo);
//! if let Some(hit) = index.find_nearest(pick, PartitionScope::All) {
//!     println!("分区 {} 单元 {}", hit.partition, hit.cell);
//! }
//! ```

use rstar::{PointDistance, RTree, RTreeObject, AABB};
use sv_foundation::Point2D;

use crate::locator::{NearestCell, NearestCellSearch};
use crate::partition::PartitionScope;
use crate::topology::MeshTopology;

/// 索引条目：一个单元中心
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndexedCentroid {
    /// 分区编号
    pub partition: usize,
    /// 分区内单元编号
    pub cell: usize,
    /// 中心坐标
    pub position: [f64; 2],
}

impl RTreeObject for IndexedCentroid {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.position)
    }
}

impl PointDistance for IndexedCentroid {
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.position[0] - point[0];
        let dy = self.position[1] - point[1];
        dx * dx + dy * dy
    }
}

/// 所有分区单元中心的 R-Tree
#[derive(Debug, Clone)]
pub struct CentroidIndex {
    tree: RTree<IndexedCentroid>,
}

impl CentroidIndex {
    /// 从拓扑批量构建
    pub fn build(topo: &MeshTopology) -> Self {
        let entries: Vec<_> = topo
            .partitions()
            .iter()
            .flat_map(|part| {
                part.centroids
                    .iter()
                    .enumerate()
                    .map(move |(cell, c)| IndexedCentroid {
                        partition: part.index,
                        cell,
                        position: [c.x, c.y],
                    })
            })
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl NearestCellSearch for CentroidIndex {
    fn find_nearest(&self, query: Point2D, scope: PartitionScope) -> Option<NearestCell> {
        let q = [query.x, query.y];
        let mut candidates = self
            .tree
            .nearest_neighbor_iter_with_distance_2(&q)
            .filter(|(e, _)| scope.includes(e.partition));

        let (first, d2) = candidates.next()?;
        let mut best = *first;
        for (e, d) in candidates {
            if d > d2 {
                break;
            }
            if (e.partition, e.cell) < (best.partition, best.cell) {
                best = *e;
            }
        }

        Some(NearestCell {
            partition: best.partition,
            cell: best.cell,
            centroid: Point2D::new(best.position[0], best.position[1]),
            distance: d2.sqrt(),
        })
    }
}
