// crates/sv_mesh/src/locator.rs

//! 最近单元查询
//!
//! 按单元中心（Voronoi 点）的欧几里得距离查找离查询点最近的单元。
//! 扫描顺序固定为分区升序、分区内单元升序；距离相等时保留最先遇到的单元，
//! 因此结果总是编号最小的 `(分区, 单元)`。

use serde::Serialize;
use sv_foundation::Point2D;

use crate::partition::PartitionScope;
use crate::topology::MeshTopology;

/// 查询结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NearestCell {
    /// 分区编号
    pub partition: usize,
    /// 分区内单元编号
    pub cell: usize,
    /// 单元中心坐标
    pub centroid: Point2D,
    /// 到查询点的距离
    pub distance: f64,
}

/// 最近单元查询接口
pub trait NearestCellSearch {
    /// 在给定范围内查找最近单元
    ///
    /// 范围内没有任何单元时返回 `None`。
    fn find_nearest(&self, query: Point2D, scope: PartitionScope) -> Option<NearestCell>;
}

impl NearestCellSearch for MeshTopology {
    fn find_nearest(&self, query: Point2D, scope: PartitionScope) -> Option<NearestCell> {
        let mut best: Option<NearestCell> = None;
        for p in scope.partitions(self.n_partitions()) {
            let part = &self.partitions()[p];
            for (i, c) in part.centroids.iter().enumerate() {
                let d = query.distance_to(c);
                if best.map_or(true, |b| d < b.distance) {
                    best = Some(NearestCell {
                        partition: p,
                        cell: i,
                        centroid: *c,
                        distance: d,
                    });
                }
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::partition::Partition;
    use crate::topology::GlobalPointSet;

    fn mesh() -> MeshTopology {
        let points = GlobalPointSet::new(vec![Point2D::ZERO; 3]);
        let part = |index, centroids: Vec<Point2D>| {
            let n = centroids.len();
            Partition::new(
                index,
                vec![[0, 1, 2]; n],
                centroids,
                vec![1.0; n],
                vec![[0, 0, 0]; n],
                vec![[0, 1]],
            )
            .unwrap()
        };
        MeshTopology::new(
            points,
            vec![
                part(0, vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]),
                part(1, vec![Point2D::new(5.0, 0.0), Point2D::new(1.0, 0.0)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_nearest_all_partitions() {
        let topo = mesh();
        let hit = topo
            .find_nearest(Point2D::new(4.0, 0.5), PartitionScope::All)
            .unwrap();
        assert_eq!((hit.partition, hit.cell), (1, 0));
        assert!((hit.distance - 1.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_nearest_single_partition() {
        let topo = mesh();
        let hit = topo
            .find_nearest(Point2D::new(4.0, 0.0), PartitionScope::Single(0))
            .unwrap();
        assert_eq!((hit.partition, hit.cell), (0, 1));
    }

    #[test]
    fn test_tie_keeps_first_in_scan_order() {
        // (0,1) 与 (1,1) 中心重合
        let topo = mesh();
        let hit = topo
            .find_nearest(Point2D::new(1.0, 0.0), PartitionScope::All)
            .unwrap();
        assert_eq!((hit.partition, hit.cell), (0, 1));
    }

    #[test]
    fn test_empty_scope() {
        let topo = mesh();
        assert!(topo
            .find_nearest(Point2D::ZERO, PartitionScope::Single(9))
            .is_none());
    }
}
