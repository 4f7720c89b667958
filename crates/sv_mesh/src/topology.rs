// crates/sv_mesh/src/topology.rs

//! 逻辑网格拓扑
//!
//! 把共享顶点表和全部分区组合为一个逻辑网格。没有全局单元编号，
//! 单元一律用 `(分区, 局部单元)` 二元组寻址。

use serde::Serialize;
use sv_foundation::{Extent, Point2D, SvError, SvResult};

use crate::partition::{Partition, PartitionScope, NFACES};

/// 全局顶点表
#[derive(Debug, Clone, Default)]
pub struct GlobalPointSet {
    points: Vec<Point2D>,
}

impl GlobalPointSet {
    /// 由顶点列表创建
    pub fn new(points: Vec<Point2D>) -> Self {
        Self { points }
    }

    /// 顶点数 `Np`
    #[inline]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// 按编号取顶点
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Point2D> {
        self.points.get(index)
    }

    /// 全部顶点
    #[inline]
    pub fn as_slice(&self) -> &[Point2D] {
        &self.points
    }
}

/// 网格统计信息
#[derive(Debug, Clone, Serialize)]
pub struct MeshStatistics {
    /// 顶点数
    pub n_points: usize,
    /// 分区数
    pub n_partitions: usize,
    /// 各分区单元数
    pub cells_per_partition: Vec<usize>,
    /// 各分区边数
    pub edges_per_partition: Vec<usize>,
    /// 单元总数
    pub total_cells: usize,
    /// 最大水深
    pub max_depth: f64,
    /// 平面范围
    pub extent: Option<Extent>,
}

/// 逻辑网格
#[derive(Debug, Clone)]
pub struct MeshTopology {
    points: GlobalPointSet,
    partitions: Vec<Partition>,
    max_depth: f64,
}

impl MeshTopology {
    /// 组合顶点表和分区，校验全部索引并计算最大水深
    pub fn new(points: GlobalPointSet, partitions: Vec<Partition>) -> SvResult<Self> {
        for (p, part) in partitions.iter().enumerate() {
            if part.index != p {
                return Err(SvError::invalid_mesh(format!(
                    "分区编号不连续: 位置 {} 的分区编号为 {}",
                    p, part.index
                )));
            }
            part.validate(points.len())?;
        }

        // 与上游一致：从 0 开始取最大值
        let max_depth = partitions
            .iter()
            .flat_map(|p| p.depth.iter().copied())
            .fold(0.0_f64, f64::max);

        Ok(Self {
            points,
            partitions,
            max_depth,
        })
    }

    /// 全局顶点表
    #[inline]
    pub fn points(&self) -> &GlobalPointSet {
        &self.points
    }

    /// 全部分区
    #[inline]
    pub fn partitions(&self) -> &[Partition] {
        &self.partitions
    }

    /// 按编号取分区
    #[inline]
    pub fn partition(&self, index: usize) -> Option<&Partition> {
        self.partitions.get(index)
    }

    /// 分区数
    #[inline]
    pub fn n_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// 全部分区的单元总数
    pub fn total_cells(&self) -> usize {
        self.partitions.iter().map(Partition::n_cells).sum()
    }

    /// 全部分区中的最大水深 `dmax`
    #[inline]
    pub fn max_depth(&self) -> f64 {
        self.max_depth
    }

    /// 垂向层界面高度 `z[i] = -dmax * i / Nkmax`，共 `Nkmax + 1` 个
    pub fn layer_interfaces(&self, n_layers: usize) -> Vec<f64> {
        (0..=n_layers)
            .map(|i| -self.max_depth * i as f64 / n_layers as f64)
            .collect()
    }

    /// 全局顶点的平面范围
    pub fn extent(&self) -> Option<Extent> {
        Extent::from_points(self.points.as_slice())
    }

    /// 范围内所有 `(分区, 单元)`，先按分区再按单元升序
    pub fn cells_in(&self, scope: PartitionScope) -> impl Iterator<Item = (usize, usize)> + '_ {
        scope
            .partitions(self.n_partitions())
            .flat_map(move |p| (0..self.partitions[p].n_cells()).map(move |i| (p, i)))
    }

    /// 单元的三个顶点坐标
    ///
    /// 索引已在构造时校验，因此这里直接下标访问。
    pub fn cell_vertices(&self, partition: usize, cell: usize) -> [Point2D; NFACES] {
        let ids = self.partitions[partition].cells[cell];
        let pts = self.points.as_slice();
        [pts[ids[0]], pts[ids[1]], pts[ids[2]]]
    }

    /// 由顶点平均得到的单元中心
    pub fn vertex_centroid(&self, partition: usize, cell: usize) -> Point2D {
        let verts = self.cell_vertices(partition, cell);
        Point2D::mean(&verts).unwrap_or(Point2D::ZERO)
    }

    /// 等效半径：第一个顶点到顶点中心的距离
    ///
    /// 只用作切片选取的容差，并不是内切圆半径。
    pub fn equivalent_radius(&self, partition: usize, cell: usize) -> f64 {
        let first = self.cell_vertices(partition, cell)[0];
        first.distance_to(&self.vertex_centroid(partition, cell))
    }

    /// 统计信息
    pub fn statistics(&self) -> MeshStatistics {
        MeshStatistics {
            n_points: self.points.len(),
            n_partitions: self.n_partitions(),
            cells_per_partition: self.partitions.iter().map(Partition::n_cells).collect(),
            edges_per_partition: self.partitions.iter().map(Partition::n_edges).collect(),
            total_cells: self.total_cells(),
            max_depth: self.max_depth,
            extent: self.extent(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_partitions() -> MeshTopology {
        let points = GlobalPointSet::new(vec![
            Point2D::new(0.0, 0.0),
            Point2D::new(3.0, 0.0),
            Point2D::new(0.0, 3.0),
            Point2D::new(3.0, 3.0),
        ]);
        let p0 = Partition::new(
            0,
            vec![[0, 1, 2]],
            vec![Point2D::new(1.0, 1.0)],
            vec![4.0],
            vec![[0, 1, 2]],
            vec![[0, 1], [1, 2], [2, 0]],
        )
        .unwrap();
        let p1 = Partition::new(
            1,
            vec![[1, 3, 2], [0, 1, 2]],
            vec![Point2D::new(2.0, 2.0), Point2D::new(1.0, 1.0)],
            vec![10.0, 2.0],
            vec![[0, 1, 2], [0, 1, 2]],
            vec![[1, 3], [3, 2], [2, 1]],
        )
        .unwrap();
        MeshTopology::new(points, vec![p0, p1]).unwrap()
    }

    #[test]
    fn test_counts_and_depth() {
        let topo = two_partitions();
        assert_eq!(topo.n_partitions(), 2);
        assert_eq!(topo.total_cells(), 3);
        assert_eq!(topo.max_depth(), 10.0);
        let stats = topo.statistics();
        assert_eq!(stats.cells_per_partition, vec![1, 2]);
        assert_eq!(stats.total_cells, 3);
    }

    #[test]
    fn test_layer_interfaces() {
        let topo = two_partitions();
        let z = topo.layer_interfaces(4);
        assert_eq!(z.len(), 5);
        assert_eq!(z[0], 0.0);
        assert!((z[2] + 5.0).abs() < 1e-12);
        assert!((z[4] + 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_and_radius() {
        let topo = two_partitions();
        let c = topo.vertex_centroid(0, 0);
        assert!((c.x - 1.0).abs() < 1e-12);
        assert!((c.y - 1.0).abs() < 1e-12);
        assert!((topo.equivalent_radius(0, 0) - 2.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_cells_in_scope_order() {
        let topo = two_partitions();
        let all: Vec<_> = topo.cells_in(PartitionScope::All).collect();
        assert_eq!(all, vec![(0, 0), (1, 0), (1, 1)]);
        let one: Vec<_> = topo.cells_in(PartitionScope::Single(1)).collect();
        assert_eq!(one, vec![(1, 0), (1, 1)]);
    }

    #[test]
    fn test_misnumbered_partition_rejected() {
        let points = GlobalPointSet::new(vec![Point2D::ZERO; 3]);
        let p = Partition::new(
            5,
            vec![[0, 1, 2]],
            vec![Point2D::ZERO],
            vec![1.0],
            vec![[0, 0, 0]],
            vec![[0, 1]],
        )
        .unwrap();
        assert!(MeshTopology::new(points, vec![p]).is_err());
    }
}
