// crates/sv_mesh/src/partition.rs

//! 分区
//!
//! 一个分区是区域分解得到的连续子网格。单元和边的编号都是分区内局部的，
//! 只有顶点编号指向全局顶点表。

use std::ops::Range;

use serde::{Deserialize, Serialize};
use sv_foundation::{Point2D, SvError, SvResult};

/// 每个单元的面数（三角形）
pub const NFACES: usize = 3;

/// 查询范围
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartitionScope {
    /// 仅当前活动分区
    Single(usize),
    /// 所有分区
    All,
}

impl PartitionScope {
    /// 由"是否扫描全部分区"标志构造
    pub fn new(active: usize, scan_all: bool) -> Self {
        if scan_all {
            Self::All
        } else {
            Self::Single(active)
        }
    }

    /// 参与扫描的分区编号范围，越界的单分区得到空范围
    pub fn partitions(&self, n_partitions: usize) -> Range<usize> {
        match *self {
            Self::All => 0..n_partitions,
            Self::Single(p) if p < n_partitions => p..p + 1,
            Self::Single(_) => n_partitions..n_partitions,
        }
    }

    /// 是否包含某个分区
    pub fn includes(&self, partition: usize) -> bool {
        match *self {
            Self::All => true,
            Self::Single(p) => p == partition,
        }
    }
}

/// 单个分区的连接关系与静态场
#[derive(Debug, Clone)]
pub struct Partition {
    /// 分区编号
    pub index: usize,
    /// 单元顶点（全局顶点编号）
    pub cells: Vec<[usize; NFACES]>,
    /// 单元中心（Voronoi 点），来自单元中心数据文件
    pub centroids: Vec<Point2D>,
    /// 单元水深（地形）
    pub depth: Vec<f64>,
    /// 单元的面 -> 边编号（分区内局部）
    pub faces: Vec<[usize; NFACES]>,
    /// 边端点（全局顶点编号）
    pub edges: Vec<[usize; 2]>,
}

impl Partition {
    /// 创建分区并检查逐单元数组长度一致
    pub fn new(
        index: usize,
        cells: Vec<[usize; NFACES]>,
        centroids: Vec<Point2D>,
        depth: Vec<f64>,
        faces: Vec<[usize; NFACES]>,
        edges: Vec<[usize; 2]>,
    ) -> SvResult<Self> {
        let nc = cells.len();
        SvError::check_size("centroids", nc, centroids.len())?;
        SvError::check_size("depth", nc, depth.len())?;
        SvError::check_size("faces", nc, faces.len())?;
        Ok(Self {
            index,
            cells,
            centroids,
            depth,
            faces,
            edges,
        })
    }

    /// 单元数 `Nc`
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.cells.len()
    }

    /// 边数 `Ne`
    #[inline]
    pub fn n_edges(&self) -> usize {
        self.edges.len()
    }

    /// 检查所有索引引用是否有效
    pub fn validate(&self, n_points: usize) -> SvResult<()> {
        for (i, cell) in self.cells.iter().enumerate() {
            for &v in cell {
                if v >= n_points {
                    return Err(SvError::invalid_mesh(format!(
                        "分区 {} 单元 {} 引用顶点 {}，顶点总数 {}",
                        self.index, i, v, n_points
                    )));
                }
            }
        }
        for (e, edge) in self.edges.iter().enumerate() {
            for &v in edge {
                if v >= n_points {
                    return Err(SvError::invalid_mesh(format!(
                        "分区 {} 边 {} 引用顶点 {}，顶点总数 {}",
                        self.index, e, v, n_points
                    )));
                }
            }
        }
        let ne = self.n_edges();
        for (i, face) in self.faces.iter().enumerate() {
            for &f in face {
                if f >= ne {
                    return Err(SvError::invalid_mesh(format!(
                        "分区 {} 单元 {} 引用边 {}，边总数 {}",
                        self.index, i, f, ne
                    )));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_triangle() -> Partition {
        Partition::new(
            0,
            vec![[0, 1, 2]],
            vec![Point2D::new(0.3, 0.3)],
            vec![1.0],
            vec![[0, 1, 2]],
            vec![[0, 1], [1, 2], [2, 0]],
        )
        .unwrap()
    }

    #[test]
    fn test_scope_ranges() {
        assert_eq!(PartitionScope::All.partitions(3), 0..3);
        assert_eq!(PartitionScope::Single(1).partitions(3), 1..2);
        assert!(PartitionScope::Single(5).partitions(3).is_empty());
        assert_eq!(PartitionScope::new(2, false), PartitionScope::Single(2));
        assert_eq!(PartitionScope::new(2, true), PartitionScope::All);
        assert!(PartitionScope::Single(1).includes(1));
        assert!(!PartitionScope::Single(1).includes(0));
    }

    #[test]
    fn test_size_mismatch_rejected() {
        let res = Partition::new(0, vec![[0, 1, 2]], vec![], vec![1.0], vec![[0, 1, 2]], vec![]);
        assert!(matches!(res, Err(SvError::SizeMismatch { name: "centroids", .. })));
    }

    #[test]
    fn test_validate() {
        let p = single_triangle();
        assert!(p.validate(3).is_ok());
        assert!(p.validate(2).is_err());

        let mut bad_face = single_triangle();
        bad_face.faces[0][2] = 7;
        assert!(matches!(bad_face.validate(3), Err(SvError::InvalidMesh { .. })));
    }
}
