// crates/sv_query/tests/common/mod.rs

//! 内存中的测试数据：两个分区各三个单元，单元中心沿 x 轴每隔 3 米排列

#![allow(dead_code)]

use sv_config::{DataConfig, Settings};
use sv_foundation::{Point2D, EMPTY};
use sv_mesh::{GlobalPointSet, MeshTopology, Partition};
use sv_state::{FieldSnapshot, MeshPartitionStore, PartitionFields};

/// 垂向层数
pub const NK: usize = 2;

/// 单元 `g`（全局顺序）第 `k` 层的盐度
pub fn salinity(g: usize, k: usize) -> f64 {
    10.0 * g as f64 + k as f64
}

/// 单元 `g` 的水深
pub fn depth(g: usize) -> f64 {
    5.0 + g as f64
}

pub fn config() -> DataConfig {
    let settings = Settings::parse(
        "Nkmax 2\nnsteps 1\nntout 1\npoints points.dat\nedges edges.dat\n\
         cells cells.dat\ncelldata celldata.dat\n",
        "memory",
    )
    .unwrap();
    DataConfig::from_settings(&settings, ".").unwrap()
}

pub fn topology() -> MeshTopology {
    let mut points = Vec::new();
    for g in 0..6 {
        let cx = 3.0 * g as f64;
        points.push(Point2D::new(cx - 1.0, -1.0));
        points.push(Point2D::new(cx + 1.0, -1.0));
        points.push(Point2D::new(cx, 2.0));
    }
    let partitions = (0..2)
        .map(|p| {
            let mut cells = Vec::new();
            let mut centroids = Vec::new();
            let mut depths = Vec::new();
            let mut faces = Vec::new();
            let mut edges = Vec::new();
            for i in 0..3 {
                let g = 3 * p + i;
                let v = 3 * g;
                cells.push([v, v + 1, v + 2]);
                centroids.push(Point2D::new(3.0 * g as f64, 0.0));
                depths.push(depth(g));
                faces.push([3 * i, 3 * i + 1, 3 * i + 2]);
                edges.extend([[v, v + 1], [v + 1, v + 2], [v + 2, v]]);
            }
            Partition::new(p, cells, centroids, depths, faces, edges).unwrap()
        })
        .collect();
    MeshTopology::new(GlobalPointSet::new(points), partitions).unwrap()
}

/// 每层 `u = 1 + k`、`v = 0`，盐度见 [`salinity`]
pub fn fields(topo: &MeshTopology) -> FieldSnapshot {
    let parts = topo
        .partitions()
        .iter()
        .map(|part| {
            let mut f = PartitionFields::empty(NK, part.depth.clone());
            for i in 0..part.n_cells() {
                let g = 3 * part.index + i;
                f.free_surface[i] = 0.0;
                f.water_column[i] = part.depth[i];
                for k in 0..NK {
                    f.salinity.set(k, i, salinity(g, k));
                    f.background.set(k, i, 0.0);
                    f.perturbation.set(k, i, salinity(g, k));
                    f.u.set(k, i, 1.0 + k as f64);
                    f.v.set(k, i, 0.0);
                    f.w.set(k, i, 0.0);
                }
            }
            f
        })
        .collect();
    FieldSnapshot::from_partitions(Some(1), NK, parts).unwrap()
}

pub fn store() -> MeshPartitionStore {
    let topo = topology();
    let snapshot = fields(&topo);
    MeshPartitionStore::from_parts(config(), topo, snapshot).unwrap()
}

/// 全部盐度为哨兵值的数据
pub fn dry_store() -> MeshPartitionStore {
    let topo = topology();
    let mut snapshot = fields(&topo);
    for p in 0..snapshot.n_partitions() {
        let f = snapshot.partition_mut(p).unwrap();
        for k in 0..NK {
            f.salinity.layer_mut(k).fill(EMPTY);
        }
    }
    MeshPartitionStore::from_parts(config(), topo, snapshot).unwrap()
}
