// crates/sv_mesh/tests/load_topology.rs

//! 从磁盘文件加载分区拓扑的集成测试

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use sv_config::DataConfig;
use sv_foundation::{Point2D, SvError};
use sv_mesh::{CentroidIndex, NearestCellSearch, PartitionScope, TopologyLoader};

/// 两个分区各三个单元，单元中心沿 x 轴每隔 3 米排列
fn write_strip(dir: &Path) {
    fs::write(
        dir.join("suntans.dat"),
        "Nkmax 2\nnsteps 4\nntout 2\npoints points.dat\nedges edges.dat\n\
         cells cells.dat\ncelldata celldata.dat\n",
    )
    .unwrap();

    let mut points = String::new();
    for k in 0..6 {
        let cx = 3.0 * k as f64;
        writeln!(points, "{} -1 0", cx - 1.0).unwrap();
        writeln!(points, "{} -1 0", cx + 1.0).unwrap();
        writeln!(points, "{} 2 0", cx).unwrap();
    }
    fs::write(dir.join("points.dat"), points).unwrap();

    for p in 0..2 {
        let (mut cells, mut edges, mut data) = (String::new(), String::new(), String::new());
        for i in 0..3 {
            let k = 3 * p + i;
            let cx = 3.0 * k as f64;
            let v = 3 * k;
            writeln!(cells, "{} 0 {} {} {} 0 0 0", cx, v, v + 1, v + 2).unwrap();
            writeln!(edges, "{} {} 0 0 0", v, v + 1).unwrap();
            writeln!(edges, "{} {} 0 0 0", v + 1, v + 2).unwrap();
            writeln!(edges, "{} {} 0 0 0", v + 2, v).unwrap();
            writeln!(
                data,
                "{} 0 0 {} 0 {} {} {} 0 0 0 0 0 0",
                cx,
                5.0 + k as f64,
                3 * i,
                3 * i + 1,
                3 * i + 2
            )
            .unwrap();
        }
        fs::write(dir.join(format!("cells.dat.{}", p)), cells).unwrap();
        fs::write(dir.join(format!("edges.dat.{}", p)), edges).unwrap();
        fs::write(dir.join(format!("celldata.dat.{}", p)), data).unwrap();
    }
}

#[test]
fn loads_two_partition_strip() {
    let dir = tempfile::tempdir().unwrap();
    write_strip(dir.path());
    let config = DataConfig::load(dir.path()).unwrap();
    let topo = TopologyLoader::load(&config, 2).unwrap();

    assert_eq!(topo.points().len(), 18);
    assert_eq!(topo.n_partitions(), 2);
    let stats = topo.statistics();
    assert_eq!(stats.cells_per_partition, vec![3, 3]);
    assert_eq!(stats.edges_per_partition, vec![9, 9]);
    assert_eq!(
        stats.total_cells,
        stats.cells_per_partition.iter().sum::<usize>()
    );
    assert_eq!(topo.max_depth(), 10.0);

    for part in topo.partitions() {
        for cell in &part.cells {
            assert!(cell.iter().all(|&v| v < topo.points().len()));
        }
    }

    let c = topo.vertex_centroid(1, 2);
    assert!((c.x - 15.0).abs() < 1e-12);
    assert!(c.y.abs() < 1e-12);
}

#[test]
fn nearest_lookup_agrees_between_scan_and_index() {
    let dir = tempfile::tempdir().unwrap();
    write_strip(dir.path());
    let config = DataConfig::load(dir.path()).unwrap();
    let topo = TopologyLoader::load(&config, 2).unwrap();
    let index = CentroidIndex::build(&topo);

    let q = Point2D::new(10.0, 0.4);
    let a = topo.find_nearest(q, PartitionScope::All).unwrap();
    let b = index.find_nearest(q, PartitionScope::All).unwrap();
    assert_eq!((a.partition, a.cell), (1, 0));
    assert_eq!((b.partition, b.cell), (1, 0));

    let a = topo.find_nearest(q, PartitionScope::Single(0)).unwrap();
    assert_eq!((a.partition, a.cell), (0, 2));
}

#[test]
fn missing_partition_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_strip(dir.path());
    let config = DataConfig::load(dir.path()).unwrap();
    let err = TopologyLoader::load(&config, 3).unwrap_err();
    assert!(matches!(err, SvError::FileNotFound { .. }));
}

#[test]
fn celldata_count_must_match_cells() {
    let dir = tempfile::tempdir().unwrap();
    write_strip(dir.path());
    fs::write(
        dir.path().join("celldata.dat.1"),
        "9 0 0 1 0 0 1 2 0 0 0 0 0 0\n",
    )
    .unwrap();
    let config = DataConfig::load(dir.path()).unwrap();
    let err = TopologyLoader::load(&config, 2).unwrap_err();
    assert!(matches!(
        err,
        SvError::SizeMismatch {
            name: "celldata",
            expected: 3,
            actual: 1
        }
    ));
}
