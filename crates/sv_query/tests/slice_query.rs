// crates/sv_query/tests/slice_query.rs

//! 切片、色标范围与幅值上限的集成测试

mod common;

use common::{depth, salinity, NK};
use sv_foundation::{Point2D, SvError};
use sv_mesh::{GlobalPointSet, MeshTopology, Partition, PartitionScope};
use sv_query::{
    select_cells, QueryContext, RangeNormalizer, ScalarRange, SliceEngine, SliceLine,
    SliceOptions, SliceOutcome, SliceRejection, DEFAULT_RANGE,
};
use sv_state::{FieldKind, LayeredField, MeshPartitionStore};

fn ctx(field: FieldKind) -> QueryContext {
    QueryContext::new(1, 0, field, PartitionScope::All)
}

fn strip_slice(engine: &mut SliceEngine, store: &MeshPartitionStore, field: FieldKind) -> SliceOutcome {
    engine
        .get_slice(
            store,
            store.topology(),
            Point2D::new(0.0, 0.0),
            Point2D::new(15.0, 0.0),
            &ctx(field),
        )
        .unwrap()
}

#[test]
fn slice_across_partitions_is_sorted() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    assert_eq!(strip_slice(&mut engine, &store, FieldKind::Salinity), SliceOutcome::Valid(6));

    let buf = engine.buffer().unwrap();
    let positions: Vec<f64> = buf.positions().collect();
    assert_eq!(positions, vec![0.0, 3.0, 6.0, 9.0, 12.0, 15.0]);
    assert!(positions.windows(2).all(|w| w[0] < w[1]));

    assert_eq!(buf.data.len(), 6);
    for (j, s) in buf.samples.iter().enumerate() {
        assert_eq!((s.partition, s.cell), (j / 3, j % 3));
        assert_eq!(buf.data[j].len(), NK);
        for k in 0..NK {
            assert_eq!(buf.data[j][k], salinity(j, k));
            assert_eq!(buf.along[j][k], 1.0 + k as f64);
        }
        assert_eq!(buf.vertical[j].len(), NK);
        // dz = 10 / 2
        assert!((buf.depth_integrated[j] - 15.0).abs() < 1e-12);
        assert_eq!(buf.depth[j], depth(j));
    }
    assert_eq!(buf.layer_interfaces, vec![0.0, -5.0, -10.0]);
}

#[test]
fn remove_depth_mean_subtracts_average() {
    let store = common::store();
    let mut engine = SliceEngine::new(SliceOptions {
        remove_depth_mean: true,
        ..SliceOptions::default()
    });
    strip_slice(&mut engine, &store, FieldKind::Salinity);
    let buf = engine.buffer().unwrap();
    for j in 0..buf.len() {
        for k in 0..NK {
            let expected = 1.0 + k as f64 - 15.0 / depth(j);
            assert!((buf.along[j][k] - expected).abs() < 1e-12);
        }
        assert!((buf.depth_integrated[j] - 15.0).abs() < 1e-12);
    }
}

#[test]
fn single_partition_scope_limits_selection() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    let ctx = ctx(FieldKind::Salinity).with_scope(PartitionScope::Single(1));
    let outcome = engine
        .get_slice(
            &store,
            store.topology(),
            Point2D::new(0.0, 0.0),
            Point2D::new(15.0, 0.0),
            &ctx,
        )
        .unwrap();
    assert_eq!(outcome, SliceOutcome::Valid(3));
    let buf = engine.buffer().unwrap();
    assert!(buf.samples.iter().all(|s| s.partition == 1));
    assert_eq!(buf.positions().collect::<Vec<_>>(), vec![0.0, 3.0, 6.0]);
}

#[test]
fn capacity_exceeded_is_an_error() {
    let store = common::store();
    let mut engine = SliceEngine::new(SliceOptions {
        max_samples: Some(3),
        ..SliceOptions::default()
    });
    let res = engine.get_slice(
        &store,
        store.topology(),
        Point2D::new(0.0, 0.0),
        Point2D::new(15.0, 0.0),
        &ctx(FieldKind::Salinity),
    );
    assert!(matches!(res, Err(SvError::CapacityExceeded { .. })));
    assert!(engine.buffer().is_none());
}

#[test]
fn identical_endpoints_reuse_previous_selection() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    let p = Point2D::new(4.0, 0.0);

    let first = engine
        .get_slice(&store, store.topology(), p, p, &ctx(FieldKind::Salinity))
        .unwrap();
    assert_eq!(first, SliceOutcome::Invalid(SliceRejection::NoPreviousSelection));
    assert!(engine.buffer().is_none());

    strip_slice(&mut engine, &store, FieldKind::Salinity);
    let samples = engine.buffer().unwrap().samples.clone();
    let again = engine
        .get_slice(&store, store.topology(), p, p, &ctx(FieldKind::UVelocity))
        .unwrap();
    assert_eq!(again, SliceOutcome::Valid(6));
    let buf = engine.buffer().unwrap();
    assert_eq!(buf.samples, samples);
    assert_eq!(buf.field, FieldKind::UVelocity);
    assert_eq!(buf.data[0], vec![1.0, 2.0]);
}

#[test]
fn endpoints_on_same_cell_are_rejected() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    let outcome = engine
        .get_slice(
            &store,
            store.topology(),
            Point2D::new(0.0, 0.0),
            Point2D::new(0.4, 0.1),
            &ctx(FieldKind::Salinity),
        )
        .unwrap();
    assert_eq!(outcome, SliceOutcome::Invalid(SliceRejection::DegenerateLine));
    assert!(!outcome.is_valid());
}

#[test]
fn two_dimensional_field_slices_as_mask() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    strip_slice(&mut engine, &store, FieldKind::FreeSurface);
    let buf = engine.buffer().unwrap();
    assert!(buf.data.iter().flatten().all(|&m| m == 1.0));
}

#[test]
fn selection_includes_cells_exactly_on_radius() {
    // 顶点中心 (6, 1.5)，等效半径 1.5
    let points = GlobalPointSet::new(vec![
        Point2D::new(6.0, 0.0),
        Point2D::new(3.0, 2.25),
        Point2D::new(9.0, 2.25),
    ]);
    let part = Partition::new(
        0,
        vec![[0, 1, 2]],
        vec![Point2D::new(6.0, 1.5)],
        vec![1.0],
        vec![[0, 1, 2]],
        vec![[0, 1], [1, 2], [2, 0]],
    )
    .unwrap();
    let topo = MeshTopology::new(points, vec![part]).unwrap();

    let on_radius = SliceLine::new(Point2D::new(0.0, 0.0), Point2D::new(12.0, 0.0)).unwrap();
    let hits = select_cells(&topo, PartitionScope::All, &on_radius);
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].position, 6.0);

    let too_far = SliceLine::new(Point2D::new(0.0, -0.5), Point2D::new(12.0, -0.5)).unwrap();
    assert!(select_cells(&topo, PartitionScope::All, &too_far).is_empty());

    let too_short = SliceLine::new(Point2D::new(0.0, 0.0), Point2D::new(5.5, 0.0)).unwrap();
    assert!(select_cells(&topo, PartitionScope::All, &too_short).is_empty());
}

#[test]
fn scalar_range_over_plan_and_slice() {
    let store = common::store();
    let normalizer = RangeNormalizer::new();

    let all = normalizer.compute_scalar_range(&store, &ctx(FieldKind::Salinity), None);
    assert_eq!(all, ScalarRange { min: 0.0, max: 50.0 });

    let one = ctx(FieldKind::Salinity)
        .with_layer(1)
        .with_scope(PartitionScope::Single(1));
    let one = normalizer.compute_scalar_range(&store, &one, None);
    assert_eq!(one, ScalarRange { min: 31.0, max: 51.0 });

    let mut engine = SliceEngine::default();
    strip_slice(&mut engine, &store, FieldKind::Salinity);
    let sliced = normalizer.compute_scalar_range(&store, &ctx(FieldKind::Salinity), engine.buffer());
    assert_eq!(sliced, ScalarRange { min: 0.0, max: 51.0 });

    // 自由面处处为 0
    let flat = normalizer.compute_scalar_range(&store, &ctx(FieldKind::FreeSurface), None);
    assert_eq!(flat, DEFAULT_RANGE);
}

#[test]
fn all_sentinel_range_falls_back() {
    let store = common::dry_store();
    let range = RangeNormalizer::new().compute_scalar_range(&store, &ctx(FieldKind::Salinity), None);
    assert_eq!(range, DEFAULT_RANGE);
    assert_eq!(range.normalize(0.5), 0.5);
}

#[test]
fn plan_magnitude_is_cached_per_step_layer_scope() {
    let store = common::store();
    let mut normalizer = RangeNormalizer::new();
    assert_eq!(normalizer.compute_vector_magnitude_max(&store, &ctx(FieldKind::Salinity), None), 1.0);
    let deeper = ctx(FieldKind::Salinity).with_layer(1);
    assert_eq!(normalizer.compute_vector_magnitude_max(&store, &deeper, None), 2.0);

    // 同一 (步, 层, 范围) 不重新计算
    let topo = common::topology();
    let mut snapshot = common::fields(&topo);
    for p in 0..snapshot.n_partitions() {
        snapshot.partition_mut(p).unwrap().u.layer_mut(1).fill(7.0);
    }
    let changed = MeshPartitionStore::from_parts(common::config(), topo, snapshot).unwrap();
    assert_eq!(normalizer.compute_vector_magnitude_max(&changed, &deeper, None), 2.0);

    normalizer.invalidate();
    assert_eq!(normalizer.compute_vector_magnitude_max(&changed, &deeper, None), 7.0);
}

#[test]
fn slice_magnitude_uses_along_and_vertical() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    strip_slice(&mut engine, &store, FieldKind::Salinity);
    let mut normalizer = RangeNormalizer::new();
    let umax = normalizer.compute_vector_magnitude_max(&store, &ctx(FieldKind::Salinity), engine.buffer());
    assert_eq!(umax, 2.0);
}

#[test]
fn repeated_slice_selects_same_cells() {
    let store = common::store();
    let mut engine = SliceEngine::default();
    let (a, b) = (Point2D::new(0.3, 0.1), Point2D::new(14.6, -0.2));
    let c = ctx(FieldKind::Salinity);

    assert_eq!(
        engine.get_slice(&store, store.topology(), a, b, &c).unwrap(),
        SliceOutcome::Valid(6)
    );
    let first = engine.buffer().unwrap().clone();

    assert_eq!(
        engine.get_slice(&store, store.topology(), a, b, &c).unwrap(),
        SliceOutcome::Valid(6)
    );
    let second = engine.buffer().unwrap();
    assert_eq!(second.line, first.line);
    assert_eq!(second.samples, first.samples);
    assert_eq!(
        second.positions().collect::<Vec<_>>(),
        first.positions().collect::<Vec<_>>()
    );
    assert_eq!(second.data, first.data);
}

#[test]
fn malformed_snapshot_is_rejected() {
    let topo = common::topology();
    let mut snapshot = common::fields(&topo);
    snapshot.partition_mut(0).unwrap().v = LayeredField::empty(1, 3);

    let res = MeshPartitionStore::from_parts(common::config(), topo, snapshot);
    assert!(matches!(res, Err(SvError::SizeMismatch { name, .. }) if name == "v"));
}
