// crates/sv_state/src/snapshot.rs

//! 时间步快照
//!
//! 一个时间步内所有分区的场。二维量（自由面、水深、水柱高度）每单元一个值，
//! 三维量按 [`LayeredField`] 存储。

use std::borrow::Cow;

use sv_foundation::{SentinelExt, SvError, SvResult, EMPTY};
use sv_mesh::MeshTopology;

use crate::field_kind::FieldKind;
use crate::layered::LayeredField;

/// 单个分区的场
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFields {
    /// 自由面 `h`
    pub free_surface: Vec<f64>,
    /// 水深（来自拓扑）
    pub depth: Vec<f64>,
    /// 水柱高度 `h + depth`
    pub water_column: Vec<f64>,
    /// 盐度
    pub salinity: LayeredField,
    /// 背景盐度
    pub background: LayeredField,
    /// 盐度扰动
    pub perturbation: LayeredField,
    /// 东向速度
    pub u: LayeredField,
    /// 北向速度
    pub v: LayeredField,
    /// 垂向速度
    pub w: LayeredField,
}

impl PartitionFields {
    /// 除水深外全部为哨兵值
    pub fn empty(n_layers: usize, depth: Vec<f64>) -> Self {
        let nc = depth.len();
        Self {
            free_surface: vec![EMPTY; nc],
            water_column: vec![EMPTY; nc],
            depth,
            salinity: LayeredField::empty(n_layers, nc),
            background: LayeredField::empty(n_layers, nc),
            perturbation: LayeredField::empty(n_layers, nc),
            u: LayeredField::empty(n_layers, nc),
            v: LayeredField::empty(n_layers, nc),
            w: LayeredField::empty(n_layers, nc),
        }
    }

    /// 单元数
    pub fn n_cells(&self) -> usize {
        self.depth.len()
    }

    /// 分层场的引用，二维场返回 `None`
    pub fn layered(&self, kind: FieldKind) -> Option<&LayeredField> {
        match kind {
            FieldKind::Salinity | FieldKind::Mask => Some(&self.salinity),
            FieldKind::SalinityPerturbation => Some(&self.perturbation),
            FieldKind::BackgroundSalinity => Some(&self.background),
            FieldKind::UVelocity => Some(&self.u),
            FieldKind::VVelocity => Some(&self.v),
            FieldKind::WVelocity => Some(&self.w),
            FieldKind::FreeSurface | FieldKind::Depth | FieldKind::WaterColumn => None,
        }
    }

    /// 某层存储的场值数组
    ///
    /// 二维场忽略 `layer`；`Mask` 没有存储数组，返回 `None`。
    pub fn stored_values(&self, kind: FieldKind, layer: usize) -> Option<&[f64]> {
        match kind {
            FieldKind::FreeSurface => Some(&self.free_surface),
            FieldKind::Depth => Some(&self.depth),
            FieldKind::WaterColumn => Some(&self.water_column),
            FieldKind::Mask => None,
            _ => self
                .layered(kind)
                .filter(|f| layer < f.n_layers())
                .map(|f| f.layer(layer)),
        }
    }

    /// 某层的场值，`Mask` 由盐度现算
    pub fn values(&self, kind: FieldKind, layer: usize) -> Option<Cow<'_, [f64]>> {
        match kind {
            FieldKind::Mask => self.mask(layer).map(Cow::Owned),
            _ => self.stored_values(kind, layer).map(Cow::Borrowed),
        }
    }

    /// 有数据掩码：盐度有效处为 1.0，否则为哨兵值
    pub fn mask(&self, layer: usize) -> Option<Vec<f64>> {
        let s = self.stored_values(FieldKind::Salinity, layer)?;
        Some(s.iter().map(|&v| mask_value(v)).collect())
    }

    /// 单个单元的值
    pub fn value(&self, kind: FieldKind, layer: usize, cell: usize) -> Option<f64> {
        if kind == FieldKind::Mask {
            let s = self.stored_values(FieldKind::Salinity, layer)?.get(cell)?;
            return Some(mask_value(*s));
        }
        self.stored_values(kind, layer)?.get(cell).copied()
    }

    /// 检查全部数组与给定的层数、单元数一致
    pub fn check_shape(&self, n_layers: usize, n_cells: usize) -> SvResult<()> {
        SvError::check_size("depth", n_cells, self.depth.len())?;
        SvError::check_size("free_surface", n_cells, self.free_surface.len())?;
        SvError::check_size("water_column", n_cells, self.water_column.len())?;
        let layered = [
            ("salinity", &self.salinity),
            ("background", &self.background),
            ("perturbation", &self.perturbation),
            ("u", &self.u),
            ("v", &self.v),
            ("w", &self.w),
        ];
        for (name, field) in layered {
            SvError::check_size(name, n_layers, field.n_layers())?;
            SvError::check_size(name, n_cells, field.n_cells())?;
        }
        Ok(())
    }
}

fn mask_value(s: f64) -> f64 {
    if s.is_sentinel() {
        EMPTY
    } else {
        1.0
    }
}

/// 一个时间步的全部分区场
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    step: Option<usize>,
    n_layers: usize,
    partitions: Vec<PartitionFields>,
}

impl FieldSnapshot {
    /// 按拓扑分配全部为哨兵值的快照（尚未对应任何时间步）
    pub fn empty(topology: &MeshTopology, n_layers: usize) -> Self {
        let partitions = topology
            .partitions()
            .iter()
            .map(|p| PartitionFields::empty(n_layers, p.depth.clone()))
            .collect();
        Self {
            step: None,
            n_layers,
            partitions,
        }
    }

    /// 由已读入的分区场组装
    pub fn from_partitions(
        step: Option<usize>,
        n_layers: usize,
        partitions: Vec<PartitionFields>,
    ) -> SvResult<Self> {
        for part in &partitions {
            part.check_shape(n_layers, part.n_cells())?;
        }
        Ok(Self {
            step,
            n_layers,
            partitions,
        })
    }

    /// 对应的时间步（尚未加载时为 `None`）
    pub fn step(&self) -> Option<usize> {
        self.step
    }

    /// 层数
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// 分区数
    pub fn n_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// 全部分区场
    pub fn partitions(&self) -> &[PartitionFields] {
        &self.partitions
    }

    /// 单个分区场
    pub fn partition(&self, index: usize) -> Option<&PartitionFields> {
        self.partitions.get(index)
    }

    /// 单个分区场（可变）
    pub fn partition_mut(&mut self, index: usize) -> Option<&mut PartitionFields> {
        self.partitions.get_mut(index)
    }

    /// 分区某层存储的场值数组
    pub fn stored_values(&self, kind: FieldKind, partition: usize, layer: usize) -> Option<&[f64]> {
        self.partition(partition)?.stored_values(kind, layer)
    }

    /// 分区某层的场值，`Mask` 由盐度现算
    pub fn values(
        &self,
        kind: FieldKind,
        partition: usize,
        layer: usize,
    ) -> Option<Cow<'_, [f64]>> {
        self.partition(partition)?.values(kind, layer)
    }

    /// 单元值
    pub fn value(&self, kind: FieldKind, partition: usize, layer: usize, cell: usize) -> Option<f64> {
        self.partition(partition)?.value(kind, layer, cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields() -> PartitionFields {
        let mut f = PartitionFields::empty(2, vec![5.0, 6.0]);
        f.salinity.copy_layer_from(0, &[30.0, EMPTY]).unwrap();
        f.free_surface = vec![0.1, 0.2];
        f
    }

    #[test]
    fn test_two_dimensional_ignore_layer() {
        let f = fields();
        assert_eq!(f.stored_values(FieldKind::Depth, 7), Some(&[5.0, 6.0][..]));
        assert_eq!(f.values(FieldKind::Depth, 7).unwrap().as_ref(), &[5.0, 6.0]);
        assert_eq!(f.value(FieldKind::FreeSurface, 1, 1), Some(0.2));
    }

    #[test]
    fn test_layered_lookup() {
        let f = fields();
        assert_eq!(f.value(FieldKind::Salinity, 0, 0), Some(30.0));
        assert_eq!(f.value(FieldKind::Salinity, 1, 0), Some(EMPTY));
        assert!(f.values(FieldKind::Salinity, 2).is_none());
    }

    #[test]
    fn test_mask() {
        let f = fields();
        assert!(f.stored_values(FieldKind::Mask, 0).is_none());
        assert_eq!(f.values(FieldKind::Mask, 0).unwrap().as_ref(), &[1.0, EMPTY]);
        assert_eq!(f.values(FieldKind::Mask, 1).unwrap().as_ref(), &[EMPTY, EMPTY]);
        assert!(f.values(FieldKind::Mask, 2).is_none());
        assert_eq!(f.value(FieldKind::Mask, 0, 0), Some(1.0));
        assert_eq!(f.value(FieldKind::Mask, 0, 1), Some(EMPTY));
    }

    #[test]
    fn test_layer_count_checked() {
        let good = PartitionFields::empty(2, vec![1.0]);
        let bad = PartitionFields::empty(3, vec![1.0]);
        assert!(FieldSnapshot::from_partitions(Some(1), 2, vec![good]).is_ok());
        assert!(FieldSnapshot::from_partitions(Some(1), 2, vec![bad]).is_err());
    }

    #[test]
    fn test_every_array_shape_checked() {
        let mut v_layers = PartitionFields::empty(2, vec![1.0, 2.0, 3.0]);
        v_layers.v = LayeredField::empty(1, 3);
        assert!(matches!(
            FieldSnapshot::from_partitions(Some(1), 2, vec![v_layers]),
            Err(SvError::SizeMismatch { name: "v", .. })
        ));

        let mut short_cells = PartitionFields::empty(2, vec![1.0, 2.0, 3.0]);
        short_cells.background = LayeredField::empty(2, 2);
        assert!(FieldSnapshot::from_partitions(Some(1), 2, vec![short_cells]).is_err());

        let mut short_surface = PartitionFields::empty(2, vec![1.0, 2.0, 3.0]);
        short_surface.free_surface.pop();
        assert!(matches!(
            FieldSnapshot::from_partitions(Some(1), 2, vec![short_surface]),
            Err(SvError::SizeMismatch { name: "free_surface", .. })
        ));
    }
}
