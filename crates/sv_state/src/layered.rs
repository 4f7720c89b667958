// crates/sv_state/src/layered.rs

//! 分层单元场
//!
//! 一个分区上 `Nkmax` 层、每层 `Nc` 个单元的值放在一块连续内存中，
//! 按 `(层, 单元)` 寻址。

use sv_foundation::{SvError, SvResult, EMPTY};
use sv_mesh::{merge_layers, CellMerge, MergeLayout};

/// 按层连续存储的单元场
#[derive(Debug, Clone, PartialEq)]
pub struct LayeredField {
    n_layers: usize,
    n_cells: usize,
    data: Vec<f64>,
}

impl LayeredField {
    /// 以常数填充
    pub fn filled(n_layers: usize, n_cells: usize, value: f64) -> Self {
        Self {
            n_layers,
            n_cells,
            data: vec![value; n_layers * n_cells],
        }
    }

    /// 全部为哨兵值
    pub fn empty(n_layers: usize, n_cells: usize) -> Self {
        Self::filled(n_layers, n_cells, EMPTY)
    }

    /// 由逐层数组构造，各层长度必须一致
    pub fn from_layers(layers: Vec<Vec<f64>>) -> SvResult<Self> {
        let n_layers = layers.len();
        let n_cells = layers.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(n_layers * n_cells);
        for layer in layers {
            SvError::check_size("layer", n_cells, layer.len())?;
            data.extend(layer);
        }
        Ok(Self {
            n_layers,
            n_cells,
            data,
        })
    }

    /// 层数
    #[inline]
    pub fn n_layers(&self) -> usize {
        self.n_layers
    }

    /// 每层单元数
    #[inline]
    pub fn n_cells(&self) -> usize {
        self.n_cells
    }

    /// 取值
    ///
    /// # Panics
    /// 层或单元越界时 panic
    #[inline]
    pub fn get(&self, layer: usize, cell: usize) -> f64 {
        self.data[layer * self.n_cells + cell]
    }

    /// 设置值
    #[inline]
    pub fn set(&mut self, layer: usize, cell: usize, value: f64) {
        self.data[layer * self.n_cells + cell] = value;
    }

    /// 单层数据
    #[inline]
    pub fn layer(&self, layer: usize) -> &[f64] {
        let start = layer * self.n_cells;
        &self.data[start..start + self.n_cells]
    }

    /// 单层可变数据
    #[inline]
    pub fn layer_mut(&mut self, layer: usize) -> &mut [f64] {
        let start = layer * self.n_cells;
        &mut self.data[start..start + self.n_cells]
    }

    /// 逐层迭代
    pub fn layers(&self) -> impl Iterator<Item = &[f64]> + '_ {
        (0..self.n_layers).map(move |k| self.layer(k))
    }

    /// 单元的垂向剖面（从表层到底层）
    pub fn column(&self, cell: usize) -> impl Iterator<Item = f64> + '_ {
        (0..self.n_layers).map(move |k| self.get(k, cell))
    }

    /// 覆盖一整层，长度必须等于单元数
    pub fn copy_layer_from(&mut self, layer: usize, values: &[f64]) -> SvResult<()> {
        SvError::check_index("layer", layer, self.n_layers)?;
        SvError::check_size("layer values", self.n_cells, values.len())?;
        self.layer_mut(layer).copy_from_slice(values);
        Ok(())
    }

    /// 全部数据（层优先）
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// 通过合并子系统把本分区各层汇集为全局编号的分层场
    ///
    /// 非协调进程得到 `None`。
    pub fn merge<M: CellMerge + ?Sized>(
        &self,
        merge: &mut M,
        layout: &MergeLayout<'_>,
    ) -> SvResult<Option<LayeredField>> {
        let layers: Vec<&[f64]> = self.layers().collect();
        match merge_layers(merge, layout, &layers)? {
            Some(global) => Self::from_layers(global).map(Some),
            None => Ok(None),
        }
    }
}
