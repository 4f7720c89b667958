// crates/sv_mesh/src/merge.rs

//! 分布式合并子系统接口
//!
//! 合并子系统把每个分区上的单元中心数组按全局单元编号汇集到协调进程上。
//! 这里只约定接口，具体实现（通常基于 MPI 集合通信）由外部提供。
//!
//! 约定：
//!
//! - 所有分区都必须以相同顺序调用每个方法，部分参与的行为未定义
//! - 合并结果按全局单元编号排列
//! - 只有协调进程得到 `Some`，其余进程得到 `None`

use sv_foundation::{SvError, SvResult};

/// 本分区参与合并所需的布局信息
#[derive(Debug, Clone, Copy)]
pub struct MergeLayout<'a> {
    /// 本分区编号
    pub partition: usize,
    /// 分区总数
    pub n_partitions: usize,
    /// 局部单元编号 -> 全局单元编号
    pub local_to_global: &'a [usize],
}

impl MergeLayout<'_> {
    /// 本分区单元数
    pub fn n_local(&self) -> usize {
        self.local_to_global.len()
    }
}

/// 合并子系统
pub trait CellMerge {
    /// 建立通信所需的索引映射
    fn initialize(&mut self, layout: &MergeLayout<'_>) -> SvResult<()>;

    /// 合并单层数组
    fn merge_2d(&mut self, local: &[f64]) -> SvResult<Option<Vec<f64>>>;

    /// 合并分层数组，默认逐层调用 [`CellMerge::merge_2d`]
    ///
    /// 每一层都会参与集合通信，非协调进程也不提前返回。
    fn merge_3d(&mut self, local: &[&[f64]]) -> SvResult<Option<Vec<Vec<f64>>>> {
        let mut merged = Vec::with_capacity(local.len());
        for layer in local {
            merged.push(self.merge_2d(layer)?);
        }
        Ok(merged.into_iter().collect())
    }

    /// 释放合并缓冲区
    fn free(&mut self);
}

/// 对一个分层场执行完整的合并流程：初始化、逐层合并、释放
///
/// 每层长度必须等于本分区单元数。
pub fn merge_layers<M: CellMerge + ?Sized>(
    merge: &mut M,
    layout: &MergeLayout<'_>,
    layers: &[&[f64]],
) -> SvResult<Option<Vec<Vec<f64>>>> {
    for layer in layers {
        SvError::check_size("merge layer", layout.n_local(), layer.len())?;
    }
    merge.initialize(layout)?;
    let result = merge.merge_3d(layers);
    merge.free();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use sv_foundation::EMPTY;

    /// 单进程测试替身：按映射散布到全局数组
    struct ScatterMerge {
        n_global: usize,
        map: Vec<usize>,
        freed: bool,
    }

    impl CellMerge for ScatterMerge {
        fn initialize(&mut self, layout: &MergeLayout<'_>) -> SvResult<()> {
            self.map = layout.local_to_global.to_vec();
            self.freed = false;
            Ok(())
        }

        fn merge_2d(&mut self, local: &[f64]) -> SvResult<Option<Vec<f64>>> {
            let mut global = vec![EMPTY; self.n_global];
            for (i, &g) in self.map.iter().enumerate() {
                SvError::check_index("global cell", g, self.n_global)?;
                global[g] = local[i];
            }
            Ok(Some(global))
        }

        fn free(&mut self) {
            self.map.clear();
            self.freed = true;
        }
    }

    #[test]
    fn test_merge_preserves_global_order() {
        let mut m = ScatterMerge {
            n_global: 4,
            map: Vec::new(),
            freed: false,
        };
        let map = [3, 0, 2];
        let layout = MergeLayout {
            partition: 0,
            n_partitions: 1,
            local_to_global: &map,
        };
        let l0 = [30.0, 0.0, 20.0];
        let l1 = [31.0, 1.0, 21.0];
        let merged = merge_layers(&mut m, &layout, &[&l0, &l1]).unwrap().unwrap();
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0], vec![0.0, EMPTY, 20.0, 30.0]);
        assert_eq!(merged[1][3], 31.0);
        assert!(m.freed);
    }

    /// 非协调进程的替身：只计数，从不返回合并结果
    struct FollowerMerge {
        calls: usize,
        freed: bool,
    }

    impl CellMerge for FollowerMerge {
        fn initialize(&mut self, _layout: &MergeLayout<'_>) -> SvResult<()> {
            Ok(())
        }

        fn merge_2d(&mut self, _local: &[f64]) -> SvResult<Option<Vec<f64>>> {
            self.calls += 1;
            Ok(None)
        }

        fn free(&mut self) {
            self.freed = true;
        }
    }

    #[test]
    fn test_follower_joins_every_layer() {
        let mut m = FollowerMerge {
            calls: 0,
            freed: false,
        };
        let map = [0, 1];
        let layout = MergeLayout {
            partition: 1,
            n_partitions: 2,
            local_to_global: &map,
        };
        let layer = [1.0, 2.0];
        let result = merge_layers(&mut m, &layout, &[&layer, &layer, &layer]).unwrap();
        assert!(result.is_none());
        assert_eq!(m.calls, 3);
        assert!(m.freed);
    }

    #[test]
    fn test_layer_length_checked() {
        let mut m = ScatterMerge {
            n_global: 2,
            map: Vec::new(),
            freed: false,
        };
        let map = [0, 1];
        let layout = MergeLayout {
            partition: 0,
            n_partitions: 1,
            local_to_global: &map,
        };
        let short = [1.0];
        assert!(matches!(
            merge_layers(&mut m, &layout, &[&short]),
            Err(SvError::SizeMismatch { .. })
        ));
        assert!(!m.freed);
    }
}
