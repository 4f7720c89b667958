// crates/sv_state/src/store.rs

//! 分区数据仓库
//!
//! 持有拓扑（加载一次）和当前时间步的场（按需重新加载）。
//! 同一时间步的重复请求直接返回，不触及文件系统。
//!
//! 时间步 `n`（从 1 开始）在各文件中的偏移（以 `f64` 个数计）：
//!
//! | 文件 | 偏移 | 每步内容 |
//! |------|------|----------|
//! | 盐度 | `(n-1)·Nc·Nkmax` | `Nkmax` 条长 `Nc` 的记录 |
//! | 水平速度 | `3·(n-1)·Ne·Nkmax` | 每层 u、v 和一条未使用的记录，各长 `Ne` |
//! | 垂向速度 | `(n-1)·Nc·(Nkmax+1)` | `Nkmax+1` 个界面，各长 `Nc` |
//! | 自由面 | `(n-1)·Nc` | 一条长 `Nc` 的记录 |
//!
//! 背景盐度文件只有 `Nkmax` 条记录，在第一次加载时间步时读入并一直保留。

use sv_config::DataConfig;
use sv_foundation::{SvError, SvResult};
use sv_mesh::{MeshTopology, Partition, TopologyLoader};
use tracing::{debug, info};

use crate::binary::RecordFile;
use crate::derived::DerivedFieldBuilder;
use crate::layered::LayeredField;
use crate::snapshot::{FieldSnapshot, PartitionFields};

/// 加载请求
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepRequest {
    /// 重新读取拓扑并清空时间步数据
    Topology,
    /// 读取第 `n` 个输出步（从 1 开始）
    Output(usize),
}

/// 分区网格与场数据
#[derive(Debug, Clone)]
pub struct MeshPartitionStore {
    config: DataConfig,
    topology: MeshTopology,
    snapshot: FieldSnapshot,
    background_loaded: bool,
    layer_interfaces: Vec<f64>,
}

impl MeshPartitionStore {
    /// 读取 `n_partitions` 个分区的拓扑
    pub fn load(config: DataConfig, n_partitions: usize) -> SvResult<Self> {
        let topology = TopologyLoader::load(&config, n_partitions)?;
        Ok(Self::from_topology(config, topology))
    }

    /// 由已有拓扑创建，尚未加载任何时间步
    pub fn from_topology(config: DataConfig, topology: MeshTopology) -> Self {
        let snapshot = FieldSnapshot::empty(&topology, config.n_layers);
        let layer_interfaces = topology.layer_interfaces(config.n_layers);
        Self {
            config,
            topology,
            snapshot,
            background_loaded: false,
            layer_interfaces,
        }
    }

    /// 由内存中的拓扑和场组装
    ///
    /// 场的分区数、单元数和层数必须与拓扑及配置一致。
    pub fn from_parts(
        config: DataConfig,
        topology: MeshTopology,
        snapshot: FieldSnapshot,
    ) -> SvResult<Self> {
        SvError::check_size("partitions", topology.n_partitions(), snapshot.n_partitions())?;
        SvError::check_size("layers", config.n_layers, snapshot.n_layers())?;
        for (part, fields) in topology.partitions().iter().zip(snapshot.partitions()) {
            fields.check_shape(config.n_layers, part.n_cells())?;
        }
        let background_loaded = snapshot.step().is_some();
        let layer_interfaces = topology.layer_interfaces(config.n_layers);
        Ok(Self {
            config,
            topology,
            snapshot,
            background_loaded,
            layer_interfaces,
        })
    }

    /// 数据配置
    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// 拓扑
    pub fn topology(&self) -> &MeshTopology {
        &self.topology
    }

    /// 当前场
    pub fn snapshot(&self) -> &FieldSnapshot {
        &self.snapshot
    }

    /// 垂向层数
    pub fn n_layers(&self) -> usize {
        self.config.n_layers
    }

    /// 可加载的输出步数
    pub fn n_snapshots(&self) -> usize {
        self.config.n_snapshots()
    }

    /// 当前缓存的时间步
    pub fn current_step(&self) -> Option<usize> {
        self.snapshot.step()
    }

    /// 垂向层界面 `z[0..=Nkmax]`
    pub fn layer_interfaces(&self) -> &[f64] {
        &self.layer_interfaces
    }

    /// 处理加载请求
    ///
    /// 请求的时间步与缓存相同时什么也不做。任一文件读取失败时返回错误，
    /// 当前场保持不变。
    pub fn load_timestep(&mut self, request: StepRequest) -> SvResult<()> {
        match request {
            StepRequest::Topology => {
                let n = self.topology.n_partitions();
                let topology = TopologyLoader::load(&self.config, n)?;
                *self = Self::from_topology(self.config.clone(), topology);
                Ok(())
            }
            StepRequest::Output(step) => self.load_output(step),
        }
    }

    fn load_output(&mut self, step: usize) -> SvResult<()> {
        if self.snapshot.step() == Some(step) {
            debug!("时间步 {} 已缓存", step);
            return Ok(());
        }
        let n_snapshots = self.n_snapshots();
        if step == 0 || step > n_snapshots {
            return Err(SvError::invalid_input(format!(
                "时间步 {} 超出范围 1..={}",
                step, n_snapshots
            )));
        }

        let mut partitions = Vec::with_capacity(self.topology.n_partitions());
        for (part, old) in self.topology.partitions().iter().zip(self.snapshot.partitions()) {
            let background = if self.background_loaded {
                old.background.clone()
            } else {
                self.read_background(part)?
            };
            partitions.push(self.read_partition(part, step, background)?);
            debug!("分区 {} 时间步 {} 读取完成", part.index, step);
        }

        self.snapshot =
            FieldSnapshot::from_partitions(Some(step), self.config.n_layers, partitions)?;
        self.background_loaded = true;
        info!("加载时间步 {}/{}", step, n_snapshots);
        Ok(())
    }

    fn read_background(&self, part: &Partition) -> SvResult<LayeredField> {
        let path = self
            .config
            .partition_path(&self.config.files.background_salinity, part.index);
        let mut file = RecordFile::open(&path)?;
        let mut background = LayeredField::empty(self.config.n_layers, part.n_cells());
        for k in 0..self.config.n_layers {
            file.read_into(background.layer_mut(k))?;
        }
        info!("读取背景盐度 {}", path.display());
        Ok(background)
    }

    fn read_partition(
        &self,
        part: &Partition,
        step: usize,
        background: LayeredField,
    ) -> SvResult<PartitionFields> {
        let files = &self.config.files;
        let path = |stem: &str| self.config.partition_path(stem, part.index);
        let nk = self.config.n_layers;
        let nc = part.n_cells();
        let ne = part.n_edges();
        let prior = (step - 1) as u64;
        let builder = DerivedFieldBuilder::new(part);

        let mut file = RecordFile::open(path(&files.salinity))?;
        file.seek_values(prior * (nc * nk) as u64)?;
        let mut salinity = LayeredField::empty(nk, nc);
        let mut perturbation = LayeredField::empty(nk, nc);
        for k in 0..nk {
            file.read_into(salinity.layer_mut(k))?;
            let sd = DerivedFieldBuilder::perturbation(salinity.layer(k), background.layer(k))?;
            perturbation.copy_layer_from(k, &sd)?;
        }

        let mut file = RecordFile::open(path(&files.horizontal_velocity))?;
        file.seek_values(3 * prior * (ne * nk) as u64)?;
        let mut u = LayeredField::empty(nk, nc);
        let mut v = LayeredField::empty(nk, nc);
        for k in 0..nk {
            let u_edges = file.read_record(ne)?;
            let v_edges = file.read_record(ne)?;
            file.skip_record(ne)?;
            let (uc, vc) = builder.horizontal_velocity(&u_edges, &v_edges, background.layer(k))?;
            u.copy_layer_from(k, &uc)?;
            v.copy_layer_from(k, &vc)?;
        }

        let mut file = RecordFile::open(path(&files.vertical_velocity))?;
        file.seek_values(prior * (nc * (nk + 1)) as u64)?;
        let mut w = LayeredField::empty(nk, nc);
        let mut upper = file.read_record(nc)?;
        for k in 0..nk {
            let lower = file.read_record(nc)?;
            let wc = builder.vertical_velocity(
                &upper,
                &lower,
                salinity.layer(k),
                background.layer(k),
            )?;
            w.copy_layer_from(k, &wc)?;
            upper = lower;
        }

        let mut file = RecordFile::open(path(&files.free_surface))?;
        file.seek_values(prior * nc as u64)?;
        let free_surface = file.read_record(nc)?;
        let water_column = builder.water_column(&free_surface)?;

        Ok(PartitionFields {
            free_surface,
            depth: part.depth.clone(),
            water_column,
            salinity,
            background,
            perturbation,
            u,
            v,
            w,
        })
    }
}
