// apps/sv_cli/src/commands/mod.rs

//! 子命令及其共用参数

pub mod info;
pub mod probe;
pub mod range;
pub mod slice;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Serialize;
use sv_config::DataConfig;
use sv_foundation::Point2D;
use sv_mesh::PartitionScope;
use sv_query::{SliceOptions, ViewerSession};
use sv_state::{FieldKind, MeshPartitionStore};

/// 数据位置
#[derive(Args, Debug, Clone)]
pub struct DataArgs {
    /// 数据目录（包含 suntans.dat）或设置文件路径
    #[arg(short, long, default_value = ".")]
    pub data: PathBuf,

    /// 分区数
    #[arg(short = 'n', long, default_value_t = 1)]
    pub partitions: usize,
}

impl DataArgs {
    /// 读取配置和拓扑
    pub fn open_store(&self) -> Result<MeshPartitionStore> {
        if self.partitions == 0 {
            bail!("分区数必须为正");
        }
        let config = DataConfig::load(&self.data)
            .with_context(|| format!("无法读取设置: {}", self.data.display()))?;
        let store = MeshPartitionStore::load(config, self.partitions)?;
        Ok(store)
    }
}

/// 查询上下文参数
#[derive(Args, Debug, Clone)]
pub struct ViewArgs {
    /// 输出步（从 1 开始）
    #[arg(short, long, default_value_t = 1)]
    pub step: usize,

    /// 场：h, d, h_d, s, sd, s0, u, v, w, mask
    #[arg(short, long, default_value = "s")]
    pub field: FieldKind,

    /// 垂向层（从 0 开始），缺省取中间层
    #[arg(short = 'k', long)]
    pub layer: Option<usize>,

    /// 只查询某个分区，缺省为全部分区
    #[arg(short, long)]
    pub partition: Option<usize>,
}

/// 打开会话并应用查询参数
pub fn open_session(
    data: &DataArgs,
    view: &ViewArgs,
    options: SliceOptions,
) -> Result<ViewerSession> {
    let store = data.open_store()?;
    let n = store.n_snapshots();
    if view.step == 0 || view.step > n {
        bail!("输出步 {} 超出范围 1..={}", view.step, n);
    }
    let mut session = ViewerSession::new(store, options)?;
    session.goto_step(view.step)?;
    session.set_field(view.field)?;
    if let Some(k) = view.layer {
        if k >= session.store().n_layers() {
            bail!("层 {} 超出范围 0..{}", k, session.store().n_layers());
        }
        session.set_layer(k);
    }
    if let Some(p) = view.partition {
        session.set_scope(PartitionScope::Single(p))?;
    }
    Ok(session)
}

/// 解析 `x,y`
pub fn parse_point(s: &str) -> Result<Point2D, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("坐标应写作 x,y: {}", s))?;
    let parse = |t: &str| {
        t.trim()
            .parse::<f64>()
            .map_err(|e| format!("无效坐标 '{}': {}", t, e))
    };
    Ok(Point2D::new(parse(x)?, parse(y)?))
}

/// 以缩进 JSON 输出
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
