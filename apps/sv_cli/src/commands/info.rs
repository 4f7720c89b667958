// apps/sv_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 只读取拓扑，输出网格统计和数据配置。

use anyhow::Result;
use clap::Args;
use serde_json::json;
use tracing::info;

use super::{print_json, DataArgs};

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    #[command(flatten)]
    pub data: DataArgs,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== SunView 信息 ===");
    let store = args.data.open_store()?;
    let stats = store.topology().statistics();
    info!(
        "{} 个分区, {} 个单元, 最大水深 {:.2}",
        stats.n_partitions, stats.total_cells, stats.max_depth
    );

    print_json(&json!({
        "version": env!("CARGO_PKG_VERSION"),
        "config": store.config(),
        "n_snapshots": store.n_snapshots(),
        "layer_interfaces": store.layer_interfaces(),
        "mesh": stats,
    }))
}
