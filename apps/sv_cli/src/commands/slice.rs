// apps/sv_cli/src/commands/slice.rs

//! 切片命令

use anyhow::Result;
use clap::Args;
use serde_json::json;
use sv_foundation::{sentinel::valid_values, Point2D};
use sv_query::{SliceOptions, NSLICEMAX};
use tracing::{info, warn};

use super::{open_session, parse_point, print_json, DataArgs, ViewArgs};

/// 切片参数
#[derive(Args)]
pub struct SliceArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// 起点 x,y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub from: Point2D,

    /// 终点 x,y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub to: Point2D,

    /// 沿线速度减去垂向平均
    #[arg(long)]
    pub remove_mean: bool,

    /// 最多选取的单元数，0 表示不限
    #[arg(long, default_value_t = NSLICEMAX)]
    pub max_samples: usize,
}

/// 执行切片命令
pub fn execute(args: SliceArgs) -> Result<()> {
    let options = SliceOptions {
        max_samples: (args.max_samples > 0).then_some(args.max_samples),
        remove_depth_mean: args.remove_mean,
    };
    let mut session = open_session(&args.data, &args.view, options)?;
    let outcome = session.slice_world(args.from, args.to)?;
    if !outcome.is_valid() {
        warn!("{}", session.status());
    }

    let valid_per_sample: Vec<usize> = session
        .slice()
        .map(|b| b.data.iter().map(|col| valid_values(col).count()).collect())
        .unwrap_or_default();
    info!("切片 {:?}", outcome);

    let frame = session.frame();
    print_json(&json!({
        "outcome": outcome,
        "status": session.status(),
        "slice": session.slice(),
        "valid_per_sample": valid_per_sample,
        "range": frame.range,
        "umag_max": frame.umag_max,
    }))
}
