// apps/sv_cli/src/commands/range.rs

//! 色标范围命令

use anyhow::Result;
use clap::Args;
use serde_json::json;
use sv_foundation::sentinel::valid_values;
use sv_query::{ScalarSource, SliceOptions};

use super::{open_session, print_json, DataArgs, ViewArgs};

/// 范围参数
#[derive(Args)]
pub struct RangeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub view: ViewArgs,
}

/// 执行范围命令
pub fn execute(args: RangeArgs) -> Result<()> {
    let mut session = open_session(&args.data, &args.view, SliceOptions::default())?;
    let frame = session.frame();
    let n_valid: usize = match &frame.scalar {
        ScalarSource::Plan { layers } => layers.iter().map(|l| valid_values(&l.values).count()).sum(),
        ScalarSource::Slice { grid, .. } => grid.iter().map(|c| valid_values(c).count()).sum(),
    };

    print_json(&json!({
        "field": frame.field,
        "step": frame.step,
        "layer": frame.layer,
        "range": frame.range,
        "umag_max": frame.umag_max,
        "n_valid": n_valid,
    }))
}
