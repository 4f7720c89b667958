// apps/sv_cli/src/commands/probe.rs

//! 单点取值命令

use anyhow::{bail, Result};
use clap::Args;
use sv_foundation::Point2D;
use sv_query::SliceOptions;

use super::{open_session, parse_point, print_json, DataArgs, ViewArgs};

/// 取值参数
#[derive(Args)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(flatten)]
    pub view: ViewArgs,

    /// 查询点 x,y
    #[arg(long, value_parser = parse_point, allow_hyphen_values = true)]
    pub at: Point2D,
}

/// 执行取值命令
pub fn execute(args: ProbeArgs) -> Result<()> {
    let mut session = open_session(&args.data, &args.view, SliceOptions::default())?;
    let Some(result) = session.probe_world(args.at) else {
        bail!("查询范围内没有单元");
    };
    eprintln!("{}", result.message());
    print_json(&result)
}
