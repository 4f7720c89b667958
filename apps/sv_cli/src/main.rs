// apps/sv_cli/src/main.rs

//! SunView 命令行界面
//!
//! 读取区域分解的分区输出，按需给出网格信息、切片、单点取值和色标范围。
//! 所有结果以 JSON 输出到标准输出，日志写到标准错误。

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// SunView 分区输出查看工具
#[derive(Parser)]
#[command(name = "sunview")]
#[command(author = "SunView Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query partitioned SUNTANS output", long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 网格与配置信息
    Info(commands::info::InfoArgs),
    /// 两点之间的垂向切片
    Slice(commands::slice::SliceArgs),
    /// 最近单元取值
    Probe(commands::probe::ProbeArgs),
    /// 色标范围与速度幅值上限
    Range(commands::range::RangeArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Info(args) => commands::info::execute(args),
        Commands::Slice(args) => commands::slice::execute(args),
        Commands::Probe(args) => commands::probe::execute(args),
        Commands::Range(args) => commands::range::execute(args),
    }
}
