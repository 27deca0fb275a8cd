// apps/sh_cli/src/main.rs

//! SedHydro 命令行界面
//!
//! # 架构层级
//!
//! 本模块属于 **Layer 6: Application**：只解析参数、初始化日志并分派子命令，
//! 领域逻辑全部在 `commands` 各模块中通过 `sh_workflow` 完成。
//!
//! # 典型流程
//!
//! ```text
//! sh_cli prepare -c model.json annual-rainfall -n 12
//! sh_cli validate -c model.json --inputs
//! sh_cli run -c model.json --summary summary.json
//! ```

mod commands;

use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// 月尺度 RUSLE 土壤侵蚀与产沙模型
#[derive(Parser)]
#[command(name = "sh_cli", version, about, long_about = None)]
struct Cli {
    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info", global = true)]
    log_level: Level,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 派生年降水、耕地代表坡度等静态图层
    Prepare(commands::prepare::PrepareArgs),
    /// 验证配置与输入
    Validate(commands::validate::ValidateArgs),
    /// 运行逐月模拟
    Run(commands::run::RunArgs),
    /// 显示配置与输出信息
    Info(commands::info::InfoArgs),
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 日志写到 stderr，stdout 留给结果摘要
    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Prepare(args) => commands::prepare::execute(args),
        Commands::Validate(args) => commands::validate::execute(args),
        Commands::Run(args) => commands::run::execute(args),
        Commands::Info(args) => commands::info::execute(args),
    }
}
