// apps/sh_cli/src/commands/run.rs

//! 运行模拟命令
//!
//! 从目录读取输入、逐月计算并把结果写入输出目录。

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Args;
use sh_io::{DirectorySink, DirectorySource};
use sh_workflow::SimulationRunner;
use std::path::PathBuf;
use std::time::Instant;
use tracing::info;

use super::load_config;

/// 运行模拟参数
#[derive(Args)]
pub struct RunArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 输出目录（覆盖配置）
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// 起始月份 YYYY-MM-DD（覆盖配置）
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// 模拟月数（覆盖配置）
    #[arg(short = 'n', long)]
    pub steps: Option<usize>,

    /// 关闭完整性检查
    #[arg(long)]
    pub no_checks: bool,

    /// 运行摘要 JSON 输出路径
    #[arg(long)]
    pub summary: Option<PathBuf>,
}

/// 执行运行命令
pub fn execute(args: RunArgs) -> Result<()> {
    info!("=== SedHydro 模拟启动 ===");

    let mut config = load_config(args.config.as_deref())?;
    if let Some(output) = args.output {
        config.paths.output_dir = output;
    }
    if let Some(start) = args.start {
        config.simulation.start_date = start;
    }
    if let Some(steps) = args.steps {
        config.simulation.n_steps = steps;
    }
    if args.no_checks {
        config.report.checks = false;
    }

    info!(
        "起始月份: {}, 月数: {}",
        config.simulation.start_date, config.simulation.n_steps
    );
    info!("输入目录: {}", config.paths.map_dir.display());
    info!("输出目录: {}", config.paths.output_dir.display());

    std::fs::create_dir_all(&config.paths.output_dir).with_context(|| {
        format!("无法创建输出目录: {}", config.paths.output_dir.display())
    })?;

    let source = DirectorySource::new(&config.paths.map_dir, &config.paths.table_dir);
    let sink = DirectorySink::new(&config.paths.output_dir, config.physics.missing_value);
    let mut runner = SimulationRunner::new(config, source, sink).context("配置无效")?;

    let start = Instant::now();
    let summary = runner.run().context("模拟失败")?;
    let elapsed = start.elapsed();

    println!("\n=== 模拟完成 ===");
    println!("月数:         {}", summary.step_count());
    println!("土壤流失合计: {:.3} t", summary.total_soil_loss());
    println!("产沙量合计:   {:.3} t", summary.total_sediment_yield());
    println!("耗时:         {:.2} s", elapsed.as_secs_f64());

    if let Some(path) = args.summary {
        let content = serde_json::to_string_pretty(&summary).context("序列化运行摘要失败")?;
        std::fs::write(&path, content)
            .with_context(|| format!("无法写出运行摘要: {}", path.display()))?;
        info!("运行摘要已写出: {}", path.display());
    }

    Ok(())
}
