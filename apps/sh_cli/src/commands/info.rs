// apps/sh_cli/src/commands/info.rs

//! 信息显示命令
//!
//! 显示版本、默认配置或指定配置的内容。

use anyhow::{Context, Result};
use clap::Args;
use sh_config::ModelConfig;
use std::path::PathBuf;
use tracing::info;

use super::load_config;

/// 信息显示参数
#[derive(Args)]
pub struct InfoArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// 显示默认配置
    #[arg(long)]
    pub defaults: bool,

    /// 把默认配置写到文件
    #[arg(long)]
    pub write_defaults: Option<PathBuf>,
}

/// 执行信息命令
pub fn execute(args: InfoArgs) -> Result<()> {
    info!("=== SedHydro 信息 ===");
    print_system_info();

    if let Some(path) = &args.write_defaults {
        ModelConfig::default()
            .save_to_file(path)
            .with_context(|| format!("无法写出默认配置: {}", path.display()))?;
        println!("\n默认配置已写出: {}", path.display());
    }

    if args.defaults {
        println!();
        print_config("默认配置", &ModelConfig::default())?;
    }

    if let Some(path) = &args.config {
        let config = load_config(Some(path.as_path()))?;
        println!();
        print_config(&format!("配置 {}", path.display()), &config)?;
        print_outputs(&config);
    }

    Ok(())
}

fn print_system_info() {
    println!("=== 系统信息 ===");
    println!("SedHydro CLI 版本: {}", env!("CARGO_PKG_VERSION"));
    println!("目标平台: {}", std::env::consts::ARCH);
    println!("操作系统: {}", std::env::consts::OS);
}

fn print_config(title: &str, config: &ModelConfig) -> Result<()> {
    println!("=== {} ===", title);
    let json = serde_json::to_string_pretty(config).context("序列化配置失败")?;
    println!("{}", json);
    Ok(())
}

fn print_outputs(config: &ModelConfig) {
    println!("\n=== 输出 ===");
    let end = config
        .simulation
        .start_date
        .checked_add_months(chrono::Months::new(
            u32::try_from(config.simulation.n_steps.saturating_sub(1)).unwrap_or(u32::MAX),
        ));
    match end {
        Some(end) => println!("模拟时段: {} ~ {}", config.simulation.start_date, end),
        None => println!("模拟时段: {} 起 {} 个月", config.simulation.start_date, config.simulation.n_steps),
    }
    println!("静态输出: {}", config.report.static_fields.join(", "));
    println!("月输出:   {}", config.report.monthly_fields.join(", "));
    for product in &config.report.products {
        println!(
            "时间序列: {} → {}.jsonl ({})",
            product.field, product.variable, product.units
        );
    }
}
