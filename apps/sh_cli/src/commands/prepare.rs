// apps/sh_cli/src/commands/prepare.rs

//! 预处理命令
//!
//! 派生年降水或耕地代表坡度图层，写入输入目录，供之后的 `run` 直接读取。

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use sh_io::{DirectorySink, DirectorySource};
use sh_workflow::prepare::{derive_annual_rainfall, derive_cropland_slope, write_prepared};
use std::path::PathBuf;
use tracing::info;

use super::load_config;

/// 预处理参数
#[derive(Args)]
pub struct PrepareArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub layer: PrepareLayer,
}

/// 要派生的图层
#[derive(Subcommand)]
pub enum PrepareLayer {
    /// 由逐月降水累加年降水
    AnnualRainfall {
        /// 累加的月数（从第 1 步开始）
        #[arg(short = 'n', long, default_value_t = 12)]
        months: usize,

        /// 输出图层名（默认取配置中的年降水名）
        #[arg(short, long)]
        output: Option<String>,
    },
    /// 由细网格坡度选取耕地代表坡度
    CroplandSlope {
        /// 细网格坡度图层
        #[arg(long)]
        slope: String,

        /// 粗分区编号图层
        #[arg(long)]
        zones: String,

        /// 耕地比例图层
        #[arg(long)]
        crop_fraction: String,

        /// 输出图层名（默认取配置中的耕地坡度名）
        #[arg(short, long)]
        output: Option<String>,
    },
}

/// 执行预处理命令
pub fn execute(args: PrepareArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let map_dir = &config.paths.map_dir;
    let source = DirectorySource::new(map_dir, &config.paths.table_dir);
    let mut sink = DirectorySink::new(map_dir, config.physics.missing_value);

    let (name, field) = match args.layer {
        PrepareLayer::AnnualRainfall { months, output } => {
            let stem = &config.inputs.rain_month;
            let field = derive_annual_rainfall(&source, stem, months, config.physics.missing_value)
                .with_context(|| format!("无法累加逐月降水 '{}'", stem))?;
            (output.unwrap_or_else(|| config.inputs.rain_annual.clone()), field)
        }
        PrepareLayer::CroplandSlope {
            slope,
            zones,
            crop_fraction,
            output,
        } => {
            let field = derive_cropland_slope(&source, &slope, &zones, &crop_fraction)
                .context("无法选取耕地代表坡度")?;
            (output.unwrap_or_else(|| config.inputs.selected_slope.clone()), field)
        }
    };

    write_prepared(&mut sink, &name, &field)
        .with_context(|| format!("无法写出图层 '{}'", name))?;
    info!("预处理完成: {}", map_dir.join(format!("{}.asc", name)).display());
    Ok(())
}
