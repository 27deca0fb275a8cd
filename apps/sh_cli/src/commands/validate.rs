// apps/sh_cli/src/commands/validate.rs

//! 配置验证命令
//!
//! 校验配置文件；加 `--inputs` 时再读取全部静态输入并做完整性检查，不写出任何结果。

use anyhow::{bail, Result};
use clap::Args;
use sh_io::{DirectorySource, MemorySink};
use sh_workflow::{RunnerError, SimulationRunner};
use std::path::PathBuf;
use tracing::{error, info};

use super::load_config;

/// 验证参数
#[derive(Args)]
pub struct ValidateArgs {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: PathBuf,

    /// 同时检查静态输入
    #[arg(long)]
    pub inputs: bool,
}

/// 执行验证命令
pub fn execute(args: ValidateArgs) -> Result<()> {
    info!("=== SedHydro 配置验证 ===");
    println!("\n检查配置文件: {}", args.config.display());

    let config = load_config(Some(args.config.as_path()))?;
    println!("  ✓ 配置文件有效");

    if !args.inputs {
        return Ok(());
    }

    println!("\n检查静态输入: {}", config.paths.map_dir.display());
    let source = DirectorySource::new(&config.paths.map_dir, &config.paths.table_dir);
    let mut runner = SimulationRunner::new(config, source, MemorySink::new())?;

    match runner.initialize() {
        Ok(()) => {
            if let Some(mask) = runner.mask() {
                println!("  研究域单元数: {}", mask.count_true());
            }
            if let Some(statics) = runner.statics() {
                println!("  土地覆盖类别: {}", statics.cover.names().collect::<Vec<_>>().join(", "));
            }
            println!("  ✓ 静态输入完整");
            Ok(())
        }
        Err(RunnerError::Model(e)) if e.is_missing_value() => {
            error!("{}", e);
            bail!("静态输入在研究域内存在缺测值")
        }
        Err(e) => Err(e.into()),
    }
}
