// apps/sh_cli/src/commands/mod.rs

//! 子命令

pub mod info;
pub mod prepare;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use sh_config::ModelConfig;
use std::path::Path;

/// 读取配置文件；未指定时使用默认配置
pub fn load_config(path: Option<&Path>) -> Result<ModelConfig> {
    match path {
        Some(p) => ModelConfig::from_file(p)
            .with_context(|| format!("无法加载配置文件: {}", p.display())),
        None => Ok(ModelConfig::default()),
    }
}
