// crates/sh_config/src/lib.rs

//! SedHydro Config Layer (Layer 3)
//!
//! 模型运行配置：路径、模拟时段、物理常数、输入名称与输出选项。
//! 配置在构建引擎时一次性传入，运行期间不可变，不存在全局运行状态。
//!
//! # 模块概览
//!
//! - [`model_config`]: ModelConfig 及各配置段
//! - [`error`]: 配置错误类型
//!
//! # 层级架构
//!
//! ```text
//! Layer 6: sh_cli       ─> 加载 ModelConfig
//! Layer 5: sh_workflow  ─> SimulationRunner 持有 ModelConfig
//! Layer 4: sh_physics   ─> 读取 PhysicsConfig
//! Layer 3: sh_config    ─> ModelConfig (本层)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod model_config;

pub use error::ConfigError;
pub use model_config::{
    InputNames, ModelConfig, PathsConfig, PhysicsConfig, Product, ReportConfig, SimulationConfig,
    TemporalMethod,
};
