// crates/sh_workflow/src/lib.rs

//! SedHydro 模拟驱动
//!
//! 按固定顺序驱动一次运行：
//!
//! ```text
//! 读取静态输入 → 覆盖归一化 → 静态因子 → 完整性检查 → 写出静态场
//!     └─ 每月: 时钟前进 → 读取月输入 → 月状态 → 完整性检查 → 写出月输出/时间序列
//! ```
//!
//! 完整性检查失败即中止运行，失败步的任何结果都不会写出。
//!
//! # 模块结构
//!
//! - [`inputs`]: 从数据源组装静态与月输入
//! - [`prepare`]: 模拟前派生年降水与耕地代表坡度图层
//! - [`runner`]: [`SimulationRunner`] 与运行摘要
//!
//! # 示例
//!
//! ```rust,ignore
//! use sh_config::ModelConfig;
//! use sh_io::{DirectorySink, DirectorySource};
//! use sh_workflow::SimulationRunner;
//!
//! let config = ModelConfig::from_file("model.json")?;
//! let source = DirectorySource::new(&config.paths.map_dir, &config.paths.table_dir);
//! let sink = DirectorySink::new(&config.paths.output_dir, config.physics.missing_value);
//!
//! let mut runner = SimulationRunner::new(config, source, sink)?;
//! let summary = runner.run()?;
//! println!("产沙量合计: {:.3} t", summary.total_sediment_yield());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod inputs;
pub mod prepare;
pub mod runner;

// 重导出核心类型
pub use runner::{RunSummary, RunnerError, SimulationRunner, StepSummary};
