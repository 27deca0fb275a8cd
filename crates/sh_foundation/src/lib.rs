// crates/sh_foundation/src/lib.rs

//! SedHydro Foundation Layer
//!
//! 基础层，提供整个项目共享的错误类型和验证报告。
//!
//! # 模块概览
//!
//! - [`error`]: 统一错误类型
//! - [`validation`]: 研究域完整性验证报告

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod validation;

// 重导出常用类型
pub use error::{ShError, ShResult};
pub use validation::{ValidationError, ValidationReport, ValidationWarning};
