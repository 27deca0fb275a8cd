// crates/sh_foundation/src/error.rs

//! 错误处理模块，定义统一错误类型
//!
//! 提供 `ShError` 枚举和 `ShResult` 类型别名，用于整个项目的错误处理。
//!
//! # 错误分类
//!
//! 1. **域不匹配** (`DomainMismatch`): 参与运算的栅格不在同一研究域上，属于编程或配置错误
//! 2. **缺失输入** (`MissingInput`): 必需的图层或参数表不存在，模拟开始前中止
//! 3. **域内缺测** (`MissingValueInDomain`): 某阶段结束后字段在研究掩膜内存在未定义单元
//!
//! 除零等数值保护不作为错误上报，而是在计算中通过下限和 cover 回退值处理。
//!
//! # 示例
//!
//! ```
//! use sh_foundation::error::{ShError, ShResult};
//!
//! fn read_layer(name: &str) -> ShResult<()> {
//!     Err(ShError::missing_input(name))
//! }
//!
//! assert!(read_layer("LDD").is_err());
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// 统一结果类型
pub type ShResult<T> = Result<T, ShError>;

/// SedHydro 错误类型
#[derive(Error, Debug)]
pub enum ShError {
    // ========================================================================
    // 栅格与研究域
    // ========================================================================
    /// 操作数字段不共享同一研究域
    #[error("研究域不匹配: 期望 {expected}, 实际 {actual}")]
    DomainMismatch {
        /// 期望的域描述
        expected: String,
        /// 实际的域描述
        actual: String,
    },

    /// 必需输入缺失
    #[error("缺失输入: {name}")]
    MissingInput {
        /// 图层或参数表名称
        name: String,
    },

    /// 研究掩膜内存在未定义单元
    #[error("研究域内存在缺测值: 第{ordinal}个字段 {field} 有 {cells} 个未定义单元")]
    MissingValueInDomain {
        /// 首个出错字段名
        field: String,
        /// 字段序号（从 1 开始）
        ordinal: usize,
        /// 该字段在掩膜内首先被标记的单元数
        cells: usize,
    },

    // ========================================================================
    // IO 相关错误
    // ========================================================================
    /// IO 错误
    #[error("IO错误: {message}")]
    Io {
        /// 描述性错误信息
        message: String,
        #[source]
        /// 可选的底层 IO 错误
        source: Option<std::io::Error>,
    },

    /// 文件不存在
    #[error("文件不存在: {path}")]
    FileNotFound {
        /// 未找到的路径
        path: PathBuf,
    },

    /// 文件解析错误
    #[error("文件解析错误: {file} 第{line}行: {message}")]
    ParseError {
        /// 文件路径
        file: PathBuf,
        /// 行号
        line: usize,
        /// 错误信息
        message: String,
    },

    // ========================================================================
    // 数据错误
    // ========================================================================
    /// 无效输入
    #[error("无效的输入数据: {message}")]
    InvalidInput {
        /// 说明无效原因
        message: String,
    },

    /// 数据超出范围
    #[error("数据超出范围: {field}={value}, 期望范围=[{min}, {max}]")]
    OutOfRange {
        /// 字段名
        field: &'static str,
        /// 实际值
        value: f64,
        /// 最小允许值
        min: f64,
        /// 最大允许值
        max: f64,
    },

    /// 数组大小不匹配
    #[error("数组大小不匹配: {name} 期望{expected}, 实际{actual}")]
    SizeMismatch {
        /// 数据名称
        name: &'static str,
        /// 期望大小
        expected: usize,
        /// 实际大小
        actual: usize,
    },

    /// 内部错误
    #[error("内部错误: {message}")]
    Internal {
        /// 内部错误描述
        message: String,
    },
}

// ========================================================================
// 便捷构造方法
// ========================================================================

impl ShError {
    /// 研究域不匹配
    pub fn domain_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::DomainMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// 缺失输入
    pub fn missing_input(name: impl Into<String>) -> Self {
        Self::MissingInput { name: name.into() }
    }

    /// 研究域内缺测
    pub fn missing_value_in_domain(field: impl Into<String>, ordinal: usize, cells: usize) -> Self {
        Self::MissingValueInDomain {
            field: field.into(),
            ordinal,
            cells,
        }
    }

    /// 从IO错误创建
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
            source: None,
        }
    }

    /// 从IO错误创建（带源）
    pub fn io_with_source(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source: Some(source),
        }
    }

    /// 文件不存在
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// 解析错误
    pub fn parse(file: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::ParseError {
            file: file.into(),
            line,
            message: message.into(),
        }
    }

    /// 无效输入
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// 数据超出范围
    pub fn out_of_range(field: &'static str, value: f64, min: f64, max: f64) -> Self {
        Self::OutOfRange {
            field,
            value,
            min,
            max,
        }
    }

    /// 数组大小不匹配
    pub fn size_mismatch(name: &'static str, expected: usize, actual: usize) -> Self {
        Self::SizeMismatch {
            name,
            expected,
            actual,
        }
    }

    /// 内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// 是否为致命的数据完整性错误
    pub fn is_missing_value(&self) -> bool {
        matches!(self, Self::MissingValueInDomain { .. })
    }
}

// ========================================================================
// 验证辅助方法
// ========================================================================

impl ShError {
    /// 检查数组大小是否匹配
    #[inline]
    pub fn check_size(name: &'static str, expected: usize, actual: usize) -> ShResult<()> {
        if expected != actual {
            Err(Self::size_mismatch(name, expected, actual))
        } else {
            Ok(())
        }
    }
}

impl From<std::io::Error> for ShError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_domain_mismatch_display() {
        let err = ShError::domain_mismatch("3x4", "4x3");
        let msg = err.to_string();
        assert!(msg.contains("3x4"));
        assert!(msg.contains("4x3"));
    }

    #[test]
    fn test_missing_value_display() {
        let err = ShError::missing_value_in_domain("K_year", 2, 5);
        assert!(err.is_missing_value());
        assert!(err.to_string().contains("K_year"));
    }

    #[test]
    fn test_missing_input() {
        let err = ShError::missing_input("Pan_90");
        assert!(matches!(err, ShError::MissingInput { .. }));
        assert!(!err.is_missing_value());
    }

    #[test]
    fn test_check_size() {
        assert!(ShError::check_size("test", 10, 10).is_ok());
        assert!(ShError::check_size("test", 10, 5).is_err());
    }

    #[test]
    fn test_out_of_range_display() {
        let msg = ShError::out_of_range("fraction", 1.5, 0.0, 1.0).to_string();
        assert!(msg.contains("fraction=1.5"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "test");
        let err: ShError = io_err.into();
        assert!(matches!(err, ShError::Io { .. }));
    }
}
