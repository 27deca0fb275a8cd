// crates/sh_foundation/src/validation.rs

//! 运行时验证工具
//!
//! 提供验证报告和错误/警告类型，用于每个计算阶段后的研究域完整性检查。
//!
//! # 示例
//!
//! ```
//! use sh_foundation::validation::{ValidationReport, ValidationWarning};
//!
//! let mut report = ValidationReport::new();
//! report.add_warning(ValidationWarning::UndefinedCells {
//!     field: "R_year".into(),
//!     ordinal: 3,
//!     cells: 12,
//! });
//!
//! assert!(report.is_valid());
//! assert!(report.has_warnings());
//! ```

use crate::error::{ShError, ShResult};
use std::fmt;

/// 验证报告
#[derive(Debug, Default)]
pub struct ValidationReport {
    /// 错误列表
    pub errors: Vec<ValidationError>,
    /// 警告列表
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// 创建空的验证报告
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加错误
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// 是否有错误
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// 是否有警告
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// 错误数量
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// 警告数量
    pub fn warning_count(&self) -> usize {
        self.warnings.len()
    }

    /// 是否通过（无错误）
    pub fn is_valid(&self) -> bool {
        !self.has_errors()
    }

    /// 合并另一个报告
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// 转换为结果：首个错误映射为 [`ShError`]
    pub fn into_result(self) -> ShResult<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(ValidationError::FirstUndefined {
                field,
                ordinal,
                cells,
            }) => Err(ShError::missing_value_in_domain(field.clone(), *ordinal, *cells)),
        }
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "验证报告:")?;
        writeln!(f, "  错误: {} 个", self.error_count())?;
        writeln!(f, "  警告: {} 个", self.warning_count())?;

        if self.has_errors() {
            writeln!(f, "\n错误详情:")?;
            for (i, err) in self.errors.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, err)?;
            }
        }

        if self.has_warnings() {
            writeln!(f, "\n警告详情:")?;
            for (i, warn) in self.warnings.iter().enumerate() {
                writeln!(f, "  {}. {}", i + 1, warn)?;
            }
        }

        Ok(())
    }
}

/// 验证错误类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// 首个在掩膜内出现未定义单元的字段
    FirstUndefined {
        /// 字段名称
        field: String,
        /// 字段序号（从 1 开始）
        ordinal: usize,
        /// 由该字段首先标记的单元数
        cells: usize,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstUndefined {
                field,
                ordinal,
                cells,
            } => write!(
                f,
                "字段{}({}): {} 个掩膜内单元首先在此字段缺测",
                ordinal, field, cells
            ),
        }
    }
}

impl std::error::Error for ValidationError {}

/// 验证警告类型
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationWarning {
    /// 字段在掩膜内存在未定义单元
    UndefinedCells {
        /// 字段名称
        field: String,
        /// 字段序号（从 1 开始）
        ordinal: usize,
        /// 掩膜内未定义单元数
        cells: usize,
    },
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedCells {
                field,
                ordinal,
                cells,
            } => write!(f, "字段{}({}): 掩膜内有 {} 个缺测单元", ordinal, field, cells),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_report_new() {
        let report = ValidationReport::new();
        assert!(report.is_valid());
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_into_result_maps_first_error() {
        let mut report = ValidationReport::new();
        report.add_error(ValidationError::FirstUndefined {
            field: "LS".into(),
            ordinal: 1,
            cells: 4,
        });
        report.add_error(ValidationError::FirstUndefined {
            field: "K_year".into(),
            ordinal: 2,
            cells: 1,
        });

        match report.into_result() {
            Err(ShError::MissingValueInDomain { field, ordinal, cells }) => {
                assert_eq!(field, "LS");
                assert_eq!(ordinal, 1);
                assert_eq!(cells, 4);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_merge() {
        let mut a = ValidationReport::new();
        a.add_warning(ValidationWarning::UndefinedCells {
            field: "R_year".into(),
            ordinal: 3,
            cells: 2,
        });
        let mut b = ValidationReport::new();
        b.add_error(ValidationError::FirstUndefined {
            field: "LS".into(),
            ordinal: 1,
            cells: 1,
        });
        a.merge(b);
        assert_eq!(a.warning_count(), 1);
        assert_eq!(a.error_count(), 1);
        assert!(!a.is_valid());
    }

    #[test]
    fn test_report_display() {
        let mut report = ValidationReport::new();
        report.add_warning(ValidationWarning::UndefinedCells {
            field: "C_month".into(),
            ordinal: 4,
            cells: 2,
        });
        let text = report.to_string();
        assert!(text.contains("C_month"));
        assert!(text.contains("警告: 1"));
    }
}
