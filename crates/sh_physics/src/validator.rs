// crates/sh_physics/src/validator.rs

//! 研究域完整性检查
//!
//! 每个阶段结束后，对该阶段持有的全部场（按登记顺序编号，从 1 开始）检查研究掩膜内
//! 是否存在未定义单元。逐单元记录最先出现缺测的场序号，得到“首个出错场”分区图；
//! 只要该图在研究域内存在非零值，整步结果作废。

use sh_field::{BoolField, Field, ZoneField};
use sh_foundation::error::ShResult;
use sh_foundation::validation::{ValidationError, ValidationReport, ValidationWarning};
use tracing::warn;

/// 场登记表：阶段产生的 (名称, 场) 有序列表
pub type FieldRegistry<'a> = Vec<(&'a str, &'a Field)>;

/// 完整性检查结果
#[derive(Debug)]
pub struct CompletenessOutcome {
    /// 首个出错场序号图：掩膜内 0 表示完整，掩膜外未定义
    pub first_offender: ZoneField,
    /// 每个有缺测的场一条警告，首个出错场一条错误
    pub report: ValidationReport,
}

impl CompletenessOutcome {
    /// 掩膜内出错序号的最大值
    pub fn max_offender(&self) -> i64 {
        let domain = self.first_offender.domain();
        (0..domain.rows)
            .flat_map(|r| (0..domain.cols).map(move |c| (r, c)))
            .filter_map(|(r, c)| self.first_offender.get(r, c))
            .max()
            .unwrap_or(0)
    }
}

/// 研究域完整性检查器
#[derive(Debug, Clone)]
pub struct CompletenessValidator {
    mask: BoolField,
}

impl CompletenessValidator {
    /// 以研究掩膜创建（为真的单元属于研究域）
    pub fn new(mask: BoolField) -> Self {
        Self { mask }
    }

    /// 研究掩膜
    pub fn mask(&self) -> &BoolField {
        &self.mask
    }

    /// 检查登记表，不中止
    pub fn inspect(&self, registry: &[(&str, &Field)]) -> ShResult<CompletenessOutcome> {
        let domain = self.mask.domain().clone();
        let (rows, cols) = domain.shape();
        let mut offender: Vec<Option<i64>> = (0..rows)
            .flat_map(|r| (0..cols).map(move |c| (r, c)))
            .map(|(r, c)| self.mask.is_true(r, c).then_some(0))
            .collect();

        let mut report = ValidationReport::new();
        for (i, (name, field)) in registry.iter().enumerate() {
            self.mask.domain().ensure_same(field.domain())?;
            let ordinal = i + 1;
            let mut undefined = 0usize;
            let mut first = 0usize;

            for (index, slot) in offender.iter_mut().enumerate() {
                let Some(current) = slot else { continue };
                let (r, c) = domain.position(index);
                if field.get(r, c).is_some() {
                    continue;
                }
                undefined += 1;
                if *current == 0 {
                    *current = ordinal as i64;
                    first += 1;
                }
            }

            if undefined > 0 {
                warn!("字段{} ({}) 在研究域内有 {} 个缺测单元", ordinal, name, undefined);
                report.add_warning(ValidationWarning::UndefinedCells {
                    field: name.to_string(),
                    ordinal,
                    cells: undefined,
                });
            }
            if first > 0 && !report.has_errors() {
                report.add_error(ValidationError::FirstUndefined {
                    field: name.to_string(),
                    ordinal,
                    cells: first,
                });
            }
        }

        let first_offender = ZoneField::from_vec(domain, offender)?;
        Ok(CompletenessOutcome {
            first_offender,
            report,
        })
    }

    /// 检查登记表，存在缺测时返回 `MissingValueInDomain`
    pub fn check(&self, registry: &[(&str, &Field)]) -> ShResult<ValidationReport> {
        self.inspect(registry)?.report.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;
    use sh_foundation::ShError;

    #[test]
    fn test_undefined_outside_mask_passes() {
        let d = GridDomain::unit(1, 3).shared();
        let mask = BoolField::from_vec(d.clone(), vec![Some(true), Some(true), Some(false)]).unwrap();
        let a = Field::from_vec(d.clone(), vec![1.0, 2.0, f64::NAN]).unwrap();
        let b = Field::constant(d, 3.0);
        let validator = CompletenessValidator::new(mask);
        let report = validator.check(&[("a", &a), ("b", &b)]).unwrap();
        assert!(!report.has_warnings());
    }

    #[test]
    fn test_first_offender_map() {
        let d = GridDomain::unit(1, 3).shared();
        let mask = BoolField::constant(d.clone(), true);
        let a = Field::from_vec(d.clone(), vec![1.0, f64::NAN, 1.0]).unwrap();
        let b = Field::from_vec(d.clone(), vec![f64::NAN, f64::NAN, 1.0]).unwrap();
        let validator = CompletenessValidator::new(mask);

        let outcome = validator.inspect(&[("a", &a), ("b", &b)]).unwrap();
        assert_eq!(outcome.first_offender.get(0, 0), Some(2));
        assert_eq!(outcome.first_offender.get(0, 1), Some(1));
        assert_eq!(outcome.first_offender.get(0, 2), Some(0));
        assert_eq!(outcome.max_offender(), 2);
        assert_eq!(outcome.report.warning_count(), 2);

        let err = validator.check(&[("a", &a), ("b", &b)]).unwrap_err();
        match err {
            ShError::MissingValueInDomain { field, ordinal, cells } => {
                assert_eq!(field, "a");
                assert_eq!(ordinal, 1);
                assert_eq!(cells, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_domain_mismatch() {
        let mask = BoolField::constant(GridDomain::unit(2, 2).shared(), true);
        let other = Field::constant(GridDomain::unit(3, 3).shared(), 1.0);
        let validator = CompletenessValidator::new(mask);
        assert!(matches!(
            validator.check(&[("x", &other)]),
            Err(ShError::DomainMismatch { .. })
        ));
    }
}
