// crates/sh_physics/src/landcover.rs

//! 土地覆盖比例与类别加权
//!
//! 原始覆盖比例逐单元求和后归一为单位分割；总覆盖不超过阈值的单元
//! 在所有类别中均未定义，不以 0 填充。
//!
//! 水保因子中耕地类别的取值依赖代表坡度，用 [`CoverClass::Cropland`]
//! 显式区分，在解析阶段按类别名一次确定。

use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};

use crate::tables::LookupTable;

/// 归一化后的土地覆盖比例集
#[derive(Debug, Clone)]
pub struct LandCoverFractions {
    classes: Vec<(String, Field)>,
}

impl LandCoverFractions {
    /// 由原始覆盖比例归一化
    ///
    /// `f_k' = f_k / max(total, threshold)`，仅在 `total > threshold` 处定义。
    pub fn normalize(raw: Vec<(String, Field)>, threshold: f64) -> ShResult<Self> {
        let first = raw
            .first()
            .ok_or_else(|| ShError::invalid_input("土地覆盖类别为空"))?;

        let mut total = Field::constant(first.1.domain().clone(), 0.0);
        for (_, fraction) in &raw {
            total = total.plus(fraction)?;
        }

        let covered = total.gt(threshold);
        let mut classes = Vec::with_capacity(raw.len());
        for (name, fraction) in raw {
            let share = fraction.zip_with(&total, |f, t| f / t.max(threshold))?;
            classes.push((name, covered.if_then(&share)?));
        }

        Ok(Self { classes })
    }

    /// 类别与比例（输入顺序）
    pub fn classes(&self) -> &[(String, Field)] {
        &self.classes
    }

    /// 类别名
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|(name, _)| name.as_str())
    }

    /// 读取类别比例
    pub fn get(&self, class: &str) -> Option<&Field> {
        self.classes
            .iter()
            .find(|(name, _)| name == class)
            .map(|(_, f)| f)
    }

    /// 类别数
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// 各类别比例之和
    pub fn total(&self) -> ShResult<Field> {
        self.weighted_sum(|_| Ok(Some(1.0)))
    }

    /// 按类别参数加权平均（类别缺少参数时报 `MissingInput`）
    pub fn weighted_average(&self, table: &LookupTable) -> ShResult<Field> {
        self.weighted_sum(|name| table.require(name).map(Some))
    }

    fn weighted_sum<F>(&self, value_of: F) -> ShResult<Field>
    where
        F: Fn(&str) -> ShResult<Option<f64>>,
    {
        let first = self
            .classes
            .first()
            .ok_or_else(|| ShError::invalid_input("土地覆盖类别为空"))?;
        let mut sum = Field::constant(first.1.domain().clone(), 0.0);
        for (name, fraction) in &self.classes {
            if let Some(value) = value_of(name)? {
                sum = sum.plus(&fraction.scale(value))?;
            }
        }
        Ok(sum)
    }
}

/// 耕地水保因子规则：`intercept + slope_coefficient × 代表坡度`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CroplandRule {
    /// 截距
    pub intercept: f64,
    /// 坡度系数
    pub slope_coefficient: f64,
}

impl CroplandRule {
    /// 按代表坡度计算耕地水保因子
    pub fn apply(&self, selected_slope: &Field) -> Field {
        selected_slope
            .scale(self.slope_coefficient)
            .offset(self.intercept)
    }
}

/// 水保因子的覆盖类别
#[derive(Debug, Clone, PartialEq)]
pub enum CoverClass {
    /// 采用文献值的普通类别
    Ordinary {
        /// 类别名
        name: String,
        /// 文献值
        value: f64,
    },
    /// 取值依赖坡度的耕地类别
    Cropland {
        /// 类别名
        name: String,
        /// 坡度规则
        rule: CroplandRule,
    },
}

impl CoverClass {
    /// 类别名
    pub fn name(&self) -> &str {
        match self {
            CoverClass::Ordinary { name, .. } | CoverClass::Cropland { name, .. } => name,
        }
    }
}

/// 为每个覆盖类别解析水保因子规则
///
/// 名称等于 `cropland_class` 的类别采用坡度规则，不需要出现在参数表中；
/// 其余类别必须在参数表中有值。
pub fn resolve_conservation_classes(
    fractions: &LandCoverFractions,
    table: &LookupTable,
    cropland_class: &str,
    rule: CroplandRule,
) -> ShResult<Vec<CoverClass>> {
    fractions
        .names()
        .map(|name| {
            if name == cropland_class {
                Ok(CoverClass::Cropland {
                    name: name.to_string(),
                    rule,
                })
            } else {
                Ok(CoverClass::Ordinary {
                    name: name.to_string(),
                    value: table.require(name)?,
                })
            }
        })
        .collect()
}

/// 水保因子 P：覆盖比例加权
pub fn conservation_factor(
    fractions: &LandCoverFractions,
    classes: &[CoverClass],
    selected_slope: &Field,
) -> ShResult<Field> {
    let mut p = Field::constant(selected_slope.domain().clone(), 0.0);
    for class in classes {
        let fraction = fractions
            .get(class.name())
            .ok_or_else(|| ShError::missing_input(format!("覆盖比例: {}", class.name())))?;
        let contribution = match class {
            CoverClass::Ordinary { value, .. } => fraction.scale(*value),
            CoverClass::Cropland { rule, .. } => fraction.times(&rule.apply(selected_slope))?,
        };
        p = p.plus(&contribution)?;
    }
    Ok(p)
}

/// 截留比例：覆盖比例加权后截断到 [0, 1]
pub fn interception_fraction(
    fractions: &LandCoverFractions,
    table: &LookupTable,
) -> ShResult<Field> {
    Ok(fractions.weighted_average(table)?.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    fn raw_pair(a: Vec<f64>, b: Vec<f64>) -> Vec<(String, Field)> {
        let d = GridDomain::unit(1, a.len()).shared();
        vec![
            ("forest".to_string(), Field::from_vec(d.clone(), a).unwrap()),
            ("croplands".to_string(), Field::from_vec(d, b).unwrap()),
        ]
    }

    #[test]
    fn test_normalize_partition_of_unity() {
        let fractions = LandCoverFractions::normalize(raw_pair(vec![0.3, 1e-13], vec![0.3, 0.0]), 1e-12).unwrap();
        let forest = fractions.get("forest").unwrap();
        let crops = fractions.get("croplands").unwrap();
        assert!((forest.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
        assert!((crops.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(forest.get(0, 1), None);
        assert_eq!(crops.get(0, 1), None);
        assert!((fractions.total().unwrap().get(0, 0).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_normalize_empty_rejected() {
        assert!(LandCoverFractions::normalize(Vec::new(), 1e-12).is_err());
    }

    #[test]
    fn test_conservation_factor_cropland_rule() {
        let fractions = LandCoverFractions::normalize(raw_pair(vec![0.5], vec![0.5]), 1e-12).unwrap();
        let table = LookupTable::new("P_factor.txt", vec![("forest".into(), 0.4)]);
        let rule = CroplandRule {
            intercept: 0.2,
            slope_coefficient: 0.3,
        };
        let classes = resolve_conservation_classes(&fractions, &table, "croplands", rule).unwrap();
        assert!(matches!(classes[1], CoverClass::Cropland { .. }));

        let slope = Field::constant(fractions.classes()[0].1.domain().clone(), 0.5);
        let p = conservation_factor(&fractions, &classes, &slope).unwrap();
        // 0.5 × 0.4 + 0.5 × (0.2 + 0.3 × 0.5)
        assert!((p.get(0, 0).unwrap() - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_missing_table_class() {
        let fractions = LandCoverFractions::normalize(raw_pair(vec![0.5], vec![0.5]), 1e-12).unwrap();
        let table = LookupTable::new("part_interception.txt", vec![("forest".into(), 0.2)]);
        let err = interception_fraction(&fractions, &table).unwrap_err();
        assert!(matches!(err, ShError::MissingInput { .. }));
    }

    #[test]
    fn test_interception_clamped() {
        let fractions = LandCoverFractions::normalize(raw_pair(vec![1.0], vec![1.0]), 1e-12).unwrap();
        let table = LookupTable::new(
            "part_interception.txt",
            vec![("forest".into(), 1.5), ("croplands".into(), 1.5)],
        );
        let i = interception_fraction(&fractions, &table).unwrap();
        assert_eq!(i.get(0, 0), Some(1.0));
    }
}
