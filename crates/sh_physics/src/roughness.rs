// crates/sh_physics/src/roughness.rs

//! 地表糙率（Manning n）
//!
//! 综合糙率 = 坡度基准值 n1 + 地表不平整分量 + max(0, NDVI) × 植被加权糙率 n4。

use sh_field::Field;
use sh_foundation::error::ShResult;

use crate::landcover::LandCoverFractions;
use crate::tables::{LookupTable, RangeTable};

/// 坡度基准糙率 n1：按坡度百分比查区间表
pub fn base_roughness(gradient: &Field, table: &RangeTable) -> Field {
    table.apply(&gradient.scale(100.0))
}

/// 植被糙率 n4：覆盖比例加权
pub fn vegetation_roughness(
    fractions: &LandCoverFractions,
    table: &LookupTable,
) -> ShResult<Field> {
    fractions.weighted_average(table)
}

/// 月综合糙率
pub fn combined_roughness(
    base: &Field,
    vegetation: &Field,
    ndvi: &Field,
    surface: f64,
) -> ShResult<Field> {
    base.zip3_with(vegetation, ndvi, |n1, n4, v| n1 + surface + v.max(0.0) * n4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tables::RangeKey;
    use sh_field::GridDomain;

    #[test]
    fn test_base_roughness_uses_percent() {
        let table = RangeTable::new(
            "ManningN1.txt",
            vec![
                (RangeKey::parse("[0,5>").unwrap(), 0.01),
                (RangeKey::parse("[5,>").unwrap(), 0.03),
            ],
        );
        let d = GridDomain::unit(1, 2).shared();
        let gradient = Field::from_vec(d, vec![0.01, 0.2]).unwrap();
        let n1 = base_roughness(&gradient, &table);
        assert_eq!(n1.get(0, 0), Some(0.01));
        assert_eq!(n1.get(0, 1), Some(0.03));
    }

    #[test]
    fn test_negative_ndvi_clipped() {
        let d = GridDomain::unit(1, 2).shared();
        let n1 = Field::constant(d.clone(), 0.01);
        let n4 = Field::constant(d.clone(), 0.2);
        let ndvi = Field::from_vec(d, vec![-0.3, 0.5]).unwrap();
        let n = combined_roughness(&n1, &n4, &ndvi, 0.049).unwrap();
        assert!((n.get(0, 0).unwrap() - 0.059).abs() < 1e-12);
        assert!((n.get(0, 1).unwrap() - 0.159).abs() < 1e-12);
    }
}
