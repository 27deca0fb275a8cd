// crates/sh_physics/src/erosivity.rs

//! 降雨侵蚀力因子 R
//!
//! 年侵蚀力采用 Renard & Freimund (1994) 的分段关系，以截留后的有效年降水 P' [mm] 计：
//!
//! ```text
//! R = 0.0483 P'^1.61                     (P' ≤ 850)
//! R = 587.8 - 1.219 P' + 0.00415 P'²     (P' > 850)
//! ```
//!
//! 两支在 850 mm 处并不连续（左支约 2513.7，右支约 2550.0，相差约 1.4%），按原关系保留。
//! 月侵蚀力按月降水占年降水的份额分配年侵蚀力。

use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};

/// 分段断点 [mm]
pub const ANNUAL_RAIN_BREAKPOINT: f64 = 850.0;

/// 单点年侵蚀力
#[inline]
pub fn annual_erosivity_value(rain: f64) -> f64 {
    if rain <= ANNUAL_RAIN_BREAKPOINT {
        0.0483 * rain.powf(1.61)
    } else {
        587.8 - 1.219 * rain + 0.00415 * rain * rain
    }
}

/// 单点月侵蚀力
#[inline]
pub fn partition_erosivity_value(rain_month: f64, rain_annual: f64, r_year: f64) -> f64 {
    let share = if rain_annual > 0.0 {
        rain_month / rain_month.max(rain_annual)
    } else {
        0.0
    };
    share * r_year
}

/// 有效年降水 `(1 - interception) × rain_annual`
pub fn effective_annual_rainfall(interception: &Field, rain_annual: &Field) -> ShResult<Field> {
    interception.zip_with(rain_annual, |i, p| (1.0 - i) * p)
}

/// 年侵蚀力场，未定义单元以 `missing_value` 填充
pub fn annual_erosivity(effective_rain: &Field, missing_value: f64) -> Field {
    effective_rain.map(annual_erosivity_value).cover(missing_value)
}

/// 月侵蚀力场
pub fn partition_erosivity(rain_month: &Field, rain_annual: &Field, r_year: &Field) -> ShResult<Field> {
    rain_month.zip3_with(rain_annual, r_year, partition_erosivity_value)
}

/// 由逐月降水累加年降水，未定义单元以 `missing_value` 填充
pub fn annual_rainfall(monthly: &[Field], missing_value: f64) -> ShResult<Field> {
    let (first, rest) = monthly
        .split_first()
        .ok_or_else(|| ShError::invalid_input("年降水累加至少需要一个月"))?;
    let mut total = first.clone();
    for month in rest {
        total = total.plus(month)?;
    }
    Ok(total.cover(missing_value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    #[test]
    fn test_breakpoint_discontinuity() {
        let left = 0.0483 * ANNUAL_RAIN_BREAKPOINT.powf(1.61);
        let right = 587.8 - 1.219 * ANNUAL_RAIN_BREAKPOINT + 0.00415 * ANNUAL_RAIN_BREAKPOINT.powi(2);
        assert!((right - 2550.025).abs() < 1e-6);
        // 断点处取左支
        assert!((annual_erosivity_value(850.0) - left).abs() < 1e-9);
        // 两支差距约 1.4%
        let gap = (left - right).abs() / right;
        assert!(gap > 0.005 && gap < 0.02, "gap = {}", gap);
    }

    #[test]
    fn test_partition_erosivity() {
        assert!((partition_erosivity_value(100.0, 1500.0, 3000.0) - 200.0).abs() < 1e-9);
        // 月降水超过年降水时份额封顶为 1
        assert!((partition_erosivity_value(2000.0, 1500.0, 3000.0) - 3000.0).abs() < 1e-9);
        assert_eq!(partition_erosivity_value(100.0, 0.0, 3000.0), 0.0);
    }

    #[test]
    fn test_annual_erosivity_covers_missing() {
        let d = GridDomain::unit(1, 3).shared();
        let rain = Field::from_vec(d, vec![1000.0, f64::NAN, -999.9]).unwrap();
        let r = annual_erosivity(&rain, -999.9);
        assert!((r.get(0, 0).unwrap() - annual_erosivity_value(1000.0)).abs() < 1e-9);
        assert_eq!(r.get(0, 1), Some(-999.9));
        // 负底数的幂未定义
        assert_eq!(r.get(0, 2), Some(-999.9));
    }

    #[test]
    fn test_annual_rainfall_sum() {
        let d = GridDomain::unit(1, 2).shared();
        let months: Vec<Field> = (0..12)
            .map(|_| Field::from_vec(d.clone(), vec![10.0, f64::NAN]).unwrap())
            .collect();
        let total = annual_rainfall(&months, -999.9).unwrap();
        assert!((total.get(0, 0).unwrap() - 120.0).abs() < 1e-9);
        assert_eq!(total.get(0, 1), Some(-999.9));
        assert!(annual_rainfall(&[], -999.9).is_err());
    }
}
