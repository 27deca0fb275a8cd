// crates/sh_physics/src/slope.rs

//! 地形因子 LS
//!
//! - 坡长因子 (Renard et al., 1997)：`(λ / 22.13)^γ`，
//!   `γ = min(1, 1.183156498 × g^0.351920534)`，坡度达到 0.625 (约 32°) 后 γ 饱和为 1
//! - 坡度因子 (Nearing, 1997)：`-1.5 + 17 / (1 + exp(2.3 - 6.1 × sin(atan(g))))`
//!
//! g 为坡度 [m/m]，λ 为坡长 [m]。

use sh_field::Field;
use sh_foundation::error::ShResult;

/// 标准小区坡长 [m]
pub const REFERENCE_SLOPE_LENGTH: f64 = 22.13;

const GAMMA_COEFFICIENT: f64 = 1.183156498;
const GAMMA_EXPONENT: f64 = 0.351920534;

/// 坡长指数 γ
#[inline]
pub fn slope_length_exponent(gradient: f64) -> f64 {
    (GAMMA_COEFFICIENT * gradient.powf(GAMMA_EXPONENT)).min(1.0)
}

/// 单点坡长因子
#[inline]
pub fn slope_length_value(length: f64, gradient: f64) -> f64 {
    (length / REFERENCE_SLOPE_LENGTH).powf(slope_length_exponent(gradient))
}

/// 单点坡度因子
#[inline]
pub fn slope_steepness_value(gradient: f64) -> f64 {
    let angle = gradient.atan();
    -1.5 + 17.0 / (1.0 + (2.3 - 6.1 * angle.sin()).exp())
}

/// 坡长因子场
pub fn slope_length_factor(length: &Field, gradient: &Field) -> ShResult<Field> {
    length.zip_with(gradient, slope_length_value)
}

/// 坡度因子场
pub fn slope_steepness_factor(gradient: &Field) -> Field {
    gradient.map(slope_steepness_value)
}

/// 地形因子 LS = 坡长因子 × 坡度因子
pub fn slope_factor(length: &Field, gradient: &Field) -> ShResult<Field> {
    length.zip_with(gradient, |l, g| slope_length_value(l, g) * slope_steepness_value(g))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    #[test]
    fn test_exponent_saturates() {
        assert!((slope_length_exponent(0.625) - 1.0).abs() < 1e-3);
        assert_eq!(slope_length_exponent(2.0), 1.0);
        assert!(slope_length_exponent(0.05) < 1.0);
        assert_eq!(slope_length_exponent(0.0), 0.0);
    }

    #[test]
    fn test_flat_slope() {
        // sin(atan(0)) = 0
        let expected = -1.5 + 17.0 / (1.0 + 2.3f64.exp());
        assert!((slope_steepness_value(0.0) - expected).abs() < 1e-12);
        // γ = 0 ⇒ 坡长因子为 1
        assert!((slope_length_value(100.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_slope_factor_product() {
        let d = GridDomain::unit(1, 2).shared();
        let length = Field::from_vec(d.clone(), vec![50.0, f64::NAN]).unwrap();
        let gradient = Field::constant(d, 0.1);
        let ls = slope_factor(&length, &gradient).unwrap();
        let expected = slope_length_value(50.0, 0.1) * slope_steepness_value(0.1);
        assert!((ls.get(0, 0).unwrap() - expected).abs() < 1e-12);
        assert_eq!(ls.get(0, 1), None);

        let l = slope_length_factor(&length, &gradient).unwrap();
        let s = slope_steepness_factor(&gradient);
        assert!((l.get(0, 0).unwrap() * s.get(0, 0).unwrap() - expected).abs() < 1e-12);
    }
}
