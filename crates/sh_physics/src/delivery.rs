// crates/sh_physics/src/delivery.rs

//! 土壤流失、泥沙输移比与产沙量
//!
//! 输移比采用 Van Dijk (2001) 的输沙能力幂律：
//!
//! ```text
//! DR = min(1, max(0, 9.53 × (H × sqrt(100 g) / (n × λ))^0.79))
//! ```
//!
//! H 为水文系数（地表径流/降水），g 为坡度 [m/m]，n 为 Manning 糙率，λ 为坡长 [m]。

use sh_field::Field;
use sh_foundation::error::ShResult;

const DELIVERY_ALPHA: f64 = 9.53;
const DELIVERY_BETA: f64 = 0.79;

/// 面积换算：m² → ha
const SQUARE_METRES_PER_HECTARE: f64 = 10_000.0;

/// 单点输移比
///
/// 分子为 0 时输移比为 0；分母为 0 而分子为正时输移能力无穷大，输移比为 1。
/// 分母为负（糙率或坡长无物理意义）时结果未定义。
pub fn delivery_ratio_value(hydro_coeff: f64, gradient: f64, manning: f64, length: f64) -> f64 {
    let numerator = hydro_coeff * (gradient * 100.0).sqrt();
    let denominator = manning * length;
    if numerator.is_nan() || denominator.is_nan() || denominator < 0.0 {
        return f64::NAN;
    }
    if numerator <= 0.0 {
        return 0.0;
    }
    if denominator == 0.0 {
        return 1.0;
    }
    (DELIVERY_ALPHA * (numerator / denominator).powf(DELIVERY_BETA)).clamp(0.0, 1.0)
}

/// 月土壤流失量 [t/像元/月]：`R × K × LS × C × P × 面积 / 10000`
pub fn soil_loss(
    r_month: &Field,
    k_month: &Field,
    ls: &Field,
    c_month: &Field,
    p_month: &Field,
    cell_area: &Field,
) -> ShResult<Field> {
    Field::zip_all(&[r_month, k_month, ls, c_month, p_month, cell_area], |v| {
        v[0] * v[1] * v[2] * v[3] * v[4] * v[5] / SQUARE_METRES_PER_HECTARE
    })
}

/// 水文系数 `min(1, max(0, cover(Q / P, fallback)))`
pub fn hydro_coefficient(qsurface: &Field, rain_month: &Field, fallback: f64) -> ShResult<Field> {
    Ok(qsurface.divide(rain_month)?.cover(fallback).clamp(0.0, 1.0))
}

/// 输移比场
pub fn delivery_ratio(
    hydro_coeff: &Field,
    gradient: &Field,
    manning: &Field,
    length: &Field,
) -> ShResult<Field> {
    Field::zip_all(&[hydro_coeff, gradient, manning, length], |v| {
        delivery_ratio_value(v[0], v[1], v[2], v[3])
    })
}

/// 产沙量 = 土壤流失量 × 输移比
pub fn sediment_yield(soil_loss: &Field, delivery_ratio: &Field) -> ShResult<Field> {
    soil_loss.times(delivery_ratio)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    #[test]
    fn test_delivery_ratio_bounded() {
        for &h in &[0.0, 1e-4, 0.3, 1.0] {
            for &g in &[0.0, 0.01, 0.5, 10.0] {
                for &n in &[0.0, 1e-12, 0.05, 1.0] {
                    for &l in &[0.0, 1e-9, 50.0, 1e6] {
                        let dr = delivery_ratio_value(h, g, n, l);
                        assert!((0.0..=1.0).contains(&dr), "h={} g={} n={} l={} dr={}", h, g, n, l, dr);
                    }
                }
            }
        }
    }

    #[test]
    fn test_delivery_ratio_value() {
        let x: f64 = 0.1 * (1.0f64).sqrt() / (0.1 * 100.0);
        let expected = 9.53 * x.powf(0.79);
        assert!((delivery_ratio_value(0.1, 0.01, 0.1, 100.0) - expected).abs() < 1e-12);
        assert_eq!(delivery_ratio_value(0.5, 0.1, 0.0, 100.0), 1.0);
        assert!(delivery_ratio_value(0.5, 0.1, -0.1, 100.0).is_nan());
    }

    #[test]
    fn test_hydro_coefficient_fallback() {
        let d = GridDomain::unit(1, 3).shared();
        let q = Field::from_vec(d.clone(), vec![20.0, 5.0, 500.0]).unwrap();
        let p = Field::from_vec(d, vec![100.0, 0.0, 100.0]).unwrap();
        let h = hydro_coefficient(&q, &p, 1e-4).unwrap();
        assert!((h.get(0, 0).unwrap() - 0.2).abs() < 1e-12);
        assert_eq!(h.get(0, 1), Some(1e-4));
        assert_eq!(h.get(0, 2), Some(1.0));
    }

    #[test]
    fn test_soil_loss_and_yield() {
        let d = GridDomain::unit(1, 1).shared();
        let f = |v: f64| Field::constant(d.clone(), v);
        let loss = soil_loss(&f(200.0), &f(0.03), &f(1.5), &f(0.01), &f(0.5), &f(1e6)).unwrap();
        let expected = 200.0 * 0.03 * 1.5 * 0.01 * 0.5 * 1e6 / 10_000.0;
        assert!((loss.get(0, 0).unwrap() - expected).abs() < 1e-9);

        let yield_ = sediment_yield(&loss, &f(0.25)).unwrap();
        assert!((yield_.get(0, 0).unwrap() - expected * 0.25).abs() < 1e-9);
    }
}
