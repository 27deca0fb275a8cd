//! 物理因子性质测试
//!
//! 覆盖坡长指数上限、侵蚀力断点、输移比有界性、覆盖归一化、
//! 季节比优先级、融化时间比例等性质。

use sh_field::{Field, GridDomain};
use sh_physics::delivery::{delivery_ratio, delivery_ratio_value};
use sh_physics::erodibility::{melt_time_fraction, seasonality_ratio};
use sh_physics::erosivity::annual_erosivity_value;
use sh_physics::slope::{slope_length_exponent, slope_length_value, REFERENCE_SLOPE_LENGTH};
use sh_physics::LandCoverFractions;

#[test]
fn gamma_never_exceeds_one() {
    let mut g = 0.0;
    while g < 5.0 {
        let gamma = slope_length_exponent(g);
        assert!(gamma <= 1.0, "g={} gamma={}", g, gamma);
        let expected = (80.0 / REFERENCE_SLOPE_LENGTH).powf(gamma);
        assert!((slope_length_value(80.0, g) - expected).abs() < 1e-12);
        g += 0.01;
    }
}

#[test]
fn erosivity_breakpoint_gap_is_documented() {
    let at = annual_erosivity_value(850.0);
    let just_above = annual_erosivity_value(850.0 + 1e-9);
    // 左支 ≈ 2513.69，右支 ≈ 2550.03
    assert!((at - 2513.689).abs() < 1e-2);
    assert!((just_above - 2550.025).abs() < 1e-2);
    assert!((just_above - at) / at < 0.02);
}

#[test]
fn delivery_ratio_bounded_for_extreme_inputs() {
    let extremes = [0.0, 1e-300, 1e-12, 0.5, 1.0, 1e12, 1e300];
    for &h in &[0.0, 1e-4, 0.5, 1.0] {
        for &g in &extremes {
            for &n in &extremes {
                for &l in &extremes {
                    let dr = delivery_ratio_value(h, g, n, l);
                    assert!(
                        (0.0..=1.0).contains(&dr),
                        "h={} g={} n={} l={} dr={}",
                        h, g, n, l, dr
                    );
                }
            }
        }
    }
}

#[test]
fn delivery_ratio_field_zero_roughness() {
    let d = GridDomain::unit(1, 2).shared();
    let h = Field::constant(d.clone(), 0.3);
    let g = Field::constant(d.clone(), 0.05);
    let n = Field::from_vec(d.clone(), vec![0.0, 0.05]).unwrap();
    let l = Field::from_vec(d, vec![100.0, 0.0]).unwrap();
    let dr = delivery_ratio(&h, &g, &n, &l).unwrap();
    assert_eq!(dr.to_vec(), vec![1.0, 1.0]);
}

#[test]
fn cover_fractions_normalized_or_undefined() {
    let d = GridDomain::unit(1, 2).shared();
    let raw = vec![
        ("A".to_string(), Field::from_vec(d.clone(), vec![0.3, 5e-14]).unwrap()),
        ("B".to_string(), Field::from_vec(d, vec![0.3, 5e-14]).unwrap()),
    ];
    let fractions = LandCoverFractions::normalize(raw, 1e-12).unwrap();
    for (_, f) in fractions.classes() {
        assert!((f.get(0, 0).unwrap() - 0.5).abs() < 1e-12);
        assert_eq!(f.get(0, 1), None);
    }
}

#[test]
fn seasonality_ratio_precedence() {
    let d = GridDomain::unit(1, 3).shared();
    let sand = Field::from_vec(d.clone(), vec![0.90, 0.70, 0.50]).unwrap();
    let clay = Field::from_vec(d, vec![0.40, 0.10, 0.20]).unwrap();
    let ratio = seasonality_ratio(&sand, &clay).unwrap();
    assert_eq!(ratio.to_vec(), vec![1.17, 4.50, 1.44]);
}

#[test]
fn melt_fraction_floors_denominator() {
    let d = GridDomain::unit(1, 2).shared();
    let tmin = Field::from_vec(d.clone(), vec![5.0, -10.0]).unwrap();
    let tmax = Field::from_vec(d, vec![5.0, 0.0]).unwrap();
    let melt = melt_time_fraction(&tmin, &tmax, 0.0).unwrap();
    assert_eq!(melt.to_vec(), vec![1.0, 0.0]);
}
