//! 单月土壤流失量回归测试
//!
//! rain_month = 100, rain_annual = 1500, 地面覆盖度 0.4, P = 1：
//! 土壤流失量必须等于各因子的直接乘积。

use sh_config::PhysicsConfig;
use sh_field::{Field, GridDomain, SharedDomain};
use sh_physics::monthly::{MonthlyInputs, MonthlyRawInputs, MonthlyState};
use sh_physics::statics::{StaticFactors, StaticInputs};
use sh_physics::tables::{LookupTable, RangeKey, RangeTable};

const CELL_AREA: f64 = 8.5e7;

fn statics(domain: &SharedDomain, physics: &PhysicsConfig) -> StaticFactors {
    let c = |v: f64| Field::constant(domain.clone(), v);
    let inputs = StaticInputs {
        slope_length: c(120.0),
        slope_gradient: c(0.08),
        cell_area: c(CELL_AREA),
        selected_slope: c(0.03),
        rain_annual: c(1500.0),
        sand: c(40.0),
        silt: c(35.0),
        clay: c(25.0),
        raw_cover: vec![("forest".to_string(), c(1.0))],
        manning_table: LookupTable::new("Landcover_n4.txt", vec![("forest".into(), 0.4)]),
        p_factor_table: LookupTable::new("P_factor.txt", vec![("forest".into(), 1.0)]),
        interception_table: LookupTable::new("part_interception.txt", vec![("forest".into(), 0.2)]),
        manning_n1_table: RangeTable::new(
            "ManningN1.txt",
            vec![(RangeKey::parse("[0,>").unwrap(), 0.03)],
        ),
    };
    StaticFactors::compute(inputs, physics).unwrap()
}

fn month(domain: &SharedDomain) -> MonthlyRawInputs {
    let c = |v: f64| Field::constant(domain.clone(), v);
    MonthlyRawInputs {
        ndvi: c(0.6),
        qsurface: c(0.03),
        tavg: c(12.0),
        tmax: c(180.0),
        tmin: c(60.0),
        rain_month: c(100.0),
        ground_cover: Some(c(0.4)),
    }
}

#[test]
fn soil_loss_matches_literal_product() {
    let domain = GridDomain::unit(1, 1).shared();
    let physics = PhysicsConfig::default();
    let statics = statics(&domain, &physics);
    let inputs = MonthlyInputs::prepare(month(&domain), &physics).unwrap();
    let state = MonthlyState::compute(&inputs, &statics, &physics).unwrap();

    let r_year = statics.r_year.get(0, 0).unwrap();
    let k_year = statics.k_year.get(0, 0).unwrap();
    let ls = statics.ls.get(0, 0).unwrap();

    // P' = (1 - 0.2) × 1500 = 1200 > 850
    let expected_r_year = 587.8 - 1.219 * 1200.0 + 0.00415 * 1200.0 * 1200.0;
    assert!((r_year - expected_r_year).abs() < 1e-9);

    let r_month = 100.0 / 1500.0 * r_year;
    // tmax = 12 + 6 = 18, tmin = 6 ⇒ 融化比例 = min(1, 18/12) = 1
    let k_month = 1.44 * k_year;
    let c_month = (-0.799 - 7.74 * 0.4 + 0.0449 * 0.4 * 0.4f64).exp() * (r_month / r_year);
    let expected = r_month * k_month * ls * c_month * 1.0 * CELL_AREA / 10_000.0;

    let soil_loss = state.soil_loss.get(0, 0).unwrap();
    assert!(
        ((soil_loss - expected) / expected).abs() < 1e-12,
        "soil_loss={} expected={}",
        soil_loss,
        expected
    );

    let ratio = state.delivery_ratio.get(0, 0).unwrap();
    assert!((0.0..=1.0).contains(&ratio));
    let yield_ = state.sediment_yield.get(0, 0).unwrap();
    assert!((yield_ - soil_loss * ratio).abs() < 1e-9 * soil_loss.max(1.0));
}

#[test]
fn monthly_state_is_memoryless() {
    let domain = GridDomain::unit(1, 1).shared();
    let physics = PhysicsConfig::default();
    let statics = statics(&domain, &physics);
    let inputs = MonthlyInputs::prepare(month(&domain), &physics).unwrap();

    let first = MonthlyState::compute(&inputs, &statics, &physics).unwrap();
    let second = MonthlyState::compute(&inputs, &statics, &physics).unwrap();
    for ((name, a), (_, b)) in first.registry().into_iter().zip(second.registry()) {
        assert_eq!(a.to_vec(), b.to_vec(), "{} differs", name);
    }
}
