// crates/sh_physics/src/erodibility.rs

//! 土壤可蚀性因子 K
//!
//! 年均 K 采用 Torri 等的修正 USLE 公式，平均粒径对数 Dg 由 Yang 等 (2003)
//! 的质地估计替代：
//!
//! ```text
//! Dg  = -3.5 sand - 2.0 silt - 0.5 clay
//! omc = organic / max(clay, 0.001)   (clay > 0.001, 否则 0)
//! K   = 0.0293 (0.65 - Dg + 0.24 Dg²) exp(-0.0021 omc - 0.00037 omc² - 4.02 clay + 1.72 clay²)
//! ```
//!
//! 月 K 按 Van Dijk (2001) 在年均值与季节极值之间依融化时间比例插值。

use sh_field::Field;
use sh_foundation::error::ShResult;

const MIN_CLAY: f64 = 0.001;
const MIN_TEMPERATURE_RANGE: f64 = 0.1;

/// 默认季节比
pub const SEASONALITY_MEDIUM: f64 = 1.44;
/// 黏质土季节比
pub const SEASONALITY_FINE: f64 = 1.17;
/// 砂质土季节比
pub const SEASONALITY_COARSE: f64 = 4.50;

/// 单点年均可蚀性
pub fn annual_erodibility_value(sand: f64, silt: f64, clay: f64, organic: f64) -> f64 {
    let dg = -3.5 * sand - 2.0 * silt - 0.5 * clay;
    let omc = if clay > MIN_CLAY {
        organic / clay.max(MIN_CLAY)
    } else {
        0.0
    };
    let correction = -0.0021 * omc - 0.00037 * omc * omc - 4.02 * clay + 1.72 * clay * clay;
    0.0293 * (0.65 - dg + 0.24 * dg * dg) * correction.exp()
}

/// 单点可蚀性季节比
///
/// 规则按顺序求值，后匹配的规则覆盖先前结果：
/// 1. clay > 0.35 ⇒ 1.17
/// 2. clay < 0.18 且 sand > 0.65 ⇒ 4.50
/// 3. clay ≤ 0.35 且 sand ≤ 0.65 ⇒ 1.44
pub fn seasonality_ratio_value(sand: f64, clay: f64) -> f64 {
    let mut ratio = SEASONALITY_MEDIUM;
    if clay > 0.35 {
        ratio = SEASONALITY_FINE;
    }
    if clay < 0.18 && sand > 0.65 {
        ratio = SEASONALITY_COARSE;
    }
    if clay <= 0.35 && sand <= 0.65 {
        ratio = SEASONALITY_MEDIUM;
    }
    ratio
}

/// 单点融化时间比例
#[inline]
pub fn melt_time_fraction_value(tmin: f64, tmax: f64, tmelt: f64) -> f64 {
    ((tmax - tmelt).max(0.0) / (tmax - tmin).max(MIN_TEMPERATURE_RANGE)).min(1.0)
}

/// 年均可蚀性场（有机质含量为常数）
pub fn annual_erodibility(sand: &Field, silt: &Field, clay: &Field, organic: f64) -> ShResult<Field> {
    sand.zip3_with(silt, clay, |sa, si, cl| {
        annual_erodibility_value(sa, si, cl, organic)
    })
}

/// 可蚀性季节比场
pub fn seasonality_ratio(sand: &Field, clay: &Field) -> ShResult<Field> {
    sand.zip_with(clay, seasonality_ratio_value)
}

/// 融化时间比例场
pub fn melt_time_fraction(tmin: &Field, tmax: &Field, tmelt: f64) -> ShResult<Field> {
    tmin.zip_with(tmax, |lo, hi| melt_time_fraction_value(lo, hi, tmelt))
}

/// 月可蚀性 `(melt × (seasonal - 1) + 1) × K_year`
pub fn monthly_erodibility(k_year: &Field, seasonality: &Field, melt: &Field) -> ShResult<Field> {
    k_year.zip3_with(seasonality, melt, |k, s, m| (m * (s - 1.0) + 1.0) * k)
}
