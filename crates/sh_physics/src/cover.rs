// crates/sh_physics/src/cover.rs

//! 植被覆盖与管理因子 C，及其相关预处理
//!
//! C 因子采用 Yang (2014) 的月尺度关系：
//! `C = exp(-0.799 - 7.74 gc + 0.0449 gc²) × R_month / R_year`，gc 为地面覆盖度。

use sh_field::{Field, ZoneField};
use sh_foundation::error::ShResult;

/// 单点覆盖项 `exp(-0.799 - 7.74 gc + 0.0449 gc²)`
#[inline]
pub fn cover_term_value(ground_cover: f64) -> f64 {
    (-0.799 - 7.74 * ground_cover + 0.0449 * ground_cover * ground_cover).exp()
}

/// 月植被覆盖因子
///
/// 覆盖项与侵蚀力指数之积；两处未定义值均以 `missing_value` 填充。
pub fn vegetation_cover_factor(
    ground_cover: &Field,
    r_month: &Field,
    r_year: &Field,
    missing_value: f64,
) -> ShResult<Field> {
    let term = ground_cover.map(cover_term_value).cover(missing_value);
    let erosivity_index = r_month.divide(r_year)?;
    Ok(term.times(&erosivity_index)?.cover(missing_value))
}

/// 由 NDVI 线性推算地面覆盖度 (Timmermans, 2007)
///
/// 以全域极值拉伸到 [0, 1]；全域常值时覆盖度为 0。
pub fn ground_cover_from_ndvi(ndvi: &Field) -> Field {
    match (ndvi.map_minimum(), ndvi.map_maximum()) {
        (Some(lo), Some(hi)) if hi > lo => ndvi.map(|v| (v - lo) / (hi - lo)),
        (Some(_), Some(_)) => ndvi.map(|_| 0.0),
        _ => ndvi.clone(),
    }
}

/// 耕地代表坡度
///
/// 在每个粗分区内对细网格坡度排序，保留百分位不超过 `min(1, 耕地比例) × 100`
/// 的坡度，取分区最大值。即假设耕地占据分区内最平缓的部分。
pub fn select_cropland_slope(
    slope: &Field,
    zones: &ZoneField,
    crop_fraction: &Field,
) -> ShResult<Field> {
    let order = slope.area_order(zones)?;
    let percentile = order
        .divide(&order.area_maximum(zones)?)?
        .scale(100.0);
    let threshold = crop_fraction.min_scalar(1.0).scale(100.0);
    let selected = percentile.zip_with(&threshold, |p, t| if p <= t { 1.0 } else { 0.0 })?;
    let kept = selected.gt(0.5).if_then(slope)?;
    kept.area_maximum(zones)
}
