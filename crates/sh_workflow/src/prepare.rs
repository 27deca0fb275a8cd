// crates/sh_workflow/src/prepare.rs

//! 输入预处理
//!
//! 在模拟之前由原始图层派生两个静态输入：
//!
//! - 年降水（默认 `Pan_90`）：前 `months` 个逐月降水图层逐单元累加
//! - 耕地代表坡度（默认 `sel_slope`）：在粗分区内按耕地比例选取最平缓的细网格坡度
//!
//! 结果经 [`ResultSink::report_static`] 写出，之后可作为模拟的静态图层读取。

use sh_field::{Field, ZoneField};
use sh_foundation::error::{ShError, ShResult};
use sh_io::{FieldSource, ResultSink};
use sh_physics::cover::select_cropland_slope;
use sh_physics::erosivity::annual_rainfall;
use tracing::info;

/// 累加逐月降水得到年降水
pub fn derive_annual_rainfall<S: FieldSource>(
    source: &S,
    stem: &str,
    months: usize,
    missing_value: f64,
) -> ShResult<Field> {
    if months == 0 {
        return Err(ShError::invalid_input("年降水累加至少需要一个月"));
    }
    let monthly = (1..=months)
        .map(|step| source.read_monthly_field(stem, step))
        .collect::<ShResult<Vec<_>>>()?;
    info!("累加 {} 个月的降水图层 '{}'", monthly.len(), stem);
    annual_rainfall(&monthly, missing_value)
}

/// 由细网格坡度、粗分区编号与耕地比例选取耕地代表坡度
pub fn derive_cropland_slope<S: FieldSource>(
    source: &S,
    slope: &str,
    zones: &str,
    crop_fraction: &str,
) -> ShResult<Field> {
    let slope = source.read_field(slope)?;
    let zones = ZoneField::from_field(&source.read_field(zones)?)?;
    let crop_fraction = source.read_field(crop_fraction)?;
    info!("在 {} 个分区内选取耕地代表坡度", zones.zone_count());
    select_cropland_slope(&slope, &zones, &crop_fraction)
}

/// 派生并写出一个静态图层
pub fn write_prepared<W: ResultSink>(sink: &mut W, name: &str, field: &Field) -> ShResult<()> {
    sink.report_static(name, field)?;
    info!("已写出预处理图层 '{}' ({} 个有效单元)", name, field.defined_count());
    Ok(())
}
