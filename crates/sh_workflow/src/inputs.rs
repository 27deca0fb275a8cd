// crates/sh_workflow/src/inputs.rs

//! 从数据源组装模型输入

use chrono::NaiveDate;
use sh_config::{InputNames, PhysicsConfig};
use sh_field::{BoolField, Field, LddField};
use sh_foundation::error::ShResult;
use sh_io::FieldSource;
use sh_physics::{MonthlyRawInputs, StaticInputs};
use tracing::{debug, info};

/// 研究掩膜：已定义且非零的单元属于研究域
pub fn load_mask<S: FieldSource>(source: &S, name: &str) -> ShResult<BoolField> {
    let mask = source.read_field(name)?.map(f64::abs).gt(0.0);
    info!("研究域单元数: {}", mask.count_true());
    Ok(mask)
}

/// 读取全部静态输入
///
/// 土地覆盖类别取自植被糙率表的类别，每个类别对应一个同名比例图层。
pub fn load_static_inputs<S: FieldSource>(source: &S, names: &InputNames) -> ShResult<StaticInputs> {
    let manning_table = source.read_lookup_table(&names.manning_table)?;
    let p_factor_table = source.read_lookup_table(&names.p_factor_table)?;
    let interception_table = source.read_lookup_table(&names.interception_table)?;
    let manning_n1_table = source.read_range_table(&names.manning_n1_table)?;

    let raw_cover = manning_table
        .classes()
        .map(|class| Ok((class.to_string(), source.read_field(class)?)))
        .collect::<ShResult<Vec<_>>>()?;
    debug!("读取 {} 个土地覆盖图层", raw_cover.len());

    Ok(StaticInputs {
        slope_length: source.read_field(&names.slope_length)?,
        slope_gradient: source.read_field(&names.slope_gradient)?,
        cell_area: source.read_field(&names.cell_area)?,
        selected_slope: source.read_field(&names.selected_slope)?,
        rain_annual: source.read_field(&names.rain_annual)?,
        sand: source.read_field(&names.sand)?,
        silt: source.read_field(&names.silt)?,
        clay: source.read_field(&names.clay)?,
        raw_cover,
        manning_table,
        p_factor_table,
        interception_table,
        manning_n1_table,
    })
}

/// 读取流向图（配置了名称时）
pub fn load_drainage<S: FieldSource>(source: &S, names: &InputNames) -> ShResult<Option<LddField>> {
    names
        .ldd
        .as_deref()
        .map(|name| LddField::from_field(&source.read_field(name)?))
        .transpose()
}

/// 读取第 `step_index` 步的月输入
pub fn load_monthly_inputs<S: FieldSource>(
    source: &S,
    names: &InputNames,
    physics: &PhysicsConfig,
    step_index: usize,
    date: NaiveDate,
) -> ShResult<MonthlyRawInputs> {
    let read = |stem: &str| read_monthly(source, names, stem, step_index, date);

    let ground_cover = if physics.ground_cover_from_ndvi {
        None
    } else {
        Some(read(&names.ground_cover)?)
    };

    Ok(MonthlyRawInputs {
        ndvi: read(&names.ndvi)?,
        qsurface: read(&names.qsurface)?,
        tavg: read(&names.tavg)?,
        tmax: read(&names.tmax)?,
        tmin: read(&names.tmin)?,
        rain_month: read(&names.rain_month)?,
        ground_cover,
    })
}

fn read_monthly<S: FieldSource>(
    source: &S,
    names: &InputNames,
    stem: &str,
    step_index: usize,
    date: NaiveDate,
) -> ShResult<Field> {
    match &names.monthly_dataset {
        Some(dataset) => {
            let timed = source.read_timeseries_field(dataset, stem, date, names.temporal_method)?;
            debug!("{}", timed.diagnostic);
            Ok(timed.field)
        }
        None => source.read_monthly_field(stem, step_index),
    }
}
