// crates/sh_io/src/traits.rs

//! 协作接口
//!
//! 读取端返回的场都绑定在本次运行的研究域上；写出端只接收已通过完整性检查的场。

use chrono::NaiveDate;
use sh_config::TemporalMethod;
use sh_field::Field;
use sh_foundation::error::ShResult;
use sh_physics::{LookupTable, RangeTable};
use std::path::Path;

/// 从时间序列数据集中取出的场
#[derive(Debug, Clone)]
pub struct TimedField {
    /// 取值结果
    pub field: Field,
    /// 实际使用的日期（插值时为目标日期）
    pub resolved_date: NaiveDate,
    /// 取值说明
    pub diagnostic: String,
}

/// 输入数据源
pub trait FieldSource {
    /// 读取命名栅格
    fn read_field(&self, name: &str) -> ShResult<Field>;

    /// 读取逐月图层（词干 + 步号，步号从 1 开始）
    fn read_monthly_field(&self, stem: &str, step_index: usize) -> ShResult<Field>;

    /// 读取类别 → 数值参数表
    fn read_lookup_table(&self, name: &str) -> ShResult<LookupTable>;

    /// 读取区间参数表
    fn read_range_table(&self, name: &str) -> ShResult<RangeTable>;

    /// 从时间序列数据集按日期取场
    fn read_timeseries_field(
        &self,
        dataset: &str,
        variable: &str,
        date: NaiveDate,
        method: TemporalMethod,
    ) -> ShResult<TimedField>;
}

/// 结果写出端
pub trait ResultSink {
    /// 写出静态场
    fn report_static(&mut self, name: &str, field: &Field) -> ShResult<()>;

    /// 写出月输出场
    fn report_monthly(
        &mut self,
        name: &str,
        field: &Field,
        step_index: usize,
        date: NaiveDate,
    ) -> ShResult<()>;

    /// 向时间序列产品追加一个时间步
    ///
    /// 第 1 步创建（或覆盖）产品，之后逐步追加；未定义单元写为 `missing_value`。
    #[allow(clippy::too_many_arguments)]
    fn write_timeseries_variable(
        &mut self,
        path: &Path,
        variable: &str,
        units: &str,
        field: &Field,
        step_index: usize,
        date: NaiveDate,
        missing_value: f64,
    ) -> ShResult<()>;
}
