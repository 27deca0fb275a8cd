// crates/sh_io/src/memory.rs

//! 内存数据源与写出端

use chrono::NaiveDate;
use sh_config::TemporalMethod;
use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};
use sh_physics::{LookupTable, RangeTable};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::naming::generate_name_t;
use crate::temporal;
use crate::traits::{FieldSource, ResultSink, TimedField};

/// 内存数据源
///
/// 逐月图层按 `generate_name_t(stem, step)` 的名字存放在同一张场表中。
#[derive(Debug, Default, Clone)]
pub struct MemorySource {
    fields: HashMap<String, Field>,
    lookup_tables: HashMap<String, LookupTable>,
    range_tables: HashMap<String, RangeTable>,
    series: HashMap<(String, String), Vec<(NaiveDate, Field)>>,
}

impl MemorySource {
    /// 创建空数据源
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加命名场
    pub fn insert_field(&mut self, name: impl Into<String>, field: Field) -> &mut Self {
        self.fields.insert(name.into(), field);
        self
    }

    /// 添加逐月图层
    pub fn insert_monthly_field(&mut self, stem: &str, step_index: usize, field: Field) -> ShResult<&mut Self> {
        let name = generate_name_t(stem, step_index)?;
        self.fields.insert(name, field);
        Ok(self)
    }

    /// 添加类别表（以表名为键）
    pub fn insert_lookup_table(&mut self, table: LookupTable) -> &mut Self {
        self.lookup_tables.insert(table.name().to_string(), table);
        self
    }

    /// 添加区间表（以表名为键）
    pub fn insert_range_table(&mut self, table: RangeTable) -> &mut Self {
        self.range_tables.insert(table.name().to_string(), table);
        self
    }

    /// 添加时间序列快照
    pub fn insert_snapshot(
        &mut self,
        dataset: &str,
        variable: &str,
        date: NaiveDate,
        field: Field,
    ) -> &mut Self {
        let snapshots = self
            .series
            .entry((dataset.to_string(), variable.to_string()))
            .or_default();
        let at = snapshots.partition_point(|(d, _)| *d < date);
        if snapshots.get(at).map(|(d, _)| *d == date).unwrap_or(false) {
            snapshots[at].1 = field;
        } else {
            snapshots.insert(at, (date, field));
        }
        self
    }
}

impl FieldSource for MemorySource {
    fn read_field(&self, name: &str) -> ShResult<Field> {
        self.fields
            .get(name)
            .cloned()
            .ok_or_else(|| ShError::missing_input(name))
    }

    fn read_monthly_field(&self, stem: &str, step_index: usize) -> ShResult<Field> {
        self.read_field(&generate_name_t(stem, step_index)?)
    }

    fn read_lookup_table(&self, name: &str) -> ShResult<LookupTable> {
        self.lookup_tables
            .get(name)
            .cloned()
            .ok_or_else(|| ShError::missing_input(name))
    }

    fn read_range_table(&self, name: &str) -> ShResult<RangeTable> {
        self.range_tables
            .get(name)
            .cloned()
            .ok_or_else(|| ShError::missing_input(name))
    }

    fn read_timeseries_field(
        &self,
        dataset: &str,
        variable: &str,
        date: NaiveDate,
        method: TemporalMethod,
    ) -> ShResult<TimedField> {
        let snapshots = self
            .series
            .get(&(dataset.to_string(), variable.to_string()))
            .ok_or_else(|| ShError::missing_input(format!("{}/{}", dataset, variable)))?;
        temporal::resolve(dataset, variable, snapshots, date, method)
    }
}

/// 写出端收到的一条记录
#[derive(Debug, Clone)]
pub enum SinkRecord {
    /// 静态场
    Static {
        /// 输出名
        name: String,
        /// 场
        field: Field,
    },
    /// 月输出
    Monthly {
        /// 输出名
        name: String,
        /// 场
        field: Field,
        /// 步号
        step_index: usize,
        /// 日期
        date: NaiveDate,
    },
    /// 时间序列步
    Timeseries {
        /// 目标路径
        path: PathBuf,
        /// 变量名
        variable: String,
        /// 单位
        units: String,
        /// 行优先数值（缺测已替换）
        data: Vec<f64>,
        /// 步号
        step_index: usize,
        /// 日期
        date: NaiveDate,
    },
}

/// 内存写出端，按调用顺序保存全部记录
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<SinkRecord>,
}

impl MemorySink {
    /// 创建空写出端
    pub fn new() -> Self {
        Self::default()
    }

    /// 全部记录
    pub fn records(&self) -> &[SinkRecord] {
        &self.records
    }

    /// 记录条数
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 查找静态输出
    pub fn static_field(&self, name: &str) -> Option<&Field> {
        self.records.iter().find_map(|r| match r {
            SinkRecord::Static { name: n, field } if n == name => Some(field),
            _ => None,
        })
    }

    /// 查找某步的月输出
    pub fn monthly_field(&self, name: &str, step_index: usize) -> Option<&Field> {
        self.records.iter().find_map(|r| match r {
            SinkRecord::Monthly {
                name: n,
                field,
                step_index: s,
                ..
            } if n == name && *s == step_index => Some(field),
            _ => None,
        })
    }

    /// 某步写出的月输出条数
    pub fn monthly_count(&self, step_index: usize) -> usize {
        self.records
            .iter()
            .filter(|r| matches!(r, SinkRecord::Monthly { step_index: s, .. } if *s == step_index))
            .count()
    }

    /// 某变量的时间序列步
    pub fn timeseries(&self, variable: &str) -> Vec<(usize, &[f64])> {
        self.records
            .iter()
            .filter_map(|r| match r {
                SinkRecord::Timeseries {
                    variable: v,
                    data,
                    step_index,
                    ..
                } if v == variable => Some((*step_index, data.as_slice())),
                _ => None,
            })
            .collect()
    }
}

impl ResultSink for MemorySink {
    fn report_static(&mut self, name: &str, field: &Field) -> ShResult<()> {
        debug!("记录静态场 {}", name);
        self.records.push(SinkRecord::Static {
            name: name.to_string(),
            field: field.clone(),
        });
        Ok(())
    }

    fn report_monthly(
        &mut self,
        name: &str,
        field: &Field,
        step_index: usize,
        date: NaiveDate,
    ) -> ShResult<()> {
        debug!("记录月输出 {} 第 {} 步", name, step_index);
        self.records.push(SinkRecord::Monthly {
            name: name.to_string(),
            field: field.clone(),
            step_index,
            date,
        });
        Ok(())
    }

    fn write_timeseries_variable(
        &mut self,
        path: &Path,
        variable: &str,
        units: &str,
        field: &Field,
        step_index: usize,
        date: NaiveDate,
        missing_value: f64,
    ) -> ShResult<()> {
        self.records.push(SinkRecord::Timeseries {
            path: path.to_path_buf(),
            variable: variable.to_string(),
            units: units.to_string(),
            data: field.to_vec_with_missing(missing_value),
            step_index,
            date,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    #[test]
    fn test_memory_source() {
        let d = GridDomain::unit(1, 1).shared();
        let mut source = MemorySource::new();
        source.insert_field("Pan_90", Field::constant(d.clone(), 900.0));
        source
            .insert_monthly_field("ndvi", 2, Field::constant(d.clone(), 0.3))
            .unwrap();
        source.insert_lookup_table(LookupTable::new("P_factor.txt", vec![("forest".into(), 1.0)]));

        assert_eq!(source.read_field("Pan_90").unwrap().get(0, 0), Some(900.0));
        assert_eq!(source.read_monthly_field("ndvi", 2).unwrap().get(0, 0), Some(0.3));
        assert!(matches!(
            source.read_monthly_field("ndvi", 3),
            Err(ShError::MissingInput { .. })
        ));
        assert_eq!(source.read_lookup_table("P_factor.txt").unwrap().get("forest"), Some(1.0));
        assert!(source.read_range_table("ManningN1.txt").is_err());
    }

    #[test]
    fn test_snapshots_kept_sorted() {
        let d = GridDomain::unit(1, 1).shared();
        let jan = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let feb = NaiveDate::from_ymd_opt(1990, 2, 1).unwrap();
        let mut source = MemorySource::new();
        source.insert_snapshot("era", "tavg", feb, Field::constant(d.clone(), 2.0));
        source.insert_snapshot("era", "tavg", jan, Field::constant(d, 1.0));

        let timed = source
            .read_timeseries_field("era", "tavg", jan, TemporalMethod::Next)
            .unwrap();
        assert_eq!(timed.resolved_date, jan);
        assert_eq!(timed.field.get(0, 0), Some(1.0));
    }

    #[test]
    fn test_memory_sink() {
        let d = GridDomain::unit(1, 1).shared();
        let f = Field::from_vec(d, vec![f64::NAN]).unwrap();
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let mut sink = MemorySink::new();
        sink.report_static("LS", &f).unwrap();
        sink.report_monthly("SoilLoss", &f, 1, date).unwrap();
        sink.write_timeseries_variable(Path::new("out/SoilLoss.jsonl"), "SoilLoss", "t", &f, 1, date, -1.0)
            .unwrap();

        assert_eq!(sink.len(), 3);
        assert!(sink.static_field("LS").is_some());
        assert!(sink.monthly_field("SoilLoss", 1).is_some());
        assert_eq!(sink.monthly_count(1), 1);
        assert_eq!(sink.timeseries("SoilLoss"), vec![(1, &[-1.0][..])]);
    }
}
