// crates/sh_io/src/timeseries.rs

//! `.jsonl` 时间序列产品
//!
//! 第一行为表头（变量名、单位、缺测值、行列数），之后每个时间步一行，
//! 按行优先顺序保存整个研究域的数值。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::Path;

/// 时间序列表头
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesHeader {
    /// 变量名
    pub variable: String,
    /// 单位
    pub units: String,
    /// 缺测值
    pub missing_value: f64,
    /// 行数
    pub rows: usize,
    /// 列数
    pub cols: usize,
}

/// 单个时间步记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesRecord {
    /// 步号（从 1 开始）
    pub step: usize,
    /// 日期
    pub date: NaiveDate,
    /// 行优先数值
    pub data: Vec<f64>,
}

impl TimeseriesRecord {
    /// 由场构造，未定义单元写为 `missing_value`
    pub fn from_field(field: &Field, step: usize, date: NaiveDate, missing_value: f64) -> Self {
        Self {
            step,
            date,
            data: field.to_vec_with_missing(missing_value),
        }
    }
}

/// 追加一个时间步；第 1 步或文件不存在时重新创建并写表头
#[allow(clippy::too_many_arguments)]
pub fn append_timeseries(
    path: &Path,
    variable: &str,
    units: &str,
    field: &Field,
    step_index: usize,
    date: NaiveDate,
    missing_value: f64,
) -> ShResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let fresh = step_index <= 1 || !path.exists();
    let mut file = OpenOptions::new()
        .create(true)
        .write(true)
        .append(!fresh)
        .truncate(fresh)
        .open(path)
        .map_err(|e| ShError::io_with_source(format!("打开时间序列失败: {}", path.display()), e))?;

    if fresh {
        let (rows, cols) = field.domain().shape();
        let header = TimeseriesHeader {
            variable: variable.to_string(),
            units: units.to_string(),
            missing_value,
            rows,
            cols,
        };
        write_line(&mut file, &header, path)?;
    }
    let record = TimeseriesRecord::from_field(field, step_index, date, missing_value);
    write_line(&mut file, &record, path)
}

fn write_line<T: Serialize>(file: &mut fs::File, value: &T, path: &Path) -> ShResult<()> {
    let line = serde_json::to_string(value)
        .map_err(|e| ShError::internal(format!("序列化时间序列失败: {}", e)))?;
    writeln!(file, "{}", line)
        .map_err(|e| ShError::io_with_source(format!("写出时间序列失败: {}", path.display()), e))
}

/// 读取时间序列产品
pub fn read_timeseries(path: &Path) -> ShResult<(TimeseriesHeader, Vec<TimeseriesRecord>)> {
    if !path.exists() {
        return Err(ShError::file_not_found(path));
    }
    let content = fs::read_to_string(path)?;
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, l)| !l.trim().is_empty());

    let (_, first) = lines
        .next()
        .ok_or_else(|| ShError::parse(path, 1, "缺少表头"))?;
    let header: TimeseriesHeader =
        serde_json::from_str(first).map_err(|e| ShError::parse(path, 1, e.to_string()))?;

    let mut records = Vec::new();
    for (line_num, line) in lines {
        let record: TimeseriesRecord = serde_json::from_str(line)
            .map_err(|e| ShError::parse(path, line_num + 1, e.to_string()))?;
        ShError::check_size("时间序列记录", header.rows * header.cols, record.data.len())?;
        records.push(record);
    }
    Ok((header, records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_append_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SedTransport.jsonl");
        let d = GridDomain::unit(1, 2).shared();
        let jan = Field::from_vec(d.clone(), vec![1.5, f64::NAN]).unwrap();
        let feb = Field::constant(d, 2.0);

        append_timeseries(&path, "SedTransport", "tonnes per month", &jan, 1, ymd(1990, 1, 1), -999.9).unwrap();
        append_timeseries(&path, "SedTransport", "tonnes per month", &feb, 2, ymd(1990, 2, 1), -999.9).unwrap();

        let (header, records) = read_timeseries(&path).unwrap();
        assert_eq!(header.units, "tonnes per month");
        assert_eq!((header.rows, header.cols), (1, 2));
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].data, vec![1.5, -999.9]);
        assert_eq!(records[1].date, ymd(1990, 2, 1));
    }

    #[test]
    fn test_first_step_truncates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("SoilLoss.jsonl");
        let d = GridDomain::unit(1, 1).shared();
        let f = Field::constant(d, 3.0);

        for _ in 0..2 {
            append_timeseries(&path, "SoilLoss", "t", &f, 1, ymd(1990, 1, 1), -1.0).unwrap();
        }
        let (_, records) = read_timeseries(&path).unwrap();
        assert_eq!(records.len(), 1);
    }
}
