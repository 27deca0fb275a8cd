// crates/sh_io/src/directory.rs

//! 目录数据源与写出端
//!
//! 目录布局：
//!
//! ```text
//! maps/
//!   slope05min_avgFrom30sec.asc      命名栅格
//!   ndvi0000.001.asc                 逐月图层
//!   era/tavg_19900115.asc            时间序列数据集
//! tables/
//!   Landcover_n4.txt
//! output/
//!   LS.asc  SoilLoss.001.asc  SedTransport.jsonl
//! ```

use chrono::NaiveDate;
use sh_config::TemporalMethod;
use sh_field::{Field, SharedDomain};
use sh_foundation::error::{ShError, ShResult};
use sh_physics::{LookupTable, RangeTable};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

use crate::ascii_grid::{read_ascii_grid, write_ascii_grid};
use crate::naming::generate_name_t;
use crate::table::{load_lookup_table, load_range_table};
use crate::temporal;
use crate::timeseries::append_timeseries;
use crate::traits::{FieldSource, ResultSink, TimedField};

const GRID_EXTENSION: &str = "asc";

/// 目录数据源
///
/// 读到的第一个栅格确定研究域，之后的栅格必须与之几何一致。
#[derive(Debug)]
pub struct DirectorySource {
    map_dir: PathBuf,
    table_dir: PathBuf,
    domain: OnceLock<SharedDomain>,
}

impl DirectorySource {
    /// 创建数据源
    pub fn new(map_dir: impl Into<PathBuf>, table_dir: impl Into<PathBuf>) -> Self {
        Self {
            map_dir: map_dir.into(),
            table_dir: table_dir.into(),
            domain: OnceLock::new(),
        }
    }

    /// 预先绑定研究域
    pub fn with_domain(self, domain: SharedDomain) -> Self {
        let _ = self.domain.set(domain);
        self
    }

    /// 已绑定的研究域
    pub fn domain(&self) -> Option<&SharedDomain> {
        self.domain.get()
    }

    fn load_grid(&self, path: &Path) -> ShResult<Field> {
        let grid = read_ascii_grid(path)?;
        let domain = self
            .domain
            .get_or_init(|| grid.domain.clone().shared())
            .clone();
        debug!("读取栅格 {}", path.display());
        grid.into_field(&domain)
    }

    fn grid_path(dir: &Path, name: &str) -> PathBuf {
        dir.join(format!("{}.{}", name, GRID_EXTENSION))
    }

    /// 数据集中某变量的全部快照日期（升序）
    pub fn snapshot_dates(&self, dataset: &str, variable: &str) -> ShResult<Vec<(NaiveDate, PathBuf)>> {
        let dir = self.map_dir.join(dataset);
        if !dir.is_dir() {
            return Err(ShError::file_not_found(dir));
        }
        let prefix = format!("{}_", variable);
        let mut found = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(GRID_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let Some(stamp) = stem.strip_prefix(&prefix) else {
                continue;
            };
            if let Ok(date) = NaiveDate::parse_from_str(stamp, "%Y%m%d") {
                found.push((date, path));
            }
        }
        found.sort_by_key(|(d, _)| *d);
        Ok(found)
    }
}

impl FieldSource for DirectorySource {
    fn read_field(&self, name: &str) -> ShResult<Field> {
        let path = Self::grid_path(&self.map_dir, name);
        if !path.exists() {
            return Err(ShError::missing_input(name));
        }
        self.load_grid(&path)
    }

    fn read_monthly_field(&self, stem: &str, step_index: usize) -> ShResult<Field> {
        self.read_field(&generate_name_t(stem, step_index)?)
    }

    fn read_lookup_table(&self, name: &str) -> ShResult<LookupTable> {
        let path = self.table_dir.join(name);
        if !path.exists() {
            return Err(ShError::missing_input(name));
        }
        load_lookup_table(path)
    }

    fn read_range_table(&self, name: &str) -> ShResult<RangeTable> {
        let path = self.table_dir.join(name);
        if !path.exists() {
            return Err(ShError::missing_input(name));
        }
        load_range_table(path)
    }

    fn read_timeseries_field(
        &self,
        dataset: &str,
        variable: &str,
        date: NaiveDate,
        method: TemporalMethod,
    ) -> ShResult<TimedField> {
        let available = self.snapshot_dates(dataset, variable)?;
        let dates: Vec<NaiveDate> = available.iter().map(|(d, _)| *d).collect();
        let selection = temporal::select(&dates, date, method).ok_or_else(|| {
            ShError::missing_input(format!("{}/{} ({})", dataset, variable, date))
        })?;

        // 只读取被选中的快照；在该子集上重新选取结果不变
        let picked: Vec<usize> = match selection {
            temporal::Selection::Single(i) => vec![i],
            temporal::Selection::Blend { before, after, .. } => vec![before, after],
        };
        let mut snapshots = Vec::with_capacity(picked.len());
        for i in picked {
            let (d, path) = &available[i];
            snapshots.push((*d, self.load_grid(path)?));
        }
        temporal::resolve(dataset, variable, &snapshots, date, method)
    }
}

/// 目录写出端
#[derive(Debug, Clone)]
pub struct DirectorySink {
    output_dir: PathBuf,
    nodata: f64,
}

impl DirectorySink {
    /// 创建写出端，未定义单元写为 `nodata`
    pub fn new(output_dir: impl Into<PathBuf>, nodata: f64) -> Self {
        Self {
            output_dir: output_dir.into(),
            nodata,
        }
    }

    /// 输出目录
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl ResultSink for DirectorySink {
    fn report_static(&mut self, name: &str, field: &Field) -> ShResult<()> {
        let path = self.output_dir.join(format!("{}.{}", name, GRID_EXTENSION));
        debug!("写出 {}", path.display());
        write_ascii_grid(path, field, self.nodata)
    }

    fn report_monthly(
        &mut self,
        name: &str,
        field: &Field,
        step_index: usize,
        _date: NaiveDate,
    ) -> ShResult<()> {
        let file = generate_name_t(name, step_index)?;
        let path = self.output_dir.join(format!("{}.{}", file, GRID_EXTENSION));
        debug!("写出 {}", path.display());
        write_ascii_grid(path, field, self.nodata)
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
        append_timeseries(path, variable, units, field, step_index, date, missing_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    const GRID_1X2: &str = "ncols 2\nnrows 1\nxllcorner 0\nyllcorner 0\ncellsize 1\nNODATA_value -9999\n";

    fn write(dir: &Path, name: &str, values: &str) {
        fs::create_dir_all(dir).unwrap();
        fs::write(dir.join(name), format!("{}{}\n", GRID_1X2, values)).unwrap();
    }

    #[test]
    fn test_read_fields_and_tables() {
        let root = tempfile::tempdir().unwrap();
        let maps = root.path().join("maps");
        let tables = root.path().join("tables");
        write(&maps, "Pan_90.asc", "800 -9999");
        write(&maps, "ndvi0000.001.asc", "0.2 0.4");
        fs::create_dir_all(&tables).unwrap();
        fs::write(tables.join("P_factor.txt"), "forest\t1.0\n").unwrap();
        fs::write(tables.join("ManningN1.txt"), "[0,5>\t0.03\n[5,>\t0.05\n").unwrap();

        let source = DirectorySource::new(&maps, &tables);
        let rain = source.read_field("Pan_90").unwrap();
        assert_eq!(rain.get(0, 1), None);
        let ndvi = source.read_monthly_field("ndvi", 1).unwrap();
        assert!(std::sync::Arc::ptr_eq(rain.domain(), ndvi.domain()));

        assert_eq!(source.read_lookup_table("P_factor.txt").unwrap().get("forest"), Some(1.0));
        assert_eq!(source.read_range_table("ManningN1.txt").unwrap().lookup(7.0), Some(0.05));
        assert!(matches!(
            source.read_field("cfr00000.001"),
            Err(ShError::MissingInput { .. })
        ));
    }

    #[test]
    fn test_domain_mismatch_on_read() {
        let root = tempfile::tempdir().unwrap();
        write(root.path(), "a.asc", "1 2");
        let source = DirectorySource::new(root.path(), root.path())
            .with_domain(GridDomain::unit(3, 3).shared());
        assert!(matches!(
            source.read_field("a"),
            Err(ShError::DomainMismatch { .. })
        ));
    }

    #[test]
    fn test_timeseries_dataset() {
        let root = tempfile::tempdir().unwrap();
        let era = root.path().join("era");
        write(&era, "tavg_19900101.asc", "0 10");
        write(&era, "tavg_19900111.asc", "10 20");
        write(&era, "tmax_19900101.asc", "99 99");

        let source = DirectorySource::new(root.path(), root.path());
        let target = NaiveDate::from_ymd_opt(1990, 1, 6).unwrap();
        let timed = source
            .read_timeseries_field("era", "tavg", target, TemporalMethod::Linear)
            .unwrap();
        assert!((timed.field.get(0, 0).unwrap() - 5.0).abs() < 1e-12);
        assert!((timed.field.get(0, 1).unwrap() - 15.0).abs() < 1e-12);

        let prev = source
            .read_timeseries_field("era", "tavg", target, TemporalMethod::Previous)
            .unwrap();
        assert_eq!(prev.resolved_date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert!(source
            .read_timeseries_field("missing", "tavg", target, TemporalMethod::Nearest)
            .is_err());
    }

    #[test]
    fn test_directory_sink() {
        let root = tempfile::tempdir().unwrap();
        let d = GridDomain::unit(1, 2).shared();
        let f = Field::from_vec(d, vec![1.0, f64::NAN]).unwrap();
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        let mut sink = DirectorySink::new(root.path(), -999.9);

        sink.report_static("LS", &f).unwrap();
        sink.report_monthly("SoilLoss", &f, 3, date).unwrap();
        let series = root.path().join("SoilLoss.jsonl");
        sink.write_timeseries_variable(&series, "SoilLoss", "t", &f, 1, date, -999.9)
            .unwrap();

        assert!(root.path().join("LS.asc").exists());
        assert!(root.path().join("SoilLoss.003.asc").exists());
        let back = read_ascii_grid(root.path().join("SoilLoss.003.asc")).unwrap();
        assert!(back.values[1].is_nan());
        assert!(series.exists());
    }
}
