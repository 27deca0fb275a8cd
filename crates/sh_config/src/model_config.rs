// crates/sh_config/src/model_config.rs

//! ModelConfig - 模型运行配置
//!
//! 从 JSON 加载，全部字段带默认值。默认值对应 0.5° 流域月尺度产沙模型的常规设置：
//! 1990 年 1 月起算 12 个月，缺测值 -999.9，土壤质地以百分比给出，
//! 温度以 0.1 °C 给出，地表径流以 m/月 给出。

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 模型配置
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ModelConfig {
    /// 路径配置
    #[serde(default)]
    pub paths: PathsConfig,

    /// 模拟时段
    #[serde(default)]
    pub simulation: SimulationConfig,

    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 输入图层与参数表名称
    #[serde(default)]
    pub inputs: InputNames,

    /// 输出配置
    #[serde(default)]
    pub report: ReportConfig,
}

/// 路径配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// 输入栅格目录
    #[serde(default = "default_map_dir")]
    pub map_dir: PathBuf,

    /// 参数表目录
    #[serde(default = "default_table_dir")]
    pub table_dir: PathBuf,

    /// 输出目录
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// 研究掩膜图层名（非零且已定义的单元属于研究域）
    #[serde(default = "default_mask")]
    pub mask: String,
}

fn default_map_dir() -> PathBuf { PathBuf::from("maps") }
fn default_table_dir() -> PathBuf { PathBuf::from("tables") }
fn default_output_dir() -> PathBuf { PathBuf::from("output") }
fn default_mask() -> String { "mask".to_string() }

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            map_dir: default_map_dir(),
            table_dir: default_table_dir(),
            output_dir: default_output_dir(),
            mask: default_mask(),
        }
    }
}

/// 模拟时段配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// 起始日期（只使用年月，步进日期恒为每月 1 日）
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// 模拟月数
    #[serde(default = "default_n_steps")]
    pub n_steps: usize,
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1990, 1, 1).unwrap_or_default()
}
fn default_n_steps() -> usize { 12 }

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            n_steps: default_n_steps(),
        }
    }
}

/// 物理参数配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 融化温度阈值 [°C]
    #[serde(default = "default_melt_temperature")]
    pub melt_temperature: f64,

    /// 缺测填充值
    #[serde(default = "default_missing_value")]
    pub missing_value: f64,

    /// 土地覆盖总量阈值，低于此值的单元不参与归一化
    #[serde(default = "default_cover_threshold")]
    pub cover_threshold: f64,

    /// 水文系数无法计算时的回退值
    #[serde(default = "default_hydro_coeff_fallback")]
    pub hydro_coeff_fallback: f64,

    /// 地表不平整糙率分量
    #[serde(default = "default_manning_surface")]
    pub manning_surface: f64,

    /// 有机质含量
    #[serde(default = "default_organic_matter")]
    pub organic_matter: f64,

    /// 耕地类别名
    #[serde(default = "default_cropland_class")]
    pub cropland_class: String,

    /// 耕地水保因子截距
    #[serde(default = "default_cropland_p_intercept")]
    pub cropland_p_intercept: f64,

    /// 耕地水保因子坡度系数
    #[serde(default = "default_cropland_p_slope")]
    pub cropland_p_slope: f64,

    /// 是否应用水保因子（否则 P = 1）
    #[serde(default = "default_true")]
    pub apply_conservation_factor: bool,

    /// 温度输入换算系数（输入单位 0.1 °C）
    #[serde(default = "default_temperature_scale")]
    pub temperature_scale: f64,

    /// 土壤质地换算系数（输入为百分比）
    #[serde(default = "default_texture_scale")]
    pub texture_scale: f64,

    /// 地表径流换算系数（m/月 → mm/月）
    #[serde(default = "default_runoff_scale")]
    pub runoff_scale: f64,

    /// 是否用最近邻值填补 NDVI 缺测
    #[serde(default = "default_true")]
    pub fill_ndvi_gaps: bool,

    /// NDVI 填补最大距离（地图单位），None 为不限
    #[serde(default)]
    pub ndvi_fill_max_distance: Option<f64>,

    /// 由 NDVI 推算地面覆盖度，而非读取覆盖度图层
    #[serde(default)]
    pub ground_cover_from_ndvi: bool,
}

fn default_melt_temperature() -> f64 { 0.0 }
fn default_missing_value() -> f64 { -999.9 }
fn default_cover_threshold() -> f64 { 1e-12 }
fn default_hydro_coeff_fallback() -> f64 { 1e-4 }
fn default_manning_surface() -> f64 { 0.049 }
fn default_organic_matter() -> f64 { 1.0 }
fn default_cropland_class() -> String { "croplands".to_string() }
fn default_cropland_p_intercept() -> f64 { 0.2 }
fn default_cropland_p_slope() -> f64 { 0.3 }
fn default_temperature_scale() -> f64 { 0.1 }
fn default_texture_scale() -> f64 { 0.01 }
fn default_runoff_scale() -> f64 { 1000.0 }
fn default_true() -> bool { true }

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            melt_temperature: default_melt_temperature(),
            missing_value: default_missing_value(),
            cover_threshold: default_cover_threshold(),
            hydro_coeff_fallback: default_hydro_coeff_fallback(),
            manning_surface: default_manning_surface(),
            organic_matter: default_organic_matter(),
            cropland_class: default_cropland_class(),
            cropland_p_intercept: default_cropland_p_intercept(),
            cropland_p_slope: default_cropland_p_slope(),
            apply_conservation_factor: true,
            temperature_scale: default_temperature_scale(),
            texture_scale: default_texture_scale(),
            runoff_scale: default_runoff_scale(),
            fill_ndvi_gaps: true,
            ndvi_fill_max_distance: None,
            ground_cover_from_ndvi: false,
        }
    }
}

/// 输入图层与参数表名称
///
/// 月尺度输入为时间序列词干，实际文件名由词干与步号生成。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputNames {
    /// 坡长
    #[serde(default = "default_slope_length")]
    pub slope_length: String,
    /// 流向（供下游汇流模块使用，None 表示不加载）
    #[serde(default = "default_ldd")]
    pub ldd: Option<String>,
    /// 像元面积 [m²]
    #[serde(default = "default_cell_area")]
    pub cell_area: String,
    /// 坡度 [m/m]
    #[serde(default = "default_slope_gradient")]
    pub slope_gradient: String,
    /// 耕地代表坡度 [m/m]
    #[serde(default = "default_selected_slope")]
    pub selected_slope: String,
    /// 年降水 [mm]
    #[serde(default = "default_rain_annual")]
    pub rain_annual: String,
    /// 砂粒含量
    #[serde(default = "default_sand")]
    pub sand: String,
    /// 粉粒含量
    #[serde(default = "default_silt")]
    pub silt: String,
    /// 黏粒含量
    #[serde(default = "default_clay")]
    pub clay: String,

    /// 植被糙率表（其类别即土地覆盖类别）
    #[serde(default = "default_manning_table")]
    pub manning_table: String,
    /// 水保因子表
    #[serde(default = "default_p_factor_table")]
    pub p_factor_table: String,
    /// 截留比例表
    #[serde(default = "default_interception_table")]
    pub interception_table: String,
    /// 坡度百分比糙率区间表
    #[serde(default = "default_manning_n1_table")]
    pub manning_n1_table: String,

    /// 月 NDVI
    #[serde(default = "default_ndvi")]
    pub ndvi: String,
    /// 月地表径流
    #[serde(default = "default_qsurface")]
    pub qsurface: String,
    /// 月平均温度
    #[serde(default = "default_tavg")]
    pub tavg: String,
    /// 月最高温度
    #[serde(default = "default_tmax")]
    pub tmax: String,
    /// 月最低温度
    #[serde(default = "default_tmin")]
    pub tmin: String,
    /// 月降水
    #[serde(default = "default_rain_month")]
    pub rain_month: String,
    /// 月地面覆盖度
    #[serde(default = "default_ground_cover")]
    pub ground_cover: String,

    /// 月输入时间序列数据集；为 None 时按词干与步号读取逐月图层
    #[serde(default)]
    pub monthly_dataset: Option<String>,

    /// 从时间序列数据集取值的时间选择方式
    #[serde(default)]
    pub temporal_method: TemporalMethod,
}

/// 时间序列取值方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TemporalMethod {
    /// 最近时刻
    #[default]
    Nearest,
    /// 前后时刻按天数线性插值
    Linear,
    /// 不晚于目标日期的最近时刻
    Previous,
    /// 不早于目标日期的最近时刻
    Next,
}

fn default_slope_length() -> String { "globalbcat".into() }
fn default_ldd() -> Option<String> { Some("LDD".into()) }
fn default_cell_area() -> String { "cellarea_05min".into() }
fn default_slope_gradient() -> String { "slope05min_avgFrom30sec".into() }
fn default_selected_slope() -> String { "sel_slope".into() }
fn default_rain_annual() -> String { "Pan_90".into() }
fn default_sand() -> String { "fsand_05deg".into() }
fn default_silt() -> String { "fsilt_05deg".into() }
fn default_clay() -> String { "fclay_05deg".into() }
fn default_manning_table() -> String { "Landcover_n4.txt".into() }
fn default_p_factor_table() -> String { "P_factor.txt".into() }
fn default_interception_table() -> String { "part_interception.txt".into() }
fn default_manning_n1_table() -> String { "ManningN1.txt".into() }
fn default_ndvi() -> String { "ndvi".into() }
fn default_qsurface() -> String { "Qsurface".into() }
fn default_tavg() -> String { "tavg".into() }
fn default_tmax() -> String { "tmax".into() }
fn default_tmin() -> String { "tmin".into() }
fn default_rain_month() -> String { "Pre9".into() }
fn default_ground_cover() -> String { "cfr".into() }

impl Default for InputNames {
    fn default() -> Self {
        Self {
            slope_length: default_slope_length(),
            ldd: default_ldd(),
            cell_area: default_cell_area(),
            slope_gradient: default_slope_gradient(),
            selected_slope: default_selected_slope(),
            rain_annual: default_rain_annual(),
            sand: default_sand(),
            silt: default_silt(),
            clay: default_clay(),
            manning_table: default_manning_table(),
            p_factor_table: default_p_factor_table(),
            interception_table: default_interception_table(),
            manning_n1_table: default_manning_n1_table(),
            ndvi: default_ndvi(),
            qsurface: default_qsurface(),
            tavg: default_tavg(),
            tmax: default_tmax(),
            tmin: default_tmin(),
            rain_month: default_rain_month(),
            ground_cover: default_ground_cover(),
            monthly_dataset: None,
            temporal_method: TemporalMethod::default(),
        }
    }
}

/// 时间序列产品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// 来源场名
    pub field: String,
    /// 输出变量名
    pub variable: String,
    /// 单位
    pub units: String,
}

impl Product {
    /// 创建产品
    pub fn new(field: &str, variable: &str, units: &str) -> Self {
        Self {
            field: field.to_string(),
            variable: variable.to_string(),
            units: units.to_string(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// 输出静态因子图
    #[serde(default = "default_true")]
    pub static_reports: bool,

    /// 输出月尺度图
    #[serde(default = "default_true")]
    pub monthly_reports: bool,

    /// 输出时间序列产品
    #[serde(default = "default_true")]
    pub timeseries_output: bool,

    /// 每个阶段后执行完整性检查
    #[serde(default = "default_true")]
    pub checks: bool,

    /// 输出的静态场
    #[serde(default = "default_static_fields")]
    pub static_fields: Vec<String>,

    /// 输出的月尺度场
    #[serde(default = "default_monthly_fields")]
    pub monthly_fields: Vec<String>,

    /// 时间序列产品
    #[serde(default = "default_products")]
    pub products: Vec<Product>,
}

fn default_static_fields() -> Vec<String> {
    ["LS", "K_year", "R_year"].iter().map(|s| s.to_string()).collect()
}

fn default_monthly_fields() -> Vec<String> {
    [
        "R_month", "K_month", "C_month", "P_month", "SoilLoss", "Manning", "HydroCff",
        "DelRatio", "SedTrans",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_products() -> Vec<Product> {
    vec![
        Product::new("SedTrans", "SedTransport", "tonnes per month"),
        Product::new("DelRatio", "DeliveryRatio", "non"),
        Product::new("SoilLoss", "SoilLoss", "tonnes per month"),
    ]
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            static_reports: true,
            monthly_reports: true,
            timeseries_output: true,
            checks: true,
            static_fields: default_static_fields(),
            monthly_fields: default_monthly_fields(),
            products: default_products(),
        }
    }
}

impl ModelConfig {
    /// 从文件加载配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::Io)?;

        let config: ModelConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.n_steps == 0 {
            return Err(ConfigError::invalid(
                "simulation.n_steps",
                self.simulation.n_steps,
                "模拟月数必须为正",
            ));
        }

        let physics = &self.physics;
        for (key, value) in [
            ("physics.temperature_scale", physics.temperature_scale),
            ("physics.texture_scale", physics.texture_scale),
            ("physics.runoff_scale", physics.runoff_scale),
        ] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(key, value, "换算系数必须为正"));
            }
        }

        for (key, value) in [
            ("physics.cover_threshold", physics.cover_threshold),
            ("physics.hydro_coeff_fallback", physics.hydro_coeff_fallback),
            ("physics.organic_matter", physics.organic_matter),
        ] {
            if !(value >= 0.0) {
                return Err(ConfigError::invalid(key, value, "不能为负"));
            }
        }

        if let Some(distance) = physics.ndvi_fill_max_distance {
            if !(distance >= 0.0) {
                return Err(ConfigError::invalid(
                    "physics.ndvi_fill_max_distance",
                    distance,
                    "不能为负",
                ));
            }
        }

        if physics.cropland_class.trim().is_empty() {
            return Err(ConfigError::Missing("physics.cropland_class".to_string()));
        }

        if self.paths.mask.trim().is_empty() {
            return Err(ConfigError::Missing("paths.mask".to_string()));
        }

        let mut seen = HashSet::new();
        for product in &self.report.products {
            if !seen.insert(product.variable.as_str()) {
                return Err(ConfigError::invalid(
                    "report.products",
                    &product.variable,
                    "时间序列变量名重复",
                ));
            }
        }

        Ok(())
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(ConfigError::Io)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ModelConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.n_steps, 12);
        assert_eq!(config.simulation.start_date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
        assert!((config.physics.missing_value + 999.9).abs() < 1e-12);
        assert_eq!(config.inputs.rain_month, "Pre9");
        assert_eq!(config.report.products.len(), 3);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "simulation": { "n_steps": 3 }, "physics": { "cropland_class": "crops" } }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.simulation.n_steps, 3);
        assert_eq!(config.physics.cropland_class, "crops");
        assert!((config.physics.manning_surface - 0.049).abs() < 1e-12);
        assert_eq!(config.report.static_fields, vec!["LS", "K_year", "R_year"]);
        assert_eq!(config.inputs.temporal_method, TemporalMethod::Nearest);
    }

    #[test]
    fn test_temporal_method_lowercase() {
        let json = r#"{ "inputs": { "monthly_dataset": "era", "temporal_method": "linear", "ldd": null } }"#;
        let config: ModelConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.inputs.temporal_method, TemporalMethod::Linear);
        assert_eq!(config.inputs.monthly_dataset.as_deref(), Some("era"));
        assert_eq!(config.inputs.ldd, None);
    }

    #[test]
    fn test_invalid_values() {
        let mut config = ModelConfig::default();
        config.simulation.n_steps = 0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.physics.texture_scale = 0.0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.physics.cover_threshold = -1.0;
        assert!(config.validate().is_err());

        let mut config = ModelConfig::default();
        config.physics.cropland_class = " ".into();
        assert!(matches!(config.validate(), Err(ConfigError::Missing(_))));
    }

    #[test]
    fn test_duplicate_product_rejected() {
        let mut config = ModelConfig::default();
        config.report.products.push(Product::new("SoilLoss", "SoilLoss", "t"));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        let mut config = ModelConfig::default();
        config.simulation.n_steps = 24;
        config.save_to_file(&path).unwrap();

        let loaded = ModelConfig::from_file(&path).unwrap();
        assert_eq!(loaded.simulation.n_steps, 24);
        assert_eq!(loaded.inputs.manning_table, "Landcover_n4.txt");
    }
}
