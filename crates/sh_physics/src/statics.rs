// crates/sh_physics/src/statics.rs

//! 静态因子
//!
//! 运行开始时计算一次，在整个模拟期间只读共享。

use sh_config::PhysicsConfig;
use sh_field::Field;
use sh_foundation::error::ShResult;
use tracing::{debug, info};

use crate::erodibility::{annual_erodibility, seasonality_ratio};
use crate::erosivity::{annual_erosivity, effective_annual_rainfall};
use crate::landcover::{
    conservation_factor, interception_fraction, resolve_conservation_classes, CroplandRule,
    LandCoverFractions,
};
use crate::roughness::{base_roughness, vegetation_roughness};
use crate::slope::slope_factor;
use crate::tables::{LookupTable, RangeTable};

/// 静态输入（原始单位）
#[derive(Debug, Clone)]
pub struct StaticInputs {
    /// 坡长 [m]
    pub slope_length: Field,
    /// 坡度 [m/m]
    pub slope_gradient: Field,
    /// 像元面积 [m²]
    pub cell_area: Field,
    /// 耕地代表坡度 [m/m]
    pub selected_slope: Field,
    /// 年降水 [mm]
    pub rain_annual: Field,
    /// 砂粒含量（按 `texture_scale` 换算为比例）
    pub sand: Field,
    /// 粉粒含量
    pub silt: Field,
    /// 黏粒含量
    pub clay: Field,
    /// 各土地覆盖类别原始比例（类别顺序同糙率表）
    pub raw_cover: Vec<(String, Field)>,
    /// 植被糙率表
    pub manning_table: LookupTable,
    /// 水保因子表
    pub p_factor_table: LookupTable,
    /// 截留比例表
    pub interception_table: LookupTable,
    /// 坡度百分比糙率区间表
    pub manning_n1_table: RangeTable,
}

/// 静态因子
#[derive(Debug, Clone)]
pub struct StaticFactors {
    /// 归一化土地覆盖比例
    pub cover: LandCoverFractions,
    /// 坡长 [m]
    pub slope_length: Field,
    /// 坡度 [m/m]
    pub slope_gradient: Field,
    /// 像元面积 [m²]
    pub cell_area: Field,
    /// 耕地代表坡度（缺测已填充）
    pub selected_slope: Field,
    /// 年降水（缺测已填充）
    pub rain_annual: Field,
    /// 砂粒比例
    pub sand: Field,
    /// 粉粒比例
    pub silt: Field,
    /// 黏粒比例
    pub clay: Field,
    /// 地形因子
    pub ls: Field,
    /// 年均可蚀性
    pub k_year: Field,
    /// 可蚀性季节比
    pub seasonality: Field,
    /// 截留比例
    pub interception: Field,
    /// 有效年降水
    pub effective_rain: Field,
    /// 年侵蚀力
    pub r_year: Field,
    /// 水保因子
    pub p_factor: Field,
    /// 坡度基准糙率 n1
    pub manning_base: Field,
    /// 植被加权糙率 n4
    pub manning_vegetation: Field,
}

impl StaticFactors {
    /// 计算全部静态因子
    pub fn compute(inputs: StaticInputs, physics: &PhysicsConfig) -> ShResult<Self> {
        info!("开始计算静态因子");
        let mv = physics.missing_value;

        let cover = LandCoverFractions::normalize(inputs.raw_cover, physics.cover_threshold)?;
        debug!("土地覆盖类别: {}", cover.len());

        let sand = inputs.sand.scale(physics.texture_scale);
        let silt = inputs.silt.scale(physics.texture_scale);
        let clay = inputs.clay.scale(physics.texture_scale);
        let selected_slope = inputs.selected_slope.cover(mv);
        let rain_annual = inputs.rain_annual.cover(mv);

        let interception = interception_fraction(&cover, &inputs.interception_table)?;
        let ls = slope_factor(&inputs.slope_length, &inputs.slope_gradient)?;
        let k_year = annual_erodibility(&sand, &silt, &clay, physics.organic_matter)?;
        let seasonality = seasonality_ratio(&sand, &clay)?;
        let effective_rain = effective_annual_rainfall(&interception, &rain_annual)?;
        let r_year = annual_erosivity(&effective_rain, mv);

        let p_factor = if physics.apply_conservation_factor {
            let rule = CroplandRule {
                intercept: physics.cropland_p_intercept,
                slope_coefficient: physics.cropland_p_slope,
            };
            let classes = resolve_conservation_classes(
                &cover,
                &inputs.p_factor_table,
                &physics.cropland_class,
                rule,
            )?;
            conservation_factor(&cover, &classes, &selected_slope)?
        } else {
            Field::constant(ls.domain().clone(), 1.0)
        };

        let manning_base = base_roughness(&inputs.slope_gradient, &inputs.manning_n1_table);
        let manning_vegetation = vegetation_roughness(&cover, &inputs.manning_table)?;
        info!("静态因子计算完成");

        Ok(Self {
            cover,
            slope_length: inputs.slope_length,
            slope_gradient: inputs.slope_gradient,
            cell_area: inputs.cell_area,
            selected_slope,
            rain_annual,
            sand,
            silt,
            clay,
            ls,
            k_year,
            seasonality,
            interception,
            effective_rain,
            r_year,
            p_factor,
            manning_base,
            manning_vegetation,
        })
    }

    /// 场登记表（完整性检查与输出使用）
    pub fn registry(&self) -> Vec<(&'static str, &Field)> {
        vec![
            ("SlopeLen", &self.slope_length),
            ("Slope", &self.slope_gradient),
            ("CellArea", &self.cell_area),
            ("SelSlope", &self.selected_slope),
            ("RainAnn", &self.rain_annual),
            ("Sand", &self.sand),
            ("Silt", &self.silt),
            ("Clay", &self.clay),
            ("LS", &self.ls),
            ("K_year", &self.k_year),
            ("KSeason", &self.seasonality),
            ("Intercpt", &self.interception),
            ("RainEff", &self.effective_rain),
            ("R_year", &self.r_year),
            ("P_month", &self.p_factor),
            ("Manning1", &self.manning_base),
            ("Manning4", &self.manning_vegetation),
        ]
    }

    /// 按名称查找场
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.registry()
            .into_iter()
            .find(|(n, _)| *n == name)
            .map(|(_, f)| f)
    }
}
