// crates/sh_physics/src/monthly.rs

//! 月尺度动态计算
//!
//! 每个时间步按固定顺序重新计算九个量：
//!
//! 1. 月侵蚀力 R_month
//! 2. 融化时间比例
//! 3. 月可蚀性 K_month
//! 4. 植被覆盖因子 C_month
//! 5. 土壤流失量
//! 6. 综合糙率
//! 7. 水文系数
//! 8. 输移比
//! 9. 产沙量
//!
//! 各步只依赖当月输入与静态因子，不读取上一月的状态。

use sh_config::PhysicsConfig;
use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};
use tracing::debug;

use crate::cover::{ground_cover_from_ndvi, vegetation_cover_factor};
use crate::delivery::{delivery_ratio, hydro_coefficient, sediment_yield, soil_loss};
use crate::erodibility::{melt_time_fraction, monthly_erodibility};
use crate::erosivity::partition_erosivity;
use crate::roughness::combined_roughness;
use crate::statics::StaticFactors;

/// 当月原始输入
#[derive(Debug, Clone)]
pub struct MonthlyRawInputs {
    /// NDVI
    pub ndvi: Field,
    /// 地表径流 [m/月]
    pub qsurface: Field,
    /// 平均温度 [°C]
    pub tavg: Field,
    /// 最高温度（按 `temperature_scale` 换算）
    pub tmax: Field,
    /// 最低温度（按 `temperature_scale` 换算）
    pub tmin: Field,
    /// 月降水 [mm]
    pub rain_month: Field,
    /// 地面覆盖度；由 NDVI 推算时可省略
    pub ground_cover: Option<Field>,
}

/// 预处理后的当月输入
#[derive(Debug, Clone)]
pub struct MonthlyInputs {
    /// NDVI（缺测已填补）
    pub ndvi: Field,
    /// 地表径流 [mm/月]
    pub qsurface: Field,
    /// 最高温度 [°C]
    pub tmax: Field,
    /// 最低温度 [°C]
    pub tmin: Field,
    /// 月降水（缺测已填充）
    pub rain_month: Field,
    /// 地面覆盖度
    pub ground_cover: Field,
}

impl MonthlyInputs {
    /// 单位换算与缺测处理
    ///
    /// 最高/最低温度由平均温度加减半日较差得到：
    /// `half = 0.5 × (tmax_raw - tmin_raw) × temperature_scale`。
    pub fn prepare(raw: MonthlyRawInputs, physics: &PhysicsConfig) -> ShResult<Self> {
        let rain_month = raw.rain_month.cover(physics.missing_value);

        let half_range = raw
            .tmax
            .minus(&raw.tmin)?
            .scale(0.5 * physics.temperature_scale);
        let tmax = raw.tavg.plus(&half_range)?;
        let tmin = raw.tavg.minus(&half_range)?;

        let ndvi = if physics.fill_ndvi_gaps {
            raw.ndvi.fill_nearest(physics.ndvi_fill_max_distance)?
        } else {
            raw.ndvi
        };

        let qsurface = raw.qsurface.scale(physics.runoff_scale);

        let ground_cover = if physics.ground_cover_from_ndvi {
            ground_cover_from_ndvi(&ndvi)
        } else {
            raw.ground_cover
                .ok_or_else(|| ShError::missing_input("ground_cover"))?
        };

        Ok(Self {
            ndvi,
            qsurface,
            tmax,
            tmin,
            rain_month,
            ground_cover,
        })
    }

    /// 场登记表
    pub fn registry(&self) -> Vec<(&'static str, &Field)> {
        vec![
            ("NDVI", &self.ndvi),
            ("Qsurface", &self.qsurface),
            ("Tmax", &self.tmax),
            ("Tmin", &self.tmin),
            ("RainMon", &self.rain_month),
            ("GrndCov", &self.ground_cover),
        ]
    }
}

/// 月状态
#[derive(Debug, Clone)]
pub struct MonthlyState {
    /// 月侵蚀力
    pub r_month: Field,
    /// 融化时间比例
    pub melt_fraction: Field,
    /// 月可蚀性
    pub k_month: Field,
    /// 植被覆盖因子
    pub c_month: Field,
    /// 水保因子（静态值）
    pub p_month: Field,
    /// 土壤流失量 [t/像元/月]
    pub soil_loss: Field,
    /// 综合糙率
    pub manning: Field,
    /// 水文系数
    pub hydro_coeff: Field,
    /// 输移比
    pub delivery_ratio: Field,
    /// 产沙量 [t/像元/月]
    pub sediment_yield: Field,
}

impl MonthlyState {
    /// 计算当月状态
    pub fn compute(
        inputs: &MonthlyInputs,
        statics: &StaticFactors,
        physics: &PhysicsConfig,
    ) -> ShResult<Self> {
        let r_month = partition_erosivity(&inputs.rain_month, &statics.rain_annual, &statics.r_year)?;
        let melt_fraction = melt_time_fraction(&inputs.tmin, &inputs.tmax, physics.melt_temperature)?;
        let k_month = monthly_erodibility(&statics.k_year, &statics.seasonality, &melt_fraction)?;
        let c_month = vegetation_cover_factor(
            &inputs.ground_cover,
            &r_month,
            &statics.r_year,
            physics.missing_value,
        )?;
        let p_month = statics.p_factor.clone();
        let soil_loss = soil_loss(
            &r_month,
            &k_month,
            &statics.ls,
            &c_month,
            &p_month,
            &statics.cell_area,
        )?;
        let manning = combined_roughness(
            &statics.manning_base,
            &statics.manning_vegetation,
            &inputs.ndvi,
            physics.manning_surface,
        )?;
        let hydro_coeff = hydro_coefficient(
            &inputs.qsurface,
            &inputs.rain_month,
            physics.hydro_coeff_fallback,
        )?;
        let delivery_ratio = delivery_ratio(
            &hydro_coeff,
            &statics.slope_gradient,
            &manning,
            &statics.slope_length,
        )?;
        let sediment_yield = sediment_yield(&soil_loss, &delivery_ratio)?;
        debug!(
            "月产沙量合计: {:?} t",
            sediment_yield.sum()
        );

        Ok(Self {
            r_month,
            melt_fraction,
            k_month,
            c_month,
            p_month,
            soil_loss,
            manning,
            hydro_coeff,
            delivery_ratio,
            sediment_yield,
        })
    }

    /// 场登记表（名称同输出文件名）
    pub fn registry(&self) -> Vec<(&'static str, &Field)> {
        vec![
            ("R_month", &self.r_month),
            ("MeltFrac", &self.melt_fraction),
            ("K_month", &self.k_month),
            ("C_month", &self.c_month),
            ("P_month", &self.p_month),
            ("SoilLoss", &self.soil_loss),
            ("Manning", &self.manning),
            ("HydroCff", &self.hydro_coeff),
            ("DelRatio", &self.delivery_ratio),
            ("SedTrans", &self.sediment_yield),
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
