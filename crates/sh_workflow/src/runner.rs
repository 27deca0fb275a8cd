// crates/sh_workflow/src/runner.rs

//! 模拟运行器
//!
//! 持有不可变配置、数据源与写出端；静态因子在 [`SimulationRunner::initialize`]
//! 中计算一次，之后每次 [`SimulationRunner::step`] 推进一个月。
//! 月份严格递增，各月之间不传递状态。

use chrono::NaiveDate;
use serde::Serialize;
use sh_config::{ConfigError, ModelConfig};
use sh_field::{BoolField, Field, LddField};
use sh_foundation::error::{ShError, ShResult};
use sh_io::{fits_legacy_name, FieldSource, ResultSink};
use sh_physics::{CompletenessValidator, MonthlyInputs, MonthlyState, StaticFactors, TimestepClock};
use thiserror::Error;
use tracing::{debug, info};

use crate::inputs::{load_drainage, load_mask, load_monthly_inputs, load_static_inputs};

/// 运行器错误
#[derive(Debug, Error)]
pub enum RunnerError {
    /// 模型计算或 IO 错误
    #[error(transparent)]
    Model(#[from] ShError),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),

    /// 尚未初始化
    #[error("运行器尚未初始化")]
    NotInitialized,

    /// 已走完全部步数
    #[error("模拟已完成 ({0} 步)")]
    Finished(usize),
}

/// 单步摘要
#[derive(Debug, Clone, Serialize)]
pub struct StepSummary {
    /// 步号（从 1 开始）
    pub index: usize,
    /// 日期
    pub date: NaiveDate,
    /// 研究域内土壤流失量合计 [t]
    pub soil_loss_total: f64,
    /// 研究域内产沙量合计 [t]
    pub sediment_yield_total: f64,
    /// 研究域内平均输移比
    pub mean_delivery_ratio: Option<f64>,
}

/// 运行摘要
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    /// 各步摘要
    pub steps: Vec<StepSummary>,
}

impl RunSummary {
    /// 步数
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    /// 全部步的土壤流失量合计
    pub fn total_soil_loss(&self) -> f64 {
        self.steps.iter().map(|s| s.soil_loss_total).sum()
    }

    /// 全部步的产沙量合计
    pub fn total_sediment_yield(&self) -> f64 {
        self.steps.iter().map(|s| s.sediment_yield_total).sum()
    }
}

/// 模拟运行器
pub struct SimulationRunner<S: FieldSource, W: ResultSink> {
    config: ModelConfig,
    source: S,
    sink: W,
    clock: TimestepClock,
    validator: Option<CompletenessValidator>,
    statics: Option<StaticFactors>,
    drainage: Option<LddField>,
}

impl<S: FieldSource, W: ResultSink> SimulationRunner<S, W> {
    /// 创建运行器；配置先经校验
    pub fn new(config: ModelConfig, source: S, sink: W) -> Result<Self, RunnerError> {
        config.validate()?;
        let clock = TimestepClock::new(config.simulation.start_date, config.simulation.n_steps);
        Ok(Self {
            config,
            source,
            sink,
            clock,
            validator: None,
            statics: None,
            drainage: None,
        })
    }

    /// 配置
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// 写出端
    pub fn sink(&self) -> &W {
        &self.sink
    }

    /// 取回写出端
    pub fn into_sink(self) -> W {
        self.sink
    }

    /// 静态因子（初始化后可用）
    pub fn statics(&self) -> Option<&StaticFactors> {
        self.statics.as_ref()
    }

    /// 流向图（配置了流向图层时可用，供汇流协作方使用）
    pub fn drainage(&self) -> Option<&LddField> {
        self.drainage.as_ref()
    }

    /// 研究掩膜（初始化后可用）
    pub fn mask(&self) -> Option<&BoolField> {
        self.validator.as_ref().map(CompletenessValidator::mask)
    }

    /// 是否已初始化
    pub fn is_initialized(&self) -> bool {
        self.statics.is_some()
    }

    /// 当前步号（0 表示尚未开始）
    pub fn step_index(&self) -> usize {
        self.clock.step_index()
    }

    /// 读取静态输入、计算静态因子、检查并写出
    pub fn initialize(&mut self) -> Result<(), RunnerError> {
        info!("初始化: 读取研究掩膜 '{}'", self.config.paths.mask);
        let validator = CompletenessValidator::new(load_mask(&self.source, &self.config.paths.mask)?);

        let inputs = load_static_inputs(&self.source, &self.config.inputs)?;
        let statics = StaticFactors::compute(inputs, &self.config.physics)?;
        self.drainage = load_drainage(&self.source, &self.config.inputs)?;

        if self.config.report.checks {
            validator.check(&statics.registry())?;
        }

        if self.config.report.static_reports {
            for name in &self.config.report.static_fields {
                if !fits_legacy_name(name) {
                    continue;
                }
                let field = statics
                    .field(name)
                    .ok_or_else(|| ShError::missing_input(format!("静态输出 {}", name)))?;
                self.sink.report_static(name, field)?;
            }
        }

        self.validator = Some(validator);
        self.statics = Some(statics);
        info!("初始化完成");
        Ok(())
    }

    /// 推进一个月
    pub fn step(&mut self) -> Result<StepSummary, RunnerError> {
        let (Some(statics), Some(validator)) = (self.statics.as_ref(), self.validator.as_ref()) else {
            return Err(RunnerError::NotInitialized);
        };
        if self.clock.is_finished() {
            return Err(RunnerError::Finished(self.clock.n_steps()));
        }

        let date = self.clock.advance()?;
        let index = self.clock.step_index();
        info!("第 {}/{} 步: {}", index, self.clock.n_steps(), date);

        let physics = &self.config.physics;
        let raw = load_monthly_inputs(&self.source, &self.config.inputs, physics, index, date)?;
        let inputs = MonthlyInputs::prepare(raw, physics)?;
        let state = MonthlyState::compute(&inputs, statics, physics)?;

        if self.config.report.checks {
            let mut registry = statics.registry();
            registry.extend(inputs.registry());
            registry.extend(state.registry());
            validator.check(&registry)?;
        }

        let report = &self.config.report;
        if report.monthly_reports {
            for name in &report.monthly_fields {
                if !fits_legacy_name(name) {
                    continue;
                }
                let field = monthly_output(&state, name)?;
                self.sink.report_monthly(name, field, index, date)?;
            }
        }
        if report.timeseries_output {
            for product in &report.products {
                let field = monthly_output(&state, &product.field)?;
                let path = self
                    .config
                    .paths
                    .output_dir
                    .join(format!("{}.jsonl", product.variable));
                self.sink.write_timeseries_variable(
                    &path,
                    &product.variable,
                    &product.units,
                    field,
                    index,
                    date,
                    physics.missing_value,
                )?;
                debug!("追加时间序列 {} 第 {} 步", product.variable, index);
            }
        }

        let mask = validator.mask();
        let summary = StepSummary {
            index,
            date,
            soil_loss_total: masked_total(mask, &state.soil_loss)?,
            sediment_yield_total: masked_total(mask, &state.sediment_yield)?,
            mean_delivery_ratio: mask.if_then(&state.delivery_ratio)?.mean(),
        };
        info!(
            "第 {} 步完成: 土壤流失 {:.3} t, 产沙 {:.3} t",
            index, summary.soil_loss_total, summary.sediment_yield_total
        );
        Ok(summary)
    }

    /// 初始化（如尚未初始化）并走完剩余全部步数
    pub fn run(&mut self) -> Result<RunSummary, RunnerError> {
        if !self.is_initialized() {
            self.initialize()?;
        }
        let mut summary = RunSummary::default();
        while !self.clock.is_finished() {
            summary.steps.push(self.step()?);
        }
        info!(
            "模拟结束: {} 步, 产沙量合计 {:.3} t",
            summary.step_count(),
            summary.total_sediment_yield()
        );
        Ok(summary)
    }
}

fn monthly_output<'a>(state: &'a MonthlyState, name: &str) -> ShResult<&'a Field> {
    state
        .field(name)
        .ok_or_else(|| ShError::missing_input(format!("月输出 {}", name)))
}

fn masked_total(mask: &BoolField, field: &Field) -> ShResult<f64> {
    Ok(mask.if_then(field)?.sum().unwrap_or(0.0))
}
