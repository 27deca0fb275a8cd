// crates/sh_io/src/temporal.rs

//! 时间序列取值
//!
//! 在一组带日期的快照中为目标日期选取一个快照，或选取两个快照做线性插值。

use chrono::NaiveDate;
use sh_config::TemporalMethod;
use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};

use crate::traits::TimedField;

/// 选取结果（下标指向按日期升序排列的快照）
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Selection {
    /// 单个快照
    Single(usize),
    /// 两个快照插值，`weight` 为后一个快照的权重
    Blend {
        /// 前一快照
        before: usize,
        /// 后一快照
        after: usize,
        /// 后一快照权重 (0, 1)
        weight: f64,
    },
}

/// 为目标日期选取快照
///
/// `dates` 必须升序排列。线性插值在目标日期落在序列外时退化为最近快照。
pub fn select(dates: &[NaiveDate], target: NaiveDate, method: TemporalMethod) -> Option<Selection> {
    if dates.is_empty() {
        return None;
    }
    let after = dates.partition_point(|d| *d < target);
    if after < dates.len() && dates[after] == target {
        return Some(Selection::Single(after));
    }
    let previous = after.checked_sub(1);
    let next = (after < dates.len()).then_some(after);

    match method {
        TemporalMethod::Previous => previous.map(Selection::Single),
        TemporalMethod::Next => next.map(Selection::Single),
        TemporalMethod::Nearest => nearest(dates, target, previous, next).map(Selection::Single),
        TemporalMethod::Linear => match (previous, next) {
            (Some(before), Some(after)) => {
                let span = (dates[after] - dates[before]).num_days() as f64;
                let offset = (target - dates[before]).num_days() as f64;
                Some(Selection::Blend {
                    before,
                    after,
                    weight: offset / span,
                })
            }
            _ => nearest(dates, target, previous, next).map(Selection::Single),
        },
    }
}

fn nearest(
    dates: &[NaiveDate],
    target: NaiveDate,
    previous: Option<usize>,
    next: Option<usize>,
) -> Option<usize> {
    match (previous, next) {
        (Some(p), Some(n)) => {
            let dp = (target - dates[p]).num_days();
            let dn = (dates[n] - target).num_days();
            // 等距时取较早者
            Some(if dp <= dn { p } else { n })
        }
        (p, n) => p.or(n),
    }
}

/// 从升序快照序列中取场
pub fn resolve(
    dataset: &str,
    variable: &str,
    snapshots: &[(NaiveDate, Field)],
    target: NaiveDate,
    method: TemporalMethod,
) -> ShResult<TimedField> {
    let dates: Vec<NaiveDate> = snapshots.iter().map(|(d, _)| *d).collect();
    let selection = select(&dates, target, method).ok_or_else(|| {
        ShError::missing_input(format!(
            "{}/{} 在 {} 附近没有可用快照 ({:?})",
            dataset, variable, target, method
        ))
    })?;

    match selection {
        Selection::Single(i) => {
            let (date, field) = &snapshots[i];
            let diagnostic = if *date == target {
                format!("{}/{}: 精确匹配 {}", dataset, variable, date)
            } else {
                format!(
                    "{}/{}: {:?} 取 {}（相差 {} 天）",
                    dataset,
                    variable,
                    method,
                    date,
                    (*date - target).num_days().abs()
                )
            };
            Ok(TimedField {
                field: field.clone(),
                resolved_date: *date,
                diagnostic,
            })
        }
        Selection::Blend {
            before,
            after,
            weight,
        } => {
            let (d0, f0) = &snapshots[before];
            let (d1, f1) = &snapshots[after];
            let field = f0.zip_with(f1, |a, b| a + weight * (b - a))?;
            Ok(TimedField {
                field,
                resolved_date: target,
                diagnostic: format!(
                    "{}/{}: {} 与 {} 线性插值（权重 {:.4}）",
                    dataset, variable, d0, d1, weight
                ),
            })
        }
    }
}
