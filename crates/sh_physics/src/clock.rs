// crates/sh_physics/src/clock.rs

//! 月步长时钟
//!
//! 步号从 1 开始，第 n 步的日期为起始月加 n - 1 个月，日恒为 1。

use chrono::{Datelike, Months, NaiveDate};
use sh_foundation::error::{ShError, ShResult};

/// 月步长时钟
#[derive(Debug, Clone)]
pub struct TimestepClock {
    start: NaiveDate,
    step: usize,
    n_steps: usize,
}

impl TimestepClock {
    /// 创建时钟，起始日期归一到当月 1 日
    pub fn new(start_date: NaiveDate, n_steps: usize) -> Self {
        let start = start_date.with_day(1).unwrap_or(start_date);
        Self {
            start,
            step: 0,
            n_steps,
        }
    }

    /// 前进一个月，返回新日期
    pub fn advance(&mut self) -> ShResult<NaiveDate> {
        if self.is_finished() {
            return Err(ShError::invalid_input(format!(
                "时钟已到达最后一步 ({})",
                self.n_steps
            )));
        }
        self.step += 1;
        self.current_date()
            .ok_or_else(|| ShError::internal(format!("第 {} 步日期超出范围", self.step)))
    }

    /// 当前步日期；尚未前进时为 None
    pub fn current_date(&self) -> Option<NaiveDate> {
        if self.step == 0 {
            return None;
        }
        let offset = u32::try_from(self.step - 1).ok()?;
        self.start.checked_add_months(Months::new(offset))
    }

    /// 当前步号（从 1 开始，0 表示尚未开始）
    pub fn step_index(&self) -> usize {
        self.step
    }

    /// 总步数
    pub fn n_steps(&self) -> usize {
        self.n_steps
    }

    /// 起始月
    pub fn start_date(&self) -> NaiveDate {
        self.start
    }

    /// 是否已走完全部步数
    pub fn is_finished(&self) -> bool {
        self.step >= self.n_steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_advance_month_start() {
        let mut clock = TimestepClock::new(ymd(1990, 11, 15), 3);
        assert_eq!(clock.current_date(), None);
        assert_eq!(clock.advance().unwrap(), ymd(1990, 11, 1));
        assert_eq!(clock.advance().unwrap(), ymd(1990, 12, 1));
        assert_eq!(clock.advance().unwrap(), ymd(1991, 1, 1));
        assert_eq!(clock.step_index(), 3);
        assert!(clock.is_finished());
        assert!(clock.advance().is_err());
    }

    #[test]
    fn test_multi_year_wrap() {
        let mut clock = TimestepClock::new(ymd(1990, 1, 1), 40);
        let mut last = None;
        while !clock.is_finished() {
            last = Some(clock.advance().unwrap());
        }
        assert_eq!(last, Some(ymd(1993, 4, 1)));
    }
}
