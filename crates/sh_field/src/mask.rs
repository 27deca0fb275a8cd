// crates/sh_field/src/mask.rs

//! 布尔场与条件选择
//!
//! [`BoolField`] 的单元取值为 `Some(true)`、`Some(false)` 或 `None`（未定义）。
//! 研究掩膜、比较结果和条件选择都使用此类型。

use crate::domain::{ensure_same_domain, SharedDomain};
use crate::field::{normalize, Field};
use ndarray::{Array2, Zip};
use sh_foundation::error::{ShError, ShResult};

/// 研究域上的布尔场
#[derive(Debug, Clone)]
pub struct BoolField {
    domain: SharedDomain,
    data: Array2<Option<bool>>,
}

impl BoolField {
    /// 由数组创建
    pub fn new(domain: SharedDomain, data: Array2<Option<bool>>) -> ShResult<Self> {
        if data.dim() != domain.shape() {
            return Err(ShError::size_mismatch("bool field", domain.cell_count(), data.len()));
        }
        Ok(Self { domain, data })
    }

    /// 由行主序向量创建
    pub fn from_vec(domain: SharedDomain, values: Vec<Option<bool>>) -> ShResult<Self> {
        ShError::check_size("bool field", domain.cell_count(), values.len())?;
        let data = Array2::from_shape_vec(domain.shape(), values)
            .map_err(|e| ShError::internal(e.to_string()))?;
        Ok(Self { domain, data })
    }

    /// 常量布尔场
    pub fn constant(domain: SharedDomain, value: bool) -> Self {
        let data = Array2::from_elem(domain.shape(), Some(value));
        Self { domain, data }
    }

    #[inline]
    pub(crate) fn from_raw(domain: SharedDomain, data: Array2<Option<bool>>) -> Self {
        Self { domain, data }
    }

    /// 研究域
    #[inline]
    pub fn domain(&self) -> &SharedDomain {
        &self.domain
    }

    /// 底层数组
    #[inline]
    pub fn data(&self) -> &Array2<Option<bool>> {
        &self.data
    }

    /// 读取单元
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.data.get((row, col)).copied().flatten()
    }

    /// 单元是否为真（未定义视为假）
    #[inline]
    pub fn is_true(&self, row: usize, col: usize) -> bool {
        self.get(row, col) == Some(true)
    }

    /// 为真的单元数
    pub fn count_true(&self) -> usize {
        self.data.iter().filter(|v| **v == Some(true)).count()
    }

    fn zip_logic<F>(&self, other: &BoolField, f: F) -> ShResult<BoolField>
    where
        F: Fn(bool, bool) -> bool + Sync + Send,
    {
        ensure_same_domain(&self.domain, &other.domain)?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .par_map_collect(|a, b| match (a, b) {
                (Some(x), Some(y)) => Some(f(*x, *y)),
                _ => None,
            });
        Ok(Self::from_raw(self.domain.clone(), data))
    }

    /// 逻辑与
    pub fn and(&self, other: &BoolField) -> ShResult<BoolField> {
        self.zip_logic(other, |a, b| a && b)
    }

    /// 逻辑或
    pub fn or(&self, other: &BoolField) -> ShResult<BoolField> {
        self.zip_logic(other, |a, b| a || b)
    }

    /// 逻辑非
    pub fn not(&self) -> BoolField {
        let data = self.data.mapv(|v| v.map(|b| !b));
        Self::from_raw(self.domain.clone(), data)
    }

    /// 条件选择（ifthenelse）：条件未定义时结果未定义
    pub fn select(&self, when_true: &Field, when_false: &Field) -> ShResult<Field> {
        ensure_same_domain(&self.domain, when_true.domain())?;
        ensure_same_domain(&self.domain, when_false.domain())?;
        let data = Zip::from(&self.data)
            .and(when_true.data())
            .and(when_false.data())
            .par_map_collect(|cond, &t, &f| match cond {
                Some(true) => t,
                Some(false) => f,
                None => f64::NAN,
            });
        Ok(Field::from_raw(self.domain.clone(), data))
    }

    /// 常量条件选择
    pub fn select_scalar(&self, when_true: f64, when_false: f64) -> Field {
        let t = normalize(when_true);
        let f = normalize(when_false);
        let data = self.data.mapv(|cond| match cond {
            Some(true) => t,
            Some(false) => f,
            None => f64::NAN,
        });
        Field::from_raw(self.domain.clone(), data)
    }

    /// 条件保留（ifthen）：条件不为真处未定义
    pub fn if_then(&self, value: &Field) -> ShResult<Field> {
        ensure_same_domain(&self.domain, value.domain())?;
        let data = Zip::from(&self.data)
            .and(value.data())
            .par_map_collect(|cond, &v| if *cond == Some(true) { v } else { f64::NAN });
        Ok(Field::from_raw(self.domain.clone(), data))
    }

    /// 转为标量场（真 = 1，假 = 0）
    pub fn to_scalar(&self) -> Field {
        self.select_scalar(1.0, 0.0)
    }
}
