// crates/sh_field/src/field.rs

//! 标量场
//!
//! [`Field`] 是研究域上的二维标量数组，NaN 表示未定义单元。
//! 所有算子都是纯函数：输入不变，返回新场。逐单元核函数通过
//! `ndarray::Zip` 在 rayon 线程池上并行求值。
//!
//! # 缺测传播
//!
//! - 任一操作数未定义，结果未定义
//! - 核函数返回的非有限值（NaN、±inf）归一为未定义
//! - `divide` 的零除数得到未定义，由调用方决定是否 `cover`

use crate::domain::{ensure_same_domain, SharedDomain};
use crate::mask::BoolField;
use ndarray::{Array2, Zip};
use rayon::prelude::*;
use sh_foundation::error::{ShError, ShResult};

/// 单元值是否已定义
#[inline]
pub fn is_defined(value: f64) -> bool {
    value.is_finite()
}

/// 非有限值归一为 NaN
#[inline]
pub(crate) fn normalize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        f64::NAN
    }
}

/// 研究域上的标量场
#[derive(Debug, Clone)]
pub struct Field {
    domain: SharedDomain,
    data: Array2<f64>,
}

impl Field {
    /// 由数组创建，形状必须与研究域一致
    pub fn new(domain: SharedDomain, data: Array2<f64>) -> ShResult<Self> {
        if data.dim() != domain.shape() {
            return Err(ShError::size_mismatch("field", domain.cell_count(), data.len()));
        }
        let data = data.mapv(normalize);
        Ok(Self { domain, data })
    }

    /// 由行主序向量创建
    pub fn from_vec(domain: SharedDomain, values: Vec<f64>) -> ShResult<Self> {
        ShError::check_size("field", domain.cell_count(), values.len())?;
        let data = Array2::from_shape_vec(domain.shape(), values)
            .map_err(|e| ShError::internal(e.to_string()))?;
        Self::new(domain, data)
    }

    /// 常量场
    pub fn constant(domain: SharedDomain, value: f64) -> Self {
        let data = Array2::from_elem(domain.shape(), normalize(value));
        Self { domain, data }
    }

    /// 全部未定义的场
    pub fn undefined(domain: SharedDomain) -> Self {
        Self::constant(domain, f64::NAN)
    }

    /// 按 (row, col) 生成
    pub fn from_fn<F>(domain: SharedDomain, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let data = Array2::from_shape_fn(domain.shape(), |(r, c)| normalize(f(r, c)));
        Self { domain, data }
    }

    /// 内部构造：调用方保证形状正确且已归一
    #[inline]
    pub(crate) fn from_raw(domain: SharedDomain, data: Array2<f64>) -> Self {
        Self { domain, data }
    }

    /// 研究域
    #[inline]
    pub fn domain(&self) -> &SharedDomain {
        &self.domain
    }

    /// 底层数组
    #[inline]
    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// 读取单元值，未定义或越界返回 None
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        self.data
            .get((row, col))
            .copied()
            .filter(|v| is_defined(*v))
    }

    /// 行主序原始值（未定义为 NaN）
    pub fn to_vec(&self) -> Vec<f64> {
        self.data.iter().copied().collect()
    }

    /// 行主序值，未定义单元替换为 `missing_value`
    pub fn to_vec_with_missing(&self, missing_value: f64) -> Vec<f64> {
        self.data
            .iter()
            .map(|&v| if is_defined(v) { v } else { missing_value })
            .collect()
    }

    /// 已定义单元数
    pub fn defined_count(&self) -> usize {
        self.data.iter().filter(|v| is_defined(**v)).count()
    }

    /// 是否所有单元都已定义
    pub fn is_fully_defined(&self) -> bool {
        self.data.iter().all(|v| is_defined(*v))
    }

    /// 检查与另一场同域
    #[inline]
    pub fn ensure_same_domain(&self, other: &Field) -> ShResult<()> {
        ensure_same_domain(&self.domain, &other.domain)
    }

    // ========================================================================
    // 通用组合子
    // ========================================================================

    /// 一元逐单元映射
    pub fn map<F>(&self, f: F) -> Field
    where
        F: Fn(f64) -> f64 + Sync + Send,
    {
        let data = Zip::from(&self.data).par_map_collect(|&v| {
            if is_defined(v) {
                normalize(f(v))
            } else {
                f64::NAN
            }
        });
        Self::from_raw(self.domain.clone(), data)
    }

    /// 二元逐单元组合
    pub fn zip_with<F>(&self, other: &Field, f: F) -> ShResult<Field>
    where
        F: Fn(f64, f64) -> f64 + Sync + Send,
    {
        self.ensure_same_domain(other)?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .par_map_collect(|&a, &b| {
                if is_defined(a) && is_defined(b) {
                    normalize(f(a, b))
                } else {
                    f64::NAN
                }
            });
        Ok(Self::from_raw(self.domain.clone(), data))
    }

    /// 三元逐单元组合
    pub fn zip3_with<F>(&self, b: &Field, c: &Field, f: F) -> ShResult<Field>
    where
        F: Fn(f64, f64, f64) -> f64 + Sync + Send,
    {
        self.ensure_same_domain(b)?;
        self.ensure_same_domain(c)?;
        let data = Zip::from(&self.data)
            .and(&b.data)
            .and(&c.data)
            .par_map_collect(|&x, &y, &z| {
                if is_defined(x) && is_defined(y) && is_defined(z) {
                    normalize(f(x, y, z))
                } else {
                    f64::NAN
                }
            });
        Ok(Self::from_raw(self.domain.clone(), data))
    }

    /// N 元逐单元组合，核函数按 `fields` 顺序接收单元值
    pub fn zip_all<F>(fields: &[&Field], f: F) -> ShResult<Field>
    where
        F: Fn(&[f64]) -> f64 + Sync + Send,
    {
        let first = fields
            .first()
            .ok_or_else(|| ShError::invalid_input("zip_all 至少需要一个场"))?;
        for other in &fields[1..] {
            first.ensure_same_domain(other)?;
        }

        let mut out = Array2::from_elem(first.domain.shape(), f64::NAN);
        Zip::indexed(&mut out).par_for_each(|(r, c), o| {
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                let v = field.data[[r, c]];
                if !is_defined(v) {
                    return;
                }
                values.push(v);
            }
            *o = normalize(f(&values));
        });
        Ok(Self::from_raw(first.domain.clone(), out))
    }

    // ========================================================================
    // 算术
    // ========================================================================

    /// 逐单元相加
    pub fn plus(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, |a, b| a + b)
    }

    /// 逐单元相减
    pub fn minus(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, |a, b| a - b)
    }

    /// 逐单元相乘
    pub fn times(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, |a, b| a * b)
    }

    /// 逐单元相除，除数为零时未定义
    pub fn divide(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, |a, b| if b == 0.0 { f64::NAN } else { a / b })
    }

    /// 乘以常数
    pub fn scale(&self, factor: f64) -> Field {
        self.map(|v| v * factor)
    }

    /// 加上常数
    pub fn offset(&self, delta: f64) -> Field {
        self.map(|v| v + delta)
    }

    /// 幂运算
    pub fn powf(&self, exponent: f64) -> Field {
        self.map(|v| v.powf(exponent))
    }

    /// 指数
    pub fn exp(&self) -> Field {
        self.map(f64::exp)
    }

    /// 平方根（负值未定义）
    pub fn sqrt(&self) -> Field {
        self.map(f64::sqrt)
    }

    /// 正弦（弧度）
    pub fn sin(&self) -> Field {
        self.map(f64::sin)
    }

    /// 反正切（弧度）
    pub fn atan(&self) -> Field {
        self.map(f64::atan)
    }

    // ========================================================================
    // 截断
    // ========================================================================

    /// `min(self, bound)`
    pub fn min_scalar(&self, bound: f64) -> Field {
        self.map(|v| v.min(bound))
    }

    /// `max(self, bound)`
    pub fn max_scalar(&self, bound: f64) -> Field {
        self.map(|v| v.max(bound))
    }

    /// 截断到 `[lo, hi]`
    pub fn clamp(&self, lo: f64, hi: f64) -> Field {
        self.map(|v| v.max(lo).min(hi))
    }

    /// 逐单元最小值
    pub fn min_with(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, f64::min)
    }

    /// 逐单元最大值
    pub fn max_with(&self, other: &Field) -> ShResult<Field> {
        self.zip_with(other, f64::max)
    }

    // ========================================================================
    // 缺测处理
    // ========================================================================

    /// 用常数填补未定义单元
    pub fn cover(&self, value: f64) -> Field {
        let fill = normalize(value);
        let data = Zip::from(&self.data).par_map_collect(|&v| if is_defined(v) { v } else { fill });
        Self::from_raw(self.domain.clone(), data)
    }

    /// 用另一场的值填补未定义单元
    pub fn cover_with(&self, other: &Field) -> ShResult<Field> {
        self.ensure_same_domain(other)?;
        let data = Zip::from(&self.data)
            .and(&other.data)
            .par_map_collect(|&a, &b| if is_defined(a) { a } else { b });
        Ok(Self::from_raw(self.domain.clone(), data))
    }

    /// 定义性掩膜（处处有定义）
    pub fn defined(&self) -> BoolField {
        let data = self.data.mapv(|v| Some(is_defined(v)));
        BoolField::from_raw(self.domain.clone(), data)
    }

    // ========================================================================
    // 比较
    // ========================================================================

    fn compare<F>(&self, pred: F) -> BoolField
    where
        F: Fn(f64) -> bool,
    {
        let data = self
            .data
            .mapv(|v| if is_defined(v) { Some(pred(v)) } else { None });
        BoolField::from_raw(self.domain.clone(), data)
    }

    /// `self > value`
    pub fn gt(&self, value: f64) -> BoolField {
        self.compare(|v| v > value)
    }

    /// `self >= value`
    pub fn ge(&self, value: f64) -> BoolField {
        self.compare(|v| v >= value)
    }

    /// `self < value`
    pub fn lt(&self, value: f64) -> BoolField {
        self.compare(|v| v < value)
    }

    /// `self <= value`
    pub fn le(&self, value: f64) -> BoolField {
        self.compare(|v| v <= value)
    }

    // ========================================================================
    // 全域统计
    // ========================================================================

    fn defined_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.data.iter().copied().filter(|v| is_defined(*v))
    }

    /// 已定义单元之和
    pub fn sum(&self) -> Option<f64> {
        let mut any = false;
        let total = self.defined_values().fold(0.0, |acc, v| {
            any = true;
            acc + v
        });
        any.then_some(total)
    }

    /// 已定义单元均值
    pub fn mean(&self) -> Option<f64> {
        let n = self.defined_count();
        self.sum().map(|s| s / n as f64)
    }

    /// 全域最小值
    pub fn map_minimum(&self) -> Option<f64> {
        self.data
            .par_iter()
            .copied()
            .filter(|v| is_defined(*v))
            .reduce_with(f64::min)
    }

    /// 全域最大值
    pub fn map_maximum(&self) -> Option<f64> {
        self.data
            .par_iter()
            .copied()
            .filter(|v| is_defined(*v))
            .reduce_with(f64::max)
    }
}
