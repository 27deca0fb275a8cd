// crates/sh_field/src/domain.rs

//! 研究域定义
//!
//! 一次运行中所有场共享同一研究域：行列数、左上角原点和像元尺寸。
//! 参与同一算子的场必须位于同一研究域，否则返回 `DomainMismatch`。

use serde::{Deserialize, Serialize};
use sh_foundation::error::{ShError, ShResult};
use std::fmt;
use std::sync::Arc;

/// 几何比较容差
const GEOMETRY_TOLERANCE: f64 = 1e-9;

/// 共享研究域句柄
pub type SharedDomain = Arc<GridDomain>;

/// 规则栅格研究域
///
/// 行号自北向南递增，列号自西向东递增。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridDomain {
    /// 行数
    pub rows: usize,
    /// 列数
    pub cols: usize,
    /// 左上角 x 坐标
    pub origin_x: f64,
    /// 左上角 y 坐标
    pub origin_y: f64,
    /// 像元宽度（x 方向）
    pub cell_width: f64,
    /// 像元高度（y 方向，取正值）
    pub cell_height: f64,
}

impl GridDomain {
    /// 创建研究域
    pub fn new(
        rows: usize,
        cols: usize,
        origin_x: f64,
        origin_y: f64,
        cell_width: f64,
        cell_height: f64,
    ) -> ShResult<Self> {
        if rows == 0 || cols == 0 {
            return Err(ShError::invalid_input(format!(
                "研究域尺寸必须为正: {}x{}",
                rows, cols
            )));
        }
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(ShError::invalid_input(format!(
                "像元尺寸必须为正: {}x{}",
                cell_width, cell_height
            )));
        }
        Ok(Self {
            rows,
            cols,
            origin_x,
            origin_y,
            cell_width,
            cell_height,
        })
    }

    /// 单位像元、原点在 (0, rows) 的研究域
    pub fn unit(rows: usize, cols: usize) -> Self {
        Self {
            rows: rows.max(1),
            cols: cols.max(1),
            origin_x: 0.0,
            origin_y: rows.max(1) as f64,
            cell_width: 1.0,
            cell_height: 1.0,
        }
    }

    /// 包装为共享句柄
    pub fn shared(self) -> SharedDomain {
        Arc::new(self)
    }

    /// 单元总数
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// 数组形状 (rows, cols)
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// 行主序线性索引
    #[inline]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.cols + col
    }

    /// 线性索引还原为 (row, col)
    #[inline]
    pub fn position(&self, index: usize) -> (usize, usize) {
        (index / self.cols, index % self.cols)
    }

    /// 是否在研究域内
    #[inline]
    pub fn contains(&self, row: isize, col: isize) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.rows && (col as usize) < self.cols
    }

    /// 像元中心坐标
    #[inline]
    pub fn cell_center(&self, row: usize, col: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.cell_width;
        let y = self.origin_y - (row as f64 + 0.5) * self.cell_height;
        (x, y)
    }

    /// 相邻像元中心距离
    #[inline]
    pub fn step_distance(&self, d_row: isize, d_col: isize) -> f64 {
        let dy = d_row as f64 * self.cell_height;
        let dx = d_col as f64 * self.cell_width;
        (dx * dx + dy * dy).sqrt()
    }

    /// 与另一研究域是否相同（几何按容差比较）
    pub fn same_as(&self, other: &GridDomain) -> bool {
        self.rows == other.rows
            && self.cols == other.cols
            && (self.origin_x - other.origin_x).abs() <= GEOMETRY_TOLERANCE
            && (self.origin_y - other.origin_y).abs() <= GEOMETRY_TOLERANCE
            && (self.cell_width - other.cell_width).abs() <= GEOMETRY_TOLERANCE
            && (self.cell_height - other.cell_height).abs() <= GEOMETRY_TOLERANCE
    }

    /// 检查研究域一致性
    pub fn ensure_same(&self, other: &GridDomain) -> ShResult<()> {
        if self.same_as(other) {
            Ok(())
        } else {
            Err(ShError::domain_mismatch(self.to_string(), other.to_string()))
        }
    }
}

impl fmt::Display for GridDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}x{} @({}, {}) 像元 {}x{}",
            self.rows, self.cols, self.origin_x, self.origin_y, self.cell_width, self.cell_height
        )
    }
}

/// 检查两个共享句柄是否指向同一研究域
#[inline]
pub fn ensure_same_domain(a: &SharedDomain, b: &SharedDomain) -> ShResult<()> {
    if Arc::ptr_eq(a, b) {
        return Ok(());
    }
    a.ensure_same(b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_roundtrip() {
        let d = GridDomain::unit(3, 4);
        assert_eq!(d.index(2, 1), 9);
        assert_eq!(d.position(9), (2, 1));
        assert_eq!(d.cell_count(), 12);
    }

    #[test]
    fn test_same_as_tolerance() {
        let a = GridDomain::new(2, 2, 0.0, 10.0, 0.5, 0.5).unwrap();
        let mut b = a.clone();
        b.origin_x += 1e-12;
        assert!(a.same_as(&b));
        b.cols = 3;
        assert!(a.ensure_same(&b).is_err());
    }

    #[test]
    fn test_invalid_domain() {
        assert!(GridDomain::new(0, 2, 0.0, 0.0, 1.0, 1.0).is_err());
        assert!(GridDomain::new(2, 2, 0.0, 0.0, -1.0, 1.0).is_err());
    }

    #[test]
    fn test_cell_center() {
        let d = GridDomain::new(2, 2, 100.0, 50.0, 10.0, 5.0).unwrap();
        assert_eq!(d.cell_center(0, 0), (105.0, 47.5));
        assert!((d.step_distance(1, 1) - (125.0f64).sqrt()).abs() < 1e-12);
    }
}
