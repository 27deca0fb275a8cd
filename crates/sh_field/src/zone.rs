// crates/sh_field/src/zone.rs

//! 分区场与分区统计
//!
//! [`ZoneField`] 是类别型栅格（如流域编号、粗网格单元编号）。
//! 分区统计把标量场按分区归约，并把结果写回分区内的每个单元：
//!
//! - `area_total` / `area_average` / `area_minimum` / `area_maximum`
//! - `area_order`: 分区内升序名次（从 1 开始）
//!
//! 最近邻扩散 `spread_zone` 以多源 Dijkstra 在 8 邻域上按物理距离
//! 传播种子编号，`Field::fill_nearest` 基于它为缺测单元赋最近有效值。

use crate::domain::{ensure_same_domain, SharedDomain};
use crate::field::{is_defined, Field};
use crate::mask::BoolField;
use ndarray::Array2;
use sh_foundation::error::{ShError, ShResult};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

/// 8 邻域偏移
const NEIGHBOURS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

/// 研究域上的分区场
#[derive(Debug, Clone)]
pub struct ZoneField {
    domain: SharedDomain,
    data: Array2<Option<i64>>,
}

impl ZoneField {
    /// 由行主序向量创建
    pub fn from_vec(domain: SharedDomain, values: Vec<Option<i64>>) -> ShResult<Self> {
        ShError::check_size("zone field", domain.cell_count(), values.len())?;
        let data = Array2::from_shape_vec(domain.shape(), values)
            .map_err(|e| ShError::internal(e.to_string()))?;
        Ok(Self { domain, data })
    }

    /// 单一分区
    pub fn constant(domain: SharedDomain, id: i64) -> Self {
        let data = Array2::from_elem(domain.shape(), Some(id));
        Self { domain, data }
    }

    /// 由标量场创建（如读入的粗网格编号图层）
    ///
    /// 已定义单元必须是整数编号，未定义单元不属于任何分区。
    pub fn from_field(field: &Field) -> ShResult<Self> {
        let mut ids = Vec::with_capacity(field.domain().cell_count());
        for v in field.data().iter() {
            if !is_defined(*v) {
                ids.push(None);
                continue;
            }
            if v.fract() != 0.0 {
                return Err(ShError::invalid_input(format!("分区编号必须为整数: {}", v)));
            }
            ids.push(Some(*v as i64));
        }
        Self::from_vec(field.domain().clone(), ids)
    }

    /// 为掩膜中每个真值单元分配唯一编号（行主序，从 1 开始）
    pub fn unique_id(mask: &BoolField) -> Self {
        let mut next = 0i64;
        let data = mask.data().mapv(|v| {
            if v == Some(true) {
                next += 1;
                Some(next)
            } else {
                None
            }
        });
        Self {
            domain: mask.domain().clone(),
            data,
        }
    }

    /// 研究域
    #[inline]
    pub fn domain(&self) -> &SharedDomain {
        &self.domain
    }

    /// 读取单元
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<i64> {
        self.data.get((row, col)).copied().flatten()
    }

    /// 不同分区数
    pub fn zone_count(&self) -> usize {
        let mut ids: Vec<i64> = self.data.iter().filter_map(|v| *v).collect();
        ids.sort_unstable();
        ids.dedup();
        ids.len()
    }

    /// 最近邻扩散
    ///
    /// 以非零编号单元为种子，沿 8 邻域按像元中心距离扩散，
    /// 每个单元取累计距离最近的种子编号。超过 `max_distance` 的单元保持未定义。
    pub fn spread_zone(&self, max_distance: Option<f64>) -> ZoneField {
        let domain = &self.domain;
        let n = domain.cell_count();
        let mut distance = vec![f64::INFINITY; n];
        let mut zone: Vec<Option<i64>> = vec![None; n];
        let mut heap = BinaryHeap::new();

        for ((r, c), id) in self.data.indexed_iter() {
            if let Some(id) = (*id).filter(|id| *id != 0) {
                let i = domain.index(r, c);
                distance[i] = 0.0;
                zone[i] = Some(id);
                heap.push(Frontier { distance: 0.0, index: i });
            }
        }

        let limit = max_distance.unwrap_or(f64::INFINITY);
        while let Some(Frontier { distance: d, index }) = heap.pop() {
            if d > distance[index] {
                continue;
            }
            let (r, c) = domain.position(index);
            for (dr, dc) in NEIGHBOURS {
                let (nr, nc) = (r as isize + dr, c as isize + dc);
                if !domain.contains(nr, nc) {
                    continue;
                }
                let j = domain.index(nr as usize, nc as usize);
                let nd = d + domain.step_distance(dr, dc);
                if nd <= limit && nd < distance[j] {
                    distance[j] = nd;
                    zone[j] = zone[index];
                    heap.push(Frontier { distance: nd, index: j });
                }
            }
        }

        let data = Array2::from_shape_vec(domain.shape(), zone)
            .unwrap_or_else(|_| Array2::from_elem(domain.shape(), None));
        Self {
            domain: domain.clone(),
            data,
        }
    }

    /// 按分区分组已定义的值，返回 (分区 -> 值列表及单元索引)
    fn group(&self, field: &Field) -> ShResult<HashMap<i64, Vec<(usize, f64)>>> {
        ensure_same_domain(&self.domain, field.domain())?;
        let mut groups: HashMap<i64, Vec<(usize, f64)>> = HashMap::new();
        for (((r, c), zone), value) in self.data.indexed_iter().zip(field.data().iter()) {
            if let Some(z) = zone {
                let entry = groups.entry(*z).or_default();
                if is_defined(*value) {
                    entry.push((self.domain.index(r, c), *value));
                }
            }
        }
        Ok(groups)
    }

    /// 把分区归约结果写回分区内所有单元
    fn broadcast<F>(&self, field: &Field, reduce: F) -> ShResult<Field>
    where
        F: Fn(&[(usize, f64)]) -> Option<f64>,
    {
        let groups = self.group(field)?;
        let results: HashMap<i64, f64> = groups
            .iter()
            .filter_map(|(z, values)| reduce(values).map(|v| (*z, v)))
            .collect();
        Ok(Field::from_fn(self.domain.clone(), |r, c| {
            self.get(r, c)
                .and_then(|z| results.get(&z).copied())
                .unwrap_or(f64::NAN)
        }))
    }
}

// ============================================================================
// 分区统计
// ============================================================================

impl Field {
    /// 分区总和
    pub fn area_total(&self, zones: &ZoneField) -> ShResult<Field> {
        zones.broadcast(self, |values| {
            (!values.is_empty()).then(|| values.iter().map(|(_, v)| v).sum())
        })
    }

    /// 分区均值
    pub fn area_average(&self, zones: &ZoneField) -> ShResult<Field> {
        zones.broadcast(self, |values| {
            (!values.is_empty())
                .then(|| values.iter().map(|(_, v)| v).sum::<f64>() / values.len() as f64)
        })
    }

    /// 分区最小值
    pub fn area_minimum(&self, zones: &ZoneField) -> ShResult<Field> {
        zones.broadcast(self, |values| values.iter().map(|(_, v)| *v).reduce(f64::min))
    }

    /// 分区最大值
    pub fn area_maximum(&self, zones: &ZoneField) -> ShResult<Field> {
        zones.broadcast(self, |values| values.iter().map(|(_, v)| *v).reduce(f64::max))
    }

    /// 分区内升序名次（从 1 开始，值相同时按行主序）
    ///
    /// 未定义的值或分区结果未定义。
    pub fn area_order(&self, zones: &ZoneField) -> ShResult<Field> {
        let groups = zones.group(self)?;
        let mut rank = vec![f64::NAN; self.domain().cell_count()];
        for values in groups.values() {
            let mut sorted = values.clone();
            sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
            for (order, (index, _)) in sorted.iter().enumerate() {
                rank[*index] = (order + 1) as f64;
            }
        }
        Field::from_vec(self.domain().clone(), rank)
    }

    /// 用最近的有效单元值填补缺测
    ///
    /// 等价于 `cover(self, area_maximum(self, spread_zone(unique_id(defined(self)))))`。
    pub fn fill_nearest(&self, max_distance: Option<f64>) -> ShResult<Field> {
        let seeds = ZoneField::unique_id(&self.defined());
        let zones = seeds.spread_zone(max_distance);
        let fill = self.area_maximum(&zones)?;
        self.cover_with(&fill)
    }
}

/// Dijkstra 前沿节点（按距离升序出堆）
#[derive(Debug, Clone, Copy)]
struct Frontier {
    distance: f64,
    index: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .distance
            .total_cmp(&self.distance)
            .then_with(|| other.index.cmp(&self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GridDomain;

    #[test]
    fn test_area_statistics() {
        let d = GridDomain::unit(1, 4).shared();
        let zones = ZoneField::from_vec(d.clone(), vec![Some(1), Some(1), Some(2), None]).unwrap();
        let f = Field::from_vec(d, vec![1.0, 3.0, f64::NAN, 5.0]).unwrap();

        let total = f.area_total(&zones).unwrap();
        assert_eq!(total.get(0, 0), Some(4.0));
        assert_eq!(total.get(0, 1), Some(4.0));
        // 分区 2 无有效值
        assert_eq!(total.get(0, 2), None);
        // 无分区
        assert_eq!(total.get(0, 3), None);

        assert_eq!(f.area_average(&zones).unwrap().get(0, 0), Some(2.0));
        assert_eq!(f.area_minimum(&zones).unwrap().get(0, 1), Some(1.0));
        assert_eq!(f.area_maximum(&zones).unwrap().get(0, 0), Some(3.0));
    }

    #[test]
    fn test_area_order() {
        let d = GridDomain::unit(1, 5).shared();
        let zones = ZoneField::constant(d.clone(), 7);
        let f = Field::from_vec(d, vec![0.3, 0.1, f64::NAN, 0.2, 0.1]).unwrap();
        let order = f.area_order(&zones).unwrap();
        assert_eq!(order.to_vec_with_missing(-1.0), vec![4.0, 1.0, -1.0, 3.0, 2.0]);
    }

    #[test]
    fn test_from_field() {
        let d = GridDomain::unit(1, 3).shared();
        let ids = Field::from_vec(d.clone(), vec![3.0, f64::NAN, 3.0]).unwrap();
        let zones = ZoneField::from_field(&ids).unwrap();
        assert_eq!(zones.get(0, 0), Some(3));
        assert_eq!(zones.get(0, 1), None);
        assert_eq!(zones.zone_count(), 1);

        let fractional = Field::from_vec(d, vec![1.0, 1.5, 2.0]).unwrap();
        assert!(matches!(
            ZoneField::from_field(&fractional),
            Err(ShError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_unique_id() {
        let d = GridDomain::unit(2, 2).shared();
        let mask = BoolField::from_vec(d, vec![Some(true), Some(false), None, Some(true)]).unwrap();
        let ids = ZoneField::unique_id(&mask);
        assert_eq!(ids.get(0, 0), Some(1));
        assert_eq!(ids.get(0, 1), None);
        assert_eq!(ids.get(1, 1), Some(2));
        assert_eq!(ids.zone_count(), 2);
    }

    #[test]
    fn test_spread_zone_nearest() {
        let d = GridDomain::unit(1, 5).shared();
        let seeds = ZoneField::from_vec(d, vec![Some(1), None, None, None, Some(2)]).unwrap();
        let spread = seeds.spread_zone(None);
        assert_eq!(spread.get(0, 1), Some(1));
        assert_eq!(spread.get(0, 3), Some(2));
        assert!(spread.get(0, 2).is_some());
    }

    #[test]
    fn test_spread_zone_max_distance() {
        let d = GridDomain::unit(1, 5).shared();
        let seeds = ZoneField::from_vec(d, vec![Some(1), None, None, None, None]).unwrap();
        let spread = seeds.spread_zone(Some(2.0));
        assert_eq!(spread.get(0, 2), Some(1));
        assert_eq!(spread.get(0, 3), None);
    }

    #[test]
    fn test_fill_nearest() {
        let d = GridDomain::unit(3, 3).shared();
        let ndvi = Field::from_vec(
            d,
            vec![
                0.5, f64::NAN, f64::NAN,
                f64::NAN, f64::NAN, f64::NAN,
                f64::NAN, f64::NAN, 0.9,
            ],
        )
        .unwrap();
        let filled = ndvi.fill_nearest(None).unwrap();
        assert!(filled.is_fully_defined());
        assert_eq!(filled.get(0, 1), Some(0.5));
        assert_eq!(filled.get(2, 1), Some(0.9));
        assert_eq!(filled.get(0, 0), Some(0.5));
    }
}
