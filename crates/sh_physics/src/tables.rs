// crates/sh_physics/src/tables.rs

//! 参数表
//!
//! - [`LookupTable`]: 土地覆盖类别 → 数值（糙率、水保因子、截留比例）
//! - [`RangeTable`]: 区间键 → 数值，用于按坡度百分比查糙率基准值
//!
//! 区间键语法：
//!
//! ```text
//! [0,5>     0 ≤ x < 5
//! <5,10]    5 < x ≤ 10
//! <,2]      x ≤ 2
//! [30,>     x ≥ 30
//! 7         x = 7
//! ```

use serde::{Deserialize, Serialize};
use sh_field::Field;
use sh_foundation::error::{ShError, ShResult};

// ============================================================
// 类别查找表
// ============================================================

/// 类别查找表，保持文件中的类别顺序
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LookupTable {
    name: String,
    entries: Vec<(String, f64)>,
}

impl LookupTable {
    /// 创建查找表，重复类别以后出现的值为准
    pub fn new(name: impl Into<String>, entries: Vec<(String, f64)>) -> Self {
        let mut table = Self {
            name: name.into(),
            entries: Vec::with_capacity(entries.len()),
        };
        for (class, value) in entries {
            table.insert(class, value);
        }
        table
    }

    /// 插入或替换类别值
    pub fn insert(&mut self, class: impl Into<String>, value: f64) {
        let class = class.into();
        match self.entries.iter_mut().find(|(c, _)| *c == class) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((class, value)),
        }
    }

    /// 表名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 查找类别值
    pub fn get(&self, class: &str) -> Option<f64> {
        self.entries.iter().find(|(c, _)| c == class).map(|(_, v)| *v)
    }

    /// 查找类别值，缺失时返回 `MissingInput`
    pub fn require(&self, class: &str) -> ShResult<f64> {
        self.get(class)
            .ok_or_else(|| ShError::missing_input(format!("{}: 类别 {}", self.name, class)))
    }

    /// 类别名（文件顺序）
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// 条目数
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================
// 区间查找表
// ============================================================

/// 区间端点
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Bound {
    /// 无界
    Unbounded,
    /// 闭端点
    Inclusive(f64),
    /// 开端点
    Exclusive(f64),
}

/// 区间表的键
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RangeKey {
    /// 精确值
    Exact(f64),
    /// 区间
    Interval {
        /// 下端点
        lower: Bound,
        /// 上端点
        upper: Bound,
    },
}

impl RangeKey {
    /// 解析区间键
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let first = text.chars().next()?;
        let last = text.chars().last()?;

        if !matches!(first, '[' | '<') {
            return text.parse::<f64>().ok().map(RangeKey::Exact);
        }
        if text.len() < 3 || !matches!(last, ']' | '>') {
            return None;
        }

        let inner = &text[1..text.len() - 1];
        let (lo, hi) = inner.split_once(',')?;
        let lower = parse_bound(lo, first == '[')?;
        let upper = parse_bound(hi, last == ']')?;
        Some(RangeKey::Interval { lower, upper })
    }

    /// 值是否落在键内
    pub fn matches(&self, x: f64) -> bool {
        match *self {
            RangeKey::Exact(v) => x == v,
            RangeKey::Interval { lower, upper } => {
                let above = match lower {
                    Bound::Unbounded => true,
                    Bound::Inclusive(lo) => x >= lo,
                    Bound::Exclusive(lo) => x > lo,
                };
                let below = match upper {
                    Bound::Unbounded => true,
                    Bound::Inclusive(hi) => x <= hi,
                    Bound::Exclusive(hi) => x < hi,
                };
                above && below
            }
        }
    }
}

fn parse_bound(text: &str, inclusive: bool) -> Option<Bound> {
    let text = text.trim();
    if text.is_empty() {
        return Some(Bound::Unbounded);
    }
    let value = text.parse::<f64>().ok()?;
    Some(if inclusive {
        Bound::Inclusive(value)
    } else {
        Bound::Exclusive(value)
    })
}

/// 区间查找表，首个匹配行生效
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    name: String,
    rows: Vec<(RangeKey, f64)>,
}

impl RangeTable {
    /// 创建区间表
    pub fn new(name: impl Into<String>, rows: Vec<(RangeKey, f64)>) -> Self {
        Self {
            name: name.into(),
            rows,
        }
    }

    /// 表名
    pub fn name(&self) -> &str {
        &self.name
    }

    /// 行数
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 查找单个值
    pub fn lookup(&self, x: f64) -> Option<f64> {
        self.rows
            .iter()
            .find(|(key, _)| key.matches(x))
            .map(|(_, v)| *v)
    }

    /// 逐单元查找（lookupscalar），无匹配行的单元未定义
    pub fn apply(&self, field: &Field) -> Field {
        field.map(|x| self.lookup(x).unwrap_or(f64::NAN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sh_field::GridDomain;

    #[test]
    fn test_lookup_table_duplicates() {
        let table = LookupTable::new(
            "P_factor.txt",
            vec![("forest".into(), 0.5), ("grass".into(), 0.8), ("forest".into(), 0.6)],
        );
        assert_eq!(table.len(), 2);
        assert_eq!(table.get("forest"), Some(0.6));
        assert_eq!(table.classes().collect::<Vec<_>>(), vec!["forest", "grass"]);
        assert!(matches!(table.require("urban"), Err(ShError::MissingInput { .. })));
    }

    #[test]
    fn test_range_key_parse() {
        assert_eq!(
            RangeKey::parse("[0,5>"),
            Some(RangeKey::Interval {
                lower: Bound::Inclusive(0.0),
                upper: Bound::Exclusive(5.0)
            })
        );
        assert_eq!(
            RangeKey::parse("<,2]"),
            Some(RangeKey::Interval {
                lower: Bound::Unbounded,
                upper: Bound::Inclusive(2.0)
            })
        );
        assert_eq!(RangeKey::parse(" 7 "), Some(RangeKey::Exact(7.0)));
        assert_eq!(RangeKey::parse("[a,3>"), None);
        assert_eq!(RangeKey::parse("[3"), None);
    }

    #[test]
    fn test_range_table_first_match() {
        let rows = vec![
            (RangeKey::parse("[0,5>").unwrap(), 0.01),
            (RangeKey::parse("[5,>").unwrap(), 0.05),
            (RangeKey::parse("[0,>").unwrap(), 0.99),
        ];
        let table = RangeTable::new("ManningN1.txt", rows);
        assert_eq!(table.lookup(0.0), Some(0.01));
        assert_eq!(table.lookup(5.0), Some(0.05));
        assert_eq!(table.lookup(-1.0), None);

        let d = GridDomain::unit(1, 3).shared();
        let slope = Field::from_vec(d, vec![1.0, 50.0, -3.0]).unwrap();
        let n1 = table.apply(&slope);
        assert_eq!(n1.get(0, 0), Some(0.01));
        assert_eq!(n1.get(0, 1), Some(0.05));
        assert_eq!(n1.get(0, 2), None);
    }
}
