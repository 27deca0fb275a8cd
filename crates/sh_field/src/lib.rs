// crates/sh_field/src/lib.rs

//! SedHydro 空间场代数
//!
//! 规则栅格上的场类型与算子，其余各层均构建于此之上。
//!
//! # 模块
//!
//! - [`domain`]: 研究域（行列数、原点与像元尺寸）
//! - [`field`]: 标量场 [`Field`] 及逐单元算子
//! - [`mask`]: 布尔场 [`BoolField`]、条件选择
//! - [`zone`]: 分区场 [`ZoneField`]、分区统计、最近邻扩散填充
//! - [`ldd`]: 流向场 [`LddField`] 与沿流向累积
//!
//! # 缺测约定
//!
//! 标量场用 NaN 表示未定义单元，任何算子产生的非有限值都归一为未定义。
//! 未定义操作数沿算子传播，只有 `cover` 系列会填补缺测。
//!
//! # 示例
//!
//! ```
//! use sh_field::{Field, GridDomain};
//!
//! let domain = GridDomain::unit(2, 2).shared();
//! let a = Field::from_vec(domain.clone(), vec![1.0, 2.0, f64::NAN, 4.0]).unwrap();
//! let b = Field::constant(domain, 2.0);
//!
//! let c = a.times(&b).unwrap().cover(0.0);
//! assert_eq!(c.get(1, 0), Some(0.0));
//! assert_eq!(c.get(1, 1), Some(8.0));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod domain;
pub mod field;
pub mod ldd;
pub mod mask;
pub mod zone;

pub use domain::{GridDomain, SharedDomain};
pub use field::Field;
pub use ldd::LddField;
pub use mask::BoolField;
pub use zone::ZoneField;
