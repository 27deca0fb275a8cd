// crates/sh_physics/src/lib.rs

//! SedHydro Physics Layer (Layer 4)
//!
//! RUSLE 月尺度土壤侵蚀与产沙计算。所有因子均为纯粹的场进场出函数，
//! 与输入输出和流程编排分离。
//!
//! # 模块概览
//!
//! - [`tables`]: 类别查找表与区间查找表
//! - [`landcover`]: 土地覆盖比例归一化、类别加权、水保因子
//! - [`slope`]: 地形因子 LS
//! - [`erodibility`]: 可蚀性 K、季节比、融化时间比例
//! - [`erosivity`]: 侵蚀力 R 及其月分配
//! - [`cover`]: 植被覆盖因子 C、NDVI 覆盖度、耕地代表坡度
//! - [`roughness`]: Manning 糙率
//! - [`delivery`]: 土壤流失、水文系数、输移比、产沙量
//! - [`statics`]: 静态因子阶段
//! - [`monthly`]: 月尺度阶段
//! - [`validator`]: 研究域完整性检查
//! - [`clock`]: 月步长时钟
//!
//! # 计算流程
//!
//! ```text
//! 覆盖归一化 → 静态因子 → 完整性检查
//!     └─> [时钟前进 → 月尺度计算 → 完整性检查] × n_steps
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod clock;
pub mod cover;
pub mod delivery;
pub mod erodibility;
pub mod erosivity;
pub mod landcover;
pub mod monthly;
pub mod roughness;
pub mod slope;
pub mod statics;
pub mod tables;
pub mod validator;

pub use clock::TimestepClock;
pub use landcover::{CoverClass, CroplandRule, LandCoverFractions};
pub use monthly::{MonthlyInputs, MonthlyRawInputs, MonthlyState};
pub use statics::{StaticFactors, StaticInputs};
pub use tables::{LookupTable, RangeKey, RangeTable};
pub use validator::{CompletenessOutcome, CompletenessValidator};
