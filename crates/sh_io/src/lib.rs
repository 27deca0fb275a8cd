// crates/sh_io/src/lib.rs

//! SedHydro IO 模块
//!
//! 引擎只通过两个协作接口与外部交换数据：
//!
//! - [`FieldSource`]: 读取命名栅格、逐月图层、参数表与时间序列数据集
//! - [`ResultSink`]: 持久化静态/月输出与时间序列产品
//!
//! # 模块
//!
//! - [`traits`]: 协作接口与 [`TimedField`]
//! - [`naming`]: 8 字符输出命名（`generate_name_t`）
//! - [`ascii_grid`]: ESRI ASCII 栅格读写
//! - [`table`]: 制表符分隔的参数表
//! - [`temporal`]: 时间序列取值（最近、线性、向前、向后）
//! - [`timeseries`]: `.jsonl` 时间序列产品
//! - [`memory`]: 内存实现（测试与嵌入使用）
//! - [`directory`]: 目录实现
//!
//! # 使用示例
//!
//! ```rust,ignore
//! use sh_io::{DirectorySink, DirectorySource, FieldSource};
//!
//! let source = DirectorySource::new("maps", "tables");
//! let slope = source.read_field("slope05min_avgFrom30sec")?;
//! let manning = source.read_lookup_table("Landcover_n4.txt")?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ascii_grid;
pub mod directory;
pub mod memory;
pub mod naming;
pub mod table;
pub mod temporal;
pub mod timeseries;
pub mod traits;

// 重导出常用类型
pub use ascii_grid::{read_ascii_grid, write_ascii_grid, AsciiGrid};
pub use directory::{DirectorySink, DirectorySource};
pub use memory::{MemorySink, MemorySource, SinkRecord};
pub use naming::{fits_legacy_name, generate_name_t, LEGACY_NAME_LENGTH};
pub use sh_config::TemporalMethod;
pub use table::{load_lookup_table, load_range_table, parse_lookup_table, parse_range_table};
pub use timeseries::{TimeseriesHeader, TimeseriesRecord};
pub use traits::{FieldSource, ResultSink, TimedField};
