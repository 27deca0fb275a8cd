// crates/sh_io/src/table.rs

//! 制表符分隔的参数表
//!
//! 每行 `键<TAB>值`；没有制表符时按最后一段空白切分，因此类别名可以含空格。
//! 空行和 `#` 开头的行被跳过；其余每行的值都必须是数字，否则报带行号的解析错误。
//!
//! 类别表：
//!
//! ```text
//! # class	n
//! forest	0.40
//! croplands	0.20
//! ```
//!
//! 区间表（PCRaster 键语法）：
//!
//! ```text
//! [0,5>	0.030
//! [5,15>	0.045
//! [15,>	0.060
//! ```

use sh_foundation::error::{ShError, ShResult};
use sh_physics::{LookupTable, RangeKey, RangeTable};
use std::fs;
use std::path::{Path, PathBuf};

const COMMENT_PREFIX: char = '#';

/// 读取类别 → 数值表
pub fn load_lookup_table(path: impl AsRef<Path>) -> ShResult<LookupTable> {
    let path = path.as_ref();
    let content = read_table_file(path)?;
    parse_lookup_table(&table_name(path), &content, Some(path))
}

/// 读取区间表
pub fn load_range_table(path: impl AsRef<Path>) -> ShResult<RangeTable> {
    let path = path.as_ref();
    let content = read_table_file(path)?;
    parse_range_table(&table_name(path), &content, Some(path))
}

/// 解析类别 → 数值表
pub fn parse_lookup_table(name: &str, content: &str, path: Option<&Path>) -> ShResult<LookupTable> {
    let rows = parse_rows(content, path)?;
    let entries = rows
        .into_iter()
        .map(|row| (row.key, row.value))
        .collect();
    Ok(LookupTable::new(name, entries))
}

/// 解析区间表
pub fn parse_range_table(name: &str, content: &str, path: Option<&Path>) -> ShResult<RangeTable> {
    let file = path.map(Path::to_path_buf).unwrap_or_default();
    let mut rows = Vec::new();
    for row in parse_rows(content, path)? {
        let key = RangeKey::parse(&row.key).ok_or_else(|| {
            ShError::parse(&file, row.line, format!("无效的区间键: '{}'", row.key))
        })?;
        rows.push((key, row.value));
    }
    Ok(RangeTable::new(name, rows))
}

struct Row {
    line: usize,
    key: String,
    value: f64,
}

fn parse_rows(content: &str, path: Option<&Path>) -> ShResult<Vec<Row>> {
    let file: PathBuf = path.map(Path::to_path_buf).unwrap_or_default();
    let mut rows = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with(COMMENT_PREFIX) {
            continue;
        }
        let line_no = line_num + 1;

        let (key, value) = split_row(trimmed)
            .ok_or_else(|| ShError::parse(&file, line_no, "需要键和值两列"))?;
        let value = value.parse::<f64>().map_err(|_| {
            ShError::parse(&file, line_no, format!("'{}' 的数值无效: '{}'", key, value))
        })?;
        rows.push(Row {
            line: line_no,
            key: key.to_string(),
            value,
        });
    }

    Ok(rows)
}

fn split_row(line: &str) -> Option<(&str, &str)> {
    let (key, value) = match line.split_once('\t') {
        Some((k, v)) => (k, v),
        None => line.rsplit_once(char::is_whitespace)?,
    };
    let (key, value) = (key.trim(), value.trim());
    (!key.is_empty() && !value.is_empty()).then_some((key, value))
}

fn read_table_file(path: &Path) -> ShResult<String> {
    if !path.exists() {
        return Err(ShError::file_not_found(path));
    }
    fs::read_to_string(path)
        .map_err(|e| ShError::io_with_source(format!("读取参数表失败: {}", path.display()), e))
}

fn table_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
