// crates/sh_io/src/ascii_grid.rs

//! ESRI ASCII 栅格
//!
//! 文件头为若干 `键 值` 行（大小写不敏感）：
//!
//! ```text
//! ncols         3
//! nrows         2
//! xllcorner     100.0
//! yllcorner     20.0
//! cellsize      0.5
//! NODATA_value  -9999
//! 1 2 3
//! 4 5 -9999
//! ```
//!
//! `xllcenter`/`yllcenter` 按半个像元换算为角点；`dx`/`dy` 可替代 `cellsize`。
//! 等于 NODATA 的数值读为未定义。

use sh_field::{Field, GridDomain, SharedDomain};
use sh_foundation::error::{ShError, ShResult};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// 解析后的栅格
#[derive(Debug, Clone)]
pub struct AsciiGrid {
    /// 栅格几何
    pub domain: GridDomain,
    /// 行优先数值，NODATA 已替换为 NaN
    pub values: Vec<f64>,
    /// 文件声明的 NODATA 值
    pub nodata: Option<f64>,
}

impl AsciiGrid {
    /// 绑定到给定研究域，几何不一致时返回 `DomainMismatch`
    pub fn into_field(self, domain: &SharedDomain) -> ShResult<Field> {
        domain.ensure_same(&self.domain)?;
        Field::from_vec(domain.clone(), self.values)
    }
}

#[derive(Default)]
struct Header {
    ncols: Option<usize>,
    nrows: Option<usize>,
    x: Option<(f64, bool)>,
    y: Option<(f64, bool)>,
    dx: Option<f64>,
    dy: Option<f64>,
    nodata: Option<f64>,
}

/// 读取 ASCII 栅格文件
pub fn read_ascii_grid(path: impl AsRef<Path>) -> ShResult<AsciiGrid> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(ShError::file_not_found(path));
    }
    let content = fs::read_to_string(path)
        .map_err(|e| ShError::io_with_source(format!("读取栅格失败: {}", path.display()), e))?;
    parse_ascii_grid(&content, Some(path))
}

/// 解析 ASCII 栅格文本
pub fn parse_ascii_grid(content: &str, path: Option<&Path>) -> ShResult<AsciiGrid> {
    let file: PathBuf = path.map(Path::to_path_buf).unwrap_or_default();
    let mut header = Header::default();
    let mut values = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let line_no = line_num + 1;

        // 文件头只出现在数值之前，且首个记号不是数（`nan`/`inf` 属于数值行）
        let is_header = values.is_empty()
            && trimmed
                .split_whitespace()
                .next()
                .is_some_and(|token| token.parse::<f64>().is_err());
        if is_header {
            parse_header_line(&mut header, trimmed, &file, line_no)?;
            continue;
        }

        for token in trimmed.split_whitespace() {
            let v: f64 = token.parse().map_err(|_| {
                ShError::parse(&file, line_no, format!("无效的栅格数值: '{}'", token))
            })?;
            values.push(v);
        }
    }

    let missing = |key: &str| ShError::parse(&file, 0, format!("文件头缺少 {}", key));
    let ncols = header.ncols.ok_or_else(|| missing("ncols"))?;
    let nrows = header.nrows.ok_or_else(|| missing("nrows"))?;
    let dx = header.dx.ok_or_else(|| missing("cellsize"))?;
    let dy = header.dy.unwrap_or(dx);
    let (x, x_center) = header.x.unwrap_or((0.0, false));
    let (y, y_center) = header.y.unwrap_or((0.0, false));

    let x_corner = if x_center { x - 0.5 * dx } else { x };
    let y_corner = if y_center { y - 0.5 * dy } else { y };
    let domain = GridDomain::new(
        nrows,
        ncols,
        x_corner,
        y_corner + nrows as f64 * dy,
        dx,
        dy,
    )?;

    ShError::check_size("栅格数值", domain.cell_count(), values.len())?;

    if let Some(nodata) = header.nodata {
        for v in values.iter_mut() {
            if *v == nodata {
                *v = f64::NAN;
            }
        }
    }

    Ok(AsciiGrid {
        domain,
        values,
        nodata: header.nodata,
    })
}

fn parse_header_line(header: &mut Header, line: &str, file: &Path, line_no: usize) -> ShResult<()> {
    let mut parts = line.split_whitespace();
    let key = parts.next().unwrap_or_default().to_ascii_lowercase();
    let value = parts
        .next()
        .ok_or_else(|| ShError::parse(file, line_no, format!("文件头 {} 缺少取值", key)))?;
    let number = || -> ShResult<f64> {
        value
            .parse::<f64>()
            .map_err(|_| ShError::parse(file, line_no, format!("{} 的取值无效: '{}'", key, value)))
    };
    let count = || -> ShResult<usize> {
        value
            .parse::<usize>()
            .map_err(|_| ShError::parse(file, line_no, format!("{} 的取值无效: '{}'", key, value)))
    };

    match key.as_str() {
        "ncols" => header.ncols = Some(count()?),
        "nrows" => header.nrows = Some(count()?),
        "xllcorner" => header.x = Some((number()?, false)),
        "xllcenter" => header.x = Some((number()?, true)),
        "yllcorner" => header.y = Some((number()?, false)),
        "yllcenter" => header.y = Some((number()?, true)),
        "cellsize" | "dx" => header.dx = Some(number()?),
        "dy" => header.dy = Some(number()?),
        "nodata_value" => header.nodata = Some(number()?),
        _ => {
            return Err(ShError::parse(
                file,
                line_no,
                format!("未知的文件头字段: {}", key),
            ))
        }
    }
    Ok(())
}

/// 格式化为 ASCII 栅格文本，未定义单元写为 `nodata`
pub fn format_ascii_grid(field: &Field, nodata: f64) -> String {
    let domain = field.domain();
    let mut out = String::new();
    let y_corner = domain.origin_y - domain.rows as f64 * domain.cell_height;

    let _ = writeln!(out, "ncols         {}", domain.cols);
    let _ = writeln!(out, "nrows         {}", domain.rows);
    let _ = writeln!(out, "xllcorner     {}", domain.origin_x);
    let _ = writeln!(out, "yllcorner     {}", y_corner);
    if domain.cell_width == domain.cell_height {
        let _ = writeln!(out, "cellsize      {}", domain.cell_width);
    } else {
        let _ = writeln!(out, "dx            {}", domain.cell_width);
        let _ = writeln!(out, "dy            {}", domain.cell_height);
    }
    let _ = writeln!(out, "NODATA_value  {}", nodata);

    for row in field.data().rows() {
        let line: Vec<String> = row
            .iter()
            .map(|v| if v.is_finite() { v.to_string() } else { nodata.to_string() })
            .collect();
        out.push_str(&line.join(" "));
        out.push('\n');
    }
    out
}

/// 写出 ASCII 栅格文件
pub fn write_ascii_grid(path: impl AsRef<Path>, field: &Field, nodata: f64) -> ShResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_ascii_grid(field, nodata))
        .map_err(|e| ShError::io_with_source(format!("写出栅格失败: {}", path.display()), e))
}
