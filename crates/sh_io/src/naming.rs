// crates/sh_io/src/naming.rs

//! 逐月图层命名
//!
//! 沿用 PCRaster 的 8.3 文件名：词干以 0 补足，与步号合计 11 个字符，
//! 在第 8 个字符后插入扩展名分隔点。
//!
//! | 词干 | 步号 | 文件名 |
//! |------|------|--------|
//! | `ndvi` | 1 | `ndvi0000.001` |
//! | `R_month` | 12 | `R_month0.012` |
//! | `SoilLoss` | 3 | `SoilLoss.003` |

use sh_foundation::error::{ShError, ShResult};
use tracing::warn;

/// 输出名最大长度
pub const LEGACY_NAME_LENGTH: usize = 8;

/// 文件名（不含分隔点）总长度
const NAME_WITH_STEP_LENGTH: usize = 11;

/// 词干 + 步号 → 8.3 文件名
pub fn generate_name_t(stem: &str, step_index: usize) -> ShResult<String> {
    let digits = step_index.to_string();
    let used = stem.len() + digits.len();
    if stem.is_empty() || !stem.is_ascii() || used > NAME_WITH_STEP_LENGTH {
        return Err(ShError::invalid_input(format!(
            "无法为 '{}' 第 {} 步生成文件名",
            stem, step_index
        )));
    }

    let mut name = String::with_capacity(NAME_WITH_STEP_LENGTH + 1);
    name.push_str(stem);
    name.extend(std::iter::repeat('0').take(NAME_WITH_STEP_LENGTH - used));
    name.push_str(&digits);
    name.insert(LEGACY_NAME_LENGTH, '.');
    Ok(name)
}

/// 输出名是否满足 8 字符限制；超长时记录警告
pub fn fits_legacy_name(name: &str) -> bool {
    let fits = !name.is_empty() && name.chars().count() <= LEGACY_NAME_LENGTH;
    if !fits {
        warn!("输出名 '{}' 超过 {} 个字符，跳过写出", name, LEGACY_NAME_LENGTH);
    }
    fits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_name_t() {
        assert_eq!(generate_name_t("ndvi", 1).unwrap(), "ndvi0000.001");
        assert_eq!(generate_name_t("R_month", 12).unwrap(), "R_month0.012");
        assert_eq!(generate_name_t("SoilLoss", 3).unwrap(), "SoilLoss.003");
        assert_eq!(generate_name_t("Pre9", 240).unwrap(), "Pre90000.240");
        assert_eq!(generate_name_t("tmax", 1000).unwrap(), "tmax0001.000");
    }

    #[test]
    fn test_generate_name_t_too_long() {
        assert!(generate_name_t("SoilLoss", 1000).is_err());
        assert!(generate_name_t("", 1).is_err());
    }

    #[test]
    fn test_fits_legacy_name() {
        assert!(fits_legacy_name("DelRatio"));
        assert!(!fits_legacy_name("DeliveryRatio"));
    }
}
