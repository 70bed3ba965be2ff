//! # 输入边界模块
//!
//! ## 设计思路
//!
//! 在“尽可能早”的阶段执行输入校验：声明类型不是图片的文件不进入解码器。
//! 同时负责 Data URL 与字节之间的互转，展示层拿到的两张图都以 Data URL 呈现。
//!
//! ## 实现思路
//!
//! - 声明类型：只看 `;` 之前的主体部分，忽略大小写与首尾空白。
//! - Data URL：仅支持 `;base64,` 形式，声明类型同样走图片类型校验。
//! - Base64 解码前先按长度估算体积，超限直接拒绝，避免无谓分配。

use base64::{Engine as _, engine::general_purpose};
use once_cell::sync::Lazy;
use regex::Regex;

use super::source::ImageFile;
use super::{DefragConfig, DefragError};

static IMAGE_MIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^image/[a-z0-9][a-z0-9!#$&^_.+-]*$").expect("image mime pattern is valid")
});

static DATA_URL_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^data:([^,]*?);base64,").expect("data url pattern is valid")
});

/// 判断声明类型是否为图片类型。
pub fn is_image_mime(mime_type: &str) -> bool {
    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    IMAGE_MIME.is_match(essence)
}

/// 校验声明类型，非图片直接拒绝。
pub fn validate_input_type(mime_type: &str) -> Result<(), DefragError> {
    if is_image_mime(mime_type) {
        Ok(())
    } else {
        Err(DefragError::InvalidInputType(mime_type.to_string()))
    }
}

/// 解析 `data:<mime>;base64,<payload>` 为图片文件。
pub fn parse_data_url(data: &str, config: &DefragConfig) -> Result<ImageFile, DefragError> {
    let data = data.trim();
    let captures = DATA_URL_HEADER
        .captures(data)
        .ok_or_else(|| DefragError::InvalidFormat("无效的 Data URL：缺少 base64 标记".to_string()))?;

    let header_end = captures.get(0).map(|m| m.end()).unwrap_or_default();
    let mime_type = captures
        .get(1)
        .map(|m| m.as_str())
        .unwrap_or_default()
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    validate_input_type(&mime_type)?;

    let payload = &data[header_end..];
    let estimated = (payload.len() as u64 / 4).saturating_mul(3);
    if estimated > config.max_file_size {
        return Err(DefragError::ResourceLimit(format!(
            "Base64 解码后体积过大：{:.2} MB（限制：{:.2} MB）",
            estimated as f64 / 1024.0 / 1024.0,
            config.max_file_size as f64 / 1024.0 / 1024.0
        )));
    }

    let bytes = general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| DefragError::InvalidFormat(format!("Base64 解码失败：{}", e)))?;

    Ok(ImageFile::new(bytes, mime_type))
}

/// 将字节编码为 Data URL。
pub(crate) fn build_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_image_types() {
        for mime in [
            "image/png",
            "image/jpeg",
            "IMAGE/GIF",
            " image/svg+xml ",
            "image/png; charset=binary",
        ] {
            assert!(is_image_mime(mime), "{mime} should be accepted");
        }
    }

    #[test]
    fn rejects_non_image_types() {
        for mime in [
            "text/plain",
            "",
            "application/octet-stream",
            "image/",
            "video/image",
            "x-image/png",
        ] {
            let result = validate_input_type(mime);
            assert!(
                matches!(result, Err(DefragError::InvalidInputType(ref t)) if t == mime),
                "{mime} should be rejected"
            );
        }
    }

    #[test]
    fn parse_data_url_extracts_type_and_bytes() {
        let file = parse_data_url("data:image/png;base64,AQID", &DefragConfig::default())
            .expect("valid data url");

        assert_eq!(file.mime_type, "image/png");
        assert_eq!(&file.bytes[..], &[1u8, 2, 3]);
    }

    #[test]
    fn parse_data_url_ignores_extra_parameters() {
        let file = parse_data_url("data:image/gif;name=a.gif;base64,AQID", &DefragConfig::default())
            .expect("valid data url");
        assert_eq!(file.mime_type, "image/gif");
    }

    #[test]
    fn parse_data_url_rejects_text_payload() {
        let result = parse_data_url("data:text/plain;base64,aGVsbG8=", &DefragConfig::default());
        assert!(matches!(result, Err(DefragError::InvalidInputType(_))));
    }

    #[test]
    fn parse_data_url_rejects_malformed_input() {
        let config = DefragConfig::default();

        assert!(matches!(
            parse_data_url("image/png;base64,AQID", &config),
            Err(DefragError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_data_url("data:image/png,AQID", &config),
            Err(DefragError::InvalidFormat(_))
        ));
        assert!(matches!(
            parse_data_url("data:image/png;base64,@@@", &config),
            Err(DefragError::InvalidFormat(_))
        ));
    }

    #[test]
    fn parse_data_url_enforces_size_limit_before_decoding() {
        let config = DefragConfig {
            max_file_size: 1024,
            ..DefragConfig::default()
        };
        let payload = "A".repeat(4096);
        let result = parse_data_url(&format!("data:image/png;base64,{payload}"), &config);
        assert!(matches!(result, Err(DefragError::ResourceLimit(_))));
    }

    #[test]
    fn build_then_parse_preserves_bytes() {
        let url = build_data_url("image/webp", &[0, 255, 128]);
        let file = parse_data_url(&url, &DefragConfig::default()).expect("built url parses");
        assert_eq!(file.mime_type, "image/webp");
        assert_eq!(&file.bytes[..], &[0u8, 255, 128]);
    }
}
