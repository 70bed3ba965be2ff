//! # 编码模块
//!
//! ## 设计思路
//!
//! 将像素缓冲按原宽高、行优先顺序写成 PNG。PNG 为无损格式，
//! 编码结果再解码可逐字节还原像素，因此不引入任何有损选项。
//!
//! 每次调用自行构建并丢弃图像缓冲，不存在全局画布。

use image::{ImageBuffer, ImageFormat, Rgba};
use std::io::Cursor;

use super::DefragError;
use super::source::{ImageBytes, PixelBuffer};

/// 编码输出的 MIME 类型。
pub const OUTPUT_MIME_TYPE: &str = "image/png";

/// 将像素缓冲编码为 PNG 字节。
pub fn encode_png(buffer: &PixelBuffer) -> Result<ImageBytes, DefragError> {
    let (width, height) = (buffer.width(), buffer.height());

    if width == 0 || height == 0 {
        return Err(DefragError::Encode(format!(
            "无法为 {}x{} 的缓冲创建图像",
            width, height
        )));
    }

    let rgba = ImageBuffer::<Rgba<u8>, Vec<u8>>::from_raw(width, height, buffer.as_raw().to_vec())
        .ok_or_else(|| DefragError::Encode("像素缓冲长度与尺寸不匹配".to_string()))?;

    let mut cursor = Cursor::new(Vec::new());
    rgba.write_to(&mut cursor, ImageFormat::Png)
        .map_err(|e| DefragError::Encode(format!("PNG 编码失败：{}", e)))?;

    let bytes = cursor.into_inner();
    log::debug!("🖼️ PNG 编码完成 - 尺寸: {}x{} 大小: {} bytes", width, height, bytes.len());

    Ok(ImageBytes::from(bytes))
}
