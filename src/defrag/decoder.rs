//! # 解码模块
//!
//! ## 设计思路
//!
//! 将“字节 → 图像 → RGBA 像素网格”的过程集中管理，并在完整解码前做尺寸检查，
//! 降低恶意输入触发高内存开销的风险。
//!
//! ## 实现思路
//!
//! 1. 文件签名探测，明确识别为非图片时直接失败
//! 2. 读取 header 尺寸，零尺寸或超限时快速拒绝
//! 3. 完整解码（异步入口放到阻塞线程池，等待完成信号）
//! 4. 按 EXIF 方向旋转/翻转，宽高与浏览器展示的自然尺寸一致
//! 5. 转换为 8 位 RGBA，不缩放、不预乘 alpha
//! 6. 校验尺寸与字节长度一致性

use image::metadata::Orientation;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageReader};
use std::io::Cursor;

use super::source::{ImageBytes, PixelBuffer};
use super::{DefragConfig, DefragError};

/// 异步解码入口。
///
/// 完整解码在 tokio 阻塞线程池中执行，等待期间不阻塞其他任务。
/// 必须在 tokio 运行时内调用。
pub async fn decode(bytes: ImageBytes, config: &DefragConfig) -> Result<PixelBuffer, DefragError> {
    let config = config.clone();

    tokio::task::spawn_blocking(move || decode_blocking(&bytes, &config))
        .await
        .map_err(|e| DefragError::Decode(format!("解码线程执行失败：{}", e)))?
}

/// 同步解码。供非异步环境或已处于阻塞线程中的调用方使用。
pub fn decode_blocking(bytes: &[u8], config: &DefragConfig) -> Result<PixelBuffer, DefragError> {
    validate_image_signature(bytes)?;

    let (header_width, header_height) = inspect_dimensions(bytes)?;
    if header_width == 0 || header_height == 0 {
        return Err(DefragError::Decode(format!(
            "图片尺寸无效：{}x{}",
            header_width, header_height
        )));
    }
    config.check_dimensions(header_width, header_height)?;

    let mut decoder = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DefragError::Decode(format!("无法识别图片格式：{}", e)))?
        .into_decoder()
        .map_err(|e| DefragError::Decode(format!("无法创建解码器：{}", e)))?;

    // 方向信息缺失或损坏时按原样展示
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut decoded = DynamicImage::from_decoder(decoder)
        .map_err(|e| DefragError::Decode(format!("图片解码失败：{}", e)))?;

    let (width, height) = decoded.dimensions();
    if (width, height) != (header_width, header_height) {
        return Err(DefragError::Decode(format!(
            "解码尺寸 {}x{} 与文件头 {}x{} 不一致",
            width, height, header_width, header_height
        )));
    }

    if orientation != Orientation::NoTransforms {
        log::debug!("🔄 应用 EXIF 方向: {:?}", orientation);
        decoded.apply_orientation(orientation);
    }

    let buffer = into_pixel_buffer(decoded)?;

    log::debug!(
        "🧩 像素提取完成 - 尺寸: {}x{}",
        buffer.width(),
        buffer.height()
    );

    Ok(buffer)
}

fn into_pixel_buffer(image: DynamicImage) -> Result<PixelBuffer, DefragError> {
    let rgba = image.into_rgba8();
    let (width, height) = rgba.dimensions();
    let data = rgba.into_raw();

    let expected_len = PixelBuffer::expected_len(width, height)
        .ok_or_else(|| DefragError::ResourceLimit("图片尺寸导致内存溢出风险".to_string()))?;

    if data.len() != expected_len {
        return Err(DefragError::Decode("解码后像素数据长度异常".to_string()));
    }

    PixelBuffer::new(width, height, data)
}

/// 仅通过图片头信息读取宽高。
fn inspect_dimensions(bytes: &[u8]) -> Result<(u32, u32), DefragError> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DefragError::Decode(format!("无法识别图片格式：{}", e)))?;

    reader
        .into_dimensions()
        .map_err(|e| DefragError::Decode(format!("无法读取图片尺寸：{}", e)))
}

fn validate_image_signature(bytes: &[u8]) -> Result<(), DefragError> {
    if bytes.is_empty() {
        return Err(DefragError::Decode("图片内容为空".to_string()));
    }

    if let Some(kind) = infer::get(bytes) {
        if kind.matcher_type() != infer::MatcherType::Image {
            return Err(DefragError::Decode(format!(
                "文件签名不是图片类型：{}",
                kind.mime_type()
            )));
        }
    }

    Ok(())
}
