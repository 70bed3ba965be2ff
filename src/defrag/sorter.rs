//! # 像素排序模块
//!
//! 按 (R, G, B, A) 字典序升序重排全部像素，宽高不变。
//! 纯同步计算，不挂起、不修改输入。相同像素值之间不保证稳定顺序，
//! 因为它们无法区分。

use super::source::{Pixel, PixelBuffer};

/// 返回像素已排序的新缓冲。
pub fn sort_pixels(buffer: &PixelBuffer) -> PixelBuffer {
    if buffer.pixel_count() <= 1 {
        return buffer.clone();
    }

    log::debug!("🔀 开始整理像素 - 数量: {}", buffer.pixel_count());

    let mut pixels: Vec<Pixel> = buffer.to_pixels();
    pixels.sort_unstable();

    let data: Vec<u8> = pixels.into_iter().flat_map(|pixel| pixel.0).collect();

    log::debug!("✅ 像素整理完成");

    buffer.with_same_dimensions(data)
}

/// 判断缓冲是否已按字典序排列。
pub fn is_sorted(buffer: &PixelBuffer) -> bool {
    let pixels = buffer.to_pixels();
    pixels.windows(2).all(|pair| pair[0] <= pair[1])
}
