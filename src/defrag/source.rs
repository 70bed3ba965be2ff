//! # 数据源与中间模型
//!
//! ## 设计思路
//!
//! 将“外部输入”和“流水线中间结果”解耦：
//! - `ImageFile` 表示展示层交来的文件（字节 + 声明类型）
//! - `PixelBuffer` 表示解码后、编码前的 RGBA 像素网格
//! - `DisplayImage` 表示可直接交给展示层渲染的图片
//!
//! 所有模型都只属于单次调用，不跨调用缓存。

use bytes::Bytes;

use super::{DefragError, loader};

/// 已编码的图片字节（PNG/JPEG/GIF 等容器格式），构造后不可变。
pub type ImageBytes = Bytes;

/// 展示层交来的图片文件。
#[derive(Debug, Clone)]
pub struct ImageFile {
    /// 原始文件字节。
    pub bytes: ImageBytes,
    /// 文件声明的 MIME 类型，如 `image/png`。
    pub mime_type: String,
}

impl ImageFile {
    pub fn new(bytes: impl Into<ImageBytes>, mime_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// 单个像素 (R, G, B, A)。
///
/// 派生的 `Ord` 按数组逐字节比较，即 R → G → B → A 的字典序。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pixel(pub [u8; 4]);

impl Pixel {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self([r, g, b, a])
    }

    pub const fn r(self) -> u8 {
        self.0[0]
    }

    pub const fn g(self) -> u8 {
        self.0[1]
    }

    pub const fn b(self) -> u8 {
        self.0[2]
    }

    pub const fn a(self) -> u8 {
        self.0[3]
    }
}

impl From<(u8, u8, u8, u8)> for Pixel {
    fn from((r, g, b, a): (u8, u8, u8, u8)) -> Self {
        Self::new(r, g, b, a)
    }
}

/// 行优先的 RGBA 像素缓冲。
///
/// 不变量：`data.len() == width * height * 4`。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl PixelBuffer {
    /// 由扁平 RGBA 字节构造，长度必须与宽高一致。
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, DefragError> {
        let expected = Self::expected_len(width, height)
            .ok_or_else(|| DefragError::ResourceLimit("像素缓冲尺寸溢出".to_string()))?;

        if data.len() != expected {
            return Err(DefragError::InvalidFormat(format!(
                "像素数据长度 {} 与尺寸 {}x{} 不匹配（应为 {}）",
                data.len(),
                width,
                height,
                expected
            )));
        }

        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// 由像素序列构造。
    pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Result<Self, DefragError> {
        let data = pixels.iter().flat_map(|pixel| pixel.0).collect();
        Self::new(width, height, data)
    }

    /// 以相同宽高承载另一组等长像素数据。
    pub(super) fn with_same_dimensions(&self, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), self.data.len());
        Self {
            width: self.width,
            height: self.height,
            data,
        }
    }

    /// `width * height * 4`，溢出时返回 `None`。
    pub fn expected_len(width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.data.len() / 4
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 扁平 RGBA 字节视图。
    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// 按行优先顺序遍历像素。
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        self.data
            .chunks_exact(4)
            .map(|c| Pixel([c[0], c[1], c[2], c[3]]))
    }

    pub fn to_pixels(&self) -> Vec<Pixel> {
        self.pixels().collect()
    }
}

/// 可交给展示层直接渲染的图片。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayImage {
    pub mime_type: String,
    pub bytes: ImageBytes,
}

impl DisplayImage {
    pub fn new(bytes: impl Into<ImageBytes>, mime_type: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// 输出 `data:<mime>;base64,<payload>`，可直接作为 `<img src>`。
    pub fn to_data_url(&self) -> String {
        loader::build_data_url(&self.mime_type, &self.bytes)
    }
}

/// 单次调用的产出：原图与整理后的图。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefragResult {
    pub original: DisplayImage,
    pub defragmented: DisplayImage,
}
