//! # 配置模块
//!
//! ## 设计思路
//!
//! 整理流水线本身没有可调的排序策略，唯一可调的是资源上限。
//! 将上限集中到 `DefragConfig`，保证解码前即可拒绝体积或像素异常的输入。
//!
//! ## 实现思路
//!
//! - `Default` 提供生产可用的上限。
//! - `validate` 在运行时修改配置前做范围校验。

use serde::{Deserialize, Serialize};

use super::DefragError;

const MIN_FILE_SIZE: u64 = 1024;

/// 像素整理资源配置。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefragConfig {
    /// 输入原始字节允许的最大体积（字节）。
    pub max_file_size: u64,
    /// 解码后的像素上限（`width * height`）。
    pub max_decoded_pixels: u64,
    /// 解码阶段允许的预计内存上限（按 RGBA 估算，字节）。
    pub max_decoded_bytes: u64,
}

impl Default for DefragConfig {
    fn default() -> Self {
        Self {
            max_file_size: 50 * 1024 * 1024,
            max_decoded_pixels: 40_000_000,
            max_decoded_bytes: 160 * 1024 * 1024,
        }
    }
}

impl DefragConfig {
    /// 校验配置取值范围。
    pub fn validate(&self) -> Result<(), DefragError> {
        if self.max_file_size < MIN_FILE_SIZE {
            return Err(DefragError::InvalidFormat(format!(
                "max_file_size 不能小于 {} 字节",
                MIN_FILE_SIZE
            )));
        }
        if self.max_decoded_pixels == 0 {
            return Err(DefragError::InvalidFormat("max_decoded_pixels 必须大于 0".to_string()));
        }
        if self.max_decoded_bytes < 4 {
            return Err(DefragError::InvalidFormat("max_decoded_bytes 至少容纳一个像素".to_string()));
        }
        Ok(())
    }

    /// 校验像素数量与预计内存是否超过上限。
    pub(crate) fn check_dimensions(&self, width: u32, height: u32) -> Result<(), DefragError> {
        let pixels = (width as u64)
            .checked_mul(height as u64)
            .ok_or_else(|| DefragError::ResourceLimit("图片像素数溢出".to_string()))?;

        if pixels > self.max_decoded_pixels {
            return Err(DefragError::ResourceLimit(format!(
                "图片像素过大：{} 像素（限制：{} 像素）",
                pixels, self.max_decoded_pixels
            )));
        }

        let estimated = pixels
            .checked_mul(4)
            .ok_or_else(|| DefragError::ResourceLimit("图片解码内存估算溢出".to_string()))?;

        if estimated > self.max_decoded_bytes {
            return Err(DefragError::ResourceLimit(format!(
                "图片解码预计内存过大：{:.2} MB（限制：{:.2} MB）",
                estimated as f64 / 1024.0 / 1024.0,
                self.max_decoded_bytes as f64 / 1024.0 / 1024.0
            )));
        }

        Ok(())
    }

    /// 校验输入字节体积。
    pub(crate) fn check_file_size(&self, len: usize) -> Result<(), DefragError> {
        if len as u64 > self.max_file_size {
            return Err(DefragError::ResourceLimit(format!(
                "文件过大：{:.2} MB（限制：{:.2} MB）",
                len as f64 / 1024.0 / 1024.0,
                self.max_file_size as f64 / 1024.0 / 1024.0
            )));
        }
        Ok(())
    }
}
