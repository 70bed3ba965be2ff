//! # 核心编排模块
//!
//! ## 设计思路
//!
//! `DefragHandler` 只负责流程编排与配置管理，不持有任何展示状态。
//! 处理链路固定为：
//! 1. 读取配置快照
//! 2. 校验声明类型与体积，生成原图（直通）
//! 3. 解码 → 排序 → 编码
//!
//! ## 实现思路
//!
//! - 配置通过 `Arc<RwLock<DefragConfig>>` 支持运行时调整上限。
//! - 单次请求内使用“同一配置快照”，避免处理中途配置漂移。
//! - 记录 `decode/sort/encode/total` 阶段耗时，便于性能诊断。
//! - 任何阶段失败都整体失败，不返回部分结果。

use std::sync::{Arc, RwLock};
use std::time::Instant;

use super::source::{DefragResult, DisplayImage, ImageBytes, ImageFile};
use super::{DefragConfig, DefragError, decoder, encoder, loader, sorter};

/// 像素整理处理器。
pub struct DefragHandler {
    config: Arc<RwLock<DefragConfig>>,
}

impl DefragHandler {
    /// 根据初始配置创建处理器。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_defrag::defrag::{DefragConfig, DefragHandler};
    ///
    /// let handler = DefragHandler::new(DefragConfig::default())?;
    /// # Ok::<(), pixel_defrag::defrag::DefragError>(())
    /// ```
    pub fn new(config: DefragConfig) -> Result<Self, DefragError> {
        config.validate()?;
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    /// 获取配置快照。
    pub fn config_snapshot(&self) -> Result<DefragConfig, DefragError> {
        self.config
            .read()
            .map(|cfg| cfg.clone())
            .map_err(|_| DefragError::ResourceLimit("配置读取锁已中毒".to_string()))
    }

    /// 替换配置，先校验再生效。
    pub fn set_config(&self, new_config: DefragConfig) -> Result<(), DefragError> {
        new_config.validate()?;

        let mut config = self
            .config
            .write()
            .map_err(|_| DefragError::ResourceLimit("配置写入锁已中毒".to_string()))?;
        *config = new_config;

        log::info!(
            "⚙️ 已更新整理配置（max_file_size={}, max_decoded_pixels={}, max_decoded_bytes={}）",
            config.max_file_size,
            config.max_decoded_pixels,
            config.max_decoded_bytes
        );

        Ok(())
    }

    /// 处理主入口：校验文件并返回原图与整理后的图。
    ///
    /// # 示例
    /// ```rust,no_run
    /// use pixel_defrag::defrag::{DefragConfig, DefragHandler, ImageFile};
    ///
    /// # async fn demo(png: Vec<u8>) -> Result<(), pixel_defrag::defrag::DefragError> {
    /// let handler = DefragHandler::new(DefragConfig::default())?;
    /// let result = handler.defragment_file(ImageFile::new(png, "image/png")).await?;
    /// println!("{}", result.defragmented.to_data_url());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn defragment_file(&self, file: ImageFile) -> Result<DefragResult, DefragError> {
        let config = self.config_snapshot()?;
        let original = Self::check_original(&file, &config)?;
        let defragmented = Self::run_pipeline(file.bytes, &config).await?;

        Ok(DefragResult {
            original,
            defragmented: DisplayImage::new(defragmented, encoder::OUTPUT_MIME_TYPE),
        })
    }

    /// 校验声明类型与体积，返回直通的原图。
    ///
    /// 不做解码，展示层可以在整理完成前先展示原图。
    pub fn prepare_original(&self, file: &ImageFile) -> Result<DisplayImage, DefragError> {
        let config = self.config_snapshot()?;
        Self::check_original(file, &config)
    }

    /// 按调用方已取得的配置快照校验原图。
    pub(crate) fn check_original(
        file: &ImageFile,
        config: &DefragConfig,
    ) -> Result<DisplayImage, DefragError> {
        loader::validate_input_type(&file.mime_type)?;
        config.check_file_size(file.bytes.len())?;

        Ok(DisplayImage::new(file.bytes.clone(), file.mime_type.trim()))
    }

    /// 仅执行“解码 → 排序 → 编码”，输入输出均为已编码字节。
    pub async fn defragment_bytes(&self, bytes: ImageBytes) -> Result<ImageBytes, DefragError> {
        let config = self.config_snapshot()?;
        config.check_file_size(bytes.len())?;
        Self::run_pipeline(bytes, &config).await
    }

    /// Data URL 入口：输入任意图片 Data URL，输出 PNG Data URL。
    pub async fn defragment_data_url(&self, data_url: &str) -> Result<String, DefragError> {
        let config = self.config_snapshot()?;
        let file = loader::parse_data_url(data_url, &config)?;
        config.check_file_size(file.bytes.len())?;

        let bytes = Self::run_pipeline(file.bytes, &config).await?;
        Ok(DisplayImage::new(bytes, encoder::OUTPUT_MIME_TYPE).to_data_url())
    }

    /// 解码 → 排序 → 编码。体积校验由入口负责，这里只使用传入的快照。
    pub(crate) async fn run_pipeline(
        bytes: ImageBytes,
        config: &DefragConfig,
    ) -> Result<ImageBytes, DefragError> {
        let total_start = Instant::now();
        let input_len = bytes.len();

        let decode_start = Instant::now();
        let buffer = decoder::decode(bytes, config).await?;
        let decode_elapsed = decode_start.elapsed();

        let sort_start = Instant::now();
        let sorted = sorter::sort_pixels(&buffer);
        drop(buffer);
        let sort_elapsed = sort_start.elapsed();

        let encode_start = Instant::now();
        let encoded = encoder::encode_png(&sorted)?;
        let encode_elapsed = encode_start.elapsed();

        log::info!(
            "✅ 像素整理完成 - 尺寸: {}x{} 输入={}KB 输出={}KB decode={}ms sort={}ms encode={}ms total={}ms",
            sorted.width(),
            sorted.height(),
            input_len / 1024,
            encoded.len() / 1024,
            decode_elapsed.as_millis(),
            sort_elapsed.as_millis(),
            encode_elapsed.as_millis(),
            total_start.elapsed().as_millis()
        );

        Ok(encoded)
    }
}
