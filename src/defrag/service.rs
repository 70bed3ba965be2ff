//! # 服务层（调用序号 + 展示状态）
//!
//! ## 设计思路
//!
//! 用户可能在上一张图尚未整理完成时选择下一张图。两次调用互不取消，
//! 先开始、后完成的调用不能覆盖新调用的结果。
//!
//! ## 实现思路
//!
//! - 每次 `select_image` 只读取一次配置快照，校验与整理共用该快照。
//! - 通过类型与体积校验后领取单调递增的调用序号（ticket）。
//! - 展示状态由 `Mutex<DisplayState>` 保护，写入前检查 ticket 是否仍为最新。
//! - 过期调用仍把结果返回给自己的调用方，但标记 `applied = false`。
//! - 整理失败时原图保持展示，错误原样上抛。

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::source::{DefragResult, DisplayImage, ImageFile};
use super::{DefragConfig, DefragError, DefragHandler, encoder};

/// 当前展示内容。`ticket` 为 0 表示尚未展示任何图片。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DisplayState {
    pub ticket: u64,
    pub original: Option<DisplayImage>,
    pub defragmented: Option<DisplayImage>,
}

/// 单次选择图片的结果。
#[derive(Debug, Clone)]
pub struct DefragOutcome {
    pub ticket: u64,
    pub result: DefragResult,
    /// 整理结果是否写入了展示状态。
    pub applied: bool,
}

/// 像素整理服务状态。
pub struct DefragServiceState {
    handler: DefragHandler,
    sequence: AtomicU64,
    display: Mutex<DisplayState>,
}

impl DefragServiceState {
    /// 使用默认配置创建服务状态。
    pub fn new() -> Result<Self, DefragError> {
        Self::with_config(DefragConfig::default())
    }

    /// 使用自定义配置创建服务状态。
    ///
    /// # 示例
    /// ```rust
    /// use pixel_defrag::defrag::{DefragConfig, DefragServiceState};
    ///
    /// let mut config = DefragConfig::default();
    /// config.max_decoded_pixels = 1_000_000;
    /// let service = DefragServiceState::with_config(config)?;
    /// assert_eq!(service.latest_ticket(), 0);
    /// # Ok::<(), pixel_defrag::defrag::DefragError>(())
    /// ```
    pub fn with_config(config: DefragConfig) -> Result<Self, DefragError> {
        Ok(Self {
            handler: DefragHandler::new(config)?,
            sequence: AtomicU64::new(0),
            display: Mutex::new(DisplayState::default()),
        })
    }

    pub fn handler(&self) -> &DefragHandler {
        &self.handler
    }

    /// 最近一次领取的调用序号。
    pub fn latest_ticket(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    pub fn is_latest(&self, ticket: u64) -> bool {
        self.latest_ticket() == ticket
    }

    /// 选择一张图片：先展示原图，再展示整理结果（仅当仍为最新调用）。
    pub async fn select_image(&self, file: ImageFile) -> Result<DefragOutcome, DefragError> {
        let config = self.handler.config_snapshot()?;
        let original = DefragHandler::check_original(&file, &config)?;
        let ticket = self.next_ticket();

        log::info!("📥 开始整理图片 - ticket={} 类型: {}", ticket, original.mime_type);

        self.publish(ticket, |state| {
            state.original = Some(original.clone());
            state.defragmented = None;
        })?;

        let bytes = match DefragHandler::run_pipeline(file.bytes, &config).await {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!(
                    "❌ 图片整理失败 - ticket={} stage={} {}",
                    ticket,
                    err.stage(),
                    err
                );
                return Err(err);
            }
        };
        let defragmented = DisplayImage::new(bytes, encoder::OUTPUT_MIME_TYPE);

        let applied = self.publish(ticket, |state| {
            state.defragmented = Some(defragmented.clone());
        })?;

        if !applied {
            log::warn!(
                "⏭️ 丢弃过期整理结果 - ticket={} latest={}",
                ticket,
                self.latest_ticket()
            );
        }

        Ok(DefragOutcome {
            ticket,
            result: DefragResult {
                original,
                defragmented,
            },
            applied,
        })
    }

    /// 当前展示内容快照。
    pub fn current_display(&self) -> Result<DisplayState, DefragError> {
        self.display
            .lock()
            .map(|state| state.clone())
            .map_err(|_| DefragError::ResourceLimit("展示状态锁已中毒".to_string()))
    }

    fn next_ticket(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// 仅当 `ticket` 仍为最新时写入展示状态，返回是否写入。
    fn publish<F>(&self, ticket: u64, apply: F) -> Result<bool, DefragError>
    where
        F: FnOnce(&mut DisplayState),
    {
        let mut state = self
            .display
            .lock()
            .map_err(|_| DefragError::ResourceLimit("展示状态锁已中毒".to_string()))?;

        if !self.is_latest(ticket) || state.ticket > ticket {
            return Ok(false);
        }

        state.ticket = ticket;
        apply(&mut *state);
        Ok(true)
    }
}
