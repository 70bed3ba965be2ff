//! # 错误模型模块
//!
//! ## 设计思路
//!
//! 使用单一错误枚举承载整条“输入校验 → 解码 → 排序 → 编码”链路的错误来源。
//! 通过 `thiserror` 保持人类可读错误，同时让调用侧可按分支匹配。
//!
//! 每个分支都提供稳定的 `code()` 与 `stage()`，供展示层做错误归类。

/// 像素整理流水线统一错误类型。
///
/// 任何阶段都不在本地恢复，错误一律向上透传给调用方。
#[derive(Debug, thiserror::Error)]
pub enum DefragError {
    #[error("输入类型错误：\"{0}\" 不是图片")]
    InvalidInputType(String),

    #[error("格式错误：{0}")]
    InvalidFormat(String),

    #[error("解码错误：{0}")]
    Decode(String),

    #[error("编码错误：{0}")]
    Encode(String),

    #[error("资源限制：{0}")]
    ResourceLimit(String),
}

impl DefragError {
    /// 稳定错误码，供展示层匹配。
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidInputType(_) => "E_INVALID_INPUT_TYPE",
            Self::InvalidFormat(_) => "E_INVALID_FORMAT",
            Self::Decode(_) => "E_DECODE",
            Self::Encode(_) => "E_ENCODE",
            Self::ResourceLimit(_) => "E_RESOURCE_LIMIT",
        }
    }

    /// 出错所在阶段。
    pub fn stage(&self) -> &'static str {
        match self {
            Self::InvalidInputType(_) | Self::InvalidFormat(_) => "input",
            Self::Decode(_) => "decode",
            Self::Encode(_) => "encode",
            Self::ResourceLimit(_) => "limit",
        }
    }
}

impl From<DefragError> for String {
    /// 兼容仍使用字符串错误的调用点。
    fn from(error: DefragError) -> Self {
        error.to_string()
    }
}
