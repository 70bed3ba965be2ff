//! # 命令层
//!
//! ## 设计思路
//!
//! 命令层仅做展示层入参/出参适配，不承载业务逻辑。
//! 所有实际处理交由 `DefragServiceState`，返回值均可序列化，
//! 图片一律以 Data URL 字符串交付。

use serde::Serialize;

use super::service::{DefragServiceState, DisplayState};
use super::{DefragConfig, DefragError, ImageFile};

#[derive(Debug, Clone, Serialize)]
pub struct DefragCommandError {
    pub code: &'static str,
    pub stage: &'static str,
    pub message: String,
}

impl From<DefragError> for DefragCommandError {
    fn from(error: DefragError) -> Self {
        Self {
            code: error.code(),
            stage: error.stage(),
            message: error.to_string(),
        }
    }
}

/// 一次选择图片的返回载荷。
#[derive(Debug, Clone, Serialize)]
pub struct DefragResponse {
    pub ticket: u64,
    pub applied: bool,
    pub original: String,
    pub defragmented: String,
}

/// 当前展示内容载荷。
#[derive(Debug, Clone, Serialize)]
pub struct DisplayPayload {
    pub ticket: u64,
    pub original: Option<String>,
    pub defragmented: Option<String>,
}

impl From<DisplayState> for DisplayPayload {
    fn from(state: DisplayState) -> Self {
        Self {
            ticket: state.ticket,
            original: state.original.map(|img| img.to_data_url()),
            defragmented: state.defragmented.map(|img| img.to_data_url()),
        }
    }
}

/// 选择图片并整理。
pub async fn select_image(
    state: &DefragServiceState,
    mime_type: String,
    bytes: Vec<u8>,
) -> Result<DefragResponse, DefragCommandError> {
    let outcome = state.select_image(ImageFile::new(bytes, mime_type)).await?;

    Ok(DefragResponse {
        ticket: outcome.ticket,
        applied: outcome.applied,
        original: outcome.result.original.to_data_url(),
        defragmented: outcome.result.defragmented.to_data_url(),
    })
}

/// 整理 Base64 Data URL 图片，返回 PNG Data URL。
pub async fn defragment_base64(
    state: &DefragServiceState,
    data: String,
) -> Result<String, DefragCommandError> {
    Ok(state.handler().defragment_data_url(&data).await?)
}

/// 查询当前展示内容。
pub fn get_display(state: &DefragServiceState) -> Result<DisplayPayload, DefragCommandError> {
    Ok(state.current_display()?.into())
}

pub fn get_defrag_config(state: &DefragServiceState) -> Result<DefragConfig, DefragCommandError> {
    Ok(state.handler().config_snapshot()?)
}

pub fn set_defrag_config(
    state: &DefragServiceState,
    config: DefragConfig,
) -> Result<(), DefragCommandError> {
    state.handler().set_config(config)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_error_serializes_code_stage_and_message() {
        let error = DefragCommandError::from(DefragError::InvalidInputType("text/plain".into()));
        let json = serde_json::to_value(&error).expect("serialize error");

        assert_eq!(json["code"], "E_INVALID_INPUT_TYPE");
        assert_eq!(json["stage"], "input");
        assert!(json["message"].as_str().unwrap_or_default().contains("text/plain"));
    }

    #[tokio::test]
    async fn select_image_rejects_non_image_type() {
        let state = DefragServiceState::new().expect("service init failed");

        let result = select_image(&state, "text/plain".into(), b"hello".to_vec()).await;
        let error = result.expect_err("text should be rejected");

        assert_eq!(error.code, "E_INVALID_INPUT_TYPE");
        assert!(get_display(&state).expect("display").original.is_none());
    }

    #[test]
    fn config_commands_roundtrip_through_json() {
        let state = DefragServiceState::new().expect("service init failed");

        let mut config = get_defrag_config(&state).expect("get config");
        config.max_decoded_pixels = 12_345;
        let json = serde_json::to_string(&config).expect("serialize config");
        let parsed: DefragConfig = serde_json::from_str(&json).expect("parse config");

        set_defrag_config(&state, parsed).expect("set config");
        assert_eq!(get_defrag_config(&state).expect("get config").max_decoded_pixels, 12_345);

        let error = set_defrag_config(
            &state,
            DefragConfig {
                max_file_size: 0,
                ..DefragConfig::default()
            },
        )
        .expect_err("invalid config should be rejected");
        assert_eq!(error.code, "E_INVALID_FORMAT");
    }
}
