//! # 像素整理模块（defrag）
//!
//! ## 设计思路
//!
//! 该模块将“输入校验 → 解码 → 排序 → 编码 → 展示状态”按职责拆分为多个子模块，
//! 每个阶段只依赖上一阶段的输出，不依赖任何界面状态。
//!
//! - `commands`：仅做展示层入参/出参适配（薄封装）
//! - `service`：调用序号与展示状态，保证最新一次选择胜出
//! - `handler`：编排整条处理流水线
//! - `loader`：声明类型校验、Data URL 解析与生成
//! - `decoder`：字节 → RGBA 像素缓冲（唯一的异步阶段）
//! - `sorter`：按 (R, G, B, A) 字典序重排像素
//! - `encoder`：像素缓冲 → 无损 PNG
//! - `config/error/source`：配置、错误、数据模型
//!
//! ## 调用链
//!
//! ```text
//! 展示层
//!    ↓
//! commands.rs（参数适配）
//!    ↓
//! service.rs（ticket + 展示状态）
//!    ↓
//! handler.rs（统一编排 + 阶段耗时日志）
//!    ├─ loader.rs（类型校验 / Data URL）
//!    ├─ decoder.rs（签名探测 + 尺寸限制 + 解码）
//!    ├─ sorter.rs（排序）
//!    └─ encoder.rs（PNG 编码）
//!    ↓
//! 返回 DefragCommandError 给展示层
//! ```

pub mod commands;
mod config;
pub mod decoder;
pub mod encoder;
mod error;
mod handler;
pub mod loader;
mod service;
pub mod sorter;
mod source;

pub use config::DefragConfig;
pub use error::DefragError;
pub use handler::DefragHandler;
pub use service::{DefragOutcome, DefragServiceState, DisplayState};
pub use source::{DefragResult, DisplayImage, ImageBytes, ImageFile, Pixel, PixelBuffer};
