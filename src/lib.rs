//! # 像素整理工具 — 库入口
//!
//! 把一张图片的全部像素按颜色值排序，得到“碎片整理”后的图片，
//! 并与原图一起交给展示层并排显示。
//!
//! ## 架构总览
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                  展示层（文件选择 / 页面布局）            │
//! └───────┬──────────────────────────────────────────────────┘
//!         ↕ ImageFile（字节 + 声明类型） / Data URL
//! ┌───────┼──────────────────────────────────────────────────┐
//! │       ↕            defrag                                │
//! │                                                          │
//! │  commands ── service ── handler                          │
//! │                            ├─ loader   类型校验·Data URL │
//! │                            ├─ decoder  字节 → RGBA       │
//! │                            ├─ sorter   RGBA 字典序排序   │
//! │                            └─ encoder  RGBA → PNG        │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## 模块职责
//!
//! | 模块 | 职责 |
//! |------|------|
//! | [`defrag`] | 解码、排序、编码流水线，以及展示状态管理 |

pub mod defrag;
