//! AI 对手模块。

pub mod delay;
pub mod easy;

pub use delay::{BrowserTimer, Delay};
pub use easy::{AiConfig, AiError, EasyAi};
