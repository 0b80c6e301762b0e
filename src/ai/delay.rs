use std::future::Future;

use gloo_timers::future::TimeoutFuture;

/// AI“思考”时使用的计时器。
pub trait Delay {
    type Sleep: Future<Output = ()>;

    fn sleep(&self, millis: u32) -> Self::Sleep;
}

/// 浏览器 `setTimeout` 计时器，仅在 wasm32 目标下可用。
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

impl Delay for BrowserTimer {
    type Sleep = TimeoutFuture;

    fn sleep(&self, millis: u32) -> Self::Sleep {
        TimeoutFuture::new(millis)
    }
}
