//! # TickSource — 节拍源
//!
//! 聚合任务只观察「节拍发生了」，不控制节奏；节奏由调用方在构造时固定。
//! 生产环境用 [`tokio::time::Interval`] 即可，测试中可用手动驱动的通道实现
//! 来精确控制节拍时机。

use async_trait::async_trait;

/// 周期性节拍源。实现方决定节奏；`tick` 挂起直到下一次节拍发生。
///
/// 注意：`tokio::time::interval` 的第一拍立即触发；需要 ticker 式
/// 「满一个周期才打第一拍」的节奏，请用 `interval_at(start + period, period)`。
#[async_trait]
pub trait TickSource: Send {
    /// 等待下一次节拍
    async fn tick(&mut self);
}

#[async_trait]
impl TickSource for tokio::time::Interval {
    async fn tick(&mut self) {
        let _ = tokio::time::Interval::tick(self).await;
    }
}
