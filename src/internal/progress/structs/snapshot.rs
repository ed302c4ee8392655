use std::time::Duration;

/// 进度快照：一次观测的不可变值，由聚合任务在每次节拍时计算并发出。
///
/// 快照序列中 `transferred` 单调不减；`fraction_complete` 不做夹取，
/// 调用方多报时可以超过 100。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    /// 完成比例（百分数）：`100 * transferred / total`。
    /// `total` 为 0 时为非有限值，构造时需保证 `total > 0` 才有意义。
    pub fraction_complete: f64,
    /// 刚结束的观测区间内的吞吐量（字节/秒）。
    /// 区间时长为 0 的节拍（如 interval 的立即首拍）下为非有限值（NaN 或 inf）。
    pub throughput: f64,
    /// 自聚合开始以来累计传输的字节数
    pub transferred: u64,
    /// 距上一次快照（首次为距开始）经过的墙钟时间
    pub interval: Duration,
}
