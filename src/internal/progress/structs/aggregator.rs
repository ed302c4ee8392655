//! # Aggregator — 进度聚合任务
//!
//! 独占全部可变聚合状态的后台任务，只通过消息传递与外界交互：
//!
//! - **上报入口**（容量 1 的 mpsc，接近 rendezvous 语义）：装饰器把每次
//!   读写的字节数交接进来，单生产者单消费者，按发出顺序消费。
//! - **节拍**：每次节拍计算一张 [`Snapshot`] 并发到输出通道，然后重置
//!   区间计数与区间起点。
//! - **停止**：流结束/出错（上报消息带 `ends_stream`）、取消信号、或
//!   所有装饰器被销毁，三者任一发生即退出循环，销毁两端通道。
//!
//! 退出即是唯一的终止信号：快照流关闭（消费方读到 `None`），上报入口
//! 拒绝后续预留。聚合任务本身没有失败路径，也不向快照流传递错误。

use tokio::sync::mpsc;
// tokio 的 Instant 而非 std：测试里 paused clock 才能推动区间计时
use tokio::time::Instant;
use tokio_util::sync::{CancellationToken, PollSender};
use tracing::debug;

use super::snapshot::Snapshot;
use super::snapshot_stream::SnapshotStream;
use crate::internal::progress::traits::tick_source::TickSource;

/// 上报入口通道容量。容量 1 意味着装饰器最多挂起一条未被消费的上报，
/// 近似 rendezvous 交接；聚合任务退出后通道关闭，预留立即失败。
const INTAKE_CAPACITY: usize = 1;

/// 一次传输上报。`ends_stream` 与字节数合并在同一条消息里，
/// 保证「上报 + 宣告结束」经由同一次交接串行化。
#[derive(Debug, Clone, Copy)]
pub(crate) struct TransferReport {
    /// 本次操作实际传输的字节数（可以为 0）
    pub(crate) bytes: usize,
    /// 底层流已结束（EOF 或错误），之后不会再有上报
    pub(crate) ends_stream: bool,
}

/// 装饰器持有的上报句柄：先预留名额、读写完成后再投递，
/// 保证投递本身永不挂起；聚合任务退出后自动转入直通模式（静默丢弃）。
#[derive(Debug)]
pub(crate) struct ReportIntake {
    sender: PollSender<TransferReport>,
    reserved: bool,
    disabled: bool,
}

impl ReportIntake {
    fn new(sender: mpsc::Sender<TransferReport>) -> Self {
        Self {
            sender: PollSender::new(sender),
            reserved: false,
            disabled: false,
        }
    }

    /// 预留一个上报名额；名额被上一条未消费的上报占用时挂起。
    /// 通道已关闭（聚合任务已退出）时转入直通模式并立即就绪，
    /// 之后的 [`send`](Self::send) 变为空操作——前台永远不会因
    /// 停止后的上报而阻塞。
    pub(crate) fn poll_ready(&mut self, cx: &mut std::task::Context<'_>) -> std::task::Poll<()> {
        use std::task::Poll;

        if self.disabled || self.reserved {
            return Poll::Ready(());
        }
        match self.sender.poll_reserve(cx) {
            Poll::Ready(Ok(())) => {
                self.reserved = true;
                Poll::Ready(())
            }
            Poll::Ready(Err(_)) => {
                self.disabled = true;
                Poll::Ready(())
            }
            Poll::Pending => Poll::Pending,
        }
    }

    /// 投递一条上报；必须先通过 [`poll_ready`](Self::poll_ready) 预留名额。
    /// 直通模式下为空操作。
    pub(crate) fn send(&mut self, report: TransferReport) {
        if !self.reserved {
            return;
        }
        self.reserved = false;
        // 预留成功到投递之间通道仍可能关闭，此时静默丢弃
        let _ = self.sender.send_item(report);
    }
}

/// 进度聚合器：状态只在 [`run`](Self::run) 循环内被触碰，
/// 通道即同步点，不需要任何锁。
struct Aggregator {
    total: u64,
    cumulative: u64,
    interval_transferred: u64,
    interval_start: Instant,
    cancel: CancellationToken,
    intake: mpsc::Receiver<TransferReport>,
    output: mpsc::Sender<Snapshot>,
    ticks: Box<dyn TickSource>,
}

/// 创建聚合器并立即启动其后台任务，返回（上报句柄, 快照流）。
///
/// 必须在 tokio 运行时上下文内调用。`total` 仅作为快照分母，
/// 不做校验也不作为上限；取 0 会得到非有限的完成比例。
pub(crate) fn spawn_aggregator(
    cancel: CancellationToken,
    total: u64,
    ticks: impl TickSource + 'static,
) -> (ReportIntake, SnapshotStream) {
    let (report_tx, report_rx) = mpsc::channel(INTAKE_CAPACITY);
    // 输出同样取容量 1：快照的产出节奏完全由消费方拉取速度决定
    let (snapshot_tx, snapshot_rx) = mpsc::channel(1);

    let aggregator = Aggregator {
        total,
        cumulative: 0,
        interval_transferred: 0,
        interval_start: Instant::now(),
        cancel,
        intake: report_rx,
        output: snapshot_tx,
        ticks: Box::new(ticks),
    };
    tokio::spawn(aggregator.run());

    (ReportIntake::new(report_tx), SnapshotStream::new(snapshot_rx))
}

impl Aggregator {
    /// 后台循环：在 {上报, 节拍, 取消} 三类事件上多路等待，每轮恰好
    /// 处理一个事件。`biased` 让排队中的上报先于同时就绪的节拍被消费，
    /// 同一区间的计数因此不会被节拍切到下一张快照里。
    async fn run(mut self) {
        debug!(total = self.total, "进度聚合任务启动");

        let reason = loop {
            tokio::select! {
                biased;

                report = self.intake.recv() => match report {
                    Some(report) => {
                        self.cumulative += report.bytes as u64;
                        self.interval_transferred += report.bytes as u64;
                        if report.ends_stream {
                            break "stream_done";
                        }
                    }
                    // 所有装饰器已被销毁
                    None => break "intake_closed",
                },

                _ = self.ticks.tick() => {
                    let snapshot = self.take_snapshot();
                    // 输出是 rendezvous 风格：消费方未接走上一张快照时，
                    // 这里挂起，后续节拍被推迟但计数照常累积。
                    // 发送只与取消竞争，消费方消失则直接退出。
                    // 偏向发送：名额可用时快照照常交付，取消只打断真正挂起的发送。
                    tokio::select! {
                        biased;

                        sent = self.output.send(snapshot) => {
                            if sent.is_err() {
                                break "consumer_gone";
                            }
                        }
                        _ = self.cancel.cancelled() => break "cancelled",
                    }
                }

                _ = self.cancel.cancelled() => break "cancelled",
            }
        };

        debug!(reason, transferred = self.cumulative, "进度聚合任务退出");
        // self 销毁时两端通道随之关闭：快照流到尾、上报入口拒收
    }

    /// 结算当前区间：计算快照并重置区间计数与区间起点。
    fn take_snapshot(&mut self) -> Snapshot {
        let elapsed = self.interval_start.elapsed();
        self.interval_start = Instant::now();

        let snapshot = Snapshot {
            fraction_complete: self.cumulative as f64 * 100.0 / self.total as f64,
            throughput: self.interval_transferred as f64 / elapsed.as_secs_f64(),
            transferred: self.cumulative,
            interval: elapsed,
        };
        self.interval_transferred = 0;
        snapshot
    }
}
