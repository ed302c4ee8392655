//! 快照输出流：聚合任务的只读出口。
//!
//! 有限序列，聚合任务退出时关闭；消费方只能从流关闭这一事实推断终止，
//! 无法区分「正常读完」「底层流出错」「被取消」——这些信息只出现在
//! 装饰器自身的返回值里，属刻意的极简设计。

use std::pin::Pin;
use std::task::{Context, Poll};

use futures_util::stream::Stream;
use tokio::sync::mpsc;

use super::snapshot::Snapshot;

/// 进度快照的只读序列；消费方按自己的节奏拉取，
/// 拉取速度会反向决定快照的产出节奏。
#[derive(Debug)]
pub struct SnapshotStream {
    receiver: mpsc::Receiver<Snapshot>,
}

impl SnapshotStream {
    pub(crate) fn new(receiver: mpsc::Receiver<Snapshot>) -> Self {
        Self { receiver }
    }

    /// 接收下一张快照；聚合任务退出后返回 `None`（含在途的最后一张之后）。
    pub async fn recv(&mut self) -> Option<Snapshot> {
        self.receiver.recv().await
    }
}

impl Stream for SnapshotStream {
    type Item = Snapshot;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Snapshot>> {
        self.receiver.poll_recv(cx)
    }
}
