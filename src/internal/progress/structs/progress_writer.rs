//! # ProgressWriter — 透明写装饰器
//!
//! [`ProgressReader`](super::progress_reader::ProgressReader) 的写侧对偶：
//! 写操作原样转发并上报实际写入的字节数；底层写错误原样透传，不重试、
//! 不包装，只顺带向聚合任务宣告流结束。
//!
//! `flush` / `shutdown` 同样受取消门控，但不产生上报：写侧正常收尾
//! 没有 EOF 概念，聚合任务由取消信号或读侧结束来停止。

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use super::aggregator::{ReportIntake, TransferReport};
use super::progress_error::ProgressError;

/// 包装一个 [`AsyncWrite`]，写入时向所属聚合任务上报进度。
/// 可直接替换原来的 writer 使用。
#[derive(Debug)]
pub struct ProgressWriter<W> {
    inner: W,
    cancel: CancellationToken,
    intake: ReportIntake,
}

impl<W> ProgressWriter<W> {
    pub(crate) fn new(inner: W, cancel: CancellationToken, intake: ReportIntake) -> Self {
        Self {
            inner,
            cancel,
            intake,
        }
    }

    /// 取回被包装的流；进度上报随装饰器一起终止。
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W> AsyncWrite for ProgressWriter<W>
where
    W: AsyncWrite + Unpin,
{
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        data: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();

        // 取消先于一切 I/O：已取消则不触碰底层流、不上报
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(ProgressError::cancelled_io()));
        }

        ready!(this.intake.poll_ready(cx));

        match Pin::new(&mut this.inner).poll_write(cx, data) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(n)) => {
                // 上报实际写入量，短写时少于请求量
                this.intake.send(TransferReport {
                    bytes: n,
                    ends_stream: false,
                });
                Poll::Ready(Ok(n))
            }
            Poll::Ready(Err(e)) => {
                this.intake.send(TransferReport {
                    bytes: 0,
                    ends_stream: true,
                });
                Poll::Ready(Err(e))
            }
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(ProgressError::cancelled_io()));
        }
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(ProgressError::cancelled_io()));
        }
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}
