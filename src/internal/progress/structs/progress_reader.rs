//! # ProgressReader — 透明读装饰器
//!
//! 对数据与错误完全透明：每次读都原样转发给被包装的流，只额外把
//! 字节数上报给聚合任务。EOF 与错误会随上报一并宣告流结束。
//!
//! 上报名额在真正读之前预留（聚合任务退出后预留立即失败并转入直通），
//! 因此读完成后的投递永不挂起——前台不会卡死在已关闭的入口上。

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, ReadBuf};
use tokio_util::sync::CancellationToken;

use super::aggregator::{ReportIntake, TransferReport};
use super::progress_error::ProgressError;

/// 包装一个 [`AsyncRead`]，读取时向所属聚合任务上报进度。
/// 可直接替换原来的 reader 使用。
#[derive(Debug)]
pub struct ProgressReader<R> {
    inner: R,
    cancel: CancellationToken,
    intake: ReportIntake,
}

impl<R> ProgressReader<R> {
    pub(crate) fn new(inner: R, cancel: CancellationToken, intake: ReportIntake) -> Self {
        Self {
            inner,
            cancel,
            intake,
        }
    }

    /// 取回被包装的流；进度上报随装饰器一起终止。
    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R> AsyncRead for ProgressReader<R>
where
    R: AsyncRead + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        // 取消先于一切 I/O：已取消则不触碰底层流、不上报
        if this.cancel.is_cancelled() {
            return Poll::Ready(Err(ProgressError::cancelled_io()));
        }

        ready!(this.intake.poll_ready(cx));

        // 空缓冲请求读到 0 字节是合法结果，不代表 EOF
        let empty_request = buf.remaining() == 0;
        let before = buf.filled().len();

        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            // 预留的名额跨 poll 保持，下次进来直接就绪
            Poll::Pending => Poll::Pending,
            Poll::Ready(Ok(())) => {
                let n = buf.filled().len() - before;
                this.intake.send(TransferReport {
                    bytes: n,
                    ends_stream: n == 0 && !empty_request,
                });
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => {
                // 错误原样透传，只顺带宣告流结束
                this.intake.send(TransferReport {
                    bytes: 0,
                    ends_stream: true,
                });
                Poll::Ready(Err(e))
            }
        }
    }
}
