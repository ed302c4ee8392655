//! 演示：用慢速 reader 模拟网络搬运，读写两侧各自发出进度快照并打印。
//!
//! 运行：`cargo run --example transfer_demo`
//! 设置 `RUST_LOG=progress_stream=debug` 可看到聚合任务的启动/退出日志。

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};
use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncRead, ReadBuf};
use tokio::time::{Instant, Sleep};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use progress_stream::{wrap_reader, wrap_writer};

/// 每读 1 字节前睡一段时间的 reader，模拟慢速链路
struct SlowReader<R> {
    inner: R,
    delay: Duration,
    sleep: Option<Pin<Box<Sleep>>>,
}

impl<R> SlowReader<R> {
    fn new(inner: R, delay: Duration) -> Self {
        Self {
            inner,
            delay,
            sleep: None,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for SlowReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        loop {
            match this.sleep.as_mut() {
                None => {
                    this.sleep = Some(Box::pin(tokio::time::sleep(this.delay)));
                }
                Some(sleep) => {
                    ready!(sleep.as_mut().poll(cx));
                    this.sleep = None;

                    // 一次只放行 1 字节
                    let mut byte = [0u8; 1];
                    let mut one = ReadBuf::new(&mut byte);
                    ready!(Pin::new(&mut this.inner).poll_read(cx, &mut one))?;
                    buf.put_slice(one.filled());
                    return Poll::Ready(Ok(()));
                }
            }
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let data: &[u8] = b"some very loooooooooooooooooooooong data";
    let total = data.len() as u64;
    let cancel = CancellationToken::new();

    // 注意：tokio 的 interval 第一拍立即触发，interval_at 才是 ticker 式节奏
    let read_period = Duration::from_millis(100);
    let read_ticks = tokio::time::interval_at(Instant::now() + read_period, read_period);
    let slow = SlowReader::new(data, Duration::from_millis(200));
    let (mut reader, mut read_snapshots) = wrap_reader(cancel.clone(), slow, total, read_ticks);

    let read_printer = tokio::spawn(async move {
        while let Some(snapshot) = read_snapshots.next().await {
            println!("reading: {:?}", snapshot);
        }
    });

    let write_period = Duration::from_millis(50);
    let write_ticks = tokio::time::interval_at(Instant::now() + write_period, write_period);
    let (mut writer, mut write_snapshots) =
        wrap_writer(cancel.clone(), tokio::io::sink(), total, write_ticks);

    let write_printer = tokio::spawn(async move {
        while let Some(snapshot) = write_snapshots.next().await {
            println!("writing: {:?}", snapshot);
        }
    });

    if let Err(e) = tokio::io::copy(&mut reader, &mut writer).await {
        eprintln!("copy failed: {}", e);
    }

    // 写侧没有 EOF，取消信号让它的快照流收尾
    cancel.cancel();

    let _ = read_printer.await;
    let _ = write_printer.await;
}
