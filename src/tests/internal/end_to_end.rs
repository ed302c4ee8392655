//! 端到端测试：读写两侧各挂一个聚合任务，经 `tokio::io::copy` 搬运数据，
//! 验证装饰器可以原地替换普通流使用，以及 `SnapshotStream` 的 `Stream` 实现。

use std::io::Cursor;

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use crate::tests::{assert_stream_closed, manual_ticks, next_snapshot};
use crate::{wrap_reader, wrap_writer};

const DATA: &[u8] = b"some very loooooooooooooooooooooong data";

#[tokio::test]
async fn copy_between_decorated_streams() {
    let total = DATA.len() as u64;

    let read_cancel = CancellationToken::new();
    let (_read_ticks_handle, read_ticks) = manual_ticks();
    let (mut reader, mut read_snapshots) =
        wrap_reader(read_cancel, DATA, total, read_ticks);

    let write_cancel = CancellationToken::new();
    let (write_ticks_handle, write_ticks) = manual_ticks();
    let (mut writer, mut write_snapshots) =
        wrap_writer(write_cancel.clone(), Cursor::new(Vec::new()), total, write_ticks);

    let copied = tokio::io::copy(&mut reader, &mut writer).await.unwrap();
    assert_eq!(copied, total);

    // 读侧在 copy 内部触达 EOF，其快照流已关闭（期间没有节拍，零张快照）
    assert_stream_closed(&mut read_snapshots).await;

    // 写侧聚合任务仍在运行：补一拍拿到终态快照
    write_ticks_handle.fire();
    let s = next_snapshot(&mut write_snapshots).await;
    assert_eq!(s.transferred, total);
    assert_eq!(s.fraction_complete, 100.0);

    // 写侧没有 EOF 概念，由取消信号收尾
    write_cancel.cancel();
    assert_stream_closed(&mut write_snapshots).await;

    assert_eq!(writer.into_inner().into_inner(), DATA);
}

#[tokio::test]
async fn snapshot_stream_works_as_futures_stream() {
    let (handle, ticks) = manual_ticks();
    let (mut reader, mut snapshots) =
        wrap_reader(CancellationToken::new(), DATA, DATA.len() as u64, ticks);

    let mut buf = [0u8; 8];
    tokio::io::AsyncReadExt::read(&mut reader, &mut buf).await.unwrap();
    handle.fire();

    // 通过 StreamExt 拉取，与 recv() 等价
    let s = snapshots.next().await.expect("应有一张快照");
    assert_eq!(s.transferred, 8);
}
