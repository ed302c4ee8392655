use tokio::io::AsyncWrite;
use tokio_util::sync::CancellationToken;

use crate::internal::progress::structs::aggregator::spawn_aggregator;
use crate::internal::progress::structs::progress_writer::ProgressWriter;
use crate::internal::progress::structs::snapshot_stream::SnapshotStream;
use crate::internal::progress::traits::tick_source::TickSource;

/// 本库主入口之一：包装一个 writer，写入时按节拍发出进度快照。
///
/// 与 [`wrap_reader`](crate::wrap_reader) 对偶：为 `writer` 构造并启动
/// 一个专属聚合任务，返回（装饰后的 writer, 快照流）。写侧没有 EOF，
/// 快照流由取消信号或底层写错误来关闭。
///
/// - 注意1：必须在 tokio 运行时上下文内调用（内部 `tokio::spawn`）
/// - 注意2：`total` 只作为完成比例的分母，不做校验；需 `total > 0` 才有意义
pub fn wrap_writer<W>(
    cancel: CancellationToken,
    writer: W,
    total: u64,
    ticks: impl TickSource + 'static,
) -> (ProgressWriter<W>, SnapshotStream)
where
    W: AsyncWrite + Unpin,
{
    let (intake, snapshots) = spawn_aggregator(cancel.clone(), total, ticks);
    (ProgressWriter::new(writer, cancel, intake), snapshots)
}
