use tokio::io::AsyncRead;
use tokio_util::sync::CancellationToken;

use crate::internal::progress::structs::aggregator::spawn_aggregator;
use crate::internal::progress::structs::progress_reader::ProgressReader;
use crate::internal::progress::structs::snapshot_stream::SnapshotStream;
use crate::internal::progress::traits::tick_source::TickSource;

/// 本库主入口之一：包装一个 reader，读取时按节拍发出进度快照。
///
/// 为 `reader` 构造并启动一个专属聚合任务，返回（装饰后的 reader, 快照流）。
/// 装饰后的 reader 可原地替换原来的流使用；快照流在流结束、出错或取消后关闭。
///
/// - 注意1：必须在 tokio 运行时上下文内调用（内部 `tokio::spawn`）
/// - 注意2：`total` 只作为完成比例的分母，不做校验；需 `total > 0` 才有意义
///
/// example:
/// ```rust,no_run
/// use tokio_util::sync::CancellationToken;
/// use progress_stream::wrap_reader;
///
/// # async fn example() {
/// let data: &[u8] = b"some very long data";
/// let cancel = CancellationToken::new();
/// let ticks = tokio::time::interval(std::time::Duration::from_millis(100));
///
/// let (mut reader, mut snapshots) =
///     wrap_reader(cancel, data, data.len() as u64, ticks);
///
/// tokio::spawn(async move {
///     while let Some(snapshot) = snapshots.recv().await {
///         println!("reading: {:?}", snapshot);
///     }
/// });
/// // 之后照常使用 reader 读取
/// # }
/// ```
pub fn wrap_reader<R>(
    cancel: CancellationToken,
    reader: R,
    total: u64,
    ticks: impl TickSource + 'static,
) -> (ProgressReader<R>, SnapshotStream)
where
    R: AsyncRead + Unpin,
{
    let (intake, snapshots) = spawn_aggregator(cancel.clone(), total, ticks);
    (ProgressReader::new(reader, cancel, intake), snapshots)
}
