//! 聚合任务测试：上报累加、区间重置、单调性、结束/取消/销毁三种停止路径。
//!
//! 直接以上报句柄驱动聚合任务，节拍全部手动触发；
//! 涉及区间时长与吞吐量的测试使用 paused clock 取得精确值。

use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use crate::internal::progress::structs::aggregator::{
    ReportIntake, TransferReport, spawn_aggregator,
};
use crate::tests::{assert_stream_closed, manual_ticks, next_snapshot};

/// 以装饰器同款的「预留-投递」路径发出一条上报
async fn report(intake: &mut ReportIntake, bytes: usize, ends_stream: bool) {
    std::future::poll_fn(|cx| intake.poll_ready(cx)).await;
    intake.send(TransferReport { bytes, ends_stream });
}

#[tokio::test]
async fn reports_accumulate_and_stay_monotonic() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 1 << 30, ticks);

    let mut rng = rand::thread_rng();
    let first: Vec<usize> = (0..16).map(|_| rng.gen_range(0..4096)).collect();
    let second: Vec<usize> = (0..16).map(|_| rng.gen_range(0..4096)).collect();

    for &n in &first {
        report(&mut intake, n, false).await;
    }
    handle.fire();
    let s1 = next_snapshot(&mut snapshots).await;
    assert_eq!(s1.transferred, first.iter().sum::<usize>() as u64);

    for &n in &second {
        report(&mut intake, n, false).await;
    }
    handle.fire();
    let s2 = next_snapshot(&mut snapshots).await;
    // 累计值跨快照单调不减，且等于全部上报之和
    assert!(s2.transferred >= s1.transferred);
    assert_eq!(
        s2.transferred,
        (first.iter().sum::<usize>() + second.iter().sum::<usize>()) as u64
    );
}

#[tokio::test(start_paused = true)]
async fn interval_counters_reset_between_ticks() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 100, ticks);

    report(&mut intake, 30, false).await;
    tokio::time::advance(Duration::from_secs(1)).await;
    handle.fire();

    let s1 = snapshots.recv().await.expect("应有第一张快照");
    assert_eq!(s1.transferred, 30);
    assert_eq!(s1.interval, Duration::from_secs(1));
    assert_eq!(s1.throughput, 30.0);
    assert_eq!(s1.fraction_complete, 30.0);

    // 第二个区间没有任何上报：累计不变、吞吐归零、区间时长独立计量
    tokio::time::advance(Duration::from_secs(2)).await;
    handle.fire();

    let s2 = snapshots.recv().await.expect("应有第二张快照");
    assert_eq!(s2.transferred, 30);
    assert_eq!(s2.interval, Duration::from_secs(2));
    assert_eq!(s2.throughput, 0.0);
}

#[tokio::test]
async fn zero_report_is_still_snapshot_eligible() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 10, ticks);

    report(&mut intake, 0, false).await;
    handle.fire();

    let s = next_snapshot(&mut snapshots).await;
    assert_eq!(s.transferred, 0);
    assert_eq!(s.fraction_complete, 0.0);
}

#[tokio::test]
async fn ends_stream_report_closes_snapshot_stream() {
    let (_handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 10, ticks);

    report(&mut intake, 10, true).await;
    assert_stream_closed(&mut snapshots).await;
}

#[tokio::test]
async fn cancellation_closes_snapshot_stream_and_unblocks_reports() {
    let cancel = CancellationToken::new();
    let (_handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) = spawn_aggregator(cancel.clone(), 10, ticks);

    cancel.cancel();
    assert_stream_closed(&mut snapshots).await;

    // 停止后的上报不得阻塞前台：入口已关闭时预留立即就绪并静默丢弃
    tokio::time::timeout(Duration::from_secs(5), async {
        report(&mut intake, 1, false).await;
        report(&mut intake, 2, false).await;
        report(&mut intake, 3, false).await;
    })
    .await
    .expect("停止后的上报不应阻塞");
}

#[tokio::test]
async fn dropped_consumer_stops_task_and_unblocks_reports() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, snapshots) =
        spawn_aggregator(CancellationToken::new(), 10, ticks);

    // 消费方消失后，下一次快照发送失败，聚合任务随之退出
    drop(snapshots);
    report(&mut intake, 4, false).await;
    handle.fire();

    // 退出后上报入口关闭：后续上报转入直通，不得阻塞前台
    tokio::time::timeout(Duration::from_secs(5), async {
        report(&mut intake, 1, false).await;
        report(&mut intake, 2, false).await;
        report(&mut intake, 3, false).await;
    })
    .await
    .expect("消费方消失后上报不应阻塞");
}

#[tokio::test]
async fn cancel_interrupts_blocked_snapshot_send() {
    let cancel = CancellationToken::new();
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) = spawn_aggregator(cancel.clone(), 10, ticks);

    // 第一拍的快照占住输出名额，第二拍的发送只能挂起等待消费方
    report(&mut intake, 1, false).await;
    handle.fire();
    handle.fire();

    // 消费方缺席时，取消信号必须能打断挂起的发送，收尾保持确定性
    cancel.cancel();

    tokio::time::timeout(Duration::from_secs(5), async {
        report(&mut intake, 1, false).await;
        report(&mut intake, 2, false).await;
    })
    .await
    .expect("取消后上报不应阻塞");

    // 在途的那张快照仍可取走，之后流关闭
    let s = tokio::time::timeout(Duration::from_secs(5), snapshots.recv())
        .await
        .expect("等待在途快照超时")
        .expect("应有一张在途快照");
    assert_eq!(s.transferred, 1);
    assert_stream_closed(&mut snapshots).await;
}

#[tokio::test]
async fn dropping_all_intakes_stops_the_task() {
    let (_handle, ticks) = manual_ticks();
    let (intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 10, ticks);

    drop(intake);
    assert_stream_closed(&mut snapshots).await;
}

#[tokio::test]
async fn fraction_complete_is_not_clamped() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 10, ticks);

    // 多报时比例超过 100，按约定不做夹取
    report(&mut intake, 15, false).await;
    handle.fire();

    let s = next_snapshot(&mut snapshots).await;
    assert_eq!(s.fraction_complete, 150.0);
}

#[tokio::test]
async fn zero_total_yields_non_finite_fraction() {
    let (handle, ticks) = manual_ticks();
    let (mut intake, mut snapshots) =
        spawn_aggregator(CancellationToken::new(), 0, ticks);

    report(&mut intake, 5, false).await;
    handle.fire();

    let s = next_snapshot(&mut snapshots).await;
    // total = 0 是文档化前置条件的反例：不报错，只是比例失去意义
    assert!(!s.fraction_complete.is_finite());
    assert_eq!(s.transferred, 5);
}
