//! Unit tests for the background refresh loop (paused clock)

use std::sync::Arc;
use std::time::Duration;
use stockwatch::core::runtime::RefreshService;
use stockwatch::core::scheduler::{RefreshScheduler, SchedulerState};
use stockwatch::core::snapshot::SnapshotStore;
use tokio_test::assert_ok;

use crate::test_utils::{symbols, FlakySource};

const INTERVAL: Duration = Duration::from_secs(60);
const RETRY_DELAY: Duration = Duration::from_secs(30);

fn scheduler_with(source: Arc<FlakySource>) -> (RefreshScheduler, Arc<SnapshotStore>) {
    let store = Arc::new(SnapshotStore::new());
    let service = Arc::new(RefreshService::new(
        source,
        store.clone(),
        symbols(&["AAA", "BBB"]),
    ));
    let scheduler = RefreshScheduler::new(service, INTERVAL, RETRY_DELAY).unwrap();
    (scheduler, store)
}

#[tokio::test]
async fn zero_interval_is_rejected() {
    let service = Arc::new(RefreshService::new(
        Arc::new(FlakySource::failing(0)),
        Arc::new(SnapshotStore::new()),
        symbols(&["AAA"]),
    ));
    assert!(RefreshScheduler::new(service, Duration::ZERO, RETRY_DELAY).is_err());
}

#[tokio::test(start_paused = true)]
async fn failed_cycle_retries_after_short_delay() {
    let source = Arc::new(FlakySource::failing(1));
    let (scheduler, store) = scheduler_with(source.clone());

    assert_ok!(scheduler.start().await);

    tokio::time::sleep(Duration::from_secs(29)).await;
    assert_eq!(source.calls(), 1);
    assert!(store.read().await.is_empty());

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 2);
    assert_eq!(store.read().await.len(), 2);

    // Back on the normal interval after a success
    tokio::time::sleep(Duration::from_secs(58)).await;
    assert_eq!(source.calls(), 2);
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(source.calls(), 3);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn start_is_idempotent() {
    let source = Arc::new(FlakySource::failing(0));
    let (scheduler, _store) = scheduler_with(source.clone());

    assert_ok!(scheduler.start().await);
    assert_ok!(scheduler.start().await);
    tokio::time::sleep(Duration::from_secs(10)).await;

    assert_eq!(source.calls(), 1);
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
}

#[tokio::test(start_paused = true)]
async fn stop_while_sleeping_terminates() {
    let source = Arc::new(FlakySource::failing(0));
    let (scheduler, _store) = scheduler_with(source.clone());
    assert_eq!(scheduler.state(), SchedulerState::Idle);

    assert_ok!(scheduler.start().await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(scheduler.state(), SchedulerState::Sleeping);

    scheduler.stop().await;
    assert_eq!(scheduler.state(), SchedulerState::Terminated);
    assert!(!scheduler.is_running().await);

    tokio::time::sleep(Duration::from_secs(600)).await;
    assert_eq!(source.calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn can_restart_after_stop() {
    let source = Arc::new(FlakySource::failing(0));
    let (scheduler, _store) = scheduler_with(source.clone());

    assert_ok!(scheduler.start().await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    scheduler.stop().await;

    assert_ok!(scheduler.start().await);
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(source.calls(), 2);
    assert!(scheduler.is_running().await);

    scheduler.stop().await;
}
