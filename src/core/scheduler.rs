//! Background loop that refreshes the snapshot on a fixed interval

use crate::core::runtime::{RefreshService, RefreshTrigger};
use crate::errors::BoxError;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    RunningCycle,
    Sleeping,
    Terminated,
}

/// Runs refresh cycles forever on one long-lived task.
///
/// A successful cycle is followed by the refresh interval, a failed one by the
/// shorter retry delay. `stop` takes effect between cycles, never mid-cycle.
pub struct RefreshScheduler {
    service: Arc<RefreshService>,
    interval: Duration,
    retry_delay: Duration,
    state: Arc<watch::Sender<SchedulerState>>,
    stop: watch::Sender<bool>,
    handle: Arc<RwLock<Option<tokio::task::JoinHandle<()>>>>,
}

impl RefreshScheduler {
    /// Create a new scheduler
    ///
    /// # Arguments
    /// * `service` - Refresh service shared with manual refreshes
    /// * `interval` - Delay after a successful cycle
    /// * `retry_delay` - Delay after a failed cycle
    pub fn new(
        service: Arc<RefreshService>,
        interval: Duration,
        retry_delay: Duration,
    ) -> Result<Self, BoxError> {
        if interval.is_zero() {
            return Err("Scheduler disabled: refresh interval is 0".into());
        }

        let (state, _) = watch::channel(SchedulerState::Idle);
        let (stop, _) = watch::channel(false);

        info!(
            interval_secs = interval.as_secs(),
            retry_delay_secs = retry_delay.as_secs(),
            "RefreshScheduler: created with interval {:?}",
            interval
        );

        Ok(Self {
            service,
            interval,
            retry_delay,
            state: Arc::new(state),
            stop,
            handle: Arc::new(RwLock::new(None)),
        })
    }

    /// Start the loop; a second call while it runs does nothing
    pub async fn start(&self) -> Result<(), BoxError> {
        let mut handle = self.handle.write().await;
        if handle.as_ref().is_some_and(|h| !h.is_finished()) {
            info!("RefreshScheduler: already running");
            return Ok(());
        }

        self.stop.send_replace(false);
        self.state.send_replace(SchedulerState::Idle);

        let service = self.service.clone();
        let state = self.state.clone();
        let mut stop_rx = self.stop.subscribe();
        let interval = self.interval;
        let retry_delay = self.retry_delay;

        *handle = Some(tokio::spawn(async move {
            if let Some(metrics) = service.metrics() {
                metrics.background_tasks_active.inc();
            }
            info!("RefreshScheduler: background refresh started");

            loop {
                if *stop_rx.borrow() {
                    break;
                }

                state.send_replace(SchedulerState::RunningCycle);
                let outcome = service.refresh(RefreshTrigger::Scheduled).await;

                let delay = if outcome.success {
                    info!("Background refresh completed");
                    interval
                } else {
                    warn!(
                        error = outcome.error.as_deref().unwrap_or("unknown"),
                        retry_in_secs = retry_delay.as_secs(),
                        "Error in background refresh, retrying in {:?}",
                        retry_delay
                    );
                    retry_delay
                };

                state.send_replace(SchedulerState::Sleeping);
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {}
                    changed = stop_rx.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                }
            }

            state.send_replace(SchedulerState::Terminated);
            if let Some(metrics) = service.metrics() {
                metrics.background_tasks_active.dec();
            }
            info!("RefreshScheduler: background refresh stopped");
        }));

        info!("RefreshScheduler: started successfully");
        Ok(())
    }

    /// Stop the loop, waiting for an in-flight cycle to finish
    pub async fn stop(&self) {
        self.stop.send_replace(true);
        let handle = self.handle.write().await.take();
        if let Some(h) = handle {
            if let Err(e) = h.await {
                error!(error = %e, "RefreshScheduler: task ended abnormally");
            }
            info!("RefreshScheduler: stopped");
        }
        self.state.send_replace(SchedulerState::Terminated);
    }

    /// Check if the background loop is running
    pub async fn is_running(&self) -> bool {
        let handle = self.handle.read().await;
        handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.borrow()
    }

    /// Watch state transitions
    pub fn subscribe(&self) -> watch::Receiver<SchedulerState> {
        self.state.subscribe()
    }
}
