//! Generic fetch → decide → arm-or-stop loop
//!
//! A [`Poller`] owns one [`StatusSource`] and one [`PollPolicy`]. Once
//! spawned it runs as a single tokio task:
//!
//! ```text
//!   ┌────────┐  visible   ┌─────────┐  Ok(snapshot)   ┌────────────┐
//!   │ hidden │ ─────────▶ │  fetch  │ ──────────────▶ │ next_poll  │──Stop──▶ Stopped
//!   └────────┘            └─────────┘                 └────────────┘
//!       ▲                      │ Err                        │ After(d)
//!       │                      ▼                            ▼
//!       │               ErrorPolicy ──────────────▶   sleep / refetch
//!       └────────────────────────────────────────────────────┘ hidden
//! ```
//!
//! Fetches for one poller never overlap. Dropping the [`PollerHandle`]
//! cancels the pending timer; an in-flight fetch runs to completion but its
//! result is discarded.
//!
//! Events are buffered up to [`EVENT_BUFFER`]; once the consumer falls that
//! far behind, newer events are dropped. `latest()` and `state()` always
//! reflect the newest cycle.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{mpsc, watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::error::FetchError;
use crate::policy::{NextPoll, PollPolicy};
use crate::retry::ErrorPolicy;
use crate::source::StatusSource;
use crate::visibility::Visibility;

/// Undelivered events kept per poller
pub const EVENT_BUFFER: usize = 16;

/// Lifecycle of one poller instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollerState {
    /// Disabled, nothing to poll
    Idle,
    /// A fetch is scheduled or in flight
    Active,
    /// No further fetches will happen
    Stopped(StopReason),
}

impl PollerState {
    pub fn is_stopped(&self) -> bool {
        matches!(self, PollerState::Stopped(_))
    }
}

/// Why a poller stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The policy decided no further fetch is needed
    Finished,
    /// The consumer discarded the poller
    Cancelled,
    /// A failed fetch stopped the poller under its error policy
    Failed,
}

/// Outcome of one cycle, delivered in order to the consumer
#[derive(Debug)]
pub enum PollEvent<T> {
    Fetched(T),
    Failed(FetchError),
    Stopped(StopReason),
}

/// Configured but not yet running poller
pub struct Poller<T> {
    source: Arc<dyn StatusSource<T>>,
    policy: Arc<dyn PollPolicy<T>>,
    visibility: Visibility,
    error_policy: ErrorPolicy,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<S, P>(source: S, policy: P) -> Self
    where
        S: StatusSource<T> + 'static,
        P: PollPolicy<T> + 'static,
    {
        Self {
            source: Arc::new(source),
            policy: Arc::new(policy),
            visibility: Visibility::always(),
            error_policy: ErrorPolicy::default(),
        }
    }

    /// Gate fetches on the consumer's interest signal
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_error_policy(mut self, policy: ErrorPolicy) -> Self {
        self.error_policy = policy;
        self
    }

    /// Start polling. The first fetch is issued as soon as the consumer is
    /// observing.
    pub fn spawn(self) -> PollerHandle<T> {
        let (state_tx, state_rx) = watch::channel(PollerState::Active);
        let (latest_tx, latest_rx) = watch::channel(None);
        let (events_tx, events_rx) = mpsc::channel(EVENT_BUFFER);
        let refetch = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        let span = info_span!("poller", source = %self.source.describe());
        let worker = Worker {
            source: self.source,
            policy: self.policy,
            visibility: self.visibility,
            error_policy: self.error_policy,
            cancel: cancel.clone(),
            refetch: refetch.clone(),
            state_tx,
            latest_tx,
            events_tx,
        };
        let task = tokio::spawn(worker.run().instrument(span));

        PollerHandle {
            state_rx,
            latest_rx,
            events_rx,
            refetch,
            cancel,
            task: Some(task),
        }
    }

    /// Handle for a poller with nothing to poll; it stays `Idle` forever
    pub fn disabled() -> PollerHandle<T> {
        let (_state_tx, state_rx) = watch::channel(PollerState::Idle);
        let (_latest_tx, latest_rx) = watch::channel(None);
        let (_events_tx, events_rx) = mpsc::channel(1);

        PollerHandle {
            state_rx,
            latest_rx,
            events_rx,
            refetch: Arc::new(Notify::new()),
            cancel: CancellationToken::new(),
            task: None,
        }
    }
}

/// Consumer side of a running poller
///
/// Dropping the handle discards the poller.
pub struct PollerHandle<T> {
    state_rx: watch::Receiver<PollerState>,
    latest_rx: watch::Receiver<Option<T>>,
    events_rx: mpsc::Receiver<PollEvent<T>>,
    refetch: Arc<Notify>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl<T: Clone> PollerHandle<T> {
    pub fn state(&self) -> PollerState {
        *self.state_rx.borrow()
    }

    /// Last successfully fetched snapshot
    pub fn latest(&self) -> Option<T> {
        self.latest_rx.borrow().clone()
    }

    /// Next cycle outcome; `None` once the poller is gone and all events
    /// have been drained
    pub async fn next_event(&mut self) -> Option<PollEvent<T>> {
        self.events_rx.recv().await
    }

    /// Fetch now instead of waiting for the pending timer. Also resumes a
    /// poller paused on a failed fetch.
    pub fn refetch(&self) {
        self.refetch.notify_one();
    }

    /// Stop scheduling fetches
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Wait until the poller stops; `None` for a disabled poller
    pub async fn stopped(&mut self) -> Option<StopReason> {
        if self.task.is_none() {
            return None;
        }
        match self.state_rx.wait_for(PollerState::is_stopped).await {
            Ok(state) => match *state {
                PollerState::Stopped(reason) => Some(reason),
                _ => None,
            },
            Err(_) => Some(StopReason::Cancelled),
        }
    }
}

impl<T> Drop for PollerHandle<T> {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// What to wait for after a cycle
enum Wait {
    Stop(StopReason),
    Timer(Duration),
    Refetch,
}

struct Worker<T> {
    source: Arc<dyn StatusSource<T>>,
    policy: Arc<dyn PollPolicy<T>>,
    visibility: Visibility,
    error_policy: ErrorPolicy,
    cancel: CancellationToken,
    refetch: Arc<Notify>,
    state_tx: watch::Sender<PollerState>,
    latest_tx: watch::Sender<Option<T>>,
    events_tx: mpsc::Sender<PollEvent<T>>,
}

impl<T> Worker<T>
where
    T: Clone + Send + Sync + 'static,
{
    async fn run(mut self) {
        debug!("Poller started");
        let reason = self.drive().await;

        self.state_tx.send_replace(PollerState::Stopped(reason));
        self.emit(PollEvent::Stopped(reason));
        info!(?reason, "Poller stopped");
    }

    async fn drive(&mut self) -> StopReason {
        let mut failures = 0u32;

        loop {
            if !self.visibility.is_visible() {
                debug!("Consumer not observing, suspending");
                tokio::select! {
                    _ = self.cancel.cancelled() => return StopReason::Cancelled,
                    _ = self.visibility.visible() => {}
                }
                // Re-decide on the cached snapshot instead of resuming the old timer
                if self.has_snapshot() && self.decide().is_stop() {
                    return StopReason::Finished;
                }
                debug!("Consumer observing again, fetching now");
                self.take_pending_refetch().await;
            }

            if self.cancel.is_cancelled() {
                return StopReason::Cancelled;
            }

            let result = self.source.fetch().await;

            if self.cancel.is_cancelled() {
                debug!("Discarding fetch result after cancellation");
                return StopReason::Cancelled;
            }

            let wait = match result {
                Ok(snapshot) => {
                    failures = 0;
                    self.latest_tx.send_replace(Some(snapshot.clone()));
                    self.emit(PollEvent::Fetched(snapshot));

                    match self.decide() {
                        NextPoll::Stop => Wait::Stop(StopReason::Finished),
                        NextPoll::After(delay) => Wait::Timer(delay),
                    }
                }
                Err(err) => {
                    failures += 1;
                    let wait = self.on_failure(&err, failures);
                    self.emit(PollEvent::Failed(err));
                    wait
                }
            };

            match wait {
                Wait::Stop(reason) => return reason,
                Wait::Timer(delay) => {
                    debug!(delay_ms = delay.as_millis() as u64, "Next fetch scheduled");
                    tokio::select! {
                        _ = self.cancel.cancelled() => return StopReason::Cancelled,
                        _ = tokio::time::sleep(delay) => {}
                        _ = self.refetch.notified() => debug!("Refetch requested"),
                        _ = self.visibility.hidden() => {}
                    }
                }
                Wait::Refetch => {
                    tokio::select! {
                        _ = self.cancel.cancelled() => return StopReason::Cancelled,
                        _ = self.refetch.notified() => debug!("Refetch requested"),
                    }
                }
            }
        }
    }

    fn on_failure(&self, err: &FetchError, failures: u32) -> Wait {
        match &self.error_policy {
            ErrorPolicy::Pause => {
                warn!(error = %err, "Fetch failed, paused until refetch");
                Wait::Refetch
            }
            ErrorPolicy::Stop => {
                warn!(error = %err, "Fetch failed, stopping");
                Wait::Stop(StopReason::Failed)
            }
            ErrorPolicy::Retry(retry) => {
                if retry.should_retry(err, failures) {
                    let delay = retry.delay_for_failure(failures);
                    warn!(
                        error = %err,
                        failures,
                        delay_ms = delay.as_millis() as u64,
                        "Fetch failed, retrying"
                    );
                    Wait::Timer(delay)
                } else {
                    warn!(error = %err, failures, "Fetch failed, giving up");
                    Wait::Stop(StopReason::Failed)
                }
            }
        }
    }

    fn emit(&self, event: PollEvent<T>) {
        match self.events_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                debug!("Event buffer full, dropping event");
            }
            // Receiver is gone
            Err(mpsc::error::TrySendError::Closed(_)) => {}
        }
    }

    /// A refetch requested while hidden is served by the resume fetch
    async fn take_pending_refetch(&self) {
        tokio::select! {
            biased;
            _ = self.refetch.notified() => debug!("Pending refetch folded into resume"),
            _ = std::future::ready(()) => {}
        }
    }

    fn has_snapshot(&self) -> bool {
        self.latest_tx.borrow().is_some()
    }

    fn decide(&self) -> NextPoll {
        let latest = self.latest_tx.borrow();
        self.policy.next_poll(latest.as_ref(), Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::{Campaign, CampaignStatus};
    use crate::error::FetchResult;
    use crate::policy::{AdaptiveCadence, AnyRunning};
    use crate::retry::RetryPolicy;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use chrono::DateTime;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Replays scripted results; repeats the last one when exhausted
    struct ScriptedSource<T> {
        script: Mutex<VecDeque<FetchResult<T>>>,
        fallback: fn() -> FetchResult<T>,
        calls: Arc<AtomicUsize>,
        latency: Duration,
    }

    impl<T> ScriptedSource<T> {
        fn new(script: Vec<FetchResult<T>>, fallback: fn() -> FetchResult<T>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                fallback,
                calls: Arc::new(AtomicUsize::new(0)),
                latency: Duration::ZERO,
            }
        }

        fn with_latency(mut self, latency: Duration) -> Self {
            self.latency = latency;
            self
        }

        fn calls(&self) -> Arc<AtomicUsize> {
            self.calls.clone()
        }
    }

    #[async_trait]
    impl<T: Send + Sync + 'static> StatusSource<T> for ScriptedSource<T> {
        async fn fetch(&self) -> FetchResult<T> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.latency.is_zero() {
                tokio::time::sleep(self.latency).await;
            }
            let next = self.script.lock().unwrap().pop_front();
            next.unwrap_or_else(|| (self.fallback)())
        }

        fn describe(&self) -> String {
            "scripted".to_string()
        }
    }

    fn running() -> FetchResult<Campaign> {
        Ok(Campaign::new("c1", CampaignStatus::Running))
    }

    fn completed() -> FetchResult<Campaign> {
        Ok(Campaign::new("c1", CampaignStatus::Completed))
    }

    fn unavailable() -> FetchResult<Campaign> {
        Err(FetchError::Api {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    /// Polls every 30s until the flag is raised
    struct UntilFlagged(Arc<AtomicBool>);

    impl PollPolicy<Campaign> for UntilFlagged {
        fn next_poll(&self, snapshot: Option<&Campaign>, _now: DateTime<Utc>) -> NextPoll {
            if snapshot.is_none() || self.0.load(Ordering::SeqCst) {
                NextPoll::Stop
            } else {
                NextPoll::After(Duration::from_secs(30))
            }
        }
    }

    fn fetched_status(event: Option<PollEvent<Campaign>>) -> CampaignStatus {
        match event {
            Some(PollEvent::Fetched(campaign)) => campaign.status,
            other => panic!("expected a snapshot, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_terminal_status() {
        let source = ScriptedSource::new(vec![running(), running()], completed);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        assert_eq!(fetched_status(handle.next_event().await), CampaignStatus::Running);
        assert_eq!(fetched_status(handle.next_event().await), CampaignStatus::Running);
        assert_eq!(fetched_status(handle.next_event().await), CampaignStatus::Completed);
        assert!(matches!(
            handle.next_event().await,
            Some(PollEvent::Stopped(StopReason::Finished))
        ));

        assert_eq!(handle.stopped().await, Some(StopReason::Finished));
        assert_eq!(
            handle.latest().map(|c| c.status),
            Some(CampaignStatus::Completed)
        );

        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_policy_delay_between_fetches() {
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        handle.next_event().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Default cadence is 30s when there is no estimate
        tokio::time::sleep(Duration::from_secs(29)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(handle.state(), PollerState::Active);
    }

    #[tokio::test(start_paused = true)]
    async fn test_near_completion_polls_faster() {
        fn almost_done() -> FetchResult<Campaign> {
            Ok(Campaign::new("c1", CampaignStatus::Running)
                .with_estimated_completion(Utc::now() + chrono::Duration::seconds(60)))
        }

        let source = ScriptedSource::new(vec![], almost_done);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        handle.next_event().await;
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_cancels_pending_timer() {
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        handle.next_event().await;
        drop(handle);

        tokio::time::sleep(Duration::from_secs(300)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_fetch_discards_result() {
        let source =
            ScriptedSource::new(vec![], running).with_latency(Duration::from_secs(2));
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        // Let the first fetch get in flight
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        handle.cancel();

        assert!(matches!(
            handle.next_event().await,
            Some(PollEvent::Stopped(StopReason::Cancelled))
        ));
        assert!(handle.latest().is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_reported_and_paused() {
        let source = ScriptedSource::new(vec![unavailable()], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        assert!(matches!(
            handle.next_event().await,
            Some(PollEvent::Failed(FetchError::Api { status: 503, .. }))
        ));
        assert_eq!(handle.state(), PollerState::Active);

        // Paused: no timer is armed
        tokio::time::sleep(Duration::from_secs(600)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        handle.refetch();
        assert_eq!(fetched_status(handle.next_event().await), CampaignStatus::Running);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_with_stop_policy() {
        let source = ScriptedSource::new(vec![], unavailable);
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_error_policy(ErrorPolicy::Stop)
            .spawn();

        assert!(matches!(handle.next_event().await, Some(PollEvent::Failed(_))));
        assert_eq!(handle.stopped().await, Some(StopReason::Failed));
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_policy_backs_off_then_gives_up() {
        let source = ScriptedSource::new(vec![], unavailable);
        let calls = source.calls();
        let retry = RetryPolicy::fixed(Duration::from_secs(10), 3);
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_error_policy(ErrorPolicy::Retry(retry))
            .spawn();

        assert_eq!(handle.stopped().await, Some(StopReason::Failed));
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        let mut failures = 0;
        while let Some(event) = handle.next_event().await {
            if matches!(event, PollEvent::Failed(_)) {
                failures += 1;
            }
        }
        assert_eq!(failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_resets_after_success() {
        let source = ScriptedSource::new(
            vec![unavailable(), unavailable(), running(), unavailable(), unavailable()],
            completed,
        );
        let retry = RetryPolicy::fixed(Duration::from_secs(1), 3);
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_error_policy(ErrorPolicy::Retry(retry))
            .spawn();

        assert_eq!(handle.stopped().await, Some(StopReason::Finished));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_preempts_timer() {
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        handle.next_event().await;
        handle.refetch();
        handle.next_event().await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hidden_consumer_suspends_fetches() {
        let (controller, visibility) = Visibility::channel(false);
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_visibility(visibility)
            .spawn();

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        controller.set_visible(true);
        handle.next_event().await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Hide mid-timer, wait past the would-be fetch
        tokio::time::sleep(Duration::from_secs(10)).await;
        controller.set_visible(false);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Showing again fetches immediately rather than finishing the old timer
        controller.set_visible(true);
        handle.next_event().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resume_stops_when_policy_says_so() {
        let (controller, visibility) = Visibility::channel(true);
        let done = Arc::new(AtomicBool::new(false));
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, UntilFlagged(done.clone()))
            .with_visibility(visibility)
            .spawn();

        handle.next_event().await;
        controller.set_visible(false);
        tokio::time::sleep(Duration::from_secs(5)).await;

        done.store(true, Ordering::SeqCst);
        controller.set_visible(true);

        assert_eq!(handle.stopped().await, Some(StopReason::Finished));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refetch_while_hidden_fetches_once_on_resume() {
        let (controller, visibility) = Visibility::channel(true);
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_visibility(visibility)
            .spawn();

        handle.next_event().await;
        controller.set_visible(false);
        tokio::time::sleep(Duration::from_secs(1)).await;

        handle.refetch();
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        controller.set_visible(true);
        handle.next_event().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unread_events_stay_bounded() {
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default()).spawn();

        // Ten hours at 30s with nobody reading events
        tokio::time::sleep(Duration::from_secs(36_000)).await;
        assert!(calls.load(Ordering::SeqCst) > 1_000);
        assert_eq!(
            handle.latest().map(|c| c.status),
            Some(CampaignStatus::Running)
        );

        handle.cancel();
        assert_eq!(handle.stopped().await, Some(StopReason::Cancelled));

        let mut queued = 0;
        while handle.next_event().await.is_some() {
            queued += 1;
        }
        assert_eq!(queued, EVENT_BUFFER);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_hidden() {
        let (_controller, visibility) = Visibility::channel(false);
        let source = ScriptedSource::new(vec![], running);
        let calls = source.calls();
        let mut handle = Poller::new(source, AdaptiveCadence::default())
            .with_visibility(visibility)
            .spawn();

        handle.cancel();
        assert_eq!(handle.stopped().await, Some(StopReason::Cancelled));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_disabled_poller_is_idle() {
        let mut handle = Poller::<Campaign>::disabled();

        assert_eq!(handle.state(), PollerState::Idle);
        assert!(handle.latest().is_none());
        assert!(handle.next_event().await.is_none());
        assert_eq!(handle.stopped().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_poller_stops_when_nothing_running() {
        fn first() -> FetchResult<Vec<Campaign>> {
            Ok(vec![
                Campaign::new("a", CampaignStatus::Running),
                Campaign::new("b", CampaignStatus::Completed),
            ])
        }
        fn settled() -> FetchResult<Vec<Campaign>> {
            Ok(vec![
                Campaign::new("a", CampaignStatus::Completed),
                Campaign::new("b", CampaignStatus::Completed),
            ])
        }

        let source = ScriptedSource::new(vec![first()], settled);
        let calls = source.calls();
        let mut handle = Poller::new(source, AnyRunning::default()).spawn();

        assert_eq!(handle.stopped().await, Some(StopReason::Finished));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(handle.latest().map(|list| list.len()), Some(2));
    }
}
