// ── Update coordinator ──
//
// Token lifecycle plus one parallel fan-out of reading requests per
// cycle, on a fixed interval. Publishes a fresh snapshot after every
// successful cycle; a failed token request leaves the previous snapshot
// in place and records the error.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use strum::Display;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::CoordinatorConfig;
use crate::error::CoreError;
use crate::model::{DeviceReading, Snapshot};
use crate::poller;
use crate::stream::SnapshotStream;
use crate::token::TokenManager;

// ── CoordinatorState ─────────────────────────────────────────────

/// Phase of the current (or most recent) poll cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "kebab-case")]
pub enum CoordinatorState {
    /// No cycle has run since construction or shutdown.
    Idle,
    RefreshingToken,
    PollingDevices,
    /// Last cycle published a snapshot.
    Published,
    /// Last cycle could not obtain a token.
    Failed,
}

/// Observable coordinator status, updated at every state transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorStatus {
    pub state: CoordinatorState,
    /// `true` once a cycle has published and no cycle has failed since;
    /// cleared by `shutdown`.
    pub last_update_success: bool,
    /// Message of the most recent failed cycle, cleared on success.
    pub last_error: Option<String>,
    /// When the current snapshot was published.
    pub last_published_at: Option<DateTime<Utc>>,
    /// Completed cycles, successful or not.
    pub cycles: u64,
}

impl Default for CoordinatorStatus {
    fn default() -> Self {
        Self {
            state: CoordinatorState::Idle,
            last_update_success: false,
            last_error: None,
            last_published_at: None,
            cycles: 0,
        }
    }
}

// ── Coordinator ──────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<CoordinatorInner>`. Build one per account
/// and hand clones to every consumer that displays its data.
#[derive(Clone)]
pub struct Coordinator {
    inner: Arc<CoordinatorInner>,
}

struct CoordinatorInner {
    config: CoordinatorConfig,
    clock: Arc<dyn Clock>,
    /// Held for the whole of a cycle, which serializes cycles.
    tokens: Mutex<TokenManager>,
    snapshot: watch::Sender<Arc<Snapshot>>,
    status: watch::Sender<CoordinatorStatus>,
    ticker: Mutex<Option<Ticker>>,
}

struct Ticker {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Coordinator {
    /// Create a coordinator using the system clock. Does NOT poll --
    /// call [`start()`](Self::start) or [`refresh()`](Self::refresh).
    pub fn new(config: CoordinatorConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Create a coordinator reading time from `clock`.
    pub fn with_clock(config: CoordinatorConfig, clock: Arc<dyn Clock>) -> Self {
        let tokens = TokenManager::new(
            config.credentials.clone(),
            config.token_expiration_secs,
            Arc::clone(&clock),
        );
        let (snapshot, _) = watch::channel(Arc::new(Snapshot::empty()));
        let (status, _) = watch::channel(CoordinatorStatus::default());

        Self {
            inner: Arc::new(CoordinatorInner {
                config,
                clock,
                tokens: Mutex::new(tokens),
                snapshot,
                status,
                ticker: Mutex::new(None),
            }),
        }
    }

    /// Access the coordinator configuration.
    pub fn config(&self) -> &CoordinatorConfig {
        &self.inner.config
    }

    /// Configured device ids, in configured order.
    pub fn device_ids(&self) -> &[String] {
        &self.inner.config.device_ids
    }

    // ── Poll cycle ───────────────────────────────────────────────

    /// Run one poll cycle and publish its snapshot.
    ///
    /// Fails only if no token can be obtained; in that case the
    /// published snapshot is left untouched. Per-device failures show
    /// up as empty readings.
    pub async fn refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        let mut tokens = self.inner.tokens.lock().await;
        self.set_state(CoordinatorState::RefreshingToken);

        // One HTTP session per cycle, dropped on every exit path.
        let session = match self.inner.config.connection.session() {
            Ok(session) => session,
            Err(e) => return Err(self.fail(e)),
        };

        if let Err(e) = tokens.ensure_valid_token(&session).await {
            return Err(self.fail(e));
        }

        self.set_state(CoordinatorState::PollingDevices);
        let device_ids = &self.inner.config.device_ids;
        let token = tokens.token();
        let results = futures_util::future::join_all(
            device_ids
                .iter()
                .map(|id| poller::fetch_reading(&session, token, id)),
        )
        .await;
        drop(session);

        let snapshot = Arc::new(Snapshot::from_results(device_ids, results));
        self.inner.snapshot.send_replace(Arc::clone(&snapshot));

        let now = self.inner.clock.now();
        self.inner.status.send_modify(|s| {
            s.state = CoordinatorState::Published;
            s.last_update_success = true;
            s.last_error = None;
            s.last_published_at = Some(now);
            s.cycles += 1;
        });
        info!(
            devices = snapshot.len(),
            reporting = snapshot.reporting_count(),
            "published gas level snapshot"
        );

        Ok(snapshot)
    }

    /// The startup cycle, run once before consumers render anything.
    pub async fn first_refresh(&self) -> Result<Arc<Snapshot>, CoreError> {
        match self.refresh().await {
            Ok(snapshot) => Ok(snapshot),
            Err(e) => {
                error!(error = %e, "first refresh failed");
                Err(e)
            }
        }
    }

    fn set_state(&self, state: CoordinatorState) {
        debug!(%state, "coordinator state");
        self.inner.status.send_modify(|s| s.state = state);
    }

    fn fail(&self, err: CoreError) -> CoreError {
        warn!(error = %err, "update failed");
        self.inner.status.send_modify(|s| {
            s.state = CoordinatorState::Failed;
            s.last_update_success = false;
            s.last_error = Some(err.to_string());
            s.cycles += 1;
        });
        err
    }

    // ── Lifecycle ────────────────────────────────────────────────

    /// Run the first refresh, then spawn the interval ticker.
    ///
    /// Calling `start()` on a running coordinator is a no-op. If the
    /// first refresh fails no ticker is spawned and the error is returned.
    pub async fn start(&self) -> Result<(), CoreError> {
        let mut ticker = self.inner.ticker.lock().await;
        if ticker.is_some() {
            debug!("coordinator already running");
            return Ok(());
        }

        self.first_refresh().await?;

        let period = self.inner.config.update_interval;
        if period.is_zero() {
            debug!("update interval is zero, periodic refresh disabled");
        } else {
            let cancel = CancellationToken::new();
            let handle = tokio::spawn(refresh_task(self.clone(), period, cancel.clone()));
            *ticker = Some(Ticker { cancel, handle });
            info!(interval_secs = period.as_secs(), "coordinator started");
        }
        Ok(())
    }

    /// Stop the ticker (waiting for an in-flight cycle) and drop the token.
    pub async fn shutdown(&self) {
        let ticker = self.inner.ticker.lock().await.take();
        if let Some(ticker) = ticker {
            ticker.cancel.cancel();
            let _ = ticker.handle.await;
        }

        self.inner.tokens.lock().await.clear();
        self.inner.status.send_modify(|s| {
            s.state = CoordinatorState::Idle;
            s.last_update_success = false;
        });
        debug!("coordinator stopped");
    }

    /// `true` while the interval ticker is running.
    pub async fn is_running(&self) -> bool {
        self.inner.ticker.lock().await.is_some()
    }

    // ── State observation ────────────────────────────────────────

    /// The most recently published snapshot (empty before the first one).
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.inner.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot publishes.
    pub fn subscribe(&self) -> SnapshotStream {
        SnapshotStream::new(self.inner.snapshot.subscribe())
    }

    /// Reading for one device from the current snapshot.
    pub fn reading(&self, device_id: &str) -> Option<DeviceReading> {
        self.inner.snapshot.borrow().get(device_id).cloned()
    }

    pub fn status(&self) -> CoordinatorStatus {
        self.inner.status.borrow().clone()
    }

    pub fn state(&self) -> CoordinatorState {
        self.inner.status.borrow().state
    }

    /// Subscribe to status changes.
    pub fn watch_status(&self) -> watch::Receiver<CoordinatorStatus> {
        self.inner.status.subscribe()
    }

    pub fn last_update_success(&self) -> bool {
        self.inner.status.borrow().last_update_success
    }

    pub fn last_error(&self) -> Option<String> {
        self.inner.status.borrow().last_error.clone()
    }

    /// Local expiry of the cached token, if one is held.
    pub async fn token_expires_at(&self) -> Option<DateTime<Utc>> {
        self.inner
            .tokens
            .lock()
            .await
            .token()
            .map(crate::token::Token::expires_at)
    }
}

/// Periodically run a poll cycle until cancelled.
async fn refresh_task(coordinator: Coordinator, period: Duration, cancel: CancellationToken) {
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval.tick().await; // consume the immediate first tick

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = interval.tick() => {
                // Failures are already logged and recorded in the status.
                let _ = coordinator.refresh().await;
            }
        }
    }
}
