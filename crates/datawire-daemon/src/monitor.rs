//! The usage monitor.
//!
//! [`UsageMonitor`] owns the ledger for the lifetime of the process and is the
//! only path that mutates it. All ledger updates happen inside a single write
//! lock section that never spans an `.await`, so a snapshot never observes a
//! half-applied record.

use crate::alert::{AlertEvaluator, NotificationIntent, Notifier};
use crate::config::MonitorConfig;
use crate::events::{RequestEvent, ShortcutCommand, status_allows_fallback};
use crate::query::{QueryRequest, QueryResponse};
use crate::state::{StateError, UsageStore};
use chrono::{DateTime, Utc};
use datawire_estimate::{ContentLength, RequestMeta, SizeEstimator, badge_text};
use datawire_ledger::{RolloverOutcome, UsageLedger, UsageSnapshot};
use datawire_types::{Clock, Direction, Settings, TransferRate};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Where the monitor is in its startup sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed, nothing loaded yet.
    Uninitialized,
    /// Settings and stored usage are being loaded.
    Loading,
    /// Stored state restored; events are applied directly.
    Ready,
}

#[derive(Debug)]
struct Startup {
    phase: Lifecycle,
    /// Events that arrived before `Ready`, with their arrival time.
    backlog: Vec<(DateTime<Utc>, RequestEvent)>,
}

/// Turns request events and UI queries into ledger updates.
///
/// Queries are always answered from whatever state exists, even while
/// loading. Until the monitor is ready, mutating queries are answered with
/// that snapshot instead of being applied, since the restore would undo them.
/// Request events that arrive before the monitor is ready are queued and
/// replayed in arrival order once stored state has been restored.
#[derive(Debug)]
pub struct UsageMonitor {
    ledger: RwLock<UsageLedger>,
    settings: RwLock<Settings>,
    startup: Mutex<Startup>,
    alerts: Mutex<AlertEvaluator>,
    store: UsageStore,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
    estimator: SizeEstimator,
    config: MonitorConfig,
}

impl UsageMonitor {
    /// Creates a monitor with an empty ledger.
    ///
    /// Call [`initialize`](Self::initialize) to load stored state.
    #[must_use]
    pub fn new(
        store: UsageStore,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
        config: MonitorConfig,
    ) -> Self {
        let ledger = UsageLedger::new(clock.now())
            .with_calendar(config.calendar)
            .with_activity_window(config.activity_window);

        Self {
            ledger: RwLock::new(ledger),
            settings: RwLock::new(Settings::default()),
            startup: Mutex::new(Startup {
                phase: Lifecycle::Uninitialized,
                backlog: Vec::new(),
            }),
            alerts: Mutex::new(AlertEvaluator::new(config.suppress_repeat_alerts)),
            store,
            notifier,
            clock,
            estimator: SizeEstimator::global(),
            config,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Returns the storage wrapper.
    #[must_use]
    pub const fn store(&self) -> &UsageStore {
        &self.store
    }

    /// Returns the current lifecycle phase.
    pub async fn lifecycle(&self) -> Lifecycle {
        self.startup.lock().await.phase
    }

    /// Loads settings and stored usage, restores the ledger, runs the
    /// startup rollover check and replays queued events.
    ///
    /// Calling this more than once has no effect.
    pub async fn initialize(&self) {
        {
            let mut startup = self.startup.lock().await;
            if startup.phase != Lifecycle::Uninitialized {
                return;
            }
            startup.phase = Lifecycle::Loading;
        }
        tracing::info!("loading stored usage");

        let settings = self.store.load_settings().await;
        let durable = self.store.load_durable().await;

        let mut startup = self.startup.lock().await;
        let backlog = std::mem::take(&mut startup.backlog);
        let replayed = backlog.len();
        {
            let now = self.clock.now();
            let mut ledger = self.ledger.write().await;
            ledger.set_retention_days(settings.retention_days());
            let outcome = ledger.restore(durable, now);
            tracing::debug!(today = %outcome.today, pruned = outcome.pruned.len(), "startup rollover");

            for (arrived, event) in backlog {
                Self::apply_event(&mut ledger, self.estimator, event, arrived);
            }
        }
        *self.settings.write().await = settings;
        startup.phase = Lifecycle::Ready;

        tracing::info!(replayed, "usage monitor ready");
    }

    /// Handles one request event.
    ///
    /// Returns whether anything was recorded. Events that arrive before the
    /// monitor is ready are queued and report `false`.
    pub async fn handle_event(&self, event: RequestEvent) -> bool {
        let now = self.clock.now();
        {
            let mut startup = self.startup.lock().await;
            if startup.phase != Lifecycle::Ready {
                tracing::debug!(url = event.url(), "queueing event until ready");
                startup.backlog.push((now, event));
                return false;
            }
        }

        let mut ledger = self.ledger.write().await;
        Self::apply_event(&mut ledger, self.estimator, event, now)
    }

    /// Records uploaded bytes for `url`. Non-positive or fractional counts
    /// are dropped.
    pub async fn record_upload(&self, bytes: f64, url: &str) -> bool {
        self.record(Direction::Upload, bytes, url).await
    }

    /// Records downloaded bytes for `url`. Non-positive or fractional counts
    /// are dropped.
    pub async fn record_download(&self, bytes: f64, url: &str) -> bool {
        self.record(Direction::Download, bytes, url).await
    }

    /// Records a transfer in `direction`.
    pub async fn record(&self, direction: Direction, bytes: f64, url: &str) -> bool {
        self.handle_event(RequestEvent::Transfer {
            direction,
            bytes,
            url: url.to_string(),
        })
        .await
    }

    fn apply_event(
        ledger: &mut UsageLedger,
        estimator: SizeEstimator,
        event: RequestEvent,
        now: DateTime<Utc>,
    ) -> bool {
        match event {
            RequestEvent::BeforeSendHeaders {
                url,
                method,
                request_headers,
            } => {
                let request = RequestMeta {
                    url,
                    method,
                    request_headers,
                };
                let bytes = estimator.upload_size(&request);
                ledger.record_upload(bytes, &request.url, now)
            }
            RequestEvent::HeadersReceived {
                url,
                response_headers,
            } => ContentLength::from_headers(&response_headers)
                .exact()
                .is_some_and(|bytes| ledger.record_download(bytes, &url, now)),
            RequestEvent::Completed {
                url,
                status_code,
                response_headers,
            } => {
                if !status_allows_fallback(status_code) {
                    return false;
                }
                let headers = response_headers.unwrap_or_default();
                if !ContentLength::from_headers(&headers).needs_fallback() {
                    return false;
                }
                let bytes = estimator.download_size_from_url(&url);
                tracing::debug!(%url, bytes, "estimated download without content-length");
                ledger.record_download(bytes, &url, now)
            }
            RequestEvent::Transfer {
                direction,
                bytes,
                url,
            } => UsageLedger::validate_bytes(bytes)
                .is_some_and(|bytes| ledger.record(direction, bytes, &url, now)),
        }
    }

    /// Answers a UI query.
    ///
    /// Before the monitor is ready, `resetSession` and `clearAllData` are
    /// not applied and are answered with the current snapshot.
    pub async fn handle_query(&self, query: QueryRequest) -> QueryResponse {
        if query.is_mutating() && self.lifecycle().await != Lifecycle::Ready {
            tracing::debug!(?query, "stored usage not loaded yet, answering with snapshot");
            return QueryResponse::Usage(Box::new(self.snapshot().await));
        }

        match query {
            QueryRequest::GetUsageData => QueryResponse::Usage(Box::new(self.snapshot().await)),
            QueryRequest::ResetSession => {
                self.reset_session().await;
                QueryResponse::success()
            }
            QueryRequest::ClearAllData => {
                self.clear_all().await;
                QueryResponse::success()
            }
            QueryRequest::GetTransferRate => QueryResponse::Rate(self.transfer_rate().await),
            QueryRequest::Unknown => QueryResponse::unknown_action(),
        }
    }

    /// Answers a UI query, giving up after the configured query timeout.
    pub async fn handle_query_with_timeout(&self, query: QueryRequest) -> QueryResponse {
        tokio::time::timeout(self.config.query_timeout, self.handle_query(query))
            .await
            .unwrap_or_else(|_| {
                tracing::warn!(?query, "query timed out");
                QueryResponse::timed_out()
            })
    }

    /// Handles a keyboard shortcut.
    pub async fn handle_command(&self, command: ShortcutCommand) {
        match command {
            ShortcutCommand::ResetSession => {
                if self.lifecycle().await != Lifecycle::Ready {
                    tracing::debug!("ignoring session reset until stored usage is loaded");
                    return;
                }
                self.reset_session().await;
                self.notify(&NotificationIntent::session_reset()).await;
            }
            ShortcutCommand::Unsupported => {
                tracing::debug!("ignoring unsupported shortcut command");
            }
        }
    }

    /// Returns a consistent copy of all usage views.
    pub async fn snapshot(&self) -> UsageSnapshot {
        let now = self.clock.now();
        self.ledger.read().await.snapshot(now)
    }

    /// Upload + download for today.
    pub async fn today_total(&self) -> u64 {
        let now = self.clock.now();
        self.ledger.read().await.today_total(now)
    }

    /// Current transfer rate.
    pub async fn transfer_rate(&self) -> TransferRate {
        let now = self.clock.now();
        self.ledger.read().await.transfer_rate(now)
    }

    /// Toolbar badge label for today's total.
    pub async fn badge_text(&self) -> String {
        badge_text(self.today_total().await)
    }

    /// Starts a new session.
    pub async fn reset_session(&self) {
        let now = self.clock.now();
        self.ledger.write().await.reset_session(now);
    }

    /// Drops all usage data and immediately persists the empty state.
    pub async fn clear_all(&self) {
        let now = self.clock.now();
        self.ledger.write().await.clear_all(now);
        self.persist_logged().await;
    }

    /// Runs the day rollover check.
    pub async fn roll_over(&self) -> RolloverOutcome {
        let now = self.clock.now();
        self.ledger.write().await.roll_over(now)
    }

    /// Writes the durable part of the ledger to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded or written.
    pub async fn persist(&self) -> Result<(), StateError> {
        let entries = {
            let ledger = self.ledger.read().await;
            UsageStore::encode_durable(ledger.durable_state())?
        };
        self.store.save_entries(entries).await?;
        tracing::trace!("usage state persisted");
        Ok(())
    }

    /// Persists and logs failures instead of returning them.
    pub async fn persist_logged(&self) {
        if let Err(e) = self.persist().await {
            tracing::warn!(error = %e, "failed to persist usage state");
        }
    }

    /// Compares today's usage against the alert threshold and notifies when
    /// it is exceeded. Returns the intent that was raised, if any.
    pub async fn check_alerts(&self) -> Option<NotificationIntent> {
        let now = self.clock.now();
        let (today, total) = {
            let ledger = self.ledger.read().await;
            (ledger.today(now), ledger.today_total(now))
        };
        let settings = self.settings().await;

        let intent = self.alerts.lock().await.evaluate(&settings, today, total)?;
        tracing::info!(%today, total, "daily usage over alert threshold");
        self.notify(&intent).await;
        Some(intent)
    }

    /// Sends a notification if alerts are enabled. Returns whether it was
    /// delivered.
    pub async fn notify(&self, intent: &NotificationIntent) -> bool {
        if !self.settings.read().await.usage_alerts {
            tracing::debug!(title = %intent.title, "notifications disabled");
            return false;
        }

        match self.notifier.notify(intent).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, "notification failed");
                false
            }
        }
    }

    /// Returns the current settings.
    pub async fn settings(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Replaces the settings, applies the retention window and saves them.
    ///
    /// # Errors
    ///
    /// Returns an error if the settings cannot be written.
    pub async fn update_settings(&self, settings: Settings) -> Result<(), StateError> {
        self.ledger
            .write()
            .await
            .set_retention_days(settings.retention_days());
        self.store.save_settings(&settings).await?;
        *self.settings.write().await = settings;
        Ok(())
    }
}
