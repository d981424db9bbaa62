//! Panel session — background task polling one displayed symbol.
//!
//! A `CoinSession` owns a tokio task that:
//! - refreshes the coin summary immediately and then on a fixed interval,
//!   through the [`FreshnessCache`],
//! - refetches the chart whenever a summary is served or the timeframe
//!   changes, dropping results of superseded requests,
//! - publishes a [`PanelSnapshot`] on a `watch` channel and discrete
//!   [`SessionEvent`]s on a stream.
//!
//! Switching symbol tears the task down and starts a new one, so a symbol's
//! timer never outlives its display.

mod task;

use std::pin::Pin;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures_util::stream::Stream;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::domain::chart::ChartSeries;
use crate::domain::coin::{FreshnessCache, RefreshOutcome, SummaryDisplay, SummaryState};
use crate::error::SdkError;
use crate::shared::{CoinSymbol, Timeframe};
use crate::source::{ChartSource, SummarySource};

use task::{Command, Shared, TaskState};

// ─── Config ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Poll interval for the summary. The first refresh runs immediately.
    /// Values below one second are raised to one second.
    pub refresh_interval: Duration,
    /// Timeframe selected when the session starts.
    pub timeframe: Timeframe,
    /// Wall clock used to stamp and age cache entries.
    pub clock: SessionClock,
    pub event_capacity: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_interval: Duration::from_secs(60),
            timeframe: Timeframe::default(),
            clock: SessionClock::system(),
            event_capacity: 256,
        }
    }
}

/// Wall-clock time derived from the tokio clock.
///
/// Anchored once; later readings add tokio's elapsed time, so paused-time
/// tests age cache entries deterministically.
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    wall: DateTime<Utc>,
    instant: tokio::time::Instant,
}

impl SessionClock {
    pub fn system() -> Self {
        Self::starting_at(Utc::now())
    }

    pub fn starting_at(wall: DateTime<Utc>) -> Self {
        Self {
            wall,
            instant: tokio::time::Instant::now(),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        chrono::Duration::from_std(self.instant.elapsed())
            .ok()
            .and_then(|elapsed| self.wall.checked_add_signed(elapsed))
            .unwrap_or(self.wall)
    }
}

// ─── Snapshot & events ───────────────────────────────────────────────────────

/// Everything a host needs to render the panel.
#[derive(Debug, Clone)]
pub struct PanelSnapshot {
    pub symbol: CoinSymbol,
    pub summary: SummaryState,
    pub timeframe: Timeframe,
    pub chart: Option<ChartSeries>,
    /// A chart fetch for the current selection is in flight.
    pub chart_loading: bool,
}

impl PanelSnapshot {
    pub fn new(symbol: CoinSymbol, timeframe: Timeframe) -> Self {
        Self {
            symbol,
            summary: SummaryState::new(),
            timeframe,
            chart: None,
            chart_loading: false,
        }
    }

    /// Formatted summary, once one is displayed.
    pub fn display(&self) -> Option<SummaryDisplay> {
        self.summary.summary().map(SummaryDisplay::from)
    }

    /// The chart, only when it matches the selected timeframe.
    pub fn current_chart(&self) -> Option<&ChartSeries> {
        self.chart.as_ref().filter(|c| c.timeframe == self.timeframe)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A refresh ran for `symbol`.
    SummaryRefreshed {
        symbol: CoinSymbol,
        outcome: RefreshOutcome,
    },
    TimeframeChanged(Timeframe),
    /// A new series for `timeframe` is in the snapshot.
    ChartUpdated { timeframe: Timeframe },
    /// A chart fetch failed; the previous series is kept.
    ChartUnavailable { timeframe: Timeframe, reason: String },
    /// The task for `symbol` exited.
    Stopped { symbol: CoinSymbol },
}

// ─── Public CoinSession ──────────────────────────────────────────────────────

/// Handle to the background task of one displayed symbol.
///
/// Must be created inside a tokio runtime. Dropping it aborts the task.
pub struct CoinSession {
    symbol: CoinSymbol,
    config: SessionConfig,
    shared: Shared,
    cmd_tx: Option<mpsc::Sender<Command>>,
    event_rx: tokio::sync::Mutex<mpsc::Receiver<SessionEvent>>,
    task_handle: Option<JoinHandle<()>>,
}

impl CoinSession {
    /// Start polling `symbol`.
    pub fn spawn(
        symbol: CoinSymbol,
        cache: FreshnessCache,
        summary_source: Arc<dyn SummarySource>,
        chart_source: Arc<dyn ChartSource>,
        config: SessionConfig,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::channel(config.event_capacity.max(1));
        let (snapshot_tx, _) = watch::channel(PanelSnapshot::new(symbol.clone(), config.timeframe));

        let shared = Shared {
            cache,
            summary_source,
            chart_source,
            clock: config.clock,
            event_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            epoch: Arc::new(AtomicU64::new(0)),
        };

        let mut session = Self {
            symbol,
            config,
            shared,
            cmd_tx: None,
            event_rx: tokio::sync::Mutex::new(event_rx),
            task_handle: None,
        };
        let timeframe = session.config.timeframe;
        session.start_task(timeframe);
        session
    }

    pub fn symbol(&self) -> &CoinSymbol {
        &self.symbol
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Whether the background task is alive.
    pub fn is_running(&self) -> bool {
        self.task_handle
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Select a chart timeframe. The previous in-flight chart fetch, if any,
    /// is cancelled.
    pub fn select_timeframe(&self, timeframe: Timeframe) -> Result<(), SdkError> {
        self.send(Command::SelectTimeframe(timeframe))
    }

    /// [`select_timeframe`](Self::select_timeframe) by code (`"1h"` … `"30d"`).
    /// Unknown codes change nothing.
    pub fn select_timeframe_code(&self, code: &str) -> Result<(), SdkError> {
        let timeframe: Timeframe = code.parse()?;
        self.select_timeframe(timeframe)
    }

    /// Run a refresh now, outside the regular interval.
    pub fn refresh(&self) -> Result<(), SdkError> {
        self.send(Command::Refresh)
    }

    /// Display another symbol.
    ///
    /// Aborts the current task (its timer and chart fetch with it) and starts
    /// a new one. The selected timeframe carries over. Cache entries of the
    /// previous symbol are left as they are.
    pub fn set_symbol(&mut self, symbol: CoinSymbol) {
        if symbol == self.symbol && self.is_running() {
            return;
        }
        let timeframe = self.shared.snapshot_tx.borrow().timeframe;
        self.stop_task();
        tracing::info!(from = %self.symbol, to = %symbol, "Switching session symbol");
        self.symbol = symbol;
        self.start_task(timeframe);
    }

    /// Current panel state.
    pub fn snapshot(&self) -> PanelSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Watch the panel state.
    pub fn subscribe(&self) -> watch::Receiver<PanelSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Wait for the next event.
    pub async fn next_event(&self) -> Option<SessionEvent> {
        self.event_rx.lock().await.recv().await
    }

    /// Stream of session events.
    ///
    /// The returned stream borrows `self`, so it must be dropped before
    /// calling `set_symbol()` or `shutdown()`.
    pub fn events(&self) -> Pin<Box<dyn Stream<Item = SessionEvent> + Send + '_>> {
        Box::pin(futures_util::stream::unfold(
            &self.event_rx,
            |rx| async move {
                let mut guard = rx.lock().await;
                guard.recv().await.map(|event| (event, rx))
            },
        ))
    }

    /// Stop the task gracefully and wait for it to finish.
    pub async fn shutdown(&mut self) {
        if let Some(tx) = self.cmd_tx.take() {
            let _ = tx.send(Command::Shutdown).await;
        }
        if let Some(handle) = self.task_handle.take() {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle).await;
        }
    }

    fn send(&self, cmd: Command) -> Result<(), SdkError> {
        match &self.cmd_tx {
            Some(tx) => tx.try_send(cmd).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    SdkError::Other("Session command channel full".into())
                }
                mpsc::error::TrySendError::Closed(_) => {
                    SdkError::Other("Session stopped".into())
                }
            }),
            None => Err(SdkError::Other("Session stopped".into())),
        }
    }

    fn start_task(&mut self, timeframe: Timeframe) {
        let (cmd_tx, cmd_rx) = mpsc::channel(64);

        // Retire the previous task before its successor's first snapshot, so
        // a write still racing out of the old task is refused.
        let epoch = self.shared.next_epoch();
        self.shared
            .snapshot_tx
            .send_replace(PanelSnapshot::new(self.symbol.clone(), timeframe));

        let state = TaskState::new(
            self.shared.clone(),
            epoch,
            self.symbol.clone(),
            timeframe,
            cmd_rx,
        );

        self.cmd_tx = Some(cmd_tx);
        self.task_handle = Some(tokio::spawn(task::run_task(
            state,
            self.config.refresh_interval,
        )));
    }

    fn stop_task(&mut self) {
        self.cmd_tx = None;
        if let Some(handle) = self.task_handle.take() {
            handle.abort();
        }
    }
}

impl Drop for CoinSession {
    fn drop(&mut self) {
        self.stop_task();
    }
}

impl std::fmt::Debug for CoinSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoinSession")
            .field("symbol", &self.symbol)
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}
