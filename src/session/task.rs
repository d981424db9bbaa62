//! Background task of a [`CoinSession`](super::CoinSession).

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::{PanelSnapshot, SessionClock, SessionEvent};
use crate::domain::chart::{ChartApply, ChartRequest, ChartState, PriceSample};
use crate::domain::coin::{CoinSummary, FreshnessCache, RefreshOutcome, SummaryRefresher};
use crate::error::SdkError;
use crate::shared::{CoinSymbol, Timeframe};
use crate::source::{ChartSource, SummarySource};

type ChartResult = (ChartRequest, Result<Vec<PriceSample>, SdkError>);
type SummaryResult = (DateTime<Utc>, Result<CoinSummary, SdkError>);

/// Shortest accepted refresh interval.
pub(super) const MIN_REFRESH_INTERVAL: Duration = Duration::from_secs(1);

// ─── Commands from public API to background task ─────────────────────────────

pub(super) enum Command {
    SelectTimeframe(Timeframe),
    Refresh,
    Shutdown,
}

/// Handles that outlive a single task and carry over on symbol change.
#[derive(Clone)]
pub(super) struct Shared {
    pub(super) cache: FreshnessCache,
    pub(super) summary_source: Arc<dyn SummarySource>,
    pub(super) chart_source: Arc<dyn ChartSource>,
    pub(super) clock: SessionClock,
    pub(super) event_tx: mpsc::Sender<SessionEvent>,
    pub(super) snapshot_tx: Arc<watch::Sender<PanelSnapshot>>,
    /// Bumped for every task started. Only the task holding the latest value
    /// may publish or emit.
    pub(super) epoch: Arc<AtomicU64>,
}

impl Shared {
    /// Retire every running task and return the epoch for the next one.
    pub(super) fn next_epoch(&self) -> u64 {
        self.epoch.fetch_add(1, Ordering::SeqCst) + 1
    }
}

// ─── Background task state ───────────────────────────────────────────────────

pub(super) struct TaskState {
    symbol: CoinSymbol,
    refresher: SummaryRefresher,
    chart: ChartState,
    chart_source: Arc<dyn ChartSource>,
    clock: SessionClock,
    cmd_rx: mpsc::Receiver<Command>,
    chart_tx: mpsc::Sender<ChartResult>,
    chart_rx: mpsc::Receiver<ChartResult>,
    chart_inflight: Option<JoinHandle<()>>,
    summary_tx: mpsc::Sender<SummaryResult>,
    summary_rx: mpsc::Receiver<SummaryResult>,
    summary_inflight: Option<JoinHandle<()>>,
    event_tx: mpsc::Sender<SessionEvent>,
    snapshot_tx: Arc<watch::Sender<PanelSnapshot>>,
    epoch: Arc<AtomicU64>,
    my_epoch: u64,
}

impl TaskState {
    pub(super) fn new(
        shared: Shared,
        my_epoch: u64,
        symbol: CoinSymbol,
        timeframe: Timeframe,
        cmd_rx: mpsc::Receiver<Command>,
    ) -> Self {
        let (chart_tx, chart_rx) = mpsc::channel(8);
        let (summary_tx, summary_rx) = mpsc::channel(1);
        Self {
            refresher: SummaryRefresher::new(symbol.clone(), shared.cache, shared.summary_source),
            symbol,
            chart: ChartState::with_timeframe(timeframe),
            chart_source: shared.chart_source,
            clock: shared.clock,
            cmd_rx,
            chart_tx,
            chart_rx,
            chart_inflight: None,
            summary_tx,
            summary_rx,
            summary_inflight: None,
            event_tx: shared.event_tx,
            snapshot_tx: shared.snapshot_tx,
            epoch: shared.epoch,
            my_epoch,
        }
    }

    /// False once the session has moved on to another task.
    fn is_current(&self) -> bool {
        self.epoch.load(Ordering::SeqCst) == self.my_epoch
    }

    fn emit(&self, event: SessionEvent) {
        if self.is_current() {
            let _ = self.event_tx.try_send(event);
        }
    }

    fn publish(&self) {
        let snapshot = PanelSnapshot {
            symbol: self.symbol.clone(),
            summary: self.refresher.state().clone(),
            timeframe: self.chart.timeframe(),
            chart: self.chart.series().cloned(),
            chart_loading: self.chart.is_pending(),
        };

        // Checked under the channel lock: the session bumps the epoch before
        // it publishes the next task's first snapshot.
        let (epoch, mine) = (&self.epoch, self.my_epoch);
        let published = self.snapshot_tx.send_if_modified(|current| {
            if epoch.load(Ordering::SeqCst) != mine {
                return false;
            }
            *current = snapshot;
            true
        });
        if !published {
            tracing::debug!(symbol = %self.symbol, "Dropped snapshot of retired task");
        }
    }

    /// Start a refresh. A fresh cache entry is served at once; otherwise the
    /// upstream fetch runs as a child task and lands in `apply_summary`.
    fn refresh_summary(&mut self) {
        if self.summary_inflight.is_some() {
            tracing::debug!(symbol = %self.symbol, "Summary fetch already in flight");
            return;
        }

        let now = self.clock.now();
        if let Some(outcome) = self.refresher.serve_fresh(now) {
            self.finish_refresh(outcome);
            return;
        }

        let source = Arc::clone(self.refresher.source());
        let symbol = self.symbol.clone();
        let tx = self.summary_tx.clone();
        self.summary_inflight = Some(tokio::spawn(async move {
            let result = source.coin_summary(&symbol).await;
            let _ = tx.send((now, result)).await;
        }));
    }

    fn apply_summary(
        &mut self,
        fetched_at: DateTime<Utc>,
        result: Result<CoinSummary, SdkError>,
    ) {
        self.summary_inflight = None;
        let outcome = self.refresher.apply_fetch(result, fetched_at);
        self.finish_refresh(outcome);
    }

    fn finish_refresh(&mut self, outcome: RefreshOutcome) {
        if outcome.replaced_summary() {
            if let Some(summary) = self.refresher.state().summary() {
                let request = self.chart.set_coin(summary.id.clone());
                self.fetch_chart(request);
            }
        }

        self.publish();
        self.emit(SessionEvent::SummaryRefreshed {
            symbol: self.symbol.clone(),
            outcome,
        });
    }

    fn select_timeframe(&mut self, timeframe: Timeframe) {
        tracing::debug!(symbol = %self.symbol, %timeframe, "Timeframe selected");
        if let Some(request) = self.chart.select_timeframe(timeframe) {
            self.fetch_chart(request);
        }
        self.publish();
        self.emit(SessionEvent::TimeframeChanged(timeframe));
    }

    /// Start `request` as a child task, aborting the one it supersedes.
    fn fetch_chart(&mut self, request: ChartRequest) {
        self.abort_chart();

        let source = Arc::clone(&self.chart_source);
        let tx = self.chart_tx.clone();
        self.chart_inflight = Some(tokio::spawn(async move {
            let result = source.market_chart(&request.coin_id, request.days()).await;
            let _ = tx.send((request, result)).await;
        }));
    }

    fn apply_chart(&mut self, request: ChartRequest, result: Result<Vec<PriceSample>, SdkError>) {
        let reason = result.as_ref().err().map(|e| e.to_string());

        match self.chart.apply(&request, result) {
            ChartApply::Superseded => return,
            ChartApply::Applied => {
                self.emit(SessionEvent::ChartUpdated {
                    timeframe: request.timeframe,
                });
            }
            ChartApply::Failed => {
                self.emit(SessionEvent::ChartUnavailable {
                    timeframe: request.timeframe,
                    reason: reason.unwrap_or_default(),
                });
            }
        }

        self.chart_inflight = None;
        self.publish();
    }

    fn abort_chart(&mut self) {
        if let Some(handle) = self.chart_inflight.take() {
            handle.abort();
        }
    }
}

impl Drop for TaskState {
    fn drop(&mut self) {
        self.abort_chart();
        if let Some(handle) = self.summary_inflight.take() {
            handle.abort();
        }
    }
}

// ─── Background task ─────────────────────────────────────────────────────────

pub(super) async fn run_task(mut state: TaskState, refresh_interval: Duration) {
    tracing::info!(symbol = %state.symbol, "Coin session started");
    state.publish();

    // First tick completes immediately.
    let mut ticker = tokio::time::interval(refresh_interval.max(MIN_REFRESH_INTERVAL));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                state.refresh_summary();
            }

            cmd = state.cmd_rx.recv() => {
                match cmd {
                    Some(Command::SelectTimeframe(timeframe)) => state.select_timeframe(timeframe),
                    Some(Command::Refresh) => state.refresh_summary(),
                    Some(Command::Shutdown) | None => break,
                }
            }

            Some((request, result)) = state.chart_rx.recv() => {
                state.apply_chart(request, result);
            }

            Some((fetched_at, result)) = state.summary_rx.recv() => {
                state.apply_summary(fetched_at, result);
            }
        }
    }

    tracing::info!(symbol = %state.symbol, "Coin session stopped");
    state.emit(SessionEvent::Stopped {
        symbol: state.symbol.clone(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HttpError;
    use crate::shared::CoinId;
    use async_trait::async_trait;

    struct Offline;

    #[async_trait]
    impl SummarySource for Offline {
        async fn coin_summary(&self, _symbol: &CoinSymbol) -> Result<CoinSummary, SdkError> {
            Err(SdkError::Http(HttpError::Timeout))
        }
    }

    #[async_trait]
    impl ChartSource for Offline {
        async fn market_chart(
            &self,
            coin_id: &CoinId,
            _days: u32,
        ) -> Result<Vec<PriceSample>, SdkError> {
            Err(SdkError::NoChartData(coin_id.to_string()))
        }
    }

    fn shared() -> (Shared, mpsc::Receiver<SessionEvent>) {
        let (event_tx, event_rx) = mpsc::channel(16);
        let (snapshot_tx, _) = watch::channel(PanelSnapshot::new(
            CoinSymbol::from("BTC"),
            Timeframe::default(),
        ));
        let shared = Shared {
            cache: FreshnessCache::in_memory(),
            summary_source: Arc::new(Offline),
            chart_source: Arc::new(Offline),
            clock: SessionClock::system(),
            event_tx,
            snapshot_tx: Arc::new(snapshot_tx),
            epoch: Arc::new(AtomicU64::new(0)),
        };
        (shared, event_rx)
    }

    fn task(shared: &Shared, symbol: &str) -> TaskState {
        let (_cmd_tx, cmd_rx) = mpsc::channel(1);
        let epoch = shared.next_epoch();
        TaskState::new(shared.clone(), epoch, CoinSymbol::from(symbol), Timeframe::Day7, cmd_rx)
    }

    #[tokio::test]
    async fn test_retired_task_cannot_publish_or_emit() {
        let (shared, mut event_rx) = shared();
        let btc = task(&shared, "BTC");
        let eth = task(&shared, "ETH");

        eth.publish();
        btc.publish();
        btc.emit(SessionEvent::TimeframeChanged(Timeframe::Hour1));

        assert!(!btc.is_current());
        assert!(eth.is_current());
        assert_eq!(shared.snapshot_tx.borrow().symbol, CoinSymbol::from("ETH"));
        assert!(event_rx.try_recv().is_err());

        eth.emit(SessionEvent::TimeframeChanged(Timeframe::Hour4));
        assert_eq!(
            event_rx.try_recv().ok(),
            Some(SessionEvent::TimeframeChanged(Timeframe::Hour4))
        );
    }

    #[tokio::test]
    async fn test_refresh_while_fetch_in_flight_is_coalesced() {
        let (shared, _event_rx) = shared();
        let mut btc = task(&shared, "BTC");

        btc.refresh_summary();
        assert!(btc.summary_inflight.is_some());
        btc.refresh_summary();

        let (fetched_at, result) = btc.summary_rx.recv().await.unwrap();
        assert!(btc.summary_rx.try_recv().is_err());

        btc.apply_summary(fetched_at, result);
        assert!(btc.summary_inflight.is_none());
        assert!(btc.refresher.state().is_rate_limited());
    }
}
