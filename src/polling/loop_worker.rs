use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{watch, Notify};
use tokio::time::{Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::http::JsonFetcher;
use crate::json_path::project;
use crate::widgets::WidgetConfig;

use super::state::WidgetState;

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_info, log_warn};

/// State shared between a controller and every tick it has spawned.
pub(crate) struct PollShared {
    generation: AtomicU64,
    tx: watch::Sender<WidgetState>,
}

impl PollShared {
    pub(crate) fn new() -> Self {
        let (tx, _rx) = watch::channel(WidgetState::new());
        Self {
            generation: AtomicU64::new(0),
            tx,
        }
    }

    pub(crate) fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Invalidates every tick of the current cycle.
    pub(crate) fn advance_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Starts a fresh cycle: new generation, blank state.
    pub(crate) fn begin_cycle(&self) -> u64 {
        let generation = self.advance_generation();
        self.tx.send_replace(WidgetState::new());
        generation
    }

    /// Applies `update` only while `generation` is still current. The check runs
    /// under the channel's write lock, so a reconfigure cannot interleave.
    pub(crate) fn apply(&self, generation: u64, update: impl FnOnce(&mut WidgetState)) -> bool {
        self.tx.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            update(state);
            true
        })
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.tx.subscribe()
    }

    pub(crate) fn snapshot(&self) -> WidgetState {
        self.tx.borrow().clone()
    }
}

pub(crate) struct PollCycle {
    pub config: Arc<WidgetConfig>,
    pub fetcher: Arc<dyn JsonFetcher>,
    pub shared: Arc<PollShared>,
    pub generation: u64,
}

impl PollCycle {
    fn spawn_tick(&self) {
        let config = Arc::clone(&self.config);
        let fetcher = Arc::clone(&self.fetcher);
        let shared = Arc::clone(&self.shared);
        let generation = self.generation;
        // Detached so a slow endpoint never holds up the timer.
        tokio::spawn(async move {
            run_tick(&config, fetcher.as_ref(), &shared, generation).await;
        });
    }
}

/// Fires a tick immediately, then every `refresh_interval_ms`, plus whenever
/// `refresh` is notified, until `cancel_token` is cancelled.
pub(crate) async fn poll_loop(cycle: PollCycle, refresh: Arc<Notify>, cancel_token: CancellationToken) {
    let period = Duration::from_millis(cycle.config.refresh_interval_ms.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    log_info!(
        "polling {} every {}ms (generation {})",
        cycle.config.api_endpoint,
        cycle.config.refresh_interval_ms,
        cycle.generation
    );

    loop {
        tokio::select! {
            _ = cancel_token.cancelled() => {
                log_info!("poll loop for {} shutting down", cycle.config.api_endpoint);
                break;
            }
            _ = ticker.tick() => cycle.spawn_tick(),
            _ = refresh.notified() => {
                log_debug!("manual refresh of {}", cycle.config.api_endpoint);
                cycle.spawn_tick();
            }
        }
    }
}

/// One fetch → parse → project → publish pass. Results from a superseded
/// generation are dropped.
pub(crate) async fn run_tick(
    config: &WidgetConfig,
    fetcher: &dyn JsonFetcher,
    shared: &PollShared,
    generation: u64,
) -> bool {
    if !shared.apply(generation, WidgetState::begin_tick) {
        return false;
    }

    let applied = match fetcher.fetch_json(&config.api_endpoint).await {
        Ok(doc) => {
            let record = project(&doc, &config.display_fields);
            let now = Utc::now();
            shared.apply(generation, |state| state.complete(record, now))
        }
        Err(err) => {
            log_warn!("poll of {} failed: {}", config.api_endpoint, err);
            let message = err.to_string();
            shared.apply(generation, |state| state.fail(message))
        }
    };

    if !applied {
        log_debug!(
            "discarded stale result for {} (generation {})",
            config.api_endpoint,
            generation
        );
    }
    applied
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedFetcher;
    use crate::http::FetchError;
    use crate::json_path::FieldPath;
    use crate::polling::PollStatus;
    use serde_json::json;

    const URL: &str = "https://api.example.com/quote";

    fn config(fields: &[&str]) -> WidgetConfig {
        WidgetConfig::new(URL, fields.iter().map(|f| FieldPath::from(*f)).collect())
    }

    #[tokio::test]
    async fn tick_projects_selected_fields() {
        let fetcher = ScriptedFetcher::new()
            .respond(URL, vec![Ok(json!({"quote": {"price": 10.0}, "symbol": "AAPL"}))]);
        let shared = PollShared::new();
        let generation = shared.begin_cycle();

        assert!(run_tick(&config(&["symbol", "quote.price", "gone"]), &fetcher, &shared, generation).await);

        let state = shared.snapshot();
        assert_eq!(state.status, PollStatus::Ready);
        let record = state.record.unwrap();
        assert_eq!(record.get("symbol"), Some(&json!("AAPL")));
        assert_eq!(record.get("quote.price"), Some(&json!(10.0)));
        assert_eq!(record.get("gone"), Some(&json!("")));
    }

    #[tokio::test]
    async fn tick_failure_sets_error() {
        let fetcher = ScriptedFetcher::new().respond(URL, vec![Err(FetchError::Timeout(10_000))]);
        let shared = PollShared::new();
        let generation = shared.begin_cycle();

        run_tick(&config(&["a"]), &fetcher, &shared, generation).await;

        let state = shared.snapshot();
        assert_eq!(state.status, PollStatus::Error);
        assert_eq!(state.error.as_deref(), Some("request timed out after 10000ms"));
        assert!(state.record.is_none());
    }

    #[tokio::test]
    async fn stale_generation_is_discarded() {
        let fetcher = ScriptedFetcher::new().respond(URL, vec![Ok(json!({"a": 1}))]);
        let shared = PollShared::new();
        let stale = shared.begin_cycle();
        shared.begin_cycle();

        assert!(!run_tick(&config(&["a"]), &fetcher, &shared, stale).await);
        assert_eq!(shared.snapshot(), WidgetState::new());
    }
}
