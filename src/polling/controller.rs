use std::sync::Arc;

use anyhow::{bail, Context, Result};
use log::info;
use tokio::sync::{watch, Notify};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::http::JsonFetcher;
use crate::widgets::WidgetConfig;

use super::loop_worker::{poll_loop, PollCycle, PollShared};
use super::state::WidgetState;

/// Owns the recurring fetch for one widget. At most one loop runs at a time;
/// reconfiguring cancels it and starts a fresh cycle whose state cannot be
/// overwritten by ticks from the old one.
pub struct PollController {
    fetcher: Arc<dyn JsonFetcher>,
    shared: Arc<PollShared>,
    handle: Option<JoinHandle<()>>,
    cancel_token: Option<CancellationToken>,
    refresh: Option<Arc<Notify>>,
    config: Option<WidgetConfig>,
}

impl PollController {
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            fetcher,
            shared: Arc::new(PollShared::new()),
            handle: None,
            cancel_token: None,
            refresh: None,
            config: None,
        }
    }

    pub fn start(&mut self, config: WidgetConfig) -> Result<()> {
        if self.handle.is_some() {
            bail!("polling already active");
        }
        config.validate().context("invalid widget configuration")?;

        let generation = self.shared.begin_cycle();
        let cancel_token = CancellationToken::new();
        let refresh = Arc::new(Notify::new());

        let cycle = PollCycle {
            config: Arc::new(config.clone()),
            fetcher: Arc::clone(&self.fetcher),
            shared: Arc::clone(&self.shared),
            generation,
        };
        let handle = tokio::spawn(poll_loop(cycle, Arc::clone(&refresh), cancel_token.clone()));

        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.refresh = Some(refresh);
        self.config = Some(config);
        Ok(())
    }

    /// Stops future ticks. Ticks already in flight finish but are not applied.
    pub async fn stop(&mut self) -> Result<()> {
        self.shared.advance_generation();
        self.refresh = None;
        self.config = None;

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }

        if let Some(handle) = self.handle.take() {
            handle.await.context("poll loop task failed to join")
        } else {
            Ok(())
        }
    }

    /// Swaps in a new configuration. An invalid one leaves the current loop running.
    pub async fn reconfigure(&mut self, config: WidgetConfig) -> Result<()> {
        config.validate().context("invalid widget configuration")?;
        info!("reconfiguring poller for {}", config.api_endpoint);
        self.stop().await?;
        self.start(config)
    }

    /// Fetches now without waiting for the next tick. Returns false when idle.
    pub fn refresh_now(&self) -> bool {
        match &self.refresh {
            Some(refresh) => {
                refresh.notify_one();
                true
            }
            None => false,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.shared.subscribe()
    }

    pub fn state(&self) -> WidgetState {
        self.shared.snapshot()
    }

    pub fn config(&self) -> Option<&WidgetConfig> {
        self.config.as_ref()
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.shared.current_generation()
    }
}

impl Drop for PollController {
    fn drop(&mut self) {
        self.shared.advance_generation();
        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
    }
}
