use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tokio::sync::watch;

use crate::http::JsonFetcher;
use crate::polling::{PollController, WidgetState};
use crate::widgets::{CustomWidget, WidgetConfig};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

struct ManagedWidget {
    widget: CustomWidget,
    poller: PollController,
}

/// Lifecycle owner for every custom widget on the dashboard. Each widget gets
/// its own poller; nothing is shared between them but the fetcher.
pub struct WidgetRegistry {
    fetcher: Arc<dyn JsonFetcher>,
    widgets: HashMap<String, ManagedWidget>,
    order: Vec<String>,
}

impl WidgetRegistry {
    pub fn new(fetcher: Arc<dyn JsonFetcher>) -> Self {
        Self {
            fetcher,
            widgets: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registers the widget and starts polling it.
    pub fn add(&mut self, widget: CustomWidget) -> Result<watch::Receiver<WidgetState>> {
        if self.widgets.contains_key(&widget.id) {
            bail!("widget {} already exists", widget.id);
        }

        let mut poller = PollController::new(Arc::clone(&self.fetcher));
        poller
            .start(widget.config.clone())
            .with_context(|| format!("failed to start widget {}", widget.id))?;
        let rx = poller.subscribe();

        log_info!("added widget {} ({})", widget.id, widget.title);
        self.order.push(widget.id.clone());
        self.widgets
            .insert(widget.id.clone(), ManagedWidget { widget, poller });
        Ok(rx)
    }

    pub async fn remove(&mut self, id: &str) -> Result<CustomWidget> {
        let mut managed = self
            .widgets
            .remove(id)
            .ok_or_else(|| anyhow!("unknown widget {id}"))?;
        self.order.retain(|existing| existing != id);

        managed.poller.stop().await?;
        log_info!("removed widget {}", id);
        Ok(managed.widget)
    }

    pub async fn reconfigure(&mut self, id: &str, config: WidgetConfig) -> Result<()> {
        let managed = self.get_mut(id)?;
        managed.poller.reconfigure(config.clone()).await?;
        managed.widget.config = config;
        Ok(())
    }

    pub fn refresh(&self, id: &str) -> Result<bool> {
        Ok(self.get(id)?.poller.refresh_now())
    }

    pub fn subscribe(&self, id: &str) -> Result<watch::Receiver<WidgetState>> {
        Ok(self.get(id)?.poller.subscribe())
    }

    pub fn state(&self, id: &str) -> Result<WidgetState> {
        Ok(self.get(id)?.poller.state())
    }

    pub fn widget(&self, id: &str) -> Option<&CustomWidget> {
        self.widgets.get(id).map(|managed| &managed.widget)
    }

    /// Widget ids in the order they were added.
    pub fn ids(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Stops every poller. Errors are logged, not propagated, so one stuck
    /// widget cannot keep the rest running.
    pub async fn shutdown(&mut self) {
        for id in std::mem::take(&mut self.order) {
            if let Some(mut managed) = self.widgets.remove(&id) {
                if let Err(err) = managed.poller.stop().await {
                    log_error!("failed to stop widget {}: {err:?}", id);
                }
            }
        }
    }

    fn get(&self, id: &str) -> Result<&ManagedWidget> {
        self.widgets
            .get(id)
            .ok_or_else(|| anyhow!("unknown widget {id}"))
    }

    fn get_mut(&mut self, id: &str) -> Result<&mut ManagedWidget> {
        self.widgets
            .get_mut(id)
            .ok_or_else(|| anyhow!("unknown widget {id}"))
    }
}
