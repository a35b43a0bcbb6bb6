use anyhow::{bail, Result};

use crate::discovery::{discover, DiscoveryOptions, DiscoveryResult};
use crate::http::JsonFetcher;
use crate::json_path::{value_at, FieldPath, EMPTY_MARKER};

use super::config::{CustomWidget, DisplayMode, WidgetConfig};

/// State behind the "add custom widget" form: the tested URL, the fields it
/// exposes, and the user's ordered selection.
#[derive(Debug, Default)]
pub struct FieldPicker {
    api_url: String,
    discovery: Option<DiscoveryResult>,
    selected: Vec<FieldPath>,
}

impl FieldPicker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs discovery against `url`. A new test replaces any earlier result;
    /// selections survive only if the new result still offers them.
    pub async fn test_connection(
        &mut self,
        fetcher: &dyn JsonFetcher,
        url: &str,
        options: &DiscoveryOptions,
    ) -> &DiscoveryResult {
        let result = discover(fetcher, url, options).await;
        self.api_url = url.trim().to_string();
        self.selected.retain(|field| result.fields.contains(field));
        self.discovery.insert(result)
    }

    pub fn discovery(&self) -> Option<&DiscoveryResult> {
        self.discovery.as_ref()
    }

    pub fn available(&self) -> &[FieldPath] {
        self.discovery
            .as_ref()
            .filter(|result| result.success)
            .map(|result| result.fields.as_slice())
            .unwrap_or_default()
    }

    /// Case-insensitive substring search over the available fields.
    pub fn filter(&self, search: &str) -> Vec<&FieldPath> {
        let needle = search.to_lowercase();
        self.available()
            .iter()
            .filter(|field| field.as_str().to_lowercase().contains(&needle))
            .collect()
    }

    /// Adds `field` to the end of the selection, or removes it if already selected.
    pub fn toggle(&mut self, field: &FieldPath) -> bool {
        if let Some(index) = self.selected.iter().position(|selected| selected == field) {
            self.selected.remove(index);
            false
        } else {
            self.selected.push(field.clone());
            true
        }
    }

    pub fn selected(&self) -> &[FieldPath] {
        &self.selected
    }

    /// Sample value of `field` from the tested response.
    pub fn preview(&self, field: &FieldPath) -> String {
        self.discovery
            .as_ref()
            .and_then(|result| result.data.as_ref())
            .map(|data| value_at(data, field.as_str()))
            .unwrap_or_else(|| EMPTY_MARKER.to_string())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Builds the widget from the current selection. `refresh_secs` is what the
    /// form collects; the config stores milliseconds.
    pub fn build_widget(
        &self,
        title: Option<&str>,
        refresh_secs: u64,
        display_mode: DisplayMode,
    ) -> Result<CustomWidget> {
        if self.api_url.is_empty() || self.selected.is_empty() {
            bail!("Please test the API and select at least one field");
        }

        let config = WidgetConfig::new(self.api_url.clone(), self.selected.clone())
            .with_refresh_interval_ms(refresh_secs.saturating_mul(1_000))
            .with_display_mode(display_mode);
        config.validate()?;

        Ok(CustomWidget::new(title, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::testing::ScriptedFetcher;
    use serde_json::json;

    const URL: &str = "https://api.example.com/markets";

    async fn tested_picker() -> FieldPicker {
        let fetcher = ScriptedFetcher::new().respond(
            URL,
            vec![Ok(json!({
                "market": "NASDAQ",
                "quotes": [{"symbol": "AAPL", "lastPrice": 189.5}]
            }))],
        );
        let mut picker = FieldPicker::new();
        picker
            .test_connection(&fetcher, URL, &DiscoveryOptions::default())
            .await;
        picker
    }

    #[tokio::test]
    async fn filters_case_insensitively() {
        let picker = tested_picker().await;
        let hits: Vec<_> = picker.filter("PRICE").into_iter().map(FieldPath::as_str).collect();
        assert_eq!(hits, vec!["quotes[].lastPrice"]);
        assert_eq!(picker.filter("").len(), 4);
    }

    #[tokio::test]
    async fn toggle_keeps_selection_order() {
        let mut picker = tested_picker().await;
        let price = FieldPath::from("quotes[].lastPrice");
        let market = FieldPath::from("market");
        let symbol = FieldPath::from("quotes[].symbol");

        assert!(picker.toggle(&price));
        assert!(picker.toggle(&market));
        assert!(picker.toggle(&symbol));
        assert!(!picker.toggle(&market));

        assert_eq!(picker.selected(), &[price, symbol]);
    }

    #[tokio::test]
    async fn previews_sample_values() {
        let picker = tested_picker().await;
        assert_eq!(picker.preview(&FieldPath::from("quotes[].symbol")), "AAPL");
        assert_eq!(picker.preview(&FieldPath::from("quotes[].lastPrice")), "189.5");
        assert_eq!(picker.preview(&FieldPath::from("nope")), EMPTY_MARKER);
    }

    #[tokio::test]
    async fn builds_widget_from_selection() {
        let mut picker = tested_picker().await;
        picker.toggle(&FieldPath::from("market"));

        let widget = picker
            .build_widget(Some("Markets"), 45, DisplayMode::List)
            .unwrap();

        assert_eq!(widget.title, "Markets");
        assert_eq!(widget.config.api_endpoint, URL);
        assert_eq!(widget.config.refresh_interval_ms, 45_000);
        assert_eq!(widget.config.display_fields, vec![FieldPath::from("market")]);
        assert_eq!(widget.config.display_mode, DisplayMode::List);
    }

    #[tokio::test]
    async fn refuses_to_build_without_selection() {
        let picker = tested_picker().await;
        assert!(picker.build_widget(None, 30, DisplayMode::Card).is_err());
        assert!(FieldPicker::new().build_widget(None, 30, DisplayMode::Card).is_err());
    }

    #[tokio::test]
    async fn failed_test_offers_no_fields() {
        let fetcher = ScriptedFetcher::new();
        let mut picker = FieldPicker::new();
        let result = picker
            .test_connection(&fetcher, "https://unreachable.example.com", &DiscoveryOptions::default())
            .await;
        assert!(!result.success);
        assert!(picker.available().is_empty());
    }
}
