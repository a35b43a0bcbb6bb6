use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::validate_url;
use crate::json_path::FieldPath;

pub const DEFAULT_REFRESH_INTERVAL_MS: u64 = 30_000;
pub const DEFAULT_WIDGET_TITLE: &str = "Custom Widget";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Card,
    Table,
    List,
}

impl std::str::FromStr for DisplayMode {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "card" => Ok(DisplayMode::Card),
            "table" => Ok(DisplayMode::Table),
            "list" => Ok(DisplayMode::List),
            other => bail!("unknown display mode '{other}' (expected card, table or list)"),
        }
    }
}

/// Configuration of a custom API widget, as stored in the dashboard file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetConfig {
    pub api_endpoint: String,
    #[serde(rename = "refreshInterval", default = "default_refresh_interval")]
    pub refresh_interval_ms: u64,
    pub display_fields: Vec<FieldPath>,
    #[serde(default)]
    pub display_mode: DisplayMode,
}

fn default_refresh_interval() -> u64 {
    DEFAULT_REFRESH_INTERVAL_MS
}

impl WidgetConfig {
    pub fn new(api_endpoint: impl Into<String>, display_fields: Vec<FieldPath>) -> Self {
        Self {
            api_endpoint: api_endpoint.into(),
            refresh_interval_ms: DEFAULT_REFRESH_INTERVAL_MS,
            display_fields,
            display_mode: DisplayMode::default(),
        }
    }

    pub fn with_refresh_interval_ms(mut self, refresh_interval_ms: u64) -> Self {
        self.refresh_interval_ms = refresh_interval_ms;
        self
    }

    pub fn with_display_mode(mut self, display_mode: DisplayMode) -> Self {
        self.display_mode = display_mode;
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_url(&self.api_endpoint)?;
        if self.refresh_interval_ms == 0 {
            bail!("refresh interval must be greater than zero");
        }
        if self.display_fields.is_empty() {
            bail!("select at least one field to display");
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPosition {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Default for GridPosition {
    fn default() -> Self {
        Self { x: 0, y: 0, w: 4, h: 3 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidgetKind {
    #[default]
    Custom,
}

/// Dashboard entry wrapping a custom widget's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomWidget {
    pub id: String,
    #[serde(rename = "type", default)]
    pub kind: WidgetKind,
    pub title: String,
    #[serde(default)]
    pub position: GridPosition,
    pub config: WidgetConfig,
}

impl CustomWidget {
    pub fn new(title: Option<&str>, config: WidgetConfig) -> Self {
        let title = title
            .map(str::trim)
            .filter(|title| !title.is_empty())
            .unwrap_or(DEFAULT_WIDGET_TITLE);

        Self {
            id: format!("widget-{}", Uuid::new_v4()),
            kind: WidgetKind::Custom,
            title: title.to_string(),
            position: GridPosition::default(),
            config,
        }
    }
}
