//! Dynamic API widgets for a finance dashboard: discover the fields of an
//! arbitrary JSON endpoint, let the user pick some, then poll and project them.

pub mod dashboard;
pub mod discovery;
pub mod http;
pub mod json_path;
pub mod polling;
pub mod settings;
pub mod utils;
pub mod widgets;

pub use dashboard::WidgetRegistry;
pub use discovery::{discover, DiscoveryOptions, DiscoveryResult};
pub use http::{FetchError, HttpFetcher, JsonFetcher};
pub use json_path::{project, resolve, value_at, FieldPath, ProjectedRecord};
pub use polling::{PollController, PollStatus, WidgetState};
pub use settings::{Settings, SettingsStore};
pub use widgets::{format_value, CustomWidget, DisplayMode, FieldPicker, WidgetConfig};
