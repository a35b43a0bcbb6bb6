pub mod config;
pub mod format;
pub mod picker;
pub mod render;

pub use config::{CustomWidget, DisplayMode, GridPosition, WidgetConfig, DEFAULT_REFRESH_INTERVAL_MS};
pub use format::{field_label, format_value};
pub use picker::FieldPicker;
pub use render::render;
