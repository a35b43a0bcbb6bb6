//! Lifecycle management for the custom widgets on a dashboard.

pub mod registry;

pub use registry::WidgetRegistry;
