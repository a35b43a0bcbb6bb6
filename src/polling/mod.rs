//! Per-widget recurring fetch → project → publish pipeline.

pub mod controller;
pub mod loop_worker;
pub mod state;

pub use controller::PollController;
pub use state::{PollStatus, WidgetState};
