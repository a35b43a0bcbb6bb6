use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::json_path::ProjectedRecord;

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum PollStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error,
}

/// What a widget shows right now. Published after every state transition.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct WidgetState {
    pub status: PollStatus,
    pub loading: bool,
    /// Latest successful projection. Kept across failed ticks.
    pub record: Option<ProjectedRecord>,
    pub error: Option<String>,
    pub last_updated: Option<DateTime<Utc>>,
    /// Ticks currently waiting on the network; ticks may overlap.
    #[serde(skip)]
    pub in_flight: u32,
}

impl WidgetState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_tick(&mut self) {
        self.in_flight = self.in_flight.saturating_add(1);
        self.loading = true;
        self.refresh_status();
    }

    pub fn complete(&mut self, record: ProjectedRecord, at: DateTime<Utc>) {
        self.end_tick();
        self.error = None;
        self.record = Some(record);
        self.last_updated = Some(at);
        self.refresh_status();
    }

    pub fn fail(&mut self, error: String) {
        self.end_tick();
        self.error = Some(error);
        self.refresh_status();
    }

    fn end_tick(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.loading = self.in_flight > 0;
    }

    fn refresh_status(&mut self) {
        self.status = if self.loading {
            PollStatus::Loading
        } else if self.error.is_some() {
            PollStatus::Error
        } else if self.record.is_some() {
            PollStatus::Ready
        } else {
            PollStatus::Idle
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(price: f64) -> ProjectedRecord {
        let mut record = ProjectedRecord::default();
        record.insert("price", json!(price));
        record
    }

    #[test]
    fn failure_keeps_previous_record() {
        let mut state = WidgetState::new();
        state.begin_tick();
        assert_eq!(state.status, PollStatus::Loading);

        let at = Utc::now();
        state.complete(record(1.0), at);
        assert_eq!(state.status, PollStatus::Ready);

        state.begin_tick();
        state.fail("HTTP 503: Service Unavailable".into());
        assert_eq!(state.status, PollStatus::Error);
        assert_eq!(state.record, Some(record(1.0)));
        assert_eq!(state.last_updated, Some(at));
        assert!(!state.loading);
    }

    #[test]
    fn success_clears_error() {
        let mut state = WidgetState::new();
        state.begin_tick();
        state.fail("timeout".into());
        state.begin_tick();
        state.complete(record(2.0), Utc::now());
        assert_eq!(state.status, PollStatus::Ready);
        assert!(state.error.is_none());
    }

    #[test]
    fn overlapping_ticks_stay_loading_until_all_finish() {
        let mut state = WidgetState::new();
        state.begin_tick();
        state.begin_tick();
        state.complete(record(3.0), Utc::now());
        assert!(state.loading);
        assert_eq!(state.status, PollStatus::Loading);
        state.complete(record(4.0), Utc::now());
        assert!(!state.loading);
        assert_eq!(state.record, Some(record(4.0)));
    }

    #[test]
    fn serializes_camel_case() {
        let encoded = serde_json::to_value(WidgetState::new()).unwrap();
        assert_eq!(
            encoded,
            json!({"status": "idle", "loading": false, "record": null, "error": null, "lastUpdated": null})
        );
    }
}
