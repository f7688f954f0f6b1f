use serde::{Deserialize, Serialize};

/// A timespan between two timestamps in millis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSpan {
    start_ts: i64,
    end_ts: i64,
}

impl TimeSpan {
    pub fn new(start_ts: i64, end_ts: i64) -> Self {
        Self { start_ts, end_ts }
    }

    pub fn start(&self) -> i64 {
        self.start_ts
    }

    pub fn end(&self) -> i64 {
        self.end_ts
    }

    /// Whether the given `[start_ts, end_ts]` interval overlaps this timespan
    pub fn overlaps(&self, start_ts: i64, end_ts: i64) -> bool {
        self.start_ts <= end_ts && self.end_ts >= start_ts
    }
}
