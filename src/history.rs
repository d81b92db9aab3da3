use crate::session::TestResult;
use std::collections::VecDeque;

/// Number of results kept, newest first
pub const HISTORY_CAPACITY: usize = 10;

/// Aggregates over the retained results
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistorySummary {
    pub mean_wpm: u32,
    pub mean_accuracy: u32,
    pub count: usize,
}

/// Bounded log of completed tests
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<TestResult>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepends `result`, dropping whatever falls past the capacity.
    pub fn record(&mut self, result: TestResult) {
        self.entries.push_front(result);
        self.entries.truncate(HISTORY_CAPACITY);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Newest first
    pub fn iter(&self) -> impl Iterator<Item = &TestResult> {
        self.entries.iter()
    }

    /// `None` while there is no history; callers show an empty state instead.
    pub fn summary(&self) -> Option<HistorySummary> {
        if self.entries.is_empty() {
            return None;
        }
        let count = self.entries.len();
        let total_wpm: u64 = self.entries.iter().map(|r| u64::from(r.wpm)).sum();
        let total_accuracy: u64 = self.entries.iter().map(|r| u64::from(r.accuracy)).sum();

        Some(HistorySummary {
            mean_wpm: (total_wpm as f64 / count as f64).round() as u32,
            mean_accuracy: (total_accuracy as f64 / count as f64).round() as u32,
            count,
        })
    }
}
