//! Logging test utilities
use super::StatsLogger;

/// Logger that records every value in memory.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RecordingLogger {
    pub records: Vec<(String, u64, f64)>,
    pub flushes: usize,
}

impl RecordingLogger {
    /// The `(step, value)` pairs logged under `name`, in order.
    pub fn series(&self, name: &str) -> Vec<(u64, f64)> {
        self.records
            .iter()
            .filter(|(n, _, _)| n == name)
            .map(|(_, step, value)| (*step, *value))
            .collect()
    }
}

impl StatsLogger for RecordingLogger {
    fn log_scalar(&mut self, name: &str, step: u64, value: f64) {
        self.records.push((name.into(), step, value));
    }

    fn flush(&mut self) {
        self.flushes += 1;
    }
}
