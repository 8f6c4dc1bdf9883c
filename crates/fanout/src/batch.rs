//! Batch outcome summary.

use derive_getters::Getters;
use fanout_core::GenerationResult;
use fanout_error::{BatchError, BatchErrorKind};
use std::time::Duration;

/// Every result of one dispatched batch, in completion order.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct BatchReport {
    /// Results in the order requests completed
    results: Vec<GenerationResult>,
    /// Wall-clock time from first issuance to the last completion
    elapsed: Duration,
}

impl BatchReport {
    /// Wrap the results of a finished batch.
    pub fn new(results: Vec<GenerationResult>, elapsed: Duration) -> Self {
        Self { results, elapsed }
    }

    /// Number of requests in the batch.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Number of successful requests.
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    /// Number of failed requests.
    pub fn failed(&self) -> usize {
        self.total() - self.succeeded()
    }

    /// Fraction of requests that succeeded; `1.0` for an empty batch.
    pub fn success_ratio(&self) -> f64 {
        if self.results.is_empty() {
            return 1.0;
        }
        self.succeeded() as f64 / self.total() as f64
    }

    /// Mean latency of successful requests.
    pub fn mean_latency(&self) -> Option<Duration> {
        let latencies: Vec<Duration> = self.success_latencies().collect();
        if latencies.is_empty() {
            return None;
        }
        let total: Duration = latencies.iter().sum();
        Some(total / latencies.len() as u32)
    }

    /// Slowest successful request.
    pub fn max_latency(&self) -> Option<Duration> {
        self.success_latencies().max()
    }

    /// True when a non-empty batch produced no successes.
    pub fn is_total_failure(&self) -> bool {
        !self.results.is_empty() && self.succeeded() == 0
    }

    /// Results ordered by prompt position rather than completion.
    pub fn sorted_by_index(&self) -> Vec<&GenerationResult> {
        let mut sorted: Vec<&GenerationResult> = self.results.iter().collect();
        sorted.sort_by_key(|r| *r.index());
        sorted
    }

    /// Escalate a total failure to an error; partial failures pass through.
    ///
    /// # Errors
    ///
    /// Returns [`BatchErrorKind::AllRequestsFailed`] when every request of a
    /// non-empty batch failed.
    #[track_caller]
    pub fn into_result(self) -> Result<Self, BatchError> {
        if self.is_total_failure() {
            return Err(BatchError::new(BatchErrorKind::AllRequestsFailed {
                total: self.total(),
            }));
        }
        Ok(self)
    }

    fn success_latencies(&self) -> impl Iterator<Item = Duration> + '_ {
        self.results
            .iter()
            .filter(|r| r.is_success())
            .map(|r| *r.elapsed())
    }
}
