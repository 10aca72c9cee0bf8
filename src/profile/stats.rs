use crate::request::{Response, UNKNOWN_STATUS};
use chrono::{DateTime, Utc};
use std::time::Duration;

/// One timed request, folded into a `SampleSet` right after it completes
#[derive(Debug)]
pub struct ResponseSample {
    pub response: Response,
    pub elapsed_ms: u64,
}

impl ResponseSample {
    pub fn new(response: Response, elapsed: Duration) -> Self {
        ResponseSample {
            response,
            elapsed_ms: elapsed.as_millis() as u64,
        }
    }
}

/// Summary of a profiling run
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileReport {
    pub host: String,
    pub request_count: usize,
    /// Sorted ascending
    pub latencies_ms: Vec<u64>,
    pub min_latency_ms: u64,
    pub max_latency_ms: u64,
    pub mean_latency_ms: u64,
    pub median_latency_ms: u64,
    pub min_size: usize,
    pub max_size: usize,
    /// Non-200 statuses in the order they were seen
    pub error_codes: Vec<u16>,
    pub success_percentage: f64,
    /// Iterations that failed before a response was read
    pub failures: usize,
    pub total_elapsed: Duration,
    pub started_at: DateTime<Utc>,
}

/// Running accumulation of samples for one profiling run
#[derive(Debug)]
pub struct SampleSet {
    latencies_ms: Vec<u64>,
    error_codes: Vec<u16>,
    min_size: Option<usize>,
    max_size: Option<usize>,
    failures: usize,
    started_at: DateTime<Utc>,
}

impl SampleSet {
    pub fn with_capacity(capacity: usize) -> Self {
        SampleSet {
            latencies_ms: Vec::with_capacity(capacity),
            error_codes: Vec::new(),
            min_size: None,
            max_size: None,
            failures: 0,
            started_at: Utc::now(),
        }
    }

    pub fn record(&mut self, sample: ResponseSample) {
        self.record_raw(
            sample.elapsed_ms,
            sample.response.size(),
            sample.response.status(),
        );
    }

    fn record_raw(&mut self, elapsed_ms: u64, size: usize, status: u16) {
        self.latencies_ms.push(elapsed_ms);
        if status != 200 {
            self.error_codes.push(status);
        }
        self.min_size = Some(self.min_size.map_or(size, |min| min.min(size)));
        self.max_size = Some(self.max_size.map_or(size, |max| max.max(size)));
    }

    /// Record an iteration that produced no response
    pub fn record_failure(&mut self, elapsed_ms: u64) {
        self.latencies_ms.push(elapsed_ms);
        self.error_codes.push(UNKNOWN_STATUS);
        self.failures += 1;
    }

    /// Sort and reduce into a report. Returns `None` if nothing was recorded.
    pub fn finish(mut self, host: &str, total_elapsed: Duration) -> Option<ProfileReport> {
        if self.latencies_ms.is_empty() {
            return None;
        }

        self.latencies_ms.sort_unstable();
        let latencies = &self.latencies_ms;
        let count = latencies.len();

        let sum: u64 = latencies.iter().sum();
        let successes = count - self.error_codes.len();

        Some(ProfileReport {
            host: host.to_lowercase(),
            request_count: count,
            min_latency_ms: latencies[0],
            max_latency_ms: latencies[count - 1],
            mean_latency_ms: sum / count as u64,
            median_latency_ms: median(latencies),
            min_size: self.min_size.unwrap_or(0),
            max_size: self.max_size.unwrap_or(0),
            success_percentage: successes as f64 / count as f64 * 100.0,
            error_codes: self.error_codes,
            failures: self.failures,
            total_elapsed,
            started_at: self.started_at,
            latencies_ms: self.latencies_ms,
        })
    }
}

/// Median of a sorted, non-empty slice with integer-truncating averaging
fn median(sorted: &[u64]) -> u64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid] + sorted[mid - 1]) / 2
    } else {
        sorted[mid]
    }
}
