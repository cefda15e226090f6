//! Metrics and observability utilities
//!
//! Counters and histograms for the client pipeline with standardized
//! naming conventions. Recording is a no-op until a recorder is installed.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

/// Metrics prefix for all Citescope metrics
pub const METRICS_PREFIX: &str = "citescope";

/// Register all metric descriptions
pub fn register_metrics() {
    describe_counter!(
        format!("{}_graph_loads_total", METRICS_PREFIX),
        Unit::Count,
        "Citation graph loads by outcome"
    );

    describe_histogram!(
        format!("{}_graph_fetch_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Latency of the graph endpoint in seconds"
    );

    describe_counter!(
        format!("{}_graph_duplicate_nodes_total", METRICS_PREFIX),
        Unit::Count,
        "Duplicate nodes dropped during normalization"
    );

    describe_counter!(
        format!("{}_chat_streams_total", METRICS_PREFIX),
        Unit::Count,
        "Chat reply streams by outcome"
    );

    describe_counter!(
        format!("{}_chat_chunks_total", METRICS_PREFIX),
        Unit::Count,
        "Chat reply chunks received"
    );

    describe_counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        Unit::Count,
        "Total number of search queries"
    );

    describe_histogram!(
        format!("{}_search_duration_seconds", METRICS_PREFIX),
        Unit::Seconds,
        "Search round-trip latency in seconds"
    );

    tracing::debug!("Metrics registered");
}

/// Times one graph load from fetch to render model
pub struct GraphLoadMetrics {
    start: Instant,
}

impl GraphLoadMetrics {
    /// Start tracking a graph load
    pub fn start() -> Self {
        Self { start: Instant::now() }
    }

    /// Record completion with the number of duplicates dropped
    pub fn finish(self, duplicates_dropped: usize) {
        histogram!(format!("{}_graph_fetch_duration_seconds", METRICS_PREFIX))
            .record(self.start.elapsed().as_secs_f64());

        counter!(
            format!("{}_graph_loads_total", METRICS_PREFIX),
            "outcome" => "success"
        )
        .increment(1);

        counter!(format!("{}_graph_duplicate_nodes_total", METRICS_PREFIX))
            .increment(duplicates_dropped as u64);
    }

    /// Record a failed load
    pub fn fail(self) {
        histogram!(format!("{}_graph_fetch_duration_seconds", METRICS_PREFIX))
            .record(self.start.elapsed().as_secs_f64());

        counter!(
            format!("{}_graph_loads_total", METRICS_PREFIX),
            "outcome" => "error"
        )
        .increment(1);
    }
}

/// Helper to record one received chat chunk
pub fn record_chat_chunk(bytes: usize) {
    counter!(format!("{}_chat_chunks_total", METRICS_PREFIX)).increment(1);
    tracing::trace!(bytes, "Chat chunk received");
}

/// Helper to record the terminal state of a chat stream
pub fn record_chat_stream(outcome: &str) {
    counter!(
        format!("{}_chat_streams_total", METRICS_PREFIX),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Helper to record search metrics
pub fn record_search(duration_secs: f64, success: bool) {
    let status = if success { "success" } else { "error" };

    counter!(
        format!("{}_search_queries_total", METRICS_PREFIX),
        "status" => status
    )
    .increment(1);

    histogram!(format!("{}_search_duration_seconds", METRICS_PREFIX)).record(duration_secs);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recording_without_recorder() {
        register_metrics();
        GraphLoadMetrics::start().finish(2);
        GraphLoadMetrics::start().fail();
        record_chat_chunk(12);
        record_chat_stream("done");
        record_search(0.01, true);
        // Just verify it runs without panic
    }
}
