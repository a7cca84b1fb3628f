//! Serving metrics: request counters, latency percentiles, and the
//! probability-score distribution, with a periodic logged summary.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector shared by all request handlers.
pub struct ServingMetrics {
    /// Total predictions served.
    pub predictions_served: AtomicU64,
    /// Predictions that came back as fraud.
    pub frauds_flagged: AtomicU64,
    /// Request processing times in microseconds.
    processing_times: RwLock<Vec<u64>>,
    /// Probability distribution in tenth-wide buckets.
    score_buckets: RwLock<[u64; 10]>,
    /// Start time for throughput calculation.
    start_time: Instant,
}

impl ServingMetrics {
    pub fn new() -> Self {
        Self {
            predictions_served: AtomicU64::new(0),
            frauds_flagged: AtomicU64::new(0),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            score_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record one served prediction.
    pub fn record_prediction(&self, processing_time: Duration, probability: f64, is_fraud: bool) {
        self.predictions_served.fetch_add(1, Ordering::Relaxed);
        if is_fraud {
            self.frauds_flagged.fetch_add(1, Ordering::Relaxed);
        }

        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only the recent window for memory efficiency.
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }

        let bucket = (probability * 10.0).min(9.0) as usize;
        if let Ok(mut buckets) = self.score_buckets.write() {
            buckets[bucket] += 1;
        }
    }

    /// Processing time statistics over the recent window.
    pub fn get_processing_stats(&self) -> ProcessingStats {
        let times = match self.processing_times.read() {
            Ok(times) => times,
            Err(_) => return ProcessingStats::default(),
        };
        if times.is_empty() {
            return ProcessingStats::default();
        }

        let mut sorted: Vec<u64> = times.clone();
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: *sorted.last().unwrap_or(&0),
        }
    }

    /// Predictions per second since startup.
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.predictions_served.load(Ordering::Relaxed) as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Probability distribution in tenth-wide buckets.
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets.read().map(|b| *b).unwrap_or([0; 10])
    }

    /// Log a summary of serving activity.
    pub fn print_summary(&self) {
        let served = self.predictions_served.load(Ordering::Relaxed);
        let frauds = self.frauds_flagged.load(Ordering::Relaxed);
        let fraud_rate = if served > 0 {
            frauds as f64 / served as f64 * 100.0
        } else {
            0.0
        };
        let processing = self.get_processing_stats();

        info!(
            predictions_served = served,
            frauds_flagged = frauds,
            fraud_rate_pct = format!("{:.1}", fraud_rate),
            throughput = format!("{:.1}/s", self.get_throughput()),
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            "Serving metrics summary"
        );
    }
}

impl Default for ServingMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics.
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Periodic reporter that logs a summary on an interval.
pub struct MetricsReporter {
    metrics: Arc<ServingMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<ServingMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Run the reporting loop; never returns.
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs));
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_recording() {
        let metrics = ServingMetrics::new();

        metrics.record_prediction(Duration::from_micros(100), 0.2, false);
        metrics.record_prediction(Duration::from_micros(300), 0.9, true);

        assert_eq!(metrics.predictions_served.load(Ordering::Relaxed), 2);
        assert_eq!(metrics.frauds_flagged.load(Ordering::Relaxed), 1);

        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.mean_us, 200);
        assert_eq!(stats.max_us, 300);
    }

    #[test]
    fn test_score_buckets() {
        let metrics = ServingMetrics::new();
        metrics.record_prediction(Duration::from_micros(10), 0.05, false);
        metrics.record_prediction(Duration::from_micros(10), 0.95, true);
        metrics.record_prediction(Duration::from_micros(10), 1.0, true);

        let buckets = metrics.get_score_distribution();
        assert_eq!(buckets[0], 1);
        assert_eq!(buckets[9], 2);
    }

    #[test]
    fn test_empty_stats_default_to_zero() {
        let metrics = ServingMetrics::new();
        let stats = metrics.get_processing_stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p99_us, 0);
    }
}
