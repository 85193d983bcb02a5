//! Stage timing and score distribution tracking for a pipeline run.

use std::time::Duration;

use ndarray::Array1;
use tracing::info;

/// Metrics collector for one training run
#[derive(Debug, Default, Clone)]
pub struct PipelineMetrics {
    /// Stage name and wall time, in execution order
    stages: Vec<(String, Duration)>,
    /// Test-set fraud probability distribution
    score_buckets: [u64; 10],
    /// Rows at or above the decision threshold
    flagged: u64,
    scored: u64,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record how long a stage took
    pub fn record_stage(&mut self, name: &str, elapsed: Duration) {
        info!(stage = name, elapsed_ms = elapsed.as_millis() as u64, "Stage complete");
        self.stages.push((name.to_string(), elapsed));
    }

    /// Bucket probabilities into deciles and count those flagged as fraud
    pub fn record_scores(&mut self, scores: &Array1<f64>, threshold: f64) {
        for &p in scores {
            let bucket = (p * 10.0).clamp(0.0, 9.0) as usize;
            self.score_buckets[bucket] += 1;
            self.scored += 1;
            if p >= threshold {
                self.flagged += 1;
            }
        }
    }

    pub fn total_time(&self) -> Duration {
        self.stages.iter().map(|(_, elapsed)| *elapsed).sum()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let flag_rate = if self.scored > 0 {
            (self.flagged as f64 / self.scored as f64) * 100.0
        } else {
            0.0
        };

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            FRAUD DETECTION TRAINER - RUN SUMMARY             ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        for (stage, elapsed) in &self.stages {
            info!("║ {:<24} {:>12.3} s                        ║", stage, elapsed.as_secs_f64());
        }
        info!(
            "║ {:<24} {:>12.3} s                        ║",
            "total",
            self.total_time().as_secs_f64()
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Test Rows Scored: {:>8}  │  Flagged: {:>6} ({:>5.2}%)       ║",
            self.scored, self.flagged, flag_rate
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Fraud Probability Distribution:                              ║");
        for (i, &count) in self.score_buckets.iter().enumerate() {
            let pct = if self.scored > 0 {
                (count as f64 / self.scored as f64) * 100.0
            } else {
                0.0
            };
            let bar: String = "█".repeat(((pct / 5.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>8} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}
