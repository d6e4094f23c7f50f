//! Run statistics and summary output.

use std::time::Duration;

use contracts::SensorKind;
use observability::HubMetricsAggregator;

/// Statistics from a polling run
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    /// Records printed
    pub records: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Sensors still enabled when polling stopped
    pub enabled: Vec<SensorKind>,

    /// Per-read and per-sensor aggregates
    pub metrics: HubMetricsAggregator,
}

impl RunStats {
    /// Records per second
    pub fn rate(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.records as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===");
        println!("Duration: {:.2}s", self.duration.as_secs_f64());
        println!("Records: {}", self.records);
        println!("Rate: {:.2} records/s", self.rate());
        let enabled: Vec<String> = self.enabled.iter().map(ToString::to_string).collect();
        println!("Enabled at exit: {}", enabled.join(", "));
        println!();
        print!("{}", self.metrics.summary());
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate() {
        let stats = RunStats {
            records: 50,
            duration: Duration::from_secs(2),
            ..RunStats::default()
        };
        assert_eq!(stats.rate(), 25.0);
        assert_eq!(RunStats::default().rate(), 0.0);
    }
}
