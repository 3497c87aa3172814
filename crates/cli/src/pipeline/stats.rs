//! Run statistics.

use std::time::Duration;

use junction::{MetricsSnapshot, TerminationCause};

/// Statistics from a roster run
#[derive(Debug, Clone)]
pub struct RunStats {
    /// Updates pushed into the junction
    pub updates_sent: u64,

    /// Snapshots printed
    pub snapshots_printed: u64,

    /// Wall time of the run
    pub duration: Duration,

    /// Junction counters at termination
    pub metrics: MetricsSnapshot,

    /// Why the junction stopped
    pub cause: TerminationCause,
}

impl RunStats {
    /// Snapshots per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.snapshots_printed as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    pub fn print_summary(&self) {
        println!("\n=== Run Statistics ===\n");
        println!("  Duration: {:.3}s", self.duration.as_secs_f64());
        println!("  Updates sent: {}", self.updates_sent);
        println!("  Updates received: {}", self.metrics.received);
        println!("  Unresolved: {}", self.metrics.unresolved);
        println!("  Snapshots published: {}", self.metrics.published);
        println!("  Snapshots printed: {}", self.snapshots_printed);
        println!("  Throughput: {:.2}/s", self.throughput());
        println!("  Termination: {}", self.cause);
        println!();
    }
}
