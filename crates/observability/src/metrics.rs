//! Junction metric recorders
//!
//! Thin wrappers over the `metrics` macros so label names stay consistent.
//! Without an installed recorder every call is a no-op.

use contracts::TerminationCause;
use metrics::counter;

/// Record an update pulled from an input stream
pub fn record_update_received(junction: &str, binding: &str) {
    counter!(
        "junction_updates_received_total",
        "junction" => junction.to_string(),
        "binding" => binding.to_string()
    )
    .increment(1);
}

/// Record an update whose target model could not be located
pub fn record_update_unresolved(junction: &str, binding: &str) {
    counter!(
        "junction_updates_unresolved_total",
        "junction" => junction.to_string(),
        "binding" => binding.to_string()
    )
    .increment(1);
}

/// Record a snapshot handed to a consumer
pub fn record_snapshot_published(junction: &str) {
    counter!(
        "junction_snapshots_published_total",
        "junction" => junction.to_string()
    )
    .increment(1);
}

/// Record a dispatcher stop and its cause
pub fn record_termination(junction: &str, cause: &TerminationCause) {
    counter!(
        "junction_terminations_total",
        "junction" => junction.to_string(),
        "cause" => cause_label(cause)
    )
    .increment(1);
}

fn cause_label(cause: &TerminationCause) -> &'static str {
    match cause {
        TerminationCause::SourceClosed { .. } => "source_closed",
        TerminationCause::AllSourcesClosed => "all_sources_closed",
        TerminationCause::Cancelled => "cancelled",
        TerminationCause::ConsumerGone => "consumer_gone",
    }
}
