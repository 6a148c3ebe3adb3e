//! Telemetry system for channelmix
//!
//! Collects run events from the CLI layer and prints a summary. The
//! aggregation and allocation kernels never record events themselves.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Telemetry event types
#[derive(Debug, Clone)]
pub enum MixEvent {
    AggregationCompleted {
        channels: usize,
        periods: usize,
        duration: Duration,
        timestamp: Instant,
    },
    AllocationCompleted {
        channels: usize,
        iterations: usize,
        duration: Duration,
        timestamp: Instant,
    },
    AllocationFailed {
        reason: String,
        timestamp: Instant,
    },
    FallbackApplied {
        policy: String,
        timestamp: Instant,
    },
}

/// Telemetry statistics
#[derive(Debug, Clone, Default)]
pub struct TelemetryStats {
    pub aggregations: usize,
    pub channels_aggregated: usize,
    pub allocations_succeeded: usize,
    pub allocations_failed: usize,
    pub redistribution_rounds: usize,
    pub fallbacks: usize,
}

/// Telemetry collector
#[derive(Clone)]
pub struct TelemetryCollector {
    events: Arc<Mutex<Vec<MixEvent>>>,
    stats: Arc<Mutex<TelemetryStats>>,
    start_time: Instant,
}

impl TelemetryCollector {
    /// Create a new telemetry collector
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            stats: Arc::new(Mutex::new(TelemetryStats::default())),
            start_time: Instant::now(),
        }
    }

    /// Record an event
    pub fn record(&self, event: MixEvent) {
        // Update stats
        {
            let mut stats = self.stats.lock().unwrap();
            match &event {
                MixEvent::AggregationCompleted { channels, .. } => {
                    stats.aggregations += 1;
                    stats.channels_aggregated += channels;
                }
                MixEvent::AllocationCompleted { iterations, .. } => {
                    stats.allocations_succeeded += 1;
                    stats.redistribution_rounds += iterations;
                }
                MixEvent::AllocationFailed { .. } => {
                    stats.allocations_failed += 1;
                }
                MixEvent::FallbackApplied { .. } => {
                    stats.fallbacks += 1;
                }
            }
        }

        // Store event
        let mut events = self.events.lock().unwrap();
        events.push(event);
    }

    /// Get current statistics
    pub fn get_stats(&self) -> TelemetryStats {
        self.stats.lock().unwrap().clone()
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Get event count
    pub fn event_count(&self) -> usize {
        self.events.lock().unwrap().len()
    }

    /// Get recent events (last n)
    pub fn recent_events(&self, n: usize) -> Vec<MixEvent> {
        let events = self.events.lock().unwrap();
        let start = events.len().saturating_sub(n);
        events[start..].to_vec()
    }

    /// Share of allocation attempts that succeeded
    pub fn allocation_success_rate(&self) -> f64 {
        let stats = self.stats.lock().unwrap();
        let total = stats.allocations_succeeded + stats.allocations_failed;
        if total == 0 {
            1.0
        } else {
            stats.allocations_succeeded as f64 / total as f64
        }
    }
}

impl Default for TelemetryCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Simple telemetry display
pub struct TelemetryDisplay {
    collector: TelemetryCollector,
    verbosity: crate::cli::Verbosity,
}

impl TelemetryDisplay {
    /// Create a new display
    pub fn new(collector: TelemetryCollector, verbosity: crate::cli::Verbosity) -> Self {
        Self {
            collector,
            verbosity,
        }
    }

    /// Summary text, one metric per line
    pub fn summary(&self) -> String {
        let stats = self.collector.get_stats();
        let elapsed = self.collector.elapsed();

        let mut lines = vec![
            "Run Summary".to_string(),
            "─────────────────────────────────────".to_string(),
        ];
        lines.push(format!("Duration:          {:?}", elapsed));
        lines.push(format!("Channels:          {}", stats.channels_aggregated));
        lines.push(format!("Allocations:       {}", stats.allocations_succeeded + stats.allocations_failed));
        lines.push(format!(
            "Success rate:      {:.1}%",
            self.collector.allocation_success_rate() * 100.0
        ));
        lines.push(format!("Rounds:            {}", stats.redistribution_rounds));
        lines.push(format!("Fallbacks:         {}", stats.fallbacks));
        lines.join("\n")
    }

    /// Display summary statistics
    pub fn display_summary(&self) {
        if self.should_show_details() {
            eprintln!("\n{}\n", self.summary());
        }
    }

    /// Check if should show detailed output
    pub fn should_show_details(&self) -> bool {
        self.verbosity.show_events()
    }
}
