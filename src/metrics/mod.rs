use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Payment commands (throughput, outcome, latency)
// - Events appended to the event store
// - Optimistic concurrency conflicts
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

/// Central metrics registry for the payment service
pub struct Metrics {
    registry: Registry,

    // Command Metrics
    pub commands_total: IntCounterVec,
    pub command_duration: HistogramVec,

    // Event Store Metrics
    pub events_appended: IntCounterVec,
    pub concurrency_conflicts: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        let commands_total = IntCounterVec::new(
            Opts::new("payment_commands_total", "Total payment commands by outcome"),
            &["command", "outcome"],
        )?;
        registry.register(Box::new(commands_total.clone()))?;

        let command_duration = HistogramVec::new(
            HistogramOpts::new("payment_command_duration_seconds", "Payment command duration")
                .buckets(vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1, 0.5]),
            &["command"],
        )?;
        registry.register(Box::new(command_duration.clone()))?;

        let events_appended = IntCounterVec::new(
            Opts::new("payment_events_appended_total", "Total events appended to the event store"),
            &["event_type"],
        )?;
        registry.register(Box::new(events_appended.clone()))?;

        let concurrency_conflicts = IntCounter::new(
            "event_store_conflicts_total",
            "Appends rejected by the expected version check",
        )?;
        registry.register(Box::new(concurrency_conflicts.clone()))?;

        Ok(Self {
            registry,
            commands_total,
            command_duration,
            events_appended,
            concurrency_conflicts,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a finished command
    pub fn record_command(&self, command: &str, outcome: &str, duration_secs: f64) {
        self.commands_total.with_label_values(&[command, outcome]).inc();
        self.command_duration.with_label_values(&[command]).observe(duration_secs);
    }

    /// Helper to record an appended event
    pub fn record_event_appended(&self, event_type: &str) {
        self.events_appended.with_label_values(&[event_type]).inc();
    }

    /// Helper to record a lost optimistic concurrency race
    pub fn record_conflict(&self) {
        self.concurrency_conflicts.inc();
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn render(&self) -> anyhow::Result<Vec<u8>> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(buffer)
    }
}
