//! Prometheus metrics for the delivery pipeline.
//!
//! Exposes:
//! - `daily_english_delivery_duration_seconds` (histogram)
//! - `daily_english_delivery_total` (counter with trigger and outcome)
//! - `daily_english_delivery_inflight` (gauge)
//! - process metrics via `process` collector

use std::time::Duration;

use once_cell::sync::Lazy;
use prometheus::process_collector::ProcessCollector;
use prometheus::{
    default_registry, register_histogram_vec, register_int_counter_vec, register_int_gauge_vec,
    Encoder, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, TextEncoder,
};
use tracing::warn;

use crate::content::ContentType;
use crate::dispatcher::{DeliveryOutcome, Trigger};
use crate::{Error, Result};

static PROCESS_COLLECTOR: Lazy<()> = Lazy::new(|| {
    if let Err(err) = default_registry().register(Box::new(ProcessCollector::for_self())) {
        warn!("Failed to register process collector: {}", err);
    }
});

static DELIVERY_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    // Exponential buckets from 250ms up to ~4 minutes.
    let buckets =
        prometheus::exponential_buckets(0.25, 2.0, 11).expect("failed to create histogram buckets");
    register_histogram_vec!(
        "daily_english_delivery_duration_seconds",
        "Pipeline invocation duration in seconds",
        &["content_type"],
        buckets
    )
    .expect("failed to register delivery duration histogram")
});

static DELIVERY_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "daily_english_delivery_total",
        "Pipeline invocations by trigger and outcome",
        &["content_type", "trigger", "outcome"]
    )
    .expect("failed to register delivery counter")
});

static DELIVERY_INFLIGHT: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "daily_english_delivery_inflight",
        "Number of in-flight pipeline invocations",
        &["content_type"]
    )
    .expect("failed to register inflight gauge")
});

/// Ensure collectors are registered.
pub fn init_collectors() {
    Lazy::force(&PROCESS_COLLECTOR);
    Lazy::force(&DELIVERY_DURATION);
    Lazy::force(&DELIVERY_TOTAL);
    Lazy::force(&DELIVERY_INFLIGHT);
}

/// Counts one delivery as in flight until dropped, even if the delivery
/// future is cancelled halfway.
#[must_use = "the delivery stops being counted as in flight when the guard is dropped"]
pub struct InflightGuard {
    gauge: IntGauge,
}

impl InflightGuard {
    pub fn track(gauge: IntGauge) -> Self {
        gauge.inc();
        Self { gauge }
    }
}

impl Drop for InflightGuard {
    fn drop(&mut self) {
        self.gauge.dec();
    }
}

pub fn record_delivery_start(content_type: ContentType) -> InflightGuard {
    init_collectors();
    InflightGuard::track(DELIVERY_INFLIGHT.with_label_values(&[content_type.label()]))
}

pub fn record_delivery_result(
    content_type: ContentType,
    trigger: Trigger,
    duration: Duration,
    outcome: &DeliveryOutcome,
) {
    init_collectors();
    DELIVERY_DURATION
        .with_label_values(&[content_type.label()])
        .observe(duration.as_secs_f64());
    DELIVERY_TOTAL
        .with_label_values(&[content_type.label(), trigger.label(), outcome.label()])
        .inc();
}

/// Encode all registered metrics in the Prometheus text format.
pub fn render() -> Result<(String, Vec<u8>)> {
    init_collectors();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| Error::SerializationError(format!("Failed to encode metrics: {}", e)))?;

    Ok((encoder.format_type().to_string(), buffer))
}
