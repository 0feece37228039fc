use crate::{config::DatabaseKind, probe::ProbeOutcome};
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGaugeVec, Registry, opts,
    register_histogram_vec_with_registry, register_int_counter_vec_with_registry,
    register_int_gauge_vec_with_registry,
};
use std::{sync::LazyLock, time::Duration};

pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

trait ResultExt<T> {
    fn or_exit(self, context: &str) -> T;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn or_exit(self, context: &str) -> T {
        match self {
            Ok(value) => value,
            Err(err) => {
                eprintln!("failed to initialize metric ({context}): {err}");
                std::process::exit(1);
            }
        }
    }
}

pub static UP: LazyLock<IntGaugeVec> = LazyLock::new(|| {
    register_int_gauge_vec_with_registry!(
        opts!("dbprobe_up", "1 if the last probe succeeded, 0 otherwise"),
        &["database"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CHECKS_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        opts!("dbprobe_checks_total", "Total probes by result"),
        &["database", "result"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static FAILURES_TOTAL: LazyLock<IntCounterVec> = LazyLock::new(|| {
    register_int_counter_vec_with_registry!(
        opts!("dbprobe_failures_total", "Total failed probes by category"),
        &["database", "category"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

pub static CHECK_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    register_histogram_vec_with_registry!(
        HistogramOpts::new(
            "dbprobe_check_duration_seconds",
            "Probe duration in seconds, connect and query"
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["database"],
        &REGISTRY
    )
    .or_exit("metric can be created")
});

/// Record the result of one probe
pub fn record(kind: DatabaseKind, outcome: &ProbeOutcome, elapsed: Duration) {
    let database = kind.as_str();

    CHECK_DURATION
        .with_label_values(&[database])
        .observe(elapsed.as_secs_f64());

    if outcome.ok {
        UP.with_label_values(&[database]).set(1);
        CHECKS_TOTAL.with_label_values(&[database, "success"]).inc();
    } else {
        UP.with_label_values(&[database]).set(0);
        CHECKS_TOTAL.with_label_values(&[database, "error"]).inc();
        FAILURES_TOTAL
            .with_label_values(&[database, outcome.category.as_str()])
            .inc();
    }
}

/// Encode all registered metrics in the text exposition format
///
/// # Errors
///
/// Returns an error if the metrics cannot be encoded
pub fn encode_metrics() -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let encoder = prometheus::TextEncoder::new();

    encoder
        .encode(&REGISTRY.gather(), &mut buffer)
        .map_err(|e| format!("could not encode custom metrics: {e}"))?;

    Ok(buffer)
}
