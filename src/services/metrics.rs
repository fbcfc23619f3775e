use lazy_static::lazy_static;
use prometheus::{register_counter_vec, register_gauge, CounterVec, Gauge};

lazy_static! {
    pub static ref REQUESTS_COUNTER: CounterVec = register_counter_vec!(
        "announcements_requests_total",
        "Announcement operations by operation and outcome",
        &["operation", "outcome"]
    ).unwrap();

    pub static ref STORED_GAUGE: Gauge = register_gauge!(
        "announcements_stored",
        "Announcements currently stored, expired ones included"
    ).unwrap();
}

/// Count one finished operation. `outcome` is "ok" or the error kind.
pub fn record(operation: &str, outcome: &str) {
    REQUESTS_COUNTER.with_label_values(&[operation, outcome]).inc();
}
