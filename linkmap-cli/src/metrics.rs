// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Prometheus metrics for the gateway.

use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, HistogramVec, IntCounterVec,
};

lazy_static! {
    pub static ref UPSERTS: IntCounterVec = register_int_counter_vec!(
        "linkmap_upserts_total",
        "Committed upserts by outcome",
        &["action"]
    )
    .unwrap();
    pub static ref LOOKUPS: IntCounterVec = register_int_counter_vec!(
        "linkmap_lookups_total",
        "Code lookups by result",
        &["result"]
    )
    .unwrap();
    pub static ref STORE_ERRORS: IntCounterVec = register_int_counter_vec!(
        "linkmap_store_errors_total",
        "Store failures by kind",
        &["kind"]
    )
    .unwrap();
    pub static ref STORE_DURATION: HistogramVec = register_histogram_vec!(
        "linkmap_store_duration_seconds",
        "Time spent inside the mapping store",
        &["operation"],
        vec![0.0005, 0.001, 0.002, 0.005, 0.010, 0.025, 0.050, 0.100, 0.500, 2.0] // upper end covers the lock timeout
    )
    .unwrap();
}

/// Force registration so every series shows up before first use.
pub fn init() {
    lazy_static::initialize(&UPSERTS);
    lazy_static::initialize(&LOOKUPS);
    lazy_static::initialize(&STORE_ERRORS);
    lazy_static::initialize(&STORE_DURATION);
}

pub fn record_upsert(action: &str) {
    UPSERTS.with_label_values(&[action]).inc();
}

pub fn record_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    LOOKUPS.with_label_values(&[result]).inc();
}

pub fn record_error(kind: &str) {
    STORE_ERRORS.with_label_values(&[kind]).inc();
}

/// Text exposition of the default registry.
pub fn metrics_handler() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }

    String::from_utf8(buffer).unwrap_or_else(|_| String::from("Encoding error"))
}
