use std::net::SocketAddr;

// ── Booking metrics ──────────────────────────────────────

/// Counter: bookings created.
pub const BOOKINGS_CREATED_TOTAL: &str = "estadia_bookings_created_total";

/// Counter: bookings cancelled.
pub const BOOKINGS_CANCELLED_TOTAL: &str = "estadia_bookings_cancelled_total";

/// Counter: bookings finalized.
pub const BOOKINGS_FINALIZED_TOTAL: &str = "estadia_bookings_finalized_total";

/// Counter: payments appended to the ledger.
pub const PAYMENTS_REGISTERED_TOTAL: &str = "estadia_payments_registered_total";

/// Counter: availability queries served.
pub const AVAILABILITY_QUERIES_TOTAL: &str = "estadia_availability_queries_total";

/// Counter: operations rejected by a business rule. Labels: rule.
pub const REJECTIONS_TOTAL: &str = "estadia_rejections_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}
