//! Prometheus metrics endpoint and metric descriptions.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use metrics::Unit;
use metrics_exporter_prometheus::PrometheusHandle;

/// Registers help text for the storefront metrics.
pub fn describe() {
    metrics::describe_counter!("cart_lines_added_total", "Product snapshots appended to carts");
    metrics::describe_counter!("cart_lines_removed_total", "Cart lines removed by product");
    metrics::describe_counter!("checkouts_total", "Cart checkouts attempted");
    metrics::describe_counter!(
        "checkout_failures_total",
        "Failed checkouts and instant buys, labelled by flow and failing step"
    );
    metrics::describe_counter!("instant_buys_total", "Instant buys attempted");
    metrics::describe_histogram!(
        "checkout_duration_seconds",
        Unit::Seconds,
        "Wall time of a cart checkout"
    );
    metrics::describe_counter!("signups_total", "Users registered");
    metrics::describe_counter!("logins_total", "Successful logins");
    metrics::describe_counter!("store_timeouts_total", "Store operations that hit the deadline");
    metrics::describe_histogram!(
        "store_operation_duration_seconds",
        Unit::Seconds,
        "PostgreSQL store operation latency"
    );
}

/// GET /metrics — returns Prometheus-formatted metrics.
pub async fn get(State(handle): State<PrometheusHandle>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        handle.render(),
    )
}
