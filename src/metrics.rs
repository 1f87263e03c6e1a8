//! Prometheus collectors and the `/metrics` text endpoint.

use actix_web::HttpResponse;
use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder,
};

lazy_static! {
    /// Currently open WebSocket chat connections.
    pub static ref ACTIVE_CHAT_CONNECTIONS: IntGauge = register_int_gauge!(
        "chat_active_connections",
        "Currently connected chat clients"
    )
    .expect("failed to register chat_active_connections");

    /// Messages persisted to the chat log (and therefore broadcast).
    pub static ref CHAT_MESSAGES_TOTAL: IntCounter = register_int_counter!(
        "chat_messages_total",
        "Chat messages persisted and fanned out"
    )
    .expect("failed to register chat_messages_total");

    /// Inbound messages dropped because persistence failed after retries.
    pub static ref CHAT_MESSAGES_DROPPED_TOTAL: IntCounter = register_int_counter!(
        "chat_messages_dropped_total",
        "Chat messages dropped on persistence failure"
    )
    .expect("failed to register chat_messages_dropped_total");

    /// Review upserts that committed (create or in-place update).
    pub static ref REVIEW_UPSERTS_TOTAL: IntCounter = register_int_counter!(
        "review_upserts_total",
        "Committed review upserts"
    )
    .expect("failed to register review_upserts_total");
}

/// Actix handler that renders Prometheus metrics in text format.
pub async fn serve_metrics() -> HttpResponse {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(err) = encoder.encode(&metric_families, &mut buffer) {
        return HttpResponse::InternalServerError().body(err.to_string());
    }

    HttpResponse::Ok()
        .content_type(encoder.format_type())
        .body(buffer)
}
