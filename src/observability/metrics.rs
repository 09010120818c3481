//! Metrics collection and exposition.
//!
//! # Metrics
//! - `huddle_http_requests_total` (counter): requests by method, route, status
//! - `huddle_http_request_duration_seconds` (histogram): latency by method, route
//! - `huddle_events_total` (counter): registry mutations by event
//! - `huddle_active` (gauge): active huddles
//! - `huddle_credentials_issued_total` (counter): signed credentials by kind
//!
//! Recording is a no-op until [`init_metrics`] installs the exporter.

use axum::{body::Body, extract::MatchedPath, http::Request, middleware::Next, response::Response};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::time::Instant;

/// Registry mutation recorded in `huddle_events_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HuddleEvent {
    Created,
    Joined,
    Left,
    Ended,
}

impl HuddleEvent {
    fn as_str(&self) -> &'static str {
        match self {
            HuddleEvent::Created => "created",
            HuddleEvent::Joined => "joined",
            HuddleEvent::Left => "left",
            HuddleEvent::Ended => "ended",
        }
    }
}

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

pub fn record_request(method: &str, path: &str, status: u16, start: Instant) {
    counter!(
        "huddle_http_requests_total",
        "method" => method.to_string(),
        "path" => path.to_string(),
        "status" => status.to_string()
    )
    .increment(1);
    histogram!(
        "huddle_http_request_duration_seconds",
        "method" => method.to_string(),
        "path" => path.to_string()
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_huddle_event(event: HuddleEvent) {
    counter!("huddle_events_total", "event" => event.as_str()).increment(1);
}

pub fn record_active_huddles(count: usize) {
    gauge!("huddle_active").set(count as f64);
}

pub fn record_credential_issued(kind: &'static str) {
    counter!("huddle_credentials_issued_total", "kind" => kind).increment(1);
}

/// Middleware recording request count and latency per route template.
pub async fn track_requests(request: Request<Body>, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().to_string();
    let path = request
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| "unmatched".to_string());

    let response = next.run(request).await;
    record_request(&method, &path, response.status().as_u16(), start);
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_and_credentials_are_labelled() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();

        ::metrics::with_local_recorder(&recorder, || {
            record_huddle_event(HuddleEvent::Created);
            record_huddle_event(HuddleEvent::Ended);
            record_huddle_event(HuddleEvent::Ended);
            record_credential_issued("rtc");
            record_active_huddles(3);
        });

        let rendered = handle.render();
        assert!(rendered.contains("huddle_events_total{event=\"created\"} 1"));
        assert!(rendered.contains("huddle_events_total{event=\"ended\"} 2"));
        assert!(rendered.contains("huddle_credentials_issued_total{kind=\"rtc\"} 1"));
        assert!(rendered.contains("huddle_active 3"));
    }
}
