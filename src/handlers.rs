//! HTTP route handlers for the threadcast service.
//!
//! The bot runs its poll loop in the background; these handlers expose a
//! banner, a health check, and the poll loop's last outcome.

use axum::{extract::State, response::Json};
use log::debug;
use serde_json::{json, Value};

use crate::poller::SharedStatus;

/// Handles GET requests to the `/` endpoint.
pub async fn handle_root() -> &'static str {
    "threadcast is polling and threading."
}

/// Handles GET requests to the `/health` endpoint.
///
/// # Example Response
///
/// ```json
/// {
///   "status": "healthy",
///   "service": "threadcast"
/// }
/// ```
pub async fn handle_health() -> Json<Value> {
    Json(json!({"status": "healthy", "service": "threadcast"}))
}

/// Handles GET requests to the `/status` endpoint.
///
/// Returns the poll loop summary: number of cycles run, time of the last
/// cycle, its report (posts found, queued and published) or its error.
///
/// # Example Response
///
/// ```json
/// {
///   "cycles": 3,
///   "last_cycle_at": "2024-05-01T12:00:00Z",
///   "last_report": { "found": 4, "queued": 4, "published": 4 },
///   "last_error": null
/// }
/// ```
pub async fn handle_status(State(status): State<SharedStatus>) -> Json<Value> {
    let snapshot = status.read().await.clone();
    debug!("Status requested after {} cycles", snapshot.cycles);
    Json(json!(snapshot))
}
