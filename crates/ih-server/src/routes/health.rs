//! Liveness probe.

/// GET / and GET /ping
pub async fn ping() -> &'static str {
    "ok"
}
