//! Per-request logging middleware.

use std::time::Instant;

use axum::{extract::Request, middleware::Next, response::Response};

/// Log each request on arrival and again with its status and duration once
/// the response is ready.
pub async fn log_requests(request: Request, next: Next) -> Response {
  let method = request.method().clone();
  let path = request.uri().path().to_owned();
  tracing::debug!(%method, %path, "received request");

  let started = Instant::now();
  let response = next.run(request).await;
  let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;

  tracing::info!(
    %method,
    %path,
    status = response.status().as_u16(),
    elapsed_ms,
    "request finished"
  );
  response
}
