// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Cross-cutting HTTP layers.

use std::time::Instant;

use axum::{
    extract::Request,
    http::{HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};

/// Response header carrying the handler time in seconds.
pub const PROCESS_TIME_HEADER: HeaderName = HeaderName::from_static("x-process-time");

/// Time each request, log it, and report the elapsed seconds in
/// `X-Process-Time`.
pub async fn process_time(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let started = Instant::now();

    let mut response = next.run(request).await;

    let elapsed = started.elapsed();
    tracing::info!(
        %method,
        %path,
        status = response.status().as_u16(),
        elapsed_ms = elapsed.as_secs_f64() * 1000.0,
        "Request completed"
    );

    if let Ok(value) = HeaderValue::from_str(&format!("{:.6}", elapsed.as_secs_f64())) {
        response.headers_mut().insert(PROCESS_TIME_HEADER, value);
    }
    response
}

/// CORS policy: permissive without a configured origin, otherwise that
/// origin only, with credentials.
pub fn cors_layer(client_origin: Option<&str>) -> CorsLayer {
    let Some(origin) = client_origin else {
        return CorsLayer::permissive();
    };

    match HeaderValue::from_str(origin) {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_credentials(true)
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request()),
        Err(e) => {
            tracing::warn!(origin, error = %e, "Invalid CLIENT_ORIGIN, falling back to permissive CORS");
            CorsLayer::permissive()
        }
    }
}
