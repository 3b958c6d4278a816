use axum::http::{header, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::{Config, DEFAULT_ALLOWED_ORIGINS};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

pub fn create_cors_layer(config: &Config) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(allowed_origins(&config.cors_origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT, header::ORIGIN])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .allow_credentials(true)
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS))
}

fn allowed_origins(configured: &[String]) -> AllowOrigin {
    let mut origins = parse_header_values(configured.iter().map(String::as_str));

    // Credentials rule out a wildcard origin, so fall back to the local frontend.
    if origins.is_empty() {
        tracing::warn!(
            "CORS: No valid origins configured, falling back to {}",
            DEFAULT_ALLOWED_ORIGINS
        );
        origins = parse_header_values(DEFAULT_ALLOWED_ORIGINS.split(','));
    }

    tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
    AllowOrigin::list(origins)
}

fn parse_header_values<'a>(origins: impl Iterator<Item = &'a str>) -> Vec<HeaderValue> {
    origins
        .filter_map(|origin| match origin.trim().parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin.trim());
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin.trim(), e);
                None
            }
        })
        .collect()
}
