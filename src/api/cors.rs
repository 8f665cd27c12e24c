//! Cross-origin policy for `/api` routes

use anyhow::{Context, Result};
use axum::http::{header::HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};

use crate::config::ServerConfig;

const ALLOWED_HEADERS: &[&str] = &[
    "x-csrf-token",
    "x-requested-with",
    "accept",
    "accept-version",
    "content-length",
    "content-md5",
    "content-type",
    "date",
    "x-api-version",
];

/// Production allows only the public URL (or nothing when unset); other
/// environments accept any origin.
pub fn layer(config: &ServerConfig) -> Result<CorsLayer> {
    let origin = if config.production {
        match config.public_url.as_deref().filter(|url| !url.is_empty()) {
            Some(url) => AllowOrigin::exact(
                HeaderValue::from_str(url.trim_end_matches('/'))
                    .with_context(|| format!("Invalid public URL: {}", url))?,
            ),
            None => AllowOrigin::list(Vec::<HeaderValue>::new()),
        }
    } else {
        // Credentials cannot be combined with a literal `*`
        AllowOrigin::mirror_request()
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::list(
            ALLOWED_HEADERS.iter().copied().map(HeaderName::from_static),
        )))
}
