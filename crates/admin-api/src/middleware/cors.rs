//! CORS layer configuration.

use axum::http::{HeaderName, HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};

use admin_core::config::CorsConfig;

use super::auth::REFRESH_TOKEN_HEADER;

/// Builds a CORS tower layer from configuration.
///
/// The refresh header is exposed so browser clients can pick up renewed tokens.
pub fn build_cors_layer(config: &CorsConfig) -> CorsLayer {
    let mut layer = CorsLayer::new();

    if config.allows_any_origin() {
        layer = layer.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        layer = layer.allow_origin(origins);
    }

    let methods: Vec<Method> = config
        .allowed_methods
        .iter()
        .filter_map(|m| m.parse().ok())
        .collect();

    layer
        .allow_methods(methods)
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REFRESH_TOKEN_HEADER)])
        .max_age(config.max_age())
}
