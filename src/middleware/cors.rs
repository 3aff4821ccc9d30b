//! Middleware de CORS
//!
//! En desarrollo se acepta cualquier origen; fuera de él solo los listados en
//! `CORS_ORIGINS`.

use axum::http::{header, HeaderValue, Method};
use tower_http::cors::CorsLayer;
use tracing::warn;

use crate::config::environment::EnvironmentConfig;

/// Capa de CORS según el entorno
pub fn cors_layer(config: &EnvironmentConfig) -> CorsLayer {
    if config.is_development() {
        return CorsLayer::very_permissive();
    }
    cors_with_origins(&config.cors_origins)
}

/// CORS restringido a los orígenes dados; los que no son cabeceras válidas se ignoran
pub fn cors_with_origins(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("⚠️ Origen CORS inválido ignorado: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}
