//! Rutas HTTP
//!
//! Un endpoint por operación de frontera. Los handlers solo extraen el
//! request, construyen el flujo desde `AppState` y delegan.

pub mod licensing_routes;
pub mod payment_routes;
pub mod vehicle_routes;

use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::cors_layer;
use crate::repositories::Store;
use crate::state::AppState;

/// Router completo de la aplicación
pub fn create_router<S: Store>(state: AppState<S>) -> Router {
    let layers = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.config));

    Router::new()
        .route("/health", get(health::<S>))
        .nest("/api/vehicles", vehicle_routes::create_vehicle_router())
        .nest("/api/payments", payment_routes::create_payment_router())
        .merge(licensing_routes::create_licensing_router())
        .layer(layers)
        .with_state(state)
}

async fn health<S: Store>(State(state): State<AppState<S>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "environment": state.config.environment,
        "timestamp": state.clock.now().to_rfc3339(),
    }))
}
