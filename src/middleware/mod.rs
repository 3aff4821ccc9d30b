//! Middleware del sistema
//!
//! Capas HTTP compartidas por todas las rutas.

pub mod cors;

pub use cors::cors_layer;
