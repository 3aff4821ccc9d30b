//! Configuración del proyecto
//!
//! Este módulo contiene la configuración de base de datos, variables de entorno
//! y las tarifas de los flujos.

pub mod database;
pub mod environment;

pub use environment::*;

use anyhow::{Context, Result};
use std::str::FromStr;

/// Lee una variable opcional y la parsea, usando `default` si no está definida
fn env_or<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", key, raw)),
        Err(_) => Ok(default),
    }
}
