//! Modelo de Owner
//!
//! Propietario registrado (tabla `users`). La identidad se resuelve fuera del
//! núcleo; aquí solo se lee.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::fmt;

use crate::utils::errors::{AppError, AppResult};

/// Owner - mapea a la tabla users
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Owner {
    pub user_id: i64,
    pub full_name: String,
    pub pan_number: String,
    pub email: Option<String>,
    pub address_line1: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pincode: Option<String>,
}

/// Identificador de propietario tal como llega desde fuera.
///
/// Los clientes mandan el id como número o como string indistintamente,
/// así que se guarda normalizado como texto y se compara como texto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawOwnerId", into = "String")]
pub struct OwnerId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOwnerId {
    Number(i64),
    Text(String),
}

impl From<RawOwnerId> for OwnerId {
    fn from(raw: RawOwnerId) -> Self {
        match raw {
            RawOwnerId::Number(n) => OwnerId::from(n),
            RawOwnerId::Text(s) => OwnerId::from(s.as_str()),
        }
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        OwnerId(id.to_string())
    }
}

impl From<&str> for OwnerId {
    fn from(id: &str) -> Self {
        OwnerId(id.trim().to_string())
    }
}

impl From<OwnerId> for String {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl OwnerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compara contra el id numérico almacenado
    pub fn matches(&self, stored: i64) -> bool {
        self.0 == stored.to_string()
    }

    /// Convierte al id de la base de datos; falla si no es numérico
    pub fn to_db_id(&self) -> AppResult<i64> {
        self.0
            .parse::<i64>()
            .map_err(|_| AppError::ValidationFailed(format!("Invalid owner id '{}'", self.0)))
    }
}
