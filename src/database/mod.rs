//! Módulo de base de datos
//!
//! Maneja el pool de PostgreSQL y la transacción con alcance que usan los flujos.

pub mod connection;
pub mod transaction;

pub use connection::DatabaseConnection;
pub use transaction::scoped;
