//! Registro de vehículos
//!
//! Motor de flujos transaccionales para el ciclo de vida del registro de
//! vehículos: alta, renovación y transferencia de titularidad, con pagos
//! pendientes como compuerta, más la licencia de aprendiz y la reserva del
//! examen de conducir.

pub mod config;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;
