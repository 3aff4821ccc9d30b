//! Utilidades del sistema
//!
//! Este módulo contiene utilidades para manejo de errores, validación
//! y la fuente de tiempo de los flujos.

pub mod clock;
pub mod errors;
pub mod validation;

pub use clock::{Clock, FixedClock, SystemClock};
pub use errors::{AppError, AppResult};
