//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno, del servidor y las
//! tarifas aplicadas por los flujos de registro y transferencia.

use anyhow::Result;
use rust_decimal::Decimal;

use super::env_or;

/// Tasa del impuesto de circulación sobre el precio ex-showroom (8%)
pub const DEFAULT_ROAD_TAX_RATE: Decimal = Decimal::from_parts(8, 0, 0, false, 2);

/// Tasa fija de transferencia de titularidad (500.00)
pub const DEFAULT_TRANSFER_FEE: Decimal = Decimal::from_parts(50_000, 0, 0, false, 2);

/// Tarifas de los flujos
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeeSchedule {
    pub road_tax_rate: Decimal,
    pub transfer_fee: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            road_tax_rate: DEFAULT_ROAD_TAX_RATE,
            transfer_fee: DEFAULT_TRANSFER_FEE,
        }
    }
}

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub cors_origins: Vec<String>,
    pub log_level: String,
    pub fees: FeeSchedule,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            port: 3000,
            host: "0.0.0.0".to_string(),
            cors_origins: Vec::new(),
            log_level: "info".to_string(),
            fees: FeeSchedule::default(),
        }
    }
}

impl EnvironmentConfig {
    /// Leer desde el entorno; lo no definido toma el valor de desarrollo
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        Ok(Self {
            environment: env_or("ENVIRONMENT", defaults.environment)?,
            port: env_or("PORT", defaults.port)?,
            host: env_or("HOST", defaults.host)?,
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| {
                    raw.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
            log_level: env_or("LOG_LEVEL", defaults.log_level)?,
            fees: FeeSchedule {
                road_tax_rate: env_or("ROAD_TAX_RATE", DEFAULT_ROAD_TAX_RATE)?,
                transfer_fee: env_or("TRANSFER_FEE", DEFAULT_TRANSFER_FEE)?,
            },
        })
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
