//! Conexión a PostgreSQL
//!
//! El pool se construye una vez al arrancar, se inyecta en `AppState` y se
//! cierra explícitamente en el apagado.

use sqlx::PgPool;
use tracing::info;

use crate::config::database::DatabaseConfig;
use crate::repositories::PgStore;

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    /// Crear el pool y verificar que la base responde
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        info!("🔌 Conectando a {}", mask_database_url(&config.url));
        let pool = config.create_pool().await?;
        test_connection(&pool).await?;
        info!(
            "🎉 Conectado a la base de datos (max {} conexiones)",
            config.max_connections
        );
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Handle de almacenamiento para los flujos
    pub fn store(&self) -> PgStore {
        PgStore::new(self.pool.clone())
    }

    /// Cerrar el pool esperando a que se devuelvan las conexiones
    pub async fn close(&self) {
        self.pool.close().await;
        info!("🔒 Pool de conexiones cerrado");
    }
}

/// Verificar que la conexión funciona
async fn test_connection(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Función helper para enmascarar la URL de la base de datos en logs
pub fn mask_database_url(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(scheme_end), Some(at_pos)) if at_pos > scheme_end => {
            format!("{}***:***@{}", &url[..scheme_end + 3], &url[at_pos + 1..])
        }
        _ => url.to_string(),
    }
}
