use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, Level};

use vehicle_registry::config::database::DatabaseConfig;
use vehicle_registry::config::environment::EnvironmentConfig;
use vehicle_registry::database::DatabaseConnection;
use vehicle_registry::routes::create_router;
use vehicle_registry::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();
    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    let level = config.log_level.parse::<Level>().unwrap_or(Level::INFO);
    tracing_subscriber::fmt().with_max_level(level).init();

    info!("🚘 Vehicle Registry - flujos de registro, renovación y transferencia");
    info!("==================================================================");
    info!("🌍 Entorno: {}", config.environment);

    // Inicializar base de datos
    let db_config = DatabaseConfig::from_env()?;
    let db_connection = match DatabaseConnection::connect(&db_config).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Invalid HOST/PORT: {}", config.server_url()))?;

    let app = create_router(AppState::new(db_connection.store(), config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🚗 Vehículos:");
    info!("   POST /api/vehicles/register - Alta de registro");
    info!("   POST /api/vehicles/renew - Renovación");
    info!("   POST /api/vehicles/create-transfer-payment - Preparar transferencia");
    info!("💳 Pagos:");
    info!("   POST /api/payments/complete-transfer - Completar transferencia");
    info!("   POST /api/payments/:transaction_id/complete - Confirmar pago");
    info!("   GET  /api/payments/:transaction_id - Consultar pago");
    info!("🪪 Licencias:");
    info!("   POST /api/apply-ll - Solicitar licencia de aprendiz");
    info!("   POST /api/verify-lln - Verificar LLN");
    info!("   POST /api/schedule-test - Reservar examen");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    db_connection.close().await;

    if let Err(e) = served {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
