//! Serve command - HTTP API over both services.

use std::net::SocketAddr;

use tower_http::trace::TraceLayer;
use tracing::info;

use common::{AppError, AppResult, Database};

use crate::cli::{MigrateAction, ServeArgs};
use crate::config::GatewayConfig;
use crate::routes::create_router;
use crate::state::AppState;

/// Execute the serve command
pub async fn execute(args: ServeArgs, config: GatewayConfig) -> AppResult<()> {
    let host = args.host.unwrap_or_else(|| config.host.clone());
    let port = args.port.unwrap_or(config.port);

    let db = Database::connect(&config.database).await?;
    super::migrate::run(&db, MigrateAction::Up).await?;

    let memberships = membership_service_lib::build_service(db.get_connection());
    let subscriptions =
        subscription_service_lib::build_service(db.get_connection(), config.subscription.policy());

    let state = AppState::new(memberships, subscriptions, Some(db), config);
    let app = create_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| AppError::BadRequest(format!("Invalid listen address: {}", e)))?;
    info!("Collective API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {}: {}", addr, e)))?;
    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::internal(e.to_string()))?;

    Ok(())
}
