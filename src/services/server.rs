use anyhow::Result;
use log::info;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

use crate::api::handlers::AppState;
use crate::api::routes::create_router;
use crate::config::settings::AppConfig;
use crate::database;

pub struct ServerService {
    port: u16,
    config: AppConfig,
}

impl ServerService {
    pub fn new(port: u16, config: AppConfig) -> Self {
        Self { port, config }
    }

    pub async fn run(&self) -> Result<()> {
        let db_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "matchpoint.db".to_string());

        let pool = database::create_pool(&db_path)?;
        // Schema application is idempotent, so a fresh database file
        // works without a separate init-db run.
        let conn = database::get_connection(&pool)?;
        database::setup::init_database(&conn)?;

        let state = Arc::new(AppState {
            pool,
            config: self.config,
        });

        let app = create_router(state).layer(CorsLayer::permissive());

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));
        info!("Server listening on {}", addr);

        let listener = tokio::net::TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
