pub mod api;
pub mod cli;
pub mod config;
pub mod database;
pub mod errors;
pub mod geo;
pub mod pagination;
pub mod ranking;
pub mod services;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::services::server::ServerService;

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_serve(port: u16) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let config = AppConfig::new();
        let service = ServerService::new(port, config);
        service.run().await
    })
}

pub fn handle_init_db() -> Result<()> {
    let db_path = std::env::var("DATABASE_PATH").unwrap_or_else(|_| "matchpoint.db".to_string());
    let pool = database::create_pool(&db_path)?;
    let conn = database::get_connection(&pool)?;
    database::setup::init_database(&conn)?;
    log::info!("Database ready at {db_path}");
    Ok(())
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}
