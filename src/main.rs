use anyhow::Result;
use colored::Colorize;

use matchpoint::cli::Command;
use matchpoint::{handle_completions, handle_init_db, handle_serve, interpret};

fn main() {
    setup_logging();
    parse_and_execute().unwrap_or_else(|e| {
        eprintln!("{} {e:#}", "Error:".red());
        std::process::exit(1);
    });
}

fn setup_logging() {
    sensible_env_logger::init!();
}

fn parse_and_execute() -> Result<()> {
    let command = interpret();
    execute_command(&command)
}

fn execute_command(command: &Command) -> Result<()> {
    match command {
        Command::Serve { port } => handle_serve(*port),
        Command::InitDb => handle_init_db(),
        Command::Completions { shell } => handle_completions(*shell),
    }
}
