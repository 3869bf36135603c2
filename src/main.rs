mod cli;
mod commands;
mod ui;

use clap::Parser;
use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result = match cli.command {
        Commands::Init => commands::init::init().map(|_| 0),
        Commands::Check => commands::check::check().await,
        Commands::Info => commands::info::info().await.map(|_| 0),
        Commands::Debug => commands::debug::debug().await.map(|_| 0),
        Commands::ClearCache => commands::clear_cache::clear_cache().map(|_| 0),
        Commands::Install => commands::install::install().await.map(|_| 0),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            ui::error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}
