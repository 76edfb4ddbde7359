use clap::Parser;
use tracing_subscriber::EnvFilter;

use sa_orchestrator::cli::{chat, run, Cli, Command};
use sa_orchestrator::{bootstrap, config as app_config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        // Default to chat when no subcommand is given.
        None => {
            init_tracing();
            let (config, _path) = app_config::load_config()?;
            chat::chat(config, "cli:chat".to_string(), 1).await
        }
        Some(Command::Chat { session, restaurant_id }) => {
            init_tracing();
            let (config, _path) = app_config::load_config()?;
            chat::chat(config, session, restaurant_id).await
        }
        Some(Command::Run { message, session, restaurant_id, json }) => {
            init_tracing();
            let (config, _path) = app_config::load_config()?;
            let state = bootstrap::build_app_state(config)?;
            run::run(&state, &session, restaurant_id, &message, json).await
        }
        Some(Command::ConfigValidate) => {
            let (config, path) = app_config::load_config()?;
            let issues = config.pipeline.validate();
            for issue in &issues {
                println!("{issue}");
            }
            if sa_domain::config::Config::has_errors(&issues) {
                eprintln!("{path}: config validation failed");
                std::process::exit(1);
            }
            println!("{path}: ok");
            Ok(())
        }
        Some(Command::Version) => {
            println!("drivethru {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sa_orchestrator=debug")))
        .init();
}
