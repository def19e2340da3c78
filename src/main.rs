use clap::Parser;
use job_portal::cli::{handle_command, PortalCli};
use job_portal::core::ConfigManager;
use std::process::ExitCode;
use tracing::error;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

const DEFAULT_LOG_FILTER: &str = "job_portal=info";

fn init_tracing(json: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    if json {
        Registry::default()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(false),
            )
            .init();
    } else {
        Registry::default().with(filter).with(fmt::layer()).init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = PortalCli::parse();

    let config = match ConfigManager::load() {
        Ok(config) => config,
        Err(e) => {
            init_tracing(false);
            error!("Invalid configuration: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    init_tracing(config.is_production());

    match handle_command(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
