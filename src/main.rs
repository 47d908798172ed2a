mod models;
mod services;
mod utils;

use std::process::ExitCode;

use clap::Parser;
use services::commit_report::{self, RunStatus};
use services::git_platforms::GitHubClient;
use services::slack::{Notifier, SlackClient, SlackWebhook, StdoutNotifier};
use utils::config::{Config, ConfigArgs, Destination};

/// Post a GitHub user's commit streak to Slack
#[derive(Parser)]
#[command(name = "commit-streak", version)]
struct Cli {
    #[command(flatten)]
    config: ConfigArgs,
}

fn build_notifier(destination: &Destination) -> anyhow::Result<Box<dyn Notifier>> {
    Ok(match destination {
        Destination::Slack { token, .. } => Box::new(SlackClient::new(token.clone())?),
        Destination::Webhook { url } => Box::new(SlackWebhook::new(url.clone())?),
        Destination::Stdout => Box::new(StdoutNotifier),
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // Load .env file FIRST so clap sees its variables
    dotenv::dotenv().ok();

    // Initialize logger with default level if RUST_LOG not set
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match Config::from_args(cli.config) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {}", e);
            return ExitCode::from(RunStatus::ComputationFailed.exit_code());
        }
    };

    log::info!(
        "Reporting on {} ({}) from the {:?} source for {} (UTC{})",
        config.username,
        config.platform.platform,
        config.source,
        config.today,
        config.offset
    );

    let platform = match GitHubClient::new(config.platform.clone(), config.github_token.clone()) {
        Ok(platform) => platform,
        Err(e) => {
            log::error!("{:#}", e);
            return ExitCode::from(RunStatus::ComputationFailed.exit_code());
        }
    };

    let notifier = match build_notifier(&config.destination) {
        Ok(notifier) => notifier,
        Err(e) => {
            log::error!("{:#}", e);
            return ExitCode::from(RunStatus::ComputationFailed.exit_code());
        }
    };

    let status = commit_report::run(&platform, notifier.as_ref(), &config).await;
    log::info!("Run finished: {:?}", status);

    ExitCode::from(status.exit_code())
}
