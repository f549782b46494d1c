use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::error::ErrorKind;
use swindom_host::{ArgumentError, HostArguments, HostConfig, ParentExit, run_host};

#[tokio::main]
async fn main() -> ExitCode {
    let args = match HostArguments::from_env() {
        Ok(args) => args,
        Err(ArgumentError::Parse(e))
            if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) =>
        {
            e.exit()
        }
        Err(e) => {
            init_logging(&HostConfig::default());
            tracing::error!(error = %e, "Invalid startup arguments");
            return ExitCode::FAILURE;
        }
    };

    let (config, config_errors) = HostConfig::load(args.settings_dir());
    init_logging(&config);
    for e in config_errors {
        tracing::warn!(error = %e, "Ignoring config file");
    }

    match run(args, config).await {
        Ok(reason) => {
            tracing::info!(%reason, "Plugin host stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Plugin host failed to start: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: HostArguments, config: HostConfig) -> Result<ParentExit> {
    let plugin = args.plugin_path().display().to_string();
    run_host(args, config)
        .await
        .with_context(|| format!("Failed to host plugin {plugin}"))
}

fn init_logging(config: &HostConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(config.effective_log_filter())
        .with_writer(std::io::stderr)
        .init();
}
