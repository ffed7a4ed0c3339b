//! Witty Server - Headless Dashboard Daemon
//!
//! Serves the robot's topic table over HTTP:
//! - `GET /topics`, `GET /topics/{path}` read published values
//! - `PUT /topics/{path}` writes a value back into the robot
//!
//! Access via: http://192.168.49.1:5810

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use validator::Validate;

mod cli;
mod config_commands;
mod process;

use cli::{Cli, Commands, ConfigCommands, ServeArgs};
use witty_core::modules::config as core_config;
use witty_core::sendables::{Alerts, SendableGroup};
use witty_core::{Dashboard, TopicServer};
use witty_types::DashboardConfig;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_new(&cli.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        None => serve(ServeArgs::default()).await,
        Some(Commands::Serve(args)) => serve(args).await,
        Some(Commands::Config(ConfigCommands::Show { json })) => config_commands::show_config(json),
        Some(Commands::Config(ConfigCommands::Set { key, value })) => {
            config_commands::set_config_value(&key, &value)
        },
    }
}

fn resolve_config(args: &ServeArgs) -> Result<DashboardConfig> {
    let mut config = core_config::load_config().unwrap_or_else(|e| {
        warn!("Could not load config, using defaults: {}", e);
        DashboardConfig::default()
    });
    core_config::apply_process_env(&mut config)?;

    if let Some(host) = &args.host {
        config.host.clone_from(host);
    }
    if let Some(port) = args.port {
        config.port = port;
    }
    if let Some(period_ms) = args.period_ms {
        config.period_ms = period_ms;
    }
    config.validate()?;
    Ok(config)
}

async fn serve(args: ServeArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    info!("Witty Server starting on {}...", config.addr());

    let alerts = Arc::new(Alerts::new());
    alerts.install_panic_hook();

    let root = SendableGroup::with_type("Robot");
    root.add("Process", Arc::new(process::ProcessInfo::new()));
    root.add("Alerts", alerts.clone());

    let dashboard = Dashboard::new(config.clone(), Arc::new(TopicServer::new()));
    dashboard.start(Some(Arc::new(root))).await?;

    for (key, value) in args.puts {
        dashboard.put_json(&key, value)?;
        info!("Published {}", key);
    }

    alerts.info(format!("Serving on {}", config.addr()));
    info!("Dashboard available at http://{}/topics", config.addr());

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    dashboard.stop().await?;
    Ok(())
}
