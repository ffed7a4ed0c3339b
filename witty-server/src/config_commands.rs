use anyhow::Result;
use colored::Colorize;

use witty_core::modules::config as core_config;

pub fn show_config(json: bool) -> Result<()> {
    let config = core_config::load_config()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&config)?);
    } else {
        println!("{}", "Dashboard Configuration:".cyan().bold());
        println!("  Host: {}", config.host);
        println!("  Port: {}", config.port);
        println!("  Period: {} ms", config.period_ms);
        println!("  Root key: {}", config.root_key);
    }
    Ok(())
}

pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    match key {
        "port" => {
            value.parse::<u16>().map_err(|_| anyhow::anyhow!("Invalid port number: {}", value))?;
        },
        "period_ms" => {
            value.parse::<u64>().map_err(|_| anyhow::anyhow!("Invalid period: {}", value))?;
        },
        "host" | "root_key" => {},
        _ => anyhow::bail!("Unknown config key: {}", key),
    }

    core_config::update_config(|config| match key {
        "host" => config.host = value.to_string(),
        "port" => config.port = value.parse().unwrap_or(config.port),
        "period_ms" => config.period_ms = value.parse().unwrap_or(config.period_ms),
        "root_key" => config.root_key = value.to_string(),
        _ => {},
    })?;

    println!("{} Config updated: {} = {}", "✓".green(), key, value);
    Ok(())
}
