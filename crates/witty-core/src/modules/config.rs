use std::fs;
use std::path::{Path, PathBuf};
use validator::Validate;
use witty_types::{ConfigError, DashboardConfig};

/// Directory name for data storage.
pub const DATA_DIR: &str = ".witty_dashboard";
/// Filename for the dashboard config.
pub const CONFIG_FILE: &str = "dashboard.json";
/// Overrides the data directory (for containers and tests).
pub const DATA_DIR_ENV: &str = "WITTY_DATA_DIR";

pub const HOST_ENV: &str = "WITTY_HOST";
pub const PORT_ENV: &str = "WITTY_PORT";
pub const PERIOD_ENV: &str = "WITTY_PERIOD_MS";

/// Get the data directory path.
///
/// Priority:
/// 1. `WITTY_DATA_DIR` environment variable
/// 2. `~/.witty_dashboard`
pub fn get_data_dir() -> Result<PathBuf, ConfigError> {
    let data_dir = if let Ok(custom_dir) = std::env::var(DATA_DIR_ENV) {
        PathBuf::from(custom_dir)
    } else {
        let home = dirs::home_dir()
            .ok_or_else(|| ConfigError::DataDir { message: "Cannot get home directory".to_string() })?;
        home.join(DATA_DIR)
    };

    if !data_dir.exists() {
        fs::create_dir_all(&data_dir).map_err(|e| ConfigError::DataDir {
            message: format!("Failed to create {}: {}", data_dir.display(), e),
        })?;
    }

    Ok(data_dir)
}

/// Load the dashboard config from the data directory.
pub fn load_config() -> Result<DashboardConfig, ConfigError> {
    load_config_from(&get_data_dir()?)
}

/// Load `dashboard.json` from `dir`. A missing file yields the defaults.
pub fn load_config_from(dir: &Path) -> Result<DashboardConfig, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(DashboardConfig::new());
    }

    let parse_error = |message: String| ConfigError::Parse { path: config_path.display().to_string(), message };
    let content = fs::read_to_string(&config_path).map_err(|e| parse_error(e.to_string()))?;
    let config: DashboardConfig = serde_json::from_str(&content).map_err(|e| parse_error(e.to_string()))?;

    config.validate().map_err(|e| ConfigError::from_validation(&e))?;
    Ok(config)
}

/// Save the dashboard config to the data directory.
pub fn save_config(config: &DashboardConfig) -> Result<(), ConfigError> {
    save_config_to(&get_data_dir()?, config)
}

/// Validate and atomically write `config` to `dir/dashboard.json`.
pub fn save_config_to(dir: &Path, config: &DashboardConfig) -> Result<(), ConfigError> {
    config.validate().map_err(|e| ConfigError::from_validation(&e))?;

    let config_path = dir.join(CONFIG_FILE);
    let temp_path = dir.join(format!("{}.tmp", CONFIG_FILE));
    let write_error = |message: String| ConfigError::Write { path: config_path.display().to_string(), message };

    let content = serde_json::to_string_pretty(config).map_err(|e| write_error(e.to_string()))?;

    // Atomic write
    fs::write(&temp_path, content).map_err(|e| write_error(e.to_string()))?;
    fs::rename(&temp_path, &config_path).map_err(|e| write_error(e.to_string()))
}

/// Update specific fields in the config.
pub fn update_config<F>(updater: F) -> Result<DashboardConfig, ConfigError>
where
    F: FnOnce(&mut DashboardConfig),
{
    let mut config = load_config()?;
    updater(&mut config);
    save_config(&config)?;
    Ok(config)
}

/// Apply `WITTY_HOST`, `WITTY_PORT` and `WITTY_PERIOD_MS` through `lookup`,
/// then re-validate.
pub fn apply_env_overrides<L>(config: &mut DashboardConfig, lookup: L) -> Result<(), ConfigError>
where
    L: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(HOST_ENV) {
        config.host = host;
    }
    if let Some(port) = lookup(PORT_ENV) {
        config.port = parse_override(PORT_ENV, &port)?;
    }
    if let Some(period) = lookup(PERIOD_ENV) {
        config.period_ms = parse_override(PERIOD_ENV, &period)?;
    }

    config.validate().map_err(|e| ConfigError::from_validation(&e))
}

/// [`apply_env_overrides`] against the process environment.
pub fn apply_process_env(config: &mut DashboardConfig) -> Result<(), ConfigError> {
    apply_env_overrides(config, |var| std::env::var(var).ok())
}

fn parse_override<T: std::str::FromStr>(var: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidOverride { var: var.to_string(), value: value.to_string() })
}
