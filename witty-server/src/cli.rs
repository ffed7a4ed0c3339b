use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "witty-server",
    about = "Witty Dashboard - robot state over a live key-value table",
    version = env!("CARGO_PKG_VERSION"),
    author,
    propagate_version = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Start the dashboard server (default if no command specified)")]
    Serve(ServeArgs),

    #[command(subcommand, about = "View and modify configuration")]
    Config(ConfigCommands),
}

#[derive(Args, Default)]
pub struct ServeArgs {
    #[arg(long, help = "Address to bind (overrides config and WITTY_HOST)")]
    pub host: Option<String>,

    #[arg(short, long, help = "Port to bind (overrides config and WITTY_PORT)")]
    pub port: Option<u16>,

    #[arg(long, help = "Publish period in milliseconds")]
    pub period_ms: Option<u64>,

    #[arg(
        long = "put",
        value_name = "KEY=JSON",
        value_parser = parse_put,
        help = "Publish a value at startup; non-JSON text is published as a string"
    )]
    pub puts: Vec<(String, serde_json::Value)>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    #[command(about = "Show current configuration")]
    Show {
        #[arg(short, long, help = "Output as JSON")]
        json: bool,
    },

    #[command(about = "Set a configuration value")]
    Set {
        #[arg(help = "Configuration key (host, port, period_ms, root_key)")]
        key: String,

        #[arg(help = "New value")]
        value: String,
    },
}

fn parse_put(raw: &str) -> Result<(String, serde_json::Value), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected KEY=JSON, got '{raw}'"))?;
    if key.is_empty() {
        return Err("key must not be empty".to_string());
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put() {
        assert_eq!(parse_put("speed=0.5"), Ok(("speed".to_string(), serde_json::json!(0.5))));
        assert_eq!(parse_put("team=Witty"), Ok(("team".to_string(), serde_json::json!("Witty"))));
        assert_eq!(parse_put("ids=[1,2]"), Ok(("ids".to_string(), serde_json::json!([1, 2]))));
        assert!(parse_put("novalue").is_err());
        assert!(parse_put("=1").is_err());
    }

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::parse_from(["witty-server"]);
        assert!(cli.command.is_none());

        let cli = Cli::parse_from(["witty-server", "serve", "--port", "5900", "--put", "a=true"]);
        match cli.command {
            Some(Commands::Serve(args)) => {
                assert_eq!(args.port, Some(5900));
                assert_eq!(args.puts, vec![("a".to_string(), serde_json::json!(true))]);
            },
            _ => panic!("expected serve"),
        }
    }
}
