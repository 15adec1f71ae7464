//! phonebook: terminal front end for the contacts directory
//!
//! Usage:
//!   phonebook                    - Start the interactive directory
//!   phonebook --config <PATH>    - Use a specific config file
//!   phonebook --help             - Show help

mod cli;
mod command;
mod render;

use pb_app::{Directory, DirectorySettings};
use pb_client::ContactsClient;
use pb_core::Config;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Run mode
#[derive(Debug, PartialEq, Eq)]
enum RunMode {
    /// Interactive directory, optionally with an explicit config file
    Interactive { config: Option<PathBuf> },
    /// Show help
    Help,
    /// Show version
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config_path = match parse_args(&args)? {
        RunMode::Help => {
            print_help();
            return Ok(());
        }
        RunMode::Version => {
            println!("phonebook {}", env!("CARGO_PKG_VERSION"));
            return Ok(());
        }
        RunMode::Interactive { config } => config,
    };

    // Load .env file before reading PHONEBOOK_* overrides
    dotenvy::dotenv().ok();

    let config = Config::load_from(config_path.as_deref())
        .map_err(|e| anyhow::anyhow!("Config error: {}", e))?;

    // Logs go to stderr so they never mix with the directory output
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log.level)?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::info!("Starting phonebook...");
    tracing::info!("API: {}", config.api.base_url);

    let client = ContactsClient::new(&config.api)
        .map_err(|e| anyhow::anyhow!("Failed to create API client: {}", e))?;
    let directory = Arc::new(Directory::new(
        Arc::new(client),
        DirectorySettings::from(&config),
    ));

    cli::run_cli(directory).await
}

/// Parse command line arguments
fn parse_args(args: &[String]) -> anyhow::Result<RunMode> {
    let mut config = None;
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => return Ok(RunMode::Help),
            "--version" | "-v" => return Ok(RunMode::Version),
            "--config" | "-c" => {
                let path = iter
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--config requires a path"))?;
                config = Some(PathBuf::from(path));
            }
            other => anyhow::bail!("Unknown argument: {} (see --help)", other),
        }
    }

    Ok(RunMode::Interactive { config })
}

/// Print help message
fn print_help() {
    println!("phonebook - contacts directory client");
    println!();
    println!("Usage:");
    println!("  phonebook                  Start the interactive directory");
    println!("  phonebook --config <PATH>  Read settings from PATH (default: phonebook.toml)");
    println!("  phonebook --help           Show this help message");
    println!("  phonebook --version        Show version");
    println!();
    println!("Environment Variables:");
    println!("  PHONEBOOK_API_URL               Contacts API base URL");
    println!("  PHONEBOOK_API_TIMEOUT           Request timeout in seconds (default: 30)");
    println!("  PHONEBOOK_PAGE_SIZE             Initial page size: 10, 25 or 50 (default: 10)");
    println!("  PHONEBOOK_SEARCH_DEBOUNCE_MS    Search debounce delay (default: 300)");
    println!("  PHONEBOOK_NOTIFICATION_SECS     Notification display time (default: 3)");
    println!("  PHONEBOOK_LOG_LEVEL             Log level when RUST_LOG is unset (default: info)");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_args_default() {
        assert_eq!(
            parse_args(&[]).unwrap(),
            RunMode::Interactive { config: None }
        );
    }

    #[test]
    fn test_parse_args_config() {
        assert_eq!(
            parse_args(&args(&["--config", "/tmp/pb.toml"])).unwrap(),
            RunMode::Interactive {
                config: Some(PathBuf::from("/tmp/pb.toml"))
            }
        );
        assert!(parse_args(&args(&["--config"])).is_err());
    }

    #[test]
    fn test_parse_args_flags() {
        assert_eq!(parse_args(&args(&["-h"])).unwrap(), RunMode::Help);
        assert_eq!(parse_args(&args(&["--version"])).unwrap(), RunMode::Version);
        assert!(parse_args(&args(&["--cli"])).is_err());
    }
}
