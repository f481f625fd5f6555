//! Command-line interface parsing
//!
//! Handles CLI arguments using clap: jumping straight to a route or the
//! favorites view, overriding the backend URL, and disabling the response
//! cache.

use clap::Parser;
use thiserror::Error;

/// Error types for CLI argument parsing
#[derive(Debug, Error)]
pub enum CliError {
    /// --route was given an empty or whitespace-only name
    #[error("Invalid route: route name cannot be empty")]
    EmptyRoute,
}

/// Marshrut - Moscow public transit schedules in the terminal
#[derive(Parser, Debug)]
#[command(name = "marshrut")]
#[command(about = "Moscow transit schedules, favorites and route statistics")]
#[command(version)]
pub struct Cli {
    /// Open directly on a route's stop list
    ///
    /// Examples:
    ///   marshrut --route 12      # Open route 12
    ///   marshrut --route т25     # Trolleybus routes work too
    #[arg(long, value_name = "NAME")]
    pub route: Option<String>,

    /// Open the favorites view on startup
    #[arg(long)]
    pub favorites: bool,

    /// Backend API base URL override
    #[arg(long, value_name = "URL")]
    pub api_url: Option<String>,

    /// Disable the response cache (every lookup hits the backend)
    #[arg(long)]
    pub no_cache: bool,
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug, Clone)]
pub struct StartupConfig {
    /// Route to open immediately (if specified)
    pub initial_route: Option<String>,
    /// Whether to start in the favorites view
    pub start_in_favorites: bool,
    /// Backend base URL override
    pub api_url: Option<String>,
    /// Whether the response cache is enabled
    pub use_cache: bool,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            initial_route: None,
            start_in_favorites: false,
            api_url: None,
            use_cache: true,
        }
    }
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// # Returns
    /// * `Ok(StartupConfig)` with appropriate settings
    /// * `Err(CliError)` if an invalid route name was specified
    pub fn from_cli(cli: &Cli) -> Result<Self, CliError> {
        let initial_route = match &cli.route {
            Some(route) => {
                let trimmed = route.trim();
                if trimmed.is_empty() {
                    return Err(CliError::EmptyRoute);
                }
                Some(trimmed.to_string())
            }
            None => None,
        };

        Ok(StartupConfig {
            initial_route,
            start_in_favorites: cli.favorites,
            api_url: cli.api_url.clone(),
            use_cache: !cli.no_cache,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_startup_config_default() {
        let config = StartupConfig::default();
        assert!(config.initial_route.is_none());
        assert!(!config.start_in_favorites);
        assert!(config.api_url.is_none());
        assert!(config.use_cache);
    }

    #[test]
    fn test_cli_parse_no_args() {
        let cli = Cli::parse_from(["marshrut"]);
        assert!(cli.route.is_none());
        assert!(!cli.favorites);
        assert!(!cli.no_cache);
    }

    #[test]
    fn test_cli_parse_route() {
        let cli = Cli::parse_from(["marshrut", "--route", "12"]);
        assert_eq!(cli.route.as_deref(), Some("12"));
    }

    #[test]
    fn test_startup_config_trims_route_name() {
        let cli = Cli::parse_from(["marshrut", "--route", " 12 "]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.initial_route.as_deref(), Some("12"));
    }

    #[test]
    fn test_startup_config_rejects_blank_route() {
        let cli = Cli::parse_from(["marshrut", "--route", "   "]);
        let result = StartupConfig::from_cli(&cli);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("route name cannot be empty"));
    }

    #[test]
    fn test_startup_config_no_cache_flag() {
        let cli = Cli::parse_from(["marshrut", "--no-cache"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(!config.use_cache);
    }

    #[test]
    fn test_startup_config_favorites_flag() {
        let cli = Cli::parse_from(["marshrut", "--favorites"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert!(config.start_in_favorites);
    }

    #[test]
    fn test_startup_config_api_url() {
        let cli = Cli::parse_from(["marshrut", "--api-url", "http://localhost:8000"]);
        let config = StartupConfig::from_cli(&cli).unwrap();
        assert_eq!(config.api_url.as_deref(), Some("http://localhost:8000"));
    }
}
