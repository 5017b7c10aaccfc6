//! Command-line interface definition.

use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand, ValueEnum};

use agrocat_core::AccountId;
use agrocat_infra::{EngineConfig, Environment};
use agrocat_observability::LogFormat;

/// Query an agricultural machinery catalog from JSON fixtures.
#[derive(Parser, Debug)]
#[command(name = "agrocat")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Catalog snapshot (products, categories, brands) as JSON.
    #[arg(long, env = "AGROCAT_CATALOG")]
    pub catalog: PathBuf,

    /// Account list as JSON.
    #[arg(long, env = "AGROCAT_ACCOUNTS")]
    pub accounts: Option<PathBuf>,

    /// Act as this account instead of an anonymous guest.
    #[arg(long)]
    pub as_account: Option<AccountId>,

    /// Language hint, e.g. `uz` or `en-US,en;q=0.9`.
    #[arg(long)]
    pub lang: Option<String>,

    /// Override the deployment environment from `AGROCAT_ENV`.
    #[arg(long, value_enum)]
    pub environment: Option<CliEnvironment>,

    /// Log output format.
    #[arg(long, value_enum, default_value = "compact")]
    pub log_format: CliLogFormat,

    /// Default log directive when `RUST_LOG` is unset.
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Filtered listing from `key=value` parameters.
    Filter {
        /// e.g. `category=tractors spec_horsepower_min=100 ordering=-price`.
        params: Vec<String>,
    },
    /// Search products, categories and brands.
    Search { query: String },
    /// Product page by slug. Counts a view.
    Detail { slug: String },
    /// Products in the same category.
    Related { slug: String },
    /// Featured products.
    Featured,
    /// Category tree, or every active category with `--flat`.
    Categories {
        #[arg(long)]
        flat: bool,
    },
    /// Featured brands.
    FeaturedBrands,
    /// Compare up to four products, comma-separated ids.
    Compare { ids: String },
    /// Visible price in USD and UZS.
    Quote { slug: String },
    /// Localized specification lines.
    Specs { slug: String },
    /// Verify the `--as-account` caller as a business.
    Verify { tax_id: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliEnvironment {
    Development,
    Production,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum CliLogFormat {
    Json,
    Compact,
}

impl Cli {
    /// Environment configuration with CLI overrides applied.
    pub fn engine_config(&self) -> anyhow::Result<EngineConfig> {
        let mut config = EngineConfig::from_env().context("invalid environment configuration")?;
        if let Some(environment) = self.environment {
            config.environment = environment.into();
        }
        Ok(config)
    }
}

/// Split `key=value` arguments.
pub fn parse_params(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|arg| match arg.split_once('=') {
            Some((key, value)) => Ok((key.trim().to_string(), value.to_string())),
            None => bail!("expected key=value, got '{arg}'"),
        })
        .collect()
}

impl From<CliEnvironment> for Environment {
    fn from(v: CliEnvironment) -> Self {
        match v {
            CliEnvironment::Development => Environment::Development,
            CliEnvironment::Production => Environment::Production,
        }
    }
}

impl From<CliLogFormat> for LogFormat {
    fn from(v: CliLogFormat) -> Self {
        match v {
            CliLogFormat::Json => LogFormat::Json,
            CliLogFormat::Compact => LogFormat::Compact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_split_on_first_equals() {
        let raw = vec!["search=a=b".to_string(), "brand=yto".to_string()];
        let params = parse_params(&raw).unwrap();
        assert_eq!(params[0], ("search".to_string(), "a=b".to_string()));
        assert!(parse_params(&["oops".to_string()]).is_err());
    }

    #[test]
    fn parses_global_flags_and_subcommand() {
        let cli = Cli::try_parse_from([
            "agrocat",
            "--catalog",
            "catalog.json",
            "--environment",
            "development",
            "specs",
            "yto-x1204",
        ])
        .unwrap();
        assert!(matches!(cli.command, Command::Specs { ref slug } if slug == "yto-x1204"));
        assert!(matches!(cli.environment, Some(CliEnvironment::Development)));
    }
}
