use std::path::PathBuf;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Args;
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/spendbook.toml";
const ENV_PREFIX: &str = "SPENDBOOK";
/// One year.
const MAX_SESSION_TTL_MINUTES: i64 = 525_600;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database_url: String,
    pub session_path: PathBuf,
    pub session_ttl_minutes: i64,
    pub currency_symbol: String,
    pub timezone: String,
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./spendbook.db?mode=rwc".to_string(),
            session_path: std::env::temp_dir().join("spendbook.session"),
            session_ttl_minutes: 30,
            currency_symbol: "₹".to_string(),
            timezone: "Asia/Kolkata".to_string(),
            level: "info".to_string(),
        }
    }
}

/// Global flags overriding the file and environment settings.
#[derive(Debug, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the database URL (e.g. sqlite:./spendbook.db?mode=rwc).
    #[arg(long, global = true)]
    pub database_url: Option<String>,
    /// Override the session file location.
    #[arg(long, global = true)]
    pub session_path: Option<PathBuf>,
    /// Override the currency symbol used in amounts.
    #[arg(long, global = true)]
    pub currency: Option<String>,
    /// Override timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
    /// Override log level (error, warn, info, debug, trace).
    #[arg(long, global = true)]
    pub level: Option<String>,
}

impl Settings {
    pub fn load(args: &Overrides) -> Result<Self> {
        let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(config::Environment::with_prefix(ENV_PREFIX));
        let mut settings: Settings = builder.build()?.try_deserialize()?;

        if let Some(database_url) = &args.database_url {
            settings.database_url.clone_from(database_url);
        }
        if let Some(session_path) = &args.session_path {
            settings.session_path.clone_from(session_path);
        }
        if let Some(currency) = &args.currency {
            settings.currency_symbol.clone_from(currency);
        }
        if let Some(timezone) = &args.timezone {
            settings.timezone.clone_from(timezone);
        }
        if let Some(level) = &args.level {
            settings.level.clone_from(level);
        }

        settings.session_ttl()?;
        settings.tz()?;
        Ok(settings)
    }

    pub fn tz(&self) -> Result<Tz> {
        self.timezone
            .parse()
            .map_err(|_| AppError::Setting(format!("unknown timezone: {}", self.timezone)))
    }

    /// Session lifetime; between one minute and one year.
    pub fn session_ttl(&self) -> Result<chrono::Duration> {
        let minutes = self.session_ttl_minutes;
        if !(1..=MAX_SESSION_TTL_MINUTES).contains(&minutes) {
            return Err(AppError::Setting(format!(
                "session_ttl_minutes must be between 1 and {MAX_SESSION_TTL_MINUTES}, got {minutes}"
            )));
        }
        chrono::Duration::try_minutes(minutes).ok_or_else(|| {
            AppError::Setting(format!("session_ttl_minutes out of range: {minutes}"))
        })
    }

    /// Current instant in the configured timezone.
    pub fn now(&self) -> Result<DateTime<FixedOffset>> {
        Ok(Utc::now().with_timezone(&self.tz()?).fixed_offset())
    }

    pub fn today(&self) -> Result<NaiveDate> {
        Ok(self.now()?.date_naive())
    }
}
