use std::{env, net::SocketAddr, path::PathBuf, str::FromStr, time::Duration};

use chessclub_events::DEFAULT_LOCATION;
use log::LevelFilter;
use reqwest::Url;
use thiserror::Error;

pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 8;
pub const GOOGLE_CALENDAR_API_URL: &str = "https://www.googleapis.com/calendar/v3";
pub const AIRTABLE_API_URL: &str = "https://api.airtable.com/v0";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("`{0}` must be set")]
    Missing(&'static str),

    #[error("`{name}` is invalid: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventSourceKind {
    Google,
    Airtable,
}

impl FromStr for EventSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" => Ok(Self::Google),
            "airtable" => Ok(Self::Airtable),
            other => Err(format!("expected `google` or `airtable`, got `{other}`")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct GoogleConfig {
    pub api_key: String,
    pub calendar_id: String,
    /// OAuth token, only needed for writes.
    pub access_token: Option<String>,
    pub api_url: Url,
}

#[derive(Debug, Clone)]
pub struct AirtableConfig {
    pub api_key: String,
    pub base_id: String,
    pub api_url: Url,
    pub events_table: String,
    pub contacts_table: String,
    pub newsletter_table: String,
    pub announcements_table: Option<String>,
    pub cards_table: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level: LevelFilter,
    pub file_path: Option<PathBuf>,
    pub archive_pattern: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub address: SocketAddr,
    pub event_source: EventSourceKind,
    pub google: Option<GoogleConfig>,
    pub airtable: AirtableConfig,
    pub location: String,
    pub fetch_timeout: Duration,
    pub log: LogConfig,
}

struct Vars<L> {
    lookup: L,
}

impl<L: Fn(&str) -> Option<String>> Vars<L> {
    fn optional(&self, name: &'static str) -> Option<String> {
        (self.lookup)(name)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn required(&self, name: &'static str) -> Result<String, ConfigError> {
        self.optional(name).ok_or(ConfigError::Missing(name))
    }

    fn or(&self, name: &'static str, default: &str) -> String {
        self.optional(name).unwrap_or_else(|| default.to_string())
    }

    fn parsed<T>(&self, name: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: ToString,
    {
        match self.optional(name) {
            Some(raw) => raw.parse().map_err(|err: T::Err| ConfigError::Invalid {
                name,
                reason: err.to_string(),
            }),
            None => Ok(default),
        }
    }

    fn url(&self, name: &'static str, default: &str) -> Result<Url, ConfigError> {
        let raw = self.or(name, default);
        let url = Url::parse(&raw).map_err(|err| ConfigError::Invalid {
            name,
            reason: err.to_string(),
        })?;
        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Invalid {
                name,
                reason: format!("`{raw}` is not an http(s) base URL"),
            });
        }
        Ok(url)
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads and validates every setting up front, so a bad deployment fails
    /// before the listener is bound.
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let vars = Vars { lookup };

        let address = vars
            .or("CHESSCLUB_SITE_ADDR", DEFAULT_ADDR)
            .parse::<SocketAddr>()
            .map_err(|err| ConfigError::Invalid {
                name: "CHESSCLUB_SITE_ADDR",
                reason: err.to_string(),
            })?;
        let event_source = vars.parsed("EVENT_SOURCE", EventSourceKind::Google)?;

        let google = match event_source {
            EventSourceKind::Google => Some(GoogleConfig {
                api_key: vars.required("GOOGLE_CALENDAR_API_KEY")?,
                calendar_id: vars.required("GOOGLE_CALENDAR_ID")?,
                access_token: vars.optional("GOOGLE_CALENDAR_ACCESS_TOKEN"),
                api_url: vars.url("GOOGLE_CALENDAR_API_URL", GOOGLE_CALENDAR_API_URL)?,
            }),
            EventSourceKind::Airtable => None,
        };

        let airtable = AirtableConfig {
            api_key: vars.required("AIRTABLE_API_KEY")?,
            base_id: vars.required("AIRTABLE_BASE_ID")?,
            api_url: vars.url("AIRTABLE_API_URL", AIRTABLE_API_URL)?,
            events_table: vars.or("AIRTABLE_TABLE_NAME", "Events"),
            contacts_table: vars.or("AIRTABLE_CONTACTS_TABLE", "Contact Submissions"),
            newsletter_table: vars.or("AIRTABLE_NEWSLETTER_TABLE", "Newsletter Subscribers"),
            announcements_table: vars.optional("AIRTABLE_ANNOUNCEMENTS_TABLE"),
            cards_table: vars.optional("AIRTABLE_CARDS_TABLE"),
        };

        let fetch_timeout_secs = vars.parsed("FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?;
        if fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "FETCH_TIMEOUT_SECS",
                reason: "must be at least 1".to_string(),
            });
        }

        let log = LogConfig {
            level: vars.parsed("LOG_LEVEL", LevelFilter::Info)?,
            file_path: vars.optional("LOG_FILE_PATH").map(PathBuf::from),
            archive_pattern: vars.optional("LOG_ARCHIVE_PATTERN"),
        };

        Ok(Self {
            address,
            event_source,
            google,
            airtable,
            location: vars.or("CLUB_LOCATION", DEFAULT_LOCATION),
            fetch_timeout: Duration::from_secs(fetch_timeout_secs),
            log,
        })
    }
}
