//! Command-line interface definition.

use std::path::PathBuf;

use calagg_api::EventTime;
use chrono::{DateTime, Utc};
use calagg_core::{TracingConfig, TracingOutputFormat};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config::{CliConfig, CredentialSettings};

/// calagg - calendar aggregation API client
#[derive(Debug, Parser)]
#[command(name = "calagg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, short, env = "CALAGG_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug output on stderr
    #[arg(long, short = 'v', global = true)]
    pub debug: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    pub compact: bool,

    /// Format of log lines on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,

    /// Filter directive for log lines, in `RUST_LOG` syntax
    #[arg(long, env = "CALAGG_LOG", global = true)]
    pub log_filter: Option<String>,

    // --- Credential overrides ---
    /// OAuth client ID (overrides config.toml)
    #[arg(long, env = "CALAGG_CLIENT_ID", global = true)]
    pub client_id: Option<String>,

    /// OAuth client secret (overrides config.toml)
    #[arg(long, env = "CALAGG_CLIENT_SECRET", hide_env_values = true, global = true)]
    pub client_secret: Option<String>,

    /// Access token (overrides config.toml)
    #[arg(long, env = "CALAGG_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Refresh token (overrides config.toml)
    #[arg(long, env = "CALAGG_REFRESH_TOKEN", hide_env_values = true, global = true)]
    pub refresh_token: Option<String>,

    // --- Endpoint overrides ---
    /// API base URL (overrides config.toml)
    #[arg(long, env = "CALAGG_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Authorization server base URL (overrides config.toml)
    #[arg(long, env = "CALAGG_APP_URL", global = true)]
    pub app_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log line format selectable from the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

impl From<LogFormat> for TracingOutputFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Compact => TracingOutputFormat::Compact,
            LogFormat::Pretty => TracingOutputFormat::Pretty,
            LogFormat::Json => TracingOutputFormat::Json,
        }
    }
}

impl Cli {
    /// Subscriber settings for this invocation.
    pub fn tracing_config(&self) -> TracingConfig {
        let config = if self.debug {
            TracingConfig::cli_debug()
        } else {
            TracingConfig::default()
        };
        let config = config.with_format(self.log_format.into());
        match &self.log_filter {
            Some(filter) => config.with_env_filter(filter.clone()),
            None => config,
        }
    }

    /// Config file in use: `--config` or the default location.
    pub fn config_path(&self) -> PathBuf {
        self.config.clone().unwrap_or_else(CliConfig::default_path)
    }

    /// Applies flag and environment overrides on top of the file config.
    pub fn apply_overrides(&self, mut config: CliConfig) -> CliConfig {
        let flags = CredentialSettings {
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
        };
        config.credentials = config.credentials.overlay(flags);
        if self.api_url.is_some() {
            config.api.api_url = self.api_url.clone();
        }
        if self.app_url.is_some() {
            config.api.app_url = self.app_url.clone();
        }
        config
    }
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Authorization: link, code exchange, refresh, revoke
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },

    /// List calendars
    Calendars,

    /// Show account information
    Account,

    /// Read and write events
    Events {
        #[command(subcommand)]
        action: EventsAction,
    },

    /// Manage push notification channels
    Channels {
        #[command(subcommand)]
        action: ChannelsAction,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Authorization actions.
#[derive(Debug, Subcommand)]
pub enum AuthAction {
    /// Print the URL the user visits to authorize this client
    Link {
        /// Where the authorization server sends the user back
        #[arg(long, env = "CALAGG_REDIRECT_URI")]
        redirect_uri: Option<String>,

        /// Scope to request (can be repeated; defaults to the configured scopes)
        #[arg(long = "scope", action = clap::ArgAction::Append)]
        scopes: Vec<String>,

        /// Also open the URL in the default browser
        #[arg(long)]
        open: bool,
    },

    /// Exchange an authorization code for tokens
    Exchange {
        /// Code from the redirect
        #[arg(long)]
        code: String,

        /// Redirect URI used for the authorization link
        #[arg(long, env = "CALAGG_REDIRECT_URI")]
        redirect_uri: Option<String>,

        /// Write the tokens to config.toml
        #[arg(long)]
        save: bool,
    },

    /// Obtain a new access token with the refresh token
    Refresh {
        /// Write the tokens to config.toml
        #[arg(long)]
        save: bool,
    },

    /// Revoke the grant
    Revoke {
        /// Remove the tokens from config.toml
        #[arg(long)]
        save: bool,
    },
}

/// Event actions.
#[derive(Debug, Subcommand)]
pub enum EventsAction {
    /// Read events across calendars
    Read {
        /// Start, as RFC 3339 or YYYY-MM-DD
        #[arg(long, value_parser = parse_event_time)]
        from: Option<EventTime>,

        /// End, as RFC 3339 or YYYY-MM-DD
        #[arg(long, value_parser = parse_event_time)]
        to: Option<EventTime>,

        /// Timezone the service renders times in
        #[arg(long)]
        tzid: Option<String>,

        /// Include deleted events (true/false)
        #[arg(long)]
        include_deleted: Option<bool>,

        /// Include moved events (true/false)
        #[arg(long)]
        include_moved: Option<bool>,

        /// Only events modified since this RFC 3339 instant
        #[arg(long, value_parser = parse_instant)]
        last_modified: Option<DateTime<Utc>>,

        /// Follow next_page links and print every page
        #[arg(long)]
        all: bool,
    },

    /// Fetch a page by the next_page URL of a previous response
    Page {
        url: String,
    },

    /// Create or update an event from JSON
    Upsert {
        /// Calendar to write to
        #[arg(long)]
        calendar: String,

        /// JSON file with the event; reads stdin when omitted or `-`
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete an event
    Delete {
        /// Calendar holding the event
        #[arg(long)]
        calendar: String,

        /// Client-assigned event id
        #[arg(long)]
        event: String,
    },
}

/// Channel actions.
#[derive(Debug, Subcommand)]
pub enum ChannelsAction {
    /// List open channels
    List,

    /// Open a channel posting to CALLBACK_URL
    Create {
        callback_url: String,
    },

    /// Close a channel
    Close {
        channel_id: String,
    },
}

/// Configuration actions.
#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Dump current configuration with secrets masked
    Dump,

    /// Validate configuration
    Validate,

    /// Show configuration file path
    Path,
}

fn parse_event_time(value: &str) -> Result<EventTime, String> {
    EventTime::parse(value)
        .ok_or_else(|| format!("`{value}` is neither RFC 3339 nor YYYY-MM-DD"))
}

fn parse_instant(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("`{value}` is not RFC 3339: {e}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn log_format_selects_tracing_output() {
        let cli = Cli::try_parse_from([
            "calagg",
            "--log-format",
            "json",
            "-v",
            "--log-filter",
            "calagg_api=trace",
            "calendars",
        ])
        .unwrap();
        let config = cli.tracing_config();
        assert_eq!(config.output_format, TracingOutputFormat::Json);
        assert_eq!(config.default_level, tracing::Level::DEBUG);
        assert_eq!(config.env_filter.as_deref(), Some("calagg_api=trace"));

        let cli = Cli::try_parse_from(["calagg", "calendars"]).unwrap();
        assert_eq!(cli.tracing_config().output_format, TracingOutputFormat::Compact);
        assert_eq!(cli.tracing_config().default_level, tracing::Level::WARN);
        assert!(cli.tracing_config().env_filter.is_none());
    }

    #[test]
    fn events_read_parses_times_and_flags() {
        let cli = Cli::try_parse_from([
            "calagg",
            "events",
            "read",
            "--from",
            "2024-03-01T09:00:00+09:00",
            "--to",
            "2024-03-08",
            "--include-deleted",
            "false",
            "--all",
        ])
        .unwrap();

        let Command::Events {
            action:
                EventsAction::Read {
                    from,
                    to,
                    include_deleted,
                    include_moved,
                    all,
                    ..
                },
        } = cli.command
        else {
            panic!("expected events read");
        };
        assert_eq!(from.unwrap().to_iso8601(), "2024-03-01T00:00:00Z");
        assert!(to.unwrap().is_all_day());
        assert_eq!(include_deleted, Some(false));
        assert_eq!(include_moved, None);
        assert!(all);
    }

    #[test]
    fn bad_time_is_rejected() {
        let result = Cli::try_parse_from(["calagg", "events", "read", "--from", "tomorrow"]);
        assert!(result.is_err());
    }

    #[test]
    fn overrides_win_over_file() {
        let cli = Cli::try_parse_from([
            "calagg",
            "--access-token",
            "flag-at",
            "--api-url",
            "http://localhost:1",
            "calendars",
        ])
        .unwrap();

        let mut file = CliConfig::default();
        file.credentials.client_id = Some("file-id".into());
        file.credentials.access_token = Some("file-at".into());

        let merged = cli.apply_overrides(file);
        assert_eq!(merged.credentials.client_id.as_deref(), Some("file-id"));
        assert_eq!(merged.credentials.access_token.as_deref(), Some("flag-at"));
        assert_eq!(merged.api.api_url.as_deref(), Some("http://localhost:1"));
    }

    #[test]
    fn repeated_scopes() {
        let cli = Cli::try_parse_from([
            "calagg",
            "auth",
            "link",
            "--redirect-uri",
            "http://localhost/cb",
            "--scope",
            "read_events",
            "--scope",
            "create_event",
        ])
        .unwrap();
        let Command::Auth {
            action: AuthAction::Link { scopes, open, .. },
        } = cli.command
        else {
            panic!("expected auth link");
        };
        assert_eq!(scopes, vec!["read_events", "create_event"]);
        assert!(!open);
    }
}
