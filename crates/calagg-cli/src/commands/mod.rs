//! Command implementations.
//!
//! Commands return an [`Output`] instead of printing, so `main` owns stdout
//! and tests can inspect results directly.

pub mod auth;
pub mod config;
pub mod events;
pub mod resources;

use std::path::PathBuf;

use calagg_api::Client;
use serde_json::Value;

use crate::cli::{AuthAction, ChannelsAction, Cli, Command, ConfigAction, EventsAction};
use crate::config::CliConfig;
use crate::error::{CliError, CliResult};

/// What a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum Output {
    Json(Value),
    Text(String),
    Nothing,
}

impl Output {
    /// Renders for stdout; `None` prints nothing.
    pub fn render(&self, compact: bool) -> CliResult<Option<String>> {
        match self {
            Self::Json(value) => {
                let rendered = if compact {
                    serde_json::to_string(value)
                } else {
                    serde_json::to_string_pretty(value)
                };
                rendered
                    .map(Some)
                    .map_err(|e| CliError::Input(format!("failed to encode output: {e}")))
            }
            Self::Text(text) => Ok(Some(text.clone())),
            Self::Nothing => Ok(None),
        }
    }
}

/// Loaded configuration plus where it came from.
#[derive(Debug, Clone)]
pub struct Context {
    pub config: CliConfig,
    pub config_path: PathBuf,
}

impl Context {
    pub fn client(&self) -> CliResult<Client> {
        self.config.build_client()
    }
}

/// Loads configuration for `cli` and runs its command.
pub async fn run(cli: Cli) -> CliResult<Output> {
    let config_path = cli.config_path();
    let file_config = if cli.config.is_some() {
        CliConfig::load_from(&config_path)?
    } else {
        CliConfig::load()?
    };
    let ctx = Context {
        config: cli.apply_overrides(file_config),
        config_path,
    };

    match cli.command {
        Command::Auth { action } => match action {
            AuthAction::Link {
                redirect_uri,
                scopes,
                open,
            } => auth::link(&ctx, redirect_uri, &scopes, open),
            AuthAction::Exchange {
                code,
                redirect_uri,
                save,
            } => auth::exchange(&ctx, &code, redirect_uri, save).await,
            AuthAction::Refresh { save } => auth::refresh(&ctx, save).await,
            AuthAction::Revoke { save } => auth::revoke(&ctx, save).await,
        },
        Command::Calendars => resources::calendars(&ctx).await,
        Command::Account => resources::account(&ctx).await,
        Command::Events { action } => match action {
            EventsAction::Read {
                from,
                to,
                tzid,
                include_deleted,
                include_moved,
                last_modified,
                all,
            } => {
                let params = events::read_params(
                    from,
                    to,
                    tzid,
                    include_deleted,
                    include_moved,
                    last_modified,
                );
                events::read(&ctx, &params, all).await
            }
            EventsAction::Page { url } => events::page(&ctx, &url).await,
            EventsAction::Upsert { calendar, file } => {
                events::upsert(&ctx, &calendar, file.as_deref()).await
            }
            EventsAction::Delete { calendar, event } => {
                events::delete(&ctx, &calendar, &event).await
            }
        },
        Command::Channels { action } => match action {
            ChannelsAction::List => resources::list_channels(&ctx).await,
            ChannelsAction::Create { callback_url } => {
                resources::create_channel(&ctx, &callback_url).await
            }
            ChannelsAction::Close { channel_id } => {
                resources::close_channel(&ctx, &channel_id).await
            }
        },
        Command::Config { action } => match action {
            ConfigAction::Dump => config::dump(&ctx),
            ConfigAction::Validate => config::validate(&ctx),
            ConfigAction::Path => Ok(config::path(&ctx)),
        },
    }
}
