//! CLI configuration.
//!
//! Everything lives in one `config.toml`, by default at
//! `~/.config/calagg/config.toml`:
//!
//! ```toml
//! [credentials]
//! client_id = "env::CALAGG_CLIENT_ID"
//! client_secret = "pass::calagg/client-secret"
//! access_token = "..."
//! refresh_token = "..."
//!
//! [api]
//! api_url = "https://api.calagg.io"
//! app_url = "https://app.calagg.io"
//! timeout = 30
//! redirect_uri = "http://localhost:8080/callback"
//! scopes = ["read_account", "read_events"]
//! ```
//!
//! Credential values support the secret references of [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use calagg_api::{Client, ClientConfig, Credentials};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{CliError, CliResult};
use crate::secret::{self, SecretRef};

// ---------------------------------------------------------------------------
// CliConfig (config.toml)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    pub credentials: CredentialSettings,
    pub api: ApiSettings,
}

/// `[credentials]`. Every field may be a secret reference.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CredentialSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// `[api]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_url: Option<String>,
    /// Request timeout in seconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect_uri: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub scopes: Vec<String>,
}

impl CredentialSettings {
    /// Fields set in `top` win over fields set in `self`.
    pub fn overlay(self, top: CredentialSettings) -> Self {
        Self {
            client_id: top.client_id.or(self.client_id),
            client_secret: top.client_secret.or(self.client_secret),
            access_token: top.access_token.or(self.access_token),
            refresh_token: top.refresh_token.or(self.refresh_token),
        }
    }

    /// Resolves secret references into library credentials.
    ///
    /// `client_id` and `client_secret` are required; tokens are optional.
    pub fn resolve(&self) -> CliResult<Credentials> {
        let client_id = self.client_id.as_deref().ok_or_else(|| {
            CliError::Config(format!(
                "client_id is not set. Add it under [credentials] in {} \
                 or pass --client-id / CALAGG_CLIENT_ID",
                CliConfig::default_path().display()
            ))
        })?;
        let client_secret = self.client_secret.as_deref().ok_or_else(|| {
            CliError::Config(
                "client_secret is not set. Add it under [credentials] \
                 or pass --client-secret / CALAGG_CLIENT_SECRET"
                    .to_string(),
            )
        })?;

        Ok(Credentials {
            client_id: resolve_field("client_id", client_id)?,
            client_secret: resolve_field("client_secret", client_secret)?,
            access_token: self
                .access_token
                .as_deref()
                .map(|v| resolve_field("access_token", v))
                .transpose()?,
            refresh_token: self
                .refresh_token
                .as_deref()
                .map(|v| resolve_field("refresh_token", v))
                .transpose()?,
        })
    }
}

fn resolve_field(name: &str, value: &str) -> CliResult<String> {
    secret::resolve(value).map_err(|e| match e {
        CliError::Secret(msg) => CliError::Secret(format!("{name}: {msg}")),
        other => other,
    })
}

impl CliConfig {
    /// Loads configuration from the default path, or defaults if it does
    /// not exist.
    pub fn load() -> CliResult<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            debug!(path = %path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    pub fn load_from(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?;
        toml::from_str(&content).map_err(|e| {
            CliError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("calagg")
    }

    /// Library configuration from `[api]`, defaults for anything unset.
    pub fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        if let Some(ref url) = self.api.api_url {
            config = config.with_api_url(url);
        }
        if let Some(ref url) = self.api.app_url {
            config = config.with_app_url(url);
        }
        if let Some(secs) = self.api.timeout {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if !self.api.scopes.is_empty() {
            config = config.with_default_scopes(self.api.scopes.clone());
        }
        config
    }

    /// Builds a client from this configuration.
    pub fn build_client(&self) -> CliResult<Client> {
        let credentials = self.credentials.resolve()?;
        Ok(Client::with_config(self.client_config(), credentials)?)
    }

    /// Copy with plain-text tokens and secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| {
            value.as_ref().map(|v| {
                if SecretRef::parse(v).is_reference() {
                    v.clone()
                } else {
                    "<redacted>".to_string()
                }
            })
        };
        let mut copy = self.clone();
        copy.credentials.client_secret = mask(&self.credentials.client_secret);
        copy.credentials.access_token = mask(&self.credentials.access_token);
        copy.credentials.refresh_token = mask(&self.credentials.refresh_token);
        copy
    }
}

// ---------------------------------------------------------------------------
// Token persistence
// ---------------------------------------------------------------------------

/// Writes the token pair of `credentials` into `[credentials]` of the file
/// at `path`, keeping the rest of the document as it is.
///
/// A token that is `None` is removed from the file. Keys that hold a secret
/// reference are left untouched. Returns the keys that were skipped.
pub fn store_tokens(path: &Path, credentials: &Credentials) -> CliResult<Vec<&'static str>> {
    let content = if path.exists() {
        std::fs::read_to_string(path).map_err(|e| CliError::io(path, e))?
    } else {
        String::new()
    };

    let mut doc = content.parse::<toml_edit::DocumentMut>().map_err(|e| {
        CliError::Config(format!("failed to parse {} for writing: {}", path.display(), e))
    })?;

    if !doc.contains_key("credentials") {
        doc["credentials"] = toml_edit::Item::Table(toml_edit::Table::new());
    }
    let table = doc["credentials"].as_table_mut().ok_or_else(|| {
        CliError::Config(format!("[credentials] in {} is not a table", path.display()))
    })?;

    let mut skipped = Vec::new();
    let tokens = [
        ("access_token", credentials.access_token.as_deref()),
        ("refresh_token", credentials.refresh_token.as_deref()),
    ];
    for (key, value) in tokens {
        let current = table.get(key).and_then(|item| item.as_str());
        if current.is_some_and(|v| SecretRef::parse(v).is_reference()) {
            warn!(key, "not overwriting secret reference");
            skipped.push(key);
            continue;
        }
        match value {
            Some(token) => {
                table[key] = toml_edit::value(token);
            }
            None => {
                table.remove(key);
            }
        }
    }

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| CliError::io(parent, e))?;
    }
    std::fs::write(path, doc.to_string()).map_err(|e| CliError::io(path, e))?;
    debug!(path = %path.display(), "tokens saved");

    Ok(skipped)
}
