//! Configuration commands.

use serde_json::json;

use super::{Context, Output};
use crate::error::{CliError, CliResult};

/// Dumps the effective configuration as TOML, secrets masked.
pub fn dump(ctx: &Context) -> CliResult<Output> {
    let toml_str = toml::to_string_pretty(&ctx.config.redacted())
        .map_err(|e| CliError::Config(format!("failed to serialize config: {}", e)))?;
    Ok(Output::Text(format!(
        "# config.toml ({})\n{}",
        ctx.config_path.display(),
        toml_str
    )))
}

/// Checks that endpoints parse and credentials resolve.
pub fn validate(ctx: &Context) -> CliResult<Output> {
    ctx.config.client_config().validate()?;
    let credentials = ctx.config.credentials.resolve()?;

    Ok(Output::Json(json!({
        "valid": true,
        "api_url": ctx.config.client_config().api_url(),
        "has_access_token": credentials.access_token.is_some(),
        "has_refresh_token": credentials.refresh_token.is_some(),
    })))
}

pub fn path(ctx: &Context) -> Output {
    Output::Text(ctx.config_path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CliConfig, CredentialSettings};
    use std::path::PathBuf;

    fn ctx(config: CliConfig) -> Context {
        Context {
            config,
            config_path: PathBuf::from("/tmp/calagg/config.toml"),
        }
    }

    fn with_identity() -> CliConfig {
        CliConfig {
            credentials: CredentialSettings {
                client_id: Some("id".into()),
                client_secret: Some("secret".into()),
                refresh_token: Some("rt".into()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn dump_masks_secrets() {
        let Output::Text(text) = dump(&ctx(with_identity())).unwrap() else {
            panic!("expected text");
        };
        assert!(text.starts_with("# config.toml (/tmp/calagg/config.toml)"));
        assert!(text.contains("client_id = \"id\""));
        assert!(!text.contains("\"secret\""));
        assert!(!text.contains("\"rt\""));
    }

    #[test]
    fn validate_reports_tokens() {
        let Output::Json(value) = validate(&ctx(with_identity())).unwrap() else {
            panic!("expected json");
        };
        assert_eq!(value["valid"], true);
        assert_eq!(value["has_access_token"], false);
        assert_eq!(value["has_refresh_token"], true);
    }

    #[test]
    fn validate_rejects_bad_url() {
        let mut config = with_identity();
        config.api.api_url = Some("ftp://files.example".into());
        let err = validate(&ctx(config)).unwrap_err();
        assert!(matches!(err, CliError::Api(_)));
    }

    #[test]
    fn validate_requires_identity() {
        let err = validate(&ctx(CliConfig::default())).unwrap_err();
        assert!(matches!(err, CliError::Config(_)));
    }

    #[test]
    fn path_is_text() {
        assert_eq!(
            path(&ctx(CliConfig::default())),
            Output::Text("/tmp/calagg/config.toml".into())
        );
    }
}
