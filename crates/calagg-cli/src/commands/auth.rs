//! Authorization commands.

use calagg_api::{Client, TokenInfo};
use serde_json::{Value, json};
use tracing::{info, warn};

use super::{Context, Output};
use crate::config;
use crate::error::{CliError, CliResult};

/// Prints the authorization URL, optionally opening it in a browser.
pub fn link(
    ctx: &Context,
    redirect_uri: Option<String>,
    scopes: &[String],
    open: bool,
) -> CliResult<Output> {
    let client = ctx.client()?;
    let redirect_uri = resolve_redirect_uri(ctx, redirect_uri)?;

    let scopes: Vec<&str> = scopes.iter().map(String::as_str).collect();
    let scope = (!scopes.is_empty()).then_some(scopes.as_slice());
    let url = client.user_auth_link(&redirect_uri, scope);

    if open && let Err(e) = open::that(&url) {
        warn!("failed to open browser: {}", e);
        eprintln!("Could not open a browser; visit the URL below.");
    }

    Ok(Output::Json(json!({ "auth_link": url })))
}

/// Exchanges an authorization code for tokens.
pub async fn exchange(
    ctx: &Context,
    code: &str,
    redirect_uri: Option<String>,
    save: bool,
) -> CliResult<Output> {
    let client = ctx.client()?;
    let redirect_uri = resolve_redirect_uri(ctx, redirect_uri)?;

    let tokens = client.get_token_from_code(code, &redirect_uri).await?;
    info!("authorization code exchanged");

    persist(ctx, &client, save)?;
    token_output(&tokens)
}

/// Refreshes the access token.
pub async fn refresh(ctx: &Context, save: bool) -> CliResult<Output> {
    let client = ctx.client()?;
    let tokens = client.refresh_access_token().await?;
    info!("access token refreshed");

    persist(ctx, &client, save)?;
    token_output(&tokens)
}

/// Revokes the grant.
pub async fn revoke(ctx: &Context, save: bool) -> CliResult<Output> {
    let client = ctx.client()?;
    client.revoke_authorization().await?;
    info!("authorization revoked");

    persist(ctx, &client, save)?;
    Ok(Output::Json(json!({ "revoked": true })))
}

fn resolve_redirect_uri(ctx: &Context, flag: Option<String>) -> CliResult<String> {
    flag.or_else(|| ctx.config.api.redirect_uri.clone())
        .ok_or_else(|| {
            CliError::Config(
                "a redirect URI is required: pass --redirect-uri or set \
                 redirect_uri under [api]"
                    .to_string(),
            )
        })
}

/// Writes the client's current tokens back to the config file.
fn persist(ctx: &Context, client: &Client, save: bool) -> CliResult<()> {
    if !save {
        return Ok(());
    }
    let skipped = config::store_tokens(&ctx.config_path, &client.credentials())?;
    for key in skipped {
        eprintln!(
            "{key} in {} is a secret reference; update it yourself",
            ctx.config_path.display()
        );
    }
    eprintln!("Tokens saved to {}", ctx.config_path.display());
    Ok(())
}

fn token_output(tokens: &TokenInfo) -> CliResult<Output> {
    let value: Value = serde_json::to_value(tokens)
        .map_err(|e| CliError::Input(format!("failed to encode tokens: {e}")))?;
    Ok(Output::Json(value))
}
