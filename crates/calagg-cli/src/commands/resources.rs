//! Calendars, account and channels.

use super::{Context, Output};
use crate::error::CliResult;

pub async fn calendars(ctx: &Context) -> CliResult<Output> {
    Ok(Output::Json(ctx.client()?.list_calendars().await?))
}

pub async fn account(ctx: &Context) -> CliResult<Output> {
    Ok(Output::Json(ctx.client()?.account().await?))
}

pub async fn list_channels(ctx: &Context) -> CliResult<Output> {
    Ok(Output::Json(ctx.client()?.list_channels().await?))
}

pub async fn create_channel(ctx: &Context, callback_url: &str) -> CliResult<Output> {
    Ok(Output::Json(ctx.client()?.create_channel(callback_url).await?))
}

pub async fn close_channel(ctx: &Context, channel_id: &str) -> CliResult<Output> {
    ctx.client()?.close_channel(channel_id).await?;
    Ok(Output::Nothing)
}
