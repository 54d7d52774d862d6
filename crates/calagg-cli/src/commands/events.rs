//! Event commands.

use std::collections::HashSet;
use std::path::Path;

use calagg_api::{Event, EventTime, ReadEventsParams, next_page_url};
use chrono::{DateTime, Utc};
use serde_json::{Value, json};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};

use super::{Context, Output};
use crate::error::{CliError, CliResult};

/// Builds the query from command-line values; `None` keeps the default.
pub fn read_params(
    from: Option<EventTime>,
    to: Option<EventTime>,
    tzid: Option<String>,
    include_deleted: Option<bool>,
    include_moved: Option<bool>,
    last_modified: Option<DateTime<Utc>>,
) -> ReadEventsParams {
    let mut params = ReadEventsParams::new();
    params.from = from;
    params.to = to;
    if let Some(tzid) = tzid {
        params.tzid = tzid;
    }
    params.include_deleted = include_deleted;
    params.include_moved = include_moved;
    params.last_modified = last_modified;
    params
}

/// Reads events. With `all`, follows `next_page` links and returns the
/// events of every page in one array. A link to a page already fetched ends
/// the walk.
pub async fn read(ctx: &Context, params: &ReadEventsParams, all: bool) -> CliResult<Output> {
    let client = ctx.client()?;
    let first = client.read_events(params).await?;
    if !all {
        return Ok(Output::Json(first));
    }

    let mut pages = 1usize;
    let mut events = Vec::new();
    let mut seen = HashSet::new();
    let mut page = first;
    loop {
        append_events(&mut events, &page);
        let Some(next) = next_page_url(&page).map(str::to_string) else {
            break;
        };
        if !seen.insert(next.clone()) {
            warn!(url = %next, "next_page points to a page already read, stopping");
            break;
        }
        debug!(page = pages + 1, "following next_page");
        page = client.get_events_page(&next).await?;
        pages += 1;
    }

    info!(pages, events = events.len(), "read all pages");
    Ok(Output::Json(json!({ "events": events })))
}

pub async fn page(ctx: &Context, url: &str) -> CliResult<Output> {
    Ok(Output::Json(ctx.client()?.get_events_page(url).await?))
}

/// Creates or updates an event read as JSON from `file` or stdin.
pub async fn upsert(ctx: &Context, calendar_id: &str, file: Option<&Path>) -> CliResult<Output> {
    let raw = match file {
        Some(path) if path != Path::new("-") => {
            tokio::fs::read_to_string(path)
                .await
                .map_err(|e| CliError::io(path, e))?
        }
        _ => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .map_err(|e| CliError::io("<stdin>", e))?;
            buf
        }
    };
    let event = parse_event(&raw)?;

    ctx.client()?.create_or_update_event(calendar_id, &event).await?;
    info!(event_id = %event.event_id, "event written");
    Ok(Output::Nothing)
}

pub async fn delete(ctx: &Context, calendar_id: &str, event_id: &str) -> CliResult<Output> {
    ctx.client()?.delete_event(calendar_id, event_id).await?;
    Ok(Output::Nothing)
}

fn parse_event(raw: &str) -> CliResult<Event> {
    serde_json::from_str(raw).map_err(|e| CliError::Input(format!("invalid event JSON: {e}")))
}

fn append_events(into: &mut Vec<Value>, page: &Value) {
    if let Some(events) = page.get("events").and_then(Value::as_array) {
        into.extend(events.iter().cloned());
    }
}
