//! Request shapes for the event endpoints.

use calagg_core::EventTime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Timezone sent with `read_events` unless the caller picks another.
pub const DEFAULT_TZID: &str = "Etc/UTC";

/// An event to create or update.
///
/// `start` and `end` always go out as UTC ISO-8601 (or plain dates for
/// all-day events). Fields the service accepts that have no typed slot here
/// go in `extra` and are sent as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub event_id: String,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Event {
    pub fn new(
        event_id: impl Into<String>,
        summary: impl Into<String>,
        start: impl Into<EventTime>,
        end: impl Into<EventTime>,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            summary: summary.into(),
            description: None,
            start: start.into(),
            end: end.into(),
            location: None,
            extra: Map::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_location(mut self, description: impl Into<String>) -> Self {
        self.location = Some(Location {
            description: description.into(),
        });
        self
    }

    /// Adds a field passed through verbatim.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub description: String,
}

/// Query for `GET /v1/events`.
///
/// `None` fields are left out of the query. The boolean flags are tri-state
/// on purpose: `Some(false)` is sent as `"false"`, `None` is not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadEventsParams {
    pub from: Option<EventTime>,
    pub to: Option<EventTime>,
    pub tzid: String,
    pub include_deleted: Option<bool>,
    pub include_moved: Option<bool>,
    pub last_modified: Option<DateTime<Utc>>,
}

impl Default for ReadEventsParams {
    fn default() -> Self {
        Self {
            from: None,
            to: None,
            tzid: DEFAULT_TZID.to_string(),
            include_deleted: None,
            include_moved: None,
            last_modified: None,
        }
    }
}

impl ReadEventsParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_from(mut self, from: impl Into<EventTime>) -> Self {
        self.from = Some(from.into());
        self
    }

    pub fn with_to(mut self, to: impl Into<EventTime>) -> Self {
        self.to = Some(to.into());
        self
    }

    pub fn with_tzid(mut self, tzid: impl Into<String>) -> Self {
        self.tzid = tzid.into();
        self
    }

    pub fn with_include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = Some(include);
        self
    }

    pub fn with_include_moved(mut self, include: bool) -> Self {
        self.include_moved = Some(include);
        self
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Query pairs in wire order, unset entries dropped.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let pairs = [
            ("from", self.from.map(|t| t.to_iso8601())),
            ("to", self.to.map(|t| t.to_iso8601())),
            ("tzid", Some(self.tzid.clone())),
            ("include_deleted", self.include_deleted.map(|b| b.to_string())),
            ("include_moved", self.include_moved.map(|b| b.to_string())),
            (
                "last_modified",
                self.last_modified
                    .map(|t| calagg_core::to_utc_iso8601(&t)),
            ),
        ];
        pairs
            .into_iter()
            .filter_map(|(key, value)| value.map(|v| (key, v)))
            .collect()
    }

    /// Form-encoded query string, without the leading `?`.
    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.query_pairs())
            .finish()
    }
}

/// Returns the `pages.next_page` URL of a paged response, if any.
///
/// Pass it to [`crate::Client::get_events_page`] to fetch the next page.
pub fn next_page_url(page: &Value) -> Option<&str> {
    page.pointer("/pages/next_page").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, NaiveDate, TimeZone};
    use serde_json::json;

    #[test]
    fn defaults_send_only_tzid() {
        let params = ReadEventsParams::new();
        assert_eq!(params.query_pairs(), vec![("tzid", "Etc/UTC".to_string())]);
        assert_eq!(params.to_query_string(), "tzid=Etc%2FUTC");
    }

    #[test]
    fn explicit_false_is_sent() {
        let params = ReadEventsParams::new()
            .with_include_deleted(false)
            .with_include_moved(true);
        let pairs = params.query_pairs();
        assert!(pairs.contains(&("include_deleted", "false".to_string())));
        assert!(pairs.contains(&("include_moved", "true".to_string())));
    }

    #[test]
    fn times_are_utc_iso8601() {
        let tz = FixedOffset::east_opt(3600).unwrap();
        let params = ReadEventsParams::new()
            .with_from(tz.with_ymd_and_hms(2024, 3, 1, 1, 0, 0).unwrap())
            .with_to(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
            .with_last_modified(Utc.with_ymd_and_hms(2024, 2, 28, 12, 0, 0).unwrap())
            .with_tzid("Europe/Paris");

        assert_eq!(
            params.query_pairs(),
            vec![
                ("from", "2024-03-01T00:00:00Z".to_string()),
                ("to", "2024-03-08".to_string()),
                ("tzid", "Europe/Paris".to_string()),
                ("last_modified", "2024-02-28T12:00:00Z".to_string()),
            ]
        );
    }

    #[test]
    fn event_serializes_times_and_passes_extras() {
        let tz = FixedOffset::west_opt(4 * 3600).unwrap();
        let event = Event::new(
            "evt-1",
            "Planning",
            tz.with_ymd_and_hms(2024, 3, 15, 10, 0, 0).unwrap(),
            tz.with_ymd_and_hms(2024, 3, 15, 11, 0, 0).unwrap(),
        )
        .with_description("Quarterly")
        .with_location("Room 4")
        .with_field("transparency", "opaque")
        .with_field("reminders", json!([{ "minutes": 10 }]));

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(
            value,
            json!({
                "event_id": "evt-1",
                "summary": "Planning",
                "description": "Quarterly",
                "start": "2024-03-15T14:00:00Z",
                "end": "2024-03-15T15:00:00Z",
                "location": { "description": "Room 4" },
                "transparency": "opaque",
                "reminders": [{ "minutes": 10 }],
            })
        );
    }

    #[test]
    fn event_without_optionals() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let value = serde_json::to_value(Event::new("e", "Off", day, day.succ_opt().unwrap()))
            .unwrap();
        assert_eq!(
            value,
            json!({ "event_id": "e", "summary": "Off", "start": "2024-03-15", "end": "2024-03-16" })
        );
    }

    #[test]
    fn next_page_extraction() {
        let page = json!({
            "pages": {
                "current": 1,
                "total": 2,
                "next_page": "https://api.calagg.io/v1/events/pages/abc"
            },
            "events": []
        });
        assert_eq!(
            next_page_url(&page),
            Some("https://api.calagg.io/v1/events/pages/abc")
        );
        assert_eq!(next_page_url(&json!({ "pages": { "current": 2 } })), None);
    }
}
