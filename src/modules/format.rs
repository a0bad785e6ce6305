use chrono::{DateTime, Local, TimeZone};
use serde::Serialize;

use crate::modules::query::BlockEvent;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders seconds since the epoch in the local timezone.
pub fn format_timestamp(secs: i64) -> String {
    format_timestamp_in(secs, &Local)
}

pub fn format_timestamp_in<Tz>(secs: i64, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    match DateTime::from_timestamp(secs, 0) {
        Some(utc) => utc.with_timezone(tz).format(TIMESTAMP_FORMAT).to_string(),
        None => format!("@{}", secs),
    }
}

pub fn describe_event(event: &BlockEvent) -> String {
    describe_event_at(event, &format_timestamp(event.time))
}

fn describe_event_at(event: &BlockEvent, timestamp: &str) -> String {
    format!(
        "{} | #{} ({}) | ({}, {}, {}) | {}",
        timestamp,
        event.user_id,
        event.user_name,
        event.x,
        event.y,
        event.z,
        event.kind()
    )
}

/// JSON view of an event for `--json` output.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventView<'a> {
    #[serde(flatten)]
    pub event: &'a BlockEvent,
    pub timestamp: String,
    pub label: &'static str,
}

impl<'a> From<&'a BlockEvent> for EventView<'a> {
    fn from(event: &'a BlockEvent) -> Self {
        Self {
            event,
            timestamp: format_timestamp(event.time),
            label: event.kind().label(),
        }
    }
}
