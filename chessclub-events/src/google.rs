//! Google Calendar v3 event resources and their mapping onto [`Event`].

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveTime};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::time::{self, REFERENCE_ZONE};
use crate::{map_category, Category, Event, EventPatch, NewEvent};

const CATEGORY_KEY: &str = "category";

/// Length given to events created from this side.
pub const DEFAULT_DURATION_HOURS: i64 = 2;

/// Response of `events.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList {
    #[serde(default)]
    pub items: Vec<GoogleEvent>,
    pub next_page_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GoogleEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<EventDateTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extended_properties: Option<ExtendedProperties>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_zone: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub private: Option<BTreeMap<String, String>>,
}

impl EventDateTime {
    fn at(instant: DateTime<Tz>) -> Self {
        Self {
            date_time: Some(instant.to_rfc3339()),
            date: None,
            time_zone: Some(REFERENCE_ZONE.name().to_string()),
        }
    }
}

impl ExtendedProperties {
    fn with_category(category: Category) -> Self {
        Self {
            private: Some(BTreeMap::from([(
                CATEGORY_KEY.to_string(),
                category.as_str().to_string(),
            )])),
        }
    }

    fn category(&self) -> Option<&str> {
        self.private.as_ref()?.get(CATEGORY_KEY).map(String::as_str)
    }
}

impl GoogleEvent {
    /// Maps the resource onto an [`Event`].
    ///
    /// Resources without an id, a summary or a readable start are skipped by
    /// returning `None`.
    pub fn to_event(&self, default_location: &str) -> Option<Event> {
        let id = self.id.as_deref().filter(|id| !id.is_empty())?;
        let title = self.summary.as_deref().filter(|title| !title.is_empty())?;
        let start = self.start.as_ref()?;

        let (date, time) = if let Some(date_time) = &start.date_time {
            let instant = DateTime::parse_from_rfc3339(date_time).ok()?;
            let local = instant.with_timezone(&REFERENCE_ZONE);
            (
                local.date_naive(),
                time::time_of_day_in_reference_zone(&instant),
            )
        } else if let Some(date) = &start.date {
            let noon = time::local_date_from_iso_date(date).ok()?;
            (noon.date_naive(), time::default_start())
        } else {
            return None;
        };

        let category_text = self
            .extended_properties
            .as_ref()
            .and_then(ExtendedProperties::category)
            .or(self.description.as_deref());

        Some(Event {
            id: id.to_string(),
            title: title.to_string(),
            date,
            time,
            category: map_category(category_text),
            description: self.description.clone().unwrap_or_default(),
            location: self
                .location
                .clone()
                .filter(|location| !location.is_empty())
                .unwrap_or_else(|| default_location.to_string()),
        })
    }

    /// Body for `events.insert`.
    pub fn from_new_event(event: &NewEvent) -> Option<Self> {
        let start = event.starts_at()?;
        let end = start + Duration::try_hours(DEFAULT_DURATION_HOURS)?;

        Some(Self {
            id: None,
            summary: Some(event.title.clone()),
            description: Some(event.description.clone()),
            location: Some(event.location.clone()),
            start: Some(EventDateTime::at(start)),
            end: Some(EventDateTime::at(end)),
            extended_properties: Some(ExtendedProperties::with_category(event.category)),
        })
    }

    /// Body for `events.patch`, holding only what the patch changes.
    ///
    /// `current` is needed because a new date keeps the old time of day and
    /// the other way around.
    pub fn from_patch(patch: &EventPatch, current: &Event) -> Option<Self> {
        let mut body = Self {
            summary: patch.title.clone(),
            description: patch.description.clone(),
            location: patch.location.clone(),
            extended_properties: patch.category.map(ExtendedProperties::with_category),
            ..Self::default()
        };

        if patch.date.is_some() || patch.time.is_some() {
            let date = patch.date.unwrap_or(current.date);
            let time: NaiveTime = patch.time.unwrap_or(current.time);
            let start = time::in_reference_zone(date, time)?;
            body.start = Some(EventDateTime::at(start));
            body.end = Some(EventDateTime::at(
                start + Duration::try_hours(DEFAULT_DURATION_HOURS)?,
            ));
        }

        Some(body)
    }
}

/// Converts a listing, silently dropping resources that do not map.
pub fn convert_events(list: &EventList, default_location: &str) -> Vec<Event> {
    list.items
        .iter()
        .filter_map(|event| event.to_event(default_location))
        .collect()
}
