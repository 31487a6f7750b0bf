//! Airtable records for the club base and their mapping onto the model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::forms::{ValidContact, ValidEmail};
use crate::time::{self, REFERENCE_ZONE};
use crate::{
    map_category, Announcement, Category, CommunityCard, ContactSubmission, Event, EventPatch,
    NewEvent, NewsletterSubscriber, Status, SubmissionStatus,
};

/// Formula selecting the events that should appear on the site.
pub const ACTIVE_FORMULA: &str = "{Status} = 'active'";

/// One page of a list request. `offset` is set while more pages remain.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "F: Deserialize<'de>"))]
pub struct RecordList<F> {
    #[serde(default)]
    pub records: Vec<Record<F>>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record<F> {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    pub fields: F,
}

/// Body of a create request.
#[derive(Debug, Clone, Serialize)]
pub struct CreateRecords<F> {
    pub records: Vec<NewRecord<F>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewRecord<F> {
    pub fields: F,
}

/// Body of a patch request.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateRecords<F> {
    pub records: Vec<Record<F>>,
}

impl<F> CreateRecords<F> {
    pub fn single(fields: F) -> Self {
        Self {
            records: vec![NewRecord { fields }],
        }
    }
}

impl<F> UpdateRecords<F> {
    pub fn single(id: String, fields: F) -> Self {
        Self {
            records: vec![Record {
                id,
                created_time: None,
                fields,
            }],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EventFields {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|value| !value.is_empty())
}

/// Accepts plain dates as well as the ISO timestamps a date-time column yields.
fn parse_record_date(raw: &str) -> Option<NaiveDate> {
    if raw.contains('T') {
        let instant = DateTime::parse_from_rfc3339(raw).ok()?;
        return Some(instant.with_timezone(&REFERENCE_ZONE).date_naive());
    }
    Some(time::local_date_from_iso_date(raw).ok()?.date_naive())
}

fn parse_status(raw: &Option<String>) -> Status {
    match non_empty(raw) {
        Some(status) if status.eq_ignore_ascii_case("active") => Status::Active,
        _ => Status::Inactive,
    }
}

impl Record<EventFields> {
    /// `None` when the record lacks a title or a readable date.
    pub fn to_event(&self, default_location: &str) -> Option<Event> {
        if self.id.is_empty() {
            return None;
        }
        let fields = &self.fields;
        let title = non_empty(&fields.title)?;
        let date = parse_record_date(non_empty(&fields.date)?)?;

        let time = match non_empty(&fields.time) {
            Some(raw) => time::parse_time_of_day(raw).ok()?,
            None => time::default_start(),
        };

        let category = non_empty(&fields.category)
            .and_then(|raw| raw.parse::<Category>().ok())
            .unwrap_or_else(|| {
                map_category(non_empty(&fields.category).or(non_empty(&fields.description)))
            });

        Some(Event {
            id: self.id.clone(),
            title: title.to_string(),
            date,
            time,
            category,
            description: fields.description.clone().unwrap_or_default(),
            location: non_empty(&fields.location)
                .unwrap_or(default_location)
                .to_string(),
        })
    }
}

impl EventFields {
    pub fn from_new_event(event: &NewEvent) -> Self {
        Self {
            title: Some(event.title.clone()),
            date: Some(event.date.format("%Y-%m-%d").to_string()),
            time: Some(event.time.format("%H:%M").to_string()),
            category: Some(event.category.as_str().to_string()),
            description: Some(event.description.clone()),
            location: Some(event.location.clone()),
            status: Some("active".to_string()),
        }
    }

    pub fn from_patch(patch: &EventPatch) -> Self {
        Self {
            title: patch.title.clone(),
            date: patch.date.map(|date| date.format("%Y-%m-%d").to_string()),
            time: patch.time.map(|time| time.format("%H:%M").to_string()),
            category: patch.category.map(|category| category.as_str().to_string()),
            description: patch.description.clone(),
            location: patch.location.clone(),
            status: None,
        }
    }
}

/// Converts a page of event records, dropping the ones that do not map.
pub fn convert_events(records: &[Record<EventFields>], default_location: &str) -> Vec<Event> {
    records
        .iter()
        .filter_map(|record| record.to_event(default_location))
        .collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AnnouncementFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub link_url: Option<String>,
    pub link_text: Option<String>,
    pub status: Option<String>,
    pub priority: Option<f64>,
    pub icon: Option<String>,
}

impl Record<AnnouncementFields> {
    pub fn to_announcement(&self) -> Option<Announcement> {
        let fields = &self.fields;
        Some(Announcement {
            id: self.id.clone(),
            title: non_empty(&fields.title)?.to_string(),
            description: fields.description.clone().unwrap_or_default(),
            link_url: non_empty(&fields.link_url).map(str::to_string),
            link_text: non_empty(&fields.link_text).map(str::to_string),
            status: parse_status(&fields.status),
            priority: fields.priority.map_or(0, |priority| priority as i64),
            icon: non_empty(&fields.icon).map(str::to_string),
        })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CardFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub icon: Option<String>,
    pub order: Option<f64>,
    pub status: Option<String>,
}

impl Record<CardFields> {
    pub fn to_card(&self) -> Option<CommunityCard> {
        let fields = &self.fields;
        Some(CommunityCard {
            id: self.id.clone(),
            title: non_empty(&fields.title)?.to_string(),
            description: fields.description.clone().unwrap_or_default(),
            icon: fields.icon.clone().unwrap_or_default(),
            order: fields.order.map_or(0, |order| order as i64),
            status: parse_status(&fields.status),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactFields {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Status")]
    pub status: SubmissionStatus,
    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "Submitted At")]
    pub submitted_at: DateTime<Utc>,
}

impl ContactFields {
    pub fn new(contact: &ValidContact, source: Option<&str>, submitted_at: DateTime<Utc>) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            message: contact.message.clone(),
            status: SubmissionStatus::New,
            source: source.map(str::to_string),
            submitted_at,
        }
    }
}

impl From<Record<ContactFields>> for ContactSubmission {
    fn from(record: Record<ContactFields>) -> Self {
        let fields = record.fields;
        Self {
            id: record.id,
            name: fields.name,
            email: fields.email,
            message: fields.message,
            submitted_at: fields.submitted_at,
            status: fields.status,
            source: fields.source,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriberFields {
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Status")]
    pub status: Status,
    #[serde(rename = "Source", skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(rename = "Subscribed At")]
    pub subscribed_at: DateTime<Utc>,
}

impl SubscriberFields {
    pub fn new(email: &ValidEmail, source: Option<&str>, subscribed_at: DateTime<Utc>) -> Self {
        Self {
            email: email.0.clone(),
            status: Status::Active,
            source: source.map(str::to_string),
            subscribed_at,
        }
    }
}

impl From<Record<SubscriberFields>> for NewsletterSubscriber {
    fn from(record: Record<SubscriberFields>) -> Self {
        let fields = record.fields;
        Self {
            id: record.id,
            email: fields.email,
            subscribed_at: fields.subscribed_at,
            status: fields.status,
            source: fields.source,
        }
    }
}
