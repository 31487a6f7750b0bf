use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::time;
use crate::Category;

pub const DEFAULT_LOCATION: &str = "70 Main St, 3rd Floor, Nyack, NY";

pub(crate) fn serialize_naive_time<S: Serializer>(
    time: &NaiveTime,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    let formatted_time = format!("{:02}:{:02}", time.hour(), time.minute());
    serializer.serialize_str(&formatted_time)
}

pub(crate) fn deserialize_naive_time<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    time::parse_time_of_day(&raw).map_err(serde::de::Error::custom)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(
        serialize_with = "serialize_naive_time",
        deserialize_with = "deserialize_naive_time"
    )]
    pub time: NaiveTime,
    pub category: Category,
    pub description: String,
    pub location: String,
}

impl Event {
    /// Start of the event in the reference zone.
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Tz>> {
        time::in_reference_zone(self.date, self.time)
    }

    #[must_use]
    pub fn display_date(&self) -> String {
        self.date.format("%B %-d, %Y").to_string()
    }

    #[must_use]
    pub fn display_time(&self) -> String {
        time::format_time_of_day(self.time)
    }
}

/// An event that has not been stored anywhere yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub date: NaiveDate,
    #[serde(
        serialize_with = "serialize_naive_time",
        deserialize_with = "deserialize_naive_time"
    )]
    pub time: NaiveTime,
    pub category: Category,
    pub description: String,
    pub location: String,
}

impl NewEvent {
    #[must_use]
    pub fn starts_at(&self) -> Option<DateTime<Tz>> {
        time::in_reference_zone(self.date, self.time)
    }

    #[must_use]
    pub fn with_id(self, id: String) -> Event {
        Event {
            id,
            title: self.title,
            date: self.date,
            time: self.time,
            category: self.category,
            description: self.description,
            location: self.location,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventPatch {
    pub title: Option<String>,
    pub date: Option<NaiveDate>,
    pub time: Option<NaiveTime>,
    pub category: Option<Category>,
    pub description: Option<String>,
    pub location: Option<String>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Applies the set fields on top of an existing event.
    pub fn apply(&self, event: &mut Event) {
        if let Some(title) = &self.title {
            event.title.clone_from(title);
        }
        if let Some(date) = self.date {
            event.date = date;
        }
        if let Some(time) = self.time {
            event.time = time;
        }
        if let Some(category) = self.category {
            event.category = category;
        }
        if let Some(description) = &self.description {
            event.description.clone_from(description);
        }
        if let Some(location) = &self.location {
            event.location.clone_from(location);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    #[default]
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_text: Option<String>,
    pub status: Status,
    pub priority: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityCard {
    pub id: String,
    pub title: String,
    pub description: String,
    pub icon: String,
    pub order: i64,
    pub status: Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    #[default]
    New,
    Reviewed,
    Responded,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: String,
    pub name: String,
    pub email: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
    pub status: SubmissionStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: String,
    pub email: String,
    pub subscribed_at: DateTime<Utc>,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}
