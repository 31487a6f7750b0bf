//! Club events and their sources, without any I/O.
//!
//! Upstream calendar data (Google Calendar, Airtable) is mapped onto one
//! [`Event`] shape here; fetching it is left to the caller.

pub mod airtable;
pub mod announcement;
mod category;
mod error;
pub mod fallback;
pub mod forms;
pub mod google;
mod structs;
pub mod time;
mod upcoming;

#[cfg(feature = "ics")]
mod ics;

pub use category::{map_category, Category, UnknownCategory};
pub use error::{Error, Result};
#[cfg(feature = "ics")]
pub use self::ics::to_ics;
pub use structs::{
    Announcement, CommunityCard, ContactSubmission, Event, EventPatch, NewEvent,
    NewsletterSubscriber, Status, SubmissionStatus, DEFAULT_LOCATION,
};
pub use upcoming::{in_category, upcoming, within_days};
