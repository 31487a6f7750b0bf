use chrono::{Days, NaiveDate};

use crate::{Category, Event};

/// Drops events before `today` and orders the rest by date.
///
/// Only the calendar date is compared, so an event that already started
/// earlier today is still listed. The sort is stable: events sharing a date
/// keep the order the source returned them in.
pub fn upcoming(events: Vec<Event>, today: NaiveDate) -> Vec<Event> {
    let mut events = events
        .into_iter()
        .filter(|event| event.date >= today)
        .collect::<Vec<_>>();
    events.sort_by_key(|event| event.date);
    events
}

/// Keeps events no later than `days` after `today`.
pub fn within_days(events: Vec<Event>, today: NaiveDate, days: u32) -> Vec<Event> {
    let Some(last) = today.checked_add_days(Days::new(u64::from(days))) else {
        return events;
    };
    events.into_iter().filter(|event| event.date <= last).collect()
}

pub fn in_category(events: Vec<Event>, category: Category) -> Vec<Event> {
    events
        .into_iter()
        .filter(|event| event.category == category)
        .collect()
}
