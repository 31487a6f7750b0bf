//! The read path behind the public pages: every upstream read is bounded by a
//! timeout and falls back to static content instead of failing the page.

use std::{future::Future, time::Duration};

use chessclub_events::{
    announcement::{active_announcements, active_cards},
    fallback, time, upcoming, Announcement, CommunityCard, Event,
};
use chrono::{DateTime, Utc};
use log::{error, warn};
use serde::Serialize;

use crate::sources::{EventSource, SourceError, SourceResult};
use crate::state::AppState;

/// Events shown on the home page.
pub const HOME_EVENT_COUNT: usize = 3;

#[derive(Debug, Clone, Serialize)]
pub struct HomeData {
    pub events: Vec<Event>,
    pub announcements: Vec<Announcement>,
    pub cards: Vec<CommunityCard>,
}

/// Awaits `fetch` for at most `timeout`, substituting `fallback()` on any
/// failure. No retries.
pub async fn with_fallback<T, F, D>(what: &str, timeout: Duration, fetch: F, fallback: D) -> T
where
    F: Future<Output = SourceResult<T>>,
    D: FnOnce() -> T,
{
    let result = match tokio::time::timeout(timeout, fetch).await {
        Ok(result) => result,
        Err(_) => Err(SourceError::Timeout(timeout)),
    };

    match result {
        Ok(value) => value,
        Err(err) => {
            error!("Failed to fetch {what}: {err}");
            warn!("Serving fallback {what}");
            fallback()
        }
    }
}

/// Upcoming events from `source`, ordered by date. Never fails: when the
/// source errors or times out the weekly club night is served instead.
pub async fn fetch_upcoming_events(
    source: &dyn EventSource,
    now: DateTime<Utc>,
    location: &str,
    timeout: Duration,
) -> Vec<Event> {
    let today = time::today(now);
    let what = format!("events from {}", source.name());

    let events = with_fallback(&what, timeout, source.list_events(today), || {
        fallback::fallback_events(today, location)
    })
    .await;

    upcoming(events, today)
}

/// Fetches events, announcements and cards concurrently. Each has its own
/// timeout and fallback, so one bad source never blanks the others.
pub async fn fetch_home(state: &AppState, now: DateTime<Utc>) -> HomeData {
    let (mut events, announcements, cards) = tokio::join!(
        fetch_upcoming_events(state.events.as_ref(), now, &state.location, state.fetch_timeout),
        with_fallback(
            "announcements",
            state.fetch_timeout,
            state.content.announcements(),
            fallback::fallback_announcements,
        ),
        with_fallback(
            "community cards",
            state.fetch_timeout,
            state.content.community_cards(),
            fallback::fallback_community_cards,
        ),
    );

    events.truncate(HOME_EVENT_COUNT);

    HomeData {
        events,
        announcements: active_announcements(announcements),
        cards: active_cards(cards),
    }
}

#[cfg(test)]
mod tests {
    use chessclub_events::{Category, Status, DEFAULT_LOCATION};
    use chrono::{Days, NaiveDate, NaiveTime, TimeZone};

    use super::*;
    use crate::sources::testing::{Answer, Stub};

    const TIMEOUT: Duration = Duration::from_millis(200);

    fn now() -> DateTime<Utc> {
        // 2030-01-01 is a Tuesday; 17:00 UTC is noon in New York.
        Utc.with_ymd_and_hms(2030, 1, 1, 17, 0, 0).unwrap()
    }

    fn event(id: &str, date: NaiveDate) -> Event {
        Event {
            id: id.to_string(),
            title: format!("Event {id}"),
            date,
            time: NaiveTime::from_hms_opt(19, 0, 0).unwrap(),
            category: Category::Casual,
            description: String::new(),
            location: DEFAULT_LOCATION.to_string(),
        }
    }

    fn announcement(id: &str, status: Status, priority: i64) -> Announcement {
        Announcement {
            id: id.to_string(),
            title: id.to_string(),
            description: String::new(),
            link_url: None,
            link_text: None,
            status,
            priority,
            icon: None,
        }
    }

    #[tokio::test]
    async fn past_events_are_dropped_and_the_rest_sorted() {
        let today = time::today(now());
        let stub = Stub {
            events: Answer::Value(vec![
                event("two-weeks", today + Days::new(14)),
                event("one-week", today + Days::new(7)),
                event("past", today - Days::new(3)),
            ]),
            ..Stub::default()
        };

        let events = fetch_upcoming_events(&stub, now(), DEFAULT_LOCATION, TIMEOUT).await;
        let ids: Vec<_> = events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, ["one-week", "two-weeks"]);
    }

    #[tokio::test]
    async fn yesterday_is_out_today_is_in() {
        let today = time::today(now());
        let stub = Stub {
            events: Answer::Value(vec![
                event("yesterday", today - Days::new(1)),
                event("today", today),
            ]),
            ..Stub::default()
        };

        let events = fetch_upcoming_events(&stub, now(), DEFAULT_LOCATION, TIMEOUT).await;
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].id, "today");
    }

    #[tokio::test]
    async fn failing_source_serves_fallback() {
        let stub = Stub {
            events: Answer::Fail,
            ..Stub::default()
        };

        let events = fetch_upcoming_events(&stub, now(), "Somewhere", TIMEOUT).await;
        assert_eq!(events, fallback::fallback_events(time::today(now()), "Somewhere"));
        assert_eq!(events[0].date, NaiveDate::from_ymd_opt(2030, 1, 3).unwrap());
    }

    #[tokio::test]
    async fn slow_source_times_out_to_fallback() {
        let stub = Stub {
            events: Answer::Hang,
            ..Stub::default()
        };

        let events = fetch_upcoming_events(&stub, now(), DEFAULT_LOCATION, TIMEOUT).await;
        assert_eq!(events.len(), fallback::FALLBACK_WEEKS as usize);
        assert!(events.iter().all(|event| event.id.starts_with("fallback-thursday-")));
    }

    #[tokio::test]
    async fn empty_source_is_not_a_failure() {
        let events = fetch_upcoming_events(&Stub::default(), now(), DEFAULT_LOCATION, TIMEOUT).await;
        assert!(events.is_empty());
    }

    #[tokio::test]
    async fn home_sources_fall_back_independently() {
        let today = time::today(now());
        let stub = Stub {
            events: Answer::Value((1..=5).map(|n| event(&n.to_string(), today + Days::new(n))).collect()),
            announcements: Answer::Value(vec![
                announcement("later", Status::Active, 2),
                announcement("hidden", Status::Inactive, 0),
                announcement("first", Status::Active, 1),
            ]),
            cards: Answer::Hang,
            ..Stub::default()
        };

        let home = fetch_home(&stub.into_state(TIMEOUT), now()).await;

        let ids: Vec<_> = home.events.iter().map(|event| event.id.as_str()).collect();
        assert_eq!(ids, ["1", "2", "3"]);

        let titles: Vec<_> = home.announcements.iter().map(|a| a.title.as_str()).collect();
        assert_eq!(titles, ["first", "later"]);

        assert_eq!(home.cards, fallback::fallback_community_cards());
    }

    #[tokio::test]
    async fn home_survives_every_source_failing() {
        let stub = Stub {
            events: Answer::Fail,
            announcements: Answer::Fail,
            cards: Answer::Fail,
            ..Stub::default()
        };

        let home = fetch_home(&stub.into_state(TIMEOUT), now()).await;
        assert_eq!(home.events.len(), HOME_EVENT_COUNT);
        assert_eq!(home.announcements, fallback::fallback_announcements());
        assert_eq!(home.cards.len(), 3);
    }
}
