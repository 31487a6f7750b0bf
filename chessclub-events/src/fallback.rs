//! Content served when an upstream source cannot be read.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::{time, Announcement, Category, CommunityCard, Event, Status};

pub const FALLBACK_WEEKS: u64 = 4;
pub const FALLBACK_WEEKDAY: Weekday = Weekday::Thu;

/// The weekly club night for the next few weeks, starting on or after `today`.
pub fn fallback_events(today: NaiveDate, location: &str) -> Vec<Event> {
    let offset = (7 + FALLBACK_WEEKDAY.num_days_from_sunday()
        - today.weekday().num_days_from_sunday())
        % 7;

    (0..FALLBACK_WEEKS)
        .filter_map(|week| {
            let date = today.checked_add_days(Days::new(u64::from(offset) + week * 7))?;
            Some(Event {
                id: format!("fallback-thursday-{week}"),
                title: "Thursday Night Chess".to_string(),
                date,
                time: time::default_start(),
                category: Category::Casual,
                description:
                    "Casual games, instruction, and friendly competition. All skill levels welcome!"
                        .to_string(),
                location: location.to_string(),
            })
        })
        .collect()
}

pub fn fallback_announcements() -> Vec<Announcement> {
    vec![Announcement {
        id: "welcome".to_string(),
        title: "Welcome to Rockland Chess Club".to_string(),
        description: "Join us for chess games, tournaments, and community events".to_string(),
        link_url: Some("/join".to_string()),
        link_text: Some("Join Today →".to_string()),
        status: Status::Active,
        priority: 1,
        icon: Some("♕".to_string()),
    }]
}

pub fn fallback_community_cards() -> Vec<CommunityCard> {
    let card = |id: &str, title: &str, description: &str, icon: &str, order| CommunityCard {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        icon: icon.to_string(),
        order,
        status: Status::Active,
    };

    vec![
        card(
            "skill-levels",
            "All Skill Levels",
            "Never played? No problem. We'll teach you. Already good? You'll find worthy opponents.",
            "♔",
            1,
        ),
        card(
            "gatherings",
            "Regular Gatherings",
            "Every Thursday night plus monthly tournaments and weekly classes",
            "♕",
            2,
        ),
        card(
            "instruction",
            "Instruction",
            "Free lessons for members. Kids and adult classes available.",
            "♗",
            3,
        ),
    ]
}
