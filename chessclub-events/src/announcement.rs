use std::time::Duration;

use crate::{Announcement, CommunityCard, Status};

/// How long one announcement stays up before the toast moves on.
pub const ROTATE_EVERY: Duration = Duration::from_secs(5);

pub fn active_announcements(announcements: Vec<Announcement>) -> Vec<Announcement> {
    let mut active = announcements
        .into_iter()
        .filter(|announcement| announcement.status == Status::Active)
        .collect::<Vec<_>>();
    active.sort_by_key(|announcement| announcement.priority);
    active
}

pub fn active_cards(cards: Vec<CommunityCard>) -> Vec<CommunityCard> {
    let mut active = cards
        .into_iter()
        .filter(|card| card.status == Status::Active)
        .collect::<Vec<_>>();
    active.sort_by_key(|card| card.order);
    active
}

/// State of the announcement toast on the home page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rotation {
    len: usize,
    current: usize,
    dismissed: bool,
}

impl Rotation {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            current: 0,
            dismissed: false,
        }
    }

    /// Index of the announcement on screen, `None` when nothing is shown.
    pub fn current(&self) -> Option<usize> {
        self.is_visible().then_some(self.current)
    }

    pub fn is_visible(&self) -> bool {
        self.len > 0 && !self.dismissed
    }

    /// Only rotates when there is more than one announcement.
    pub fn should_rotate(&self) -> bool {
        self.is_visible() && self.len > 1
    }

    pub fn advance(&mut self) {
        if self.should_rotate() {
            self.current = (self.current + 1) % self.len;
        }
    }

    pub fn go_to(&mut self, index: usize) {
        if index < self.len {
            self.current = index;
        }
    }

    pub fn dismiss(&mut self) {
        self.dismissed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallback::{fallback_announcements, fallback_community_cards};

    fn announcement(id: &str, priority: i64, status: Status) -> Announcement {
        Announcement {
            id: id.into(),
            priority,
            status,
            ..fallback_announcements().remove(0)
        }
    }

    #[test]
    fn inactive_dropped_rest_by_priority() {
        let active = active_announcements(vec![
            announcement("c", 3, Status::Active),
            announcement("hidden", 0, Status::Inactive),
            announcement("a", 1, Status::Active),
        ]);
        let ids = active.iter().map(|a| a.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, ["a", "c"]);
    }

    #[test]
    fn cards_by_order() {
        let mut cards = fallback_community_cards();
        cards.reverse();
        cards[0].status = Status::Inactive;

        let ids = active_cards(cards)
            .into_iter()
            .map(|card| card.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, ["skill-levels", "gatherings"]);
    }

    #[test]
    fn rotation_wraps_and_dismisses() {
        let mut rotation = Rotation::new(3);
        assert_eq!(rotation.current(), Some(0));
        rotation.advance();
        rotation.advance();
        assert_eq!(rotation.current(), Some(2));
        rotation.advance();
        assert_eq!(rotation.current(), Some(0));

        rotation.go_to(1);
        assert_eq!(rotation.current(), Some(1));
        rotation.go_to(7);
        assert_eq!(rotation.current(), Some(1));

        rotation.dismiss();
        assert!(!rotation.is_visible());
        assert_eq!(rotation.current(), None);
        rotation.advance();
        assert_eq!(rotation.current(), None);
    }

    #[test]
    fn single_or_empty() {
        let mut single = Rotation::new(1);
        assert!(!single.should_rotate());
        single.advance();
        assert_eq!(single.current(), Some(0));

        assert_eq!(Rotation::new(0).current(), None);
    }
}
