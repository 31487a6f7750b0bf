use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Tournament,
    #[default]
    Casual,
    Classes,
    BoardGames,
    Special,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Tournament,
        Category::Casual,
        Category::Classes,
        Category::BoardGames,
        Category::Special,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Tournament => "tournament",
            Category::Casual => "casual",
            Category::Classes => "classes",
            Category::BoardGames => "board-games",
            Category::Special => "special",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Category::Tournament => "Tournament",
            Category::Casual => "Casual Play",
            Category::Classes => "Classes",
            Category::BoardGames => "Board Games",
            Category::Special => "Special Event",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(needle))
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}

/// Guesses a category from free text. First matching keyword wins.
pub fn map_category(raw: Option<&str>) -> Category {
    const RULES: [(&[&str], Category); 4] = [
        (&["tournament"], Category::Tournament),
        (&["class", "lesson"], Category::Classes),
        (&["board", "game"], Category::BoardGames),
        (&["special", "event"], Category::Special),
    ];

    let Some(raw) = raw else {
        return Category::default();
    };
    let lower = raw.to_lowercase();

    RULES
        .iter()
        .find(|(keywords, _)| keywords.iter().any(|keyword| lower.contains(keyword)))
        .map_or_else(Category::default, |(_, category)| *category)
}
