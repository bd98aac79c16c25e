//! The two competing sides.

use serde::{Deserialize, Serialize};

/// One of the two teams. Red defends the top rows, blue the bottom rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Team {
    Red,
    Blue,
}

/// Both teams in resolution order.
pub const ALL_TEAMS: [Team; 2] = [Team::Red, Team::Blue];

impl Team {
    /// Index into per-team arrays.
    pub const fn index(self) -> usize {
        match self {
            Team::Red => 0,
            Team::Blue => 1,
        }
    }

    pub const fn opponent(self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    /// Returns the lowercase full name.
    pub const fn name(self) -> &'static str {
        match self {
            Team::Red => "red",
            Team::Blue => "blue",
        }
    }

    /// Parses a team from its full name or single-letter abbreviation.
    pub fn from_name(name: &str) -> Option<Team> {
        match name {
            "red" | "r" => Some(Team::Red),
            "blue" | "b" => Some(Team::Blue),
            _ => None,
        }
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opponent_is_involution() {
        for t in ALL_TEAMS {
            assert_ne!(t.opponent(), t);
            assert_eq!(t.opponent().opponent(), t);
        }
    }

    #[test]
    fn indices_are_distinct() {
        assert_eq!(Team::Red.index(), 0);
        assert_eq!(Team::Blue.index(), 1);
    }

    #[test]
    fn from_name_accepts_abbreviations() {
        assert_eq!(Team::from_name("red"), Some(Team::Red));
        assert_eq!(Team::from_name("b"), Some(Team::Blue));
        assert_eq!(Team::from_name("green"), None);
    }
}
