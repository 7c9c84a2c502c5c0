use std::fmt;
use std::str::FromStr;

use crate::config::ConfigError;

/// How many objects the smallest-id policy asks the index for.
pub const SMALLEST_ID_SCAN_LIMIT: usize = 100;

/// Which object wins when a name matches more than one indexed object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchPolicy {
    /// Take whatever the index returns first. The index gives no ordering
    /// guarantee, so this is not stable across runs.
    #[default]
    FirstReturned,
    /// Take the lexicographically smallest id among the returned matches.
    SmallestId,
    /// Refuse to link when more than one object matches.
    RequireUnique,
}

/// Outcome of applying a policy to the ids returned by one lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    NoMatch,
    Chosen(String),
    Ambiguous(usize),
}

impl MatchPolicy {
    /// Result limit to request from the index.
    pub fn lookup_limit(self) -> usize {
        match self {
            MatchPolicy::FirstReturned => 1,
            MatchPolicy::SmallestId => SMALLEST_ID_SCAN_LIMIT,
            MatchPolicy::RequireUnique => 2,
        }
    }

    pub fn select(self, ids: Vec<String>) -> Selection {
        let count = ids.len();
        let chosen = match self {
            MatchPolicy::FirstReturned => ids.into_iter().next(),
            MatchPolicy::SmallestId => ids.into_iter().min(),
            MatchPolicy::RequireUnique if count > 1 => return Selection::Ambiguous(count),
            MatchPolicy::RequireUnique => ids.into_iter().next(),
        };
        chosen.map_or(Selection::NoMatch, Selection::Chosen)
    }
}

impl fmt::Display for MatchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchPolicy::FirstReturned => "first",
            MatchPolicy::SmallestId => "smallest",
            MatchPolicy::RequireUnique => "unique",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for MatchPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(MatchPolicy::FirstReturned),
            "smallest" => Ok(MatchPolicy::SmallestId),
            "unique" => Ok(MatchPolicy::RequireUnique),
            other => Err(ConfigError::Invalid {
                key: "match-policy",
                reason: format!("expected first, smallest or unique, got '{}'", other),
            }),
        }
    }
}
