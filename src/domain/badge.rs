/// Badge catalog types and rule evaluation
///
/// Badges are achievements unlocked when an aggregate statistic over an
/// owner's entries crosses a threshold. The catalog is fixed master data; the
/// rule is stored as a type tag plus a numeric threshold.

use serde::{Deserialize, Serialize};

use crate::domain::BadgeId;

/// How a badge is earned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BadgeRule {
    /// Total number of entries is at least `n`
    EntryCountAtLeast(u32),
    /// Current consecutive-day streak is at least `n`
    StreakAtLeast(u32),
    /// Number of distinct moods ever used is at least `n`
    DistinctMoodAtLeast(u32),
    /// A rule tag this build does not understand; never satisfied
    Unknown { rule_type: String, value: u32 },
}

impl BadgeRule {
    pub const ENTRY_COUNT_AT_LEAST: &'static str = "ENTRY_COUNT_AT_LEAST";
    pub const STREAK_AT_LEAST: &'static str = "STREAK_AT_LEAST";
    pub const DISTINCT_MOOD_AT_LEAST: &'static str = "DISTINCT_MOOD_AT_LEAST";

    /// Build a rule from its persisted (`rule_type`, `rule_value`) pair
    pub fn from_parts(rule_type: &str, value: u32) -> Self {
        match rule_type {
            Self::ENTRY_COUNT_AT_LEAST => BadgeRule::EntryCountAtLeast(value),
            Self::STREAK_AT_LEAST => BadgeRule::StreakAtLeast(value),
            Self::DISTINCT_MOOD_AT_LEAST => BadgeRule::DistinctMoodAtLeast(value),
            other => BadgeRule::Unknown {
                rule_type: other.to_string(),
                value,
            },
        }
    }

    pub fn rule_type(&self) -> &str {
        match self {
            BadgeRule::EntryCountAtLeast(_) => Self::ENTRY_COUNT_AT_LEAST,
            BadgeRule::StreakAtLeast(_) => Self::STREAK_AT_LEAST,
            BadgeRule::DistinctMoodAtLeast(_) => Self::DISTINCT_MOOD_AT_LEAST,
            BadgeRule::Unknown { rule_type, .. } => rule_type,
        }
    }

    pub fn value(&self) -> u32 {
        match self {
            BadgeRule::EntryCountAtLeast(n)
            | BadgeRule::StreakAtLeast(n)
            | BadgeRule::DistinctMoodAtLeast(n) => *n,
            BadgeRule::Unknown { value, .. } => *value,
        }
    }

    pub fn is_satisfied_by(&self, stats: &BadgeStats) -> bool {
        match self {
            BadgeRule::EntryCountAtLeast(n) => stats.entry_count >= *n,
            BadgeRule::StreakAtLeast(n) => stats.current_streak >= *n,
            BadgeRule::DistinctMoodAtLeast(n) => stats.distinct_moods >= *n,
            BadgeRule::Unknown { .. } => false,
        }
    }
}

/// Aggregates a badge evaluation runs against
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeStats {
    pub entry_count: u32,
    pub current_streak: u32,
    pub distinct_moods: u32,
}

/// A catalog badge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
    pub rule: BadgeRule,
}

/// A catalog badge annotated with one owner's progress
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BadgeStatus {
    pub badge: Badge,
    pub is_earned: bool,
    /// Shown as the owner's representative badge
    pub is_selected: bool,
}

/// The seeded catalog: (id, name, description, rule type, threshold)
pub const BADGE_CATALOG: [(BadgeId, &str, &str, &str, u32); 5] = [
    (1, "Steady Start", "Write your first diary entry", BadgeRule::ENTRY_COUNT_AT_LEAST, 1),
    (2, "Pieces of a Month", "Write 30 diary entries", BadgeRule::ENTRY_COUNT_AT_LEAST, 30),
    (3, "Emotion Log Collector", "Write 100 diary entries", BadgeRule::ENTRY_COUNT_AT_LEAST, 100),
    (4, "Three-Day Master", "Write three days in a row", BadgeRule::STREAK_AT_LEAST, 3),
    (5, "Emotion Sommelier", "Use every kind of mood", BadgeRule::DISTINCT_MOOD_AT_LEAST, 7),
];
