/// Monthly mood summary for one owner and one calendar month
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{Mood, Owner, YearMonth};

/// At most this many keywords are kept per summary
pub const MAX_KEYWORDS: usize = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub owner: Owner,
    pub year_month: YearMonth,
    /// Most frequent mood of the month
    pub dominant_mood: Mood,
    pub one_line_summary: String,
    pub detail_summary: String,
    /// Mood progression across the month, e.g. `JOY -> TIRED -> CALM`
    pub emotion_flow: String,
    pub keywords: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl MonthlySummary {
    /// Keep only the first `MAX_KEYWORDS` keywords
    pub fn with_keywords(mut self, keywords: Vec<String>) -> Self {
        self.keywords = keywords.into_iter().take(MAX_KEYWORDS).collect();
        self
    }
}
