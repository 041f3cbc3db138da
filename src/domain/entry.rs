/// DiaryEntry entity, the one-per-day journal record
///
/// This module defines the DiaryEntry struct that represents what an owner
/// wrote on a given calendar day, together with its mood, tags and flags.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, EntryId, Mood, Owner};

const MAX_TITLE_CHARS: usize = 100;
const MAX_TAGS: usize = 10;

/// A diary entry for a single (owner, date) pair
///
/// Entries are upserted on (owner, date), so writing twice on the same day
/// replaces the earlier text instead of creating a second row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiaryEntry {
    /// Database id; `None` until the entry has been saved
    pub id: Option<EntryId>,
    pub owner: Owner,
    /// Which day this entry is for
    pub date: NaiveDate,
    pub title: String,
    pub content: String,
    pub mood: Mood,
    /// Free-text tags in the order the user picked them
    pub tags: Vec<String>,
    /// Kept in the mind card archive
    pub is_favorite: bool,
    /// Anonymous-session entry, hidden from calendar, list and archive views
    pub is_temporary: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DiaryEntry {
    /// Create a new, unsaved entry with validation
    pub fn new(
        owner: Owner,
        date: NaiveDate,
        title: impl Into<String>,
        content: impl Into<String>,
        mood: Mood,
        tags: Vec<String>,
    ) -> Result<Self, DomainError> {
        let title = title.into();
        let content = content.into();
        let tags: Vec<String> = tags
            .into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        Self::validate_title(&title)?;
        Self::validate_tags(&tags)?;

        let now = Utc::now();
        Ok(Self {
            id: None,
            owner,
            date,
            title,
            content,
            mood,
            tags,
            is_favorite: false,
            is_temporary: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Mark the entry as belonging to an anonymous, temporary session
    pub fn temporary(mut self, is_temporary: bool) -> Self {
        self.is_temporary = is_temporary;
        self
    }

    fn validate_title(title: &str) -> Result<(), DomainError> {
        if title.chars().count() > MAX_TITLE_CHARS {
            return Err(DomainError::validation(format!(
                "Title cannot be longer than {} characters",
                MAX_TITLE_CHARS
            )));
        }
        Ok(())
    }

    fn validate_tags(tags: &[String]) -> Result<(), DomainError> {
        if tags.len() > MAX_TAGS {
            return Err(DomainError::validation(format!("At most {} tags are allowed", MAX_TAGS)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    #[test]
    fn test_create_valid_entry() {
        let owner = Owner::Anonymous("t".to_string());
        let entry = DiaryEntry::new(
            owner.clone(),
            day(10),
            "Today",
            "A little tired",
            Mood::Tired,
            vec![" tired ".to_string(), "".to_string()],
        )
        .unwrap();

        assert_eq!(entry.owner, owner);
        assert_eq!(entry.id, None);
        assert_eq!(entry.tags, vec!["tired".to_string()]);
        assert!(!entry.is_favorite);
        assert!(!entry.is_temporary);
        assert!(entry.temporary(true).is_temporary);
    }

    #[test]
    fn test_overlong_title_invalid() {
        let result = DiaryEntry::new(
            Owner::Registered(1),
            day(1),
            "x".repeat(101),
            "c",
            Mood::Calm,
            vec![],
        );
        assert!(result.is_err());
    }
}
