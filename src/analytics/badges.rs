/// Badge engine: evaluate catalog rules and grant newly satisfied badges
use chrono::Utc;
use rusqlite::Connection;

use crate::domain::{consecutive_days, BadgeId, BadgeStats, Owner};
use crate::storage::{BadgeStore, EntryStore, StorageError};

/// Evaluates badge rules for one owner against a borrowed connection
///
/// Meant to run inside the same transaction as the entry write that
/// triggered it, so the statistics see that write.
pub struct BadgeEngine<'c> {
    entries: EntryStore<'c>,
    badges: BadgeStore<'c>,
}

impl<'c> BadgeEngine<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self {
            entries: EntryStore::new(conn),
            badges: BadgeStore::new(conn),
        }
    }

    /// Aggregates over every entry of the owner, temporary ones included
    pub fn stats(&self, owner: &Owner) -> Result<BadgeStats, StorageError> {
        Ok(BadgeStats {
            entry_count: self.entries.count_for_owner(owner)?,
            current_streak: consecutive_days(&self.entries.dates_desc(owner)?),
            distinct_moods: self.entries.distinct_mood_count(owner)?,
        })
    }

    /// Grant every satisfied badge the owner does not hold yet
    ///
    /// Returns the ids granted by this call; running it again right away
    /// returns an empty list.
    pub fn check_and_grant(&self, owner: &Owner) -> Result<Vec<BadgeId>, StorageError> {
        let stats = self.stats(owner)?;
        let held = self.badges.granted_ids(owner)?;
        let now = Utc::now();

        let mut granted = Vec::new();
        for badge in self.badges.catalog()? {
            if held.contains(&badge.id) || !badge.rule.is_satisfied_by(&stats) {
                continue;
            }
            if self.badges.grant(owner, badge.id, now)? {
                tracing::info!("Granted badge {} ({}) to {}", badge.id, badge.name, owner);
                granted.push(badge.id);
            }
        }
        Ok(granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DiaryEntry, Mood};
    use crate::storage::SqliteStorage;
    use chrono::NaiveDate;

    fn write_entry(conn: &Connection, owner: &Owner, day: u32, mood: Mood) {
        let entry = DiaryEntry::new(
            owner.clone(),
            NaiveDate::from_ymd_opt(2026, 1, day).unwrap(),
            "t",
            "c",
            mood,
            vec![],
        )
        .unwrap();
        EntryStore::new(conn).upsert(&entry).unwrap();
    }

    #[test]
    fn test_first_entry_grants_first_badge_once() {
        let storage = SqliteStorage::in_memory().unwrap();
        let owner = Owner::Registered(1);
        storage
            .write(|tx| {
                write_entry(tx, &owner, 10, Mood::Joy);
                let engine = BadgeEngine::new(tx);
                assert_eq!(engine.check_and_grant(&owner)?, vec![1]);
                assert!(engine.check_and_grant(&owner)?.is_empty());
                assert_eq!(BadgeStore::new(tx).granted_ids(&owner)?, vec![1]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_streak_and_mood_badges() {
        let storage = SqliteStorage::in_memory().unwrap();
        let owner = Owner::Anonymous("m".to_string());
        storage
            .write(|tx| {
                for (i, mood) in Mood::ALL.iter().enumerate() {
                    write_entry(tx, &owner, 1 + i as u32, *mood);
                }
                let engine = BadgeEngine::new(tx);
                let stats = engine.stats(&owner)?;
                assert_eq!(stats.entry_count, 7);
                assert_eq!(stats.current_streak, 7);
                assert_eq!(stats.distinct_moods, 7);

                assert_eq!(engine.check_and_grant(&owner)?, vec![1, 4, 5]);
                Ok(())
            })
            .unwrap();
    }

    #[test]
    fn test_grants_are_scoped_per_owner() {
        let storage = SqliteStorage::in_memory().unwrap();
        let a = Owner::Registered(1);
        let b = Owner::Registered(2);
        storage
            .write(|tx| {
                write_entry(tx, &a, 3, Mood::Calm);
                let engine = BadgeEngine::new(tx);
                engine.check_and_grant(&a)?;
                assert!(engine.check_and_grant(&b)?.is_empty());
                assert!(BadgeStore::new(tx).granted_ids(&b)?.is_empty());
                Ok(())
            })
            .unwrap();
    }
}
