/// Badge catalog and per-owner grants
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::domain::{Badge, BadgeId, BadgeRule, BadgeStatus, Owner};
use crate::storage::{to_millis, StorageError};

pub struct BadgeStore<'c> {
    conn: &'c Connection,
}

impl<'c> BadgeStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }

    /// The whole catalog, ordered by id
    pub fn catalog(&self) -> Result<Vec<Badge>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT badge_id, name, description, rule_type, rule_value
             FROM badges ORDER BY badge_id",
        )?;
        let badges = stmt
            .query_map([], map_badge)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(badges)
    }

    pub fn granted_ids(&self, owner: &Owner) -> Result<Vec<BadgeId>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT badge_id FROM user_badges WHERE owner_id = ?1 ORDER BY badge_id")?;
        let ids = stmt
            .query_map(params![owner.to_string()], |row| row.get(0))?
            .collect::<Result<Vec<BadgeId>, _>>()?;
        Ok(ids)
    }

    /// Record a grant; returns false if the owner already had the badge
    pub fn grant(&self, owner: &Owner, badge_id: BadgeId, earned_at: DateTime<Utc>) -> Result<bool, StorageError> {
        let rows = self.conn.execute(
            "INSERT OR IGNORE INTO user_badges (owner_id, badge_id, earned_at, is_selected)
             VALUES (?1, ?2, ?3, 0)",
            params![owner.to_string(), badge_id, to_millis(earned_at)],
        )?;
        Ok(rows > 0)
    }

    /// Every catalog badge exactly once, with this owner's earned and
    /// selected flags
    pub fn statuses(&self, owner: &Owner) -> Result<Vec<BadgeStatus>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT b.badge_id, b.name, b.description, b.rule_type, b.rule_value,
                    ub.badge_id IS NOT NULL, COALESCE(ub.is_selected, 0)
             FROM badges b
             LEFT JOIN user_badges ub ON ub.badge_id = b.badge_id AND ub.owner_id = ?1
             ORDER BY b.badge_id",
        )?;
        let statuses = stmt
            .query_map(params![owner.to_string()], |row| {
                Ok(BadgeStatus {
                    badge: map_badge(row)?,
                    is_earned: row.get(5)?,
                    is_selected: row.get(6)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(statuses)
    }

    /// Make `badge_id` the only selected grant of `owner`
    ///
    /// Returns false, changing nothing, when the owner has not earned it.
    /// Run inside a transaction so the clear and the set land together.
    pub fn select(&self, owner: &Owner, badge_id: BadgeId) -> Result<bool, StorageError> {
        let owner_id = owner.to_string();
        let earned: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM user_badges WHERE owner_id = ?1 AND badge_id = ?2",
                params![owner_id, badge_id],
                |row| row.get(0),
            )
            .optional()?;
        if earned.is_none() {
            return Ok(false);
        }

        self.conn.execute(
            "UPDATE user_badges SET is_selected = 0 WHERE owner_id = ?1",
            params![owner_id],
        )?;
        self.conn.execute(
            "UPDATE user_badges SET is_selected = 1 WHERE owner_id = ?1 AND badge_id = ?2",
            params![owner_id, badge_id],
        )?;
        Ok(true)
    }

    pub fn selected(&self, owner: &Owner) -> Result<Option<Badge>, StorageError> {
        Ok(self
            .conn
            .query_row(
                "SELECT b.badge_id, b.name, b.description, b.rule_type, b.rule_value
                 FROM user_badges ub JOIN badges b ON b.badge_id = ub.badge_id
                 WHERE ub.owner_id = ?1 AND ub.is_selected = 1
                 LIMIT 1",
                params![owner.to_string()],
                map_badge,
            )
            .optional()?)
    }

    pub fn delete_all_for_owner(&self, owner: &Owner) -> Result<usize, StorageError> {
        Ok(self
            .conn
            .execute("DELETE FROM user_badges WHERE owner_id = ?1", params![owner.to_string()])?)
    }
}

fn map_badge(row: &Row<'_>) -> rusqlite::Result<Badge> {
    let rule_type: String = row.get(3)?;
    Ok(Badge {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        rule: BadgeRule::from_parts(&rule_type, row.get(4)?),
    })
}
