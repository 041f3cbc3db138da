/// Registered accounts and the derived profile view
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Badge, Owner};

/// Nickname shown for owners that never set one
pub const DEFAULT_NICKNAME: &str = "Guest";

/// Label used instead of an email address for anonymous owners
pub const ANONYMOUS_LABEL: &str = "Anonymous session";

/// A registered account row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    /// Normalized (trimmed, lowercase)
    pub email: String,
    /// Argon2 PHC string; never the cleartext password
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Profile composed at read time; nothing here is stored as one row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub owner: Owner,
    pub nickname: String,
    /// Email for registered owners, `ANONYMOUS_LABEL` otherwise
    pub account_label: String,
    /// Days since sign-up or since the anonymous session started, counting
    /// the first day as day 1
    pub service_days: i64,
    pub selected_badge: Option<Badge>,
    pub profile_image_uri: Option<String>,
}

/// Day count from `since` to `now`, inclusive of the starting day
pub fn service_days(since: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    let days = (now.date_naive() - since.date_naive()).num_days();
    days.max(0) + 1
}
