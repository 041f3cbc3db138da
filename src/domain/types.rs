/// Core types and enums used throughout the domain layer
///
/// This module defines the fundamental value types like Owner, Mood and
/// YearMonth that are used by DiaryEntry, MonthlySummary and the service.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::DomainError;

/// Numeric identifier assigned by the database to a diary entry
pub type EntryId = i64;

/// Numeric identifier of a badge in the fixed catalog
pub type BadgeId = i64;

const ANONYMOUS_PREFIX: &str = "ANON_";
const REGISTERED_PREFIX: &str = "USER_";

/// The identity all entries, analyses, badges and settings are partitioned by
///
/// Persisted as `ANON_<token>` or `USER_<user id>`; everything above the
/// storage layer works with the tagged form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Owner {
    /// A device-local session that has not signed up
    Anonymous(String),
    /// A registered account, identified by its user id
    Registered(i64),
}

impl Owner {
    /// Generate a fresh anonymous identity
    pub fn new_anonymous() -> Self {
        Self::Anonymous(Uuid::new_v4().simple().to_string())
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Owner::Anonymous(_))
    }

    /// The account id for registered owners
    pub fn user_id(&self) -> Option<i64> {
        match self {
            Owner::Registered(id) => Some(*id),
            Owner::Anonymous(_) => None,
        }
    }
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Owner::Anonymous(token) => write!(f, "{}{}", ANONYMOUS_PREFIX, token),
            Owner::Registered(id) => write!(f, "{}{}", REGISTERED_PREFIX, id),
        }
    }
}

impl FromStr for Owner {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(token) = s.strip_prefix(ANONYMOUS_PREFIX) {
            if token.is_empty() {
                return Err(DomainError::InvalidOwner(s.to_string()));
            }
            return Ok(Owner::Anonymous(token.to_string()));
        }
        if let Some(id) = s.strip_prefix(REGISTERED_PREFIX) {
            return id
                .parse::<i64>()
                .map(Owner::Registered)
                .map_err(|_| DomainError::InvalidOwner(s.to_string()));
        }
        Err(DomainError::InvalidOwner(s.to_string()))
    }
}

impl TryFrom<String> for Owner {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Owner> for String {
    fn from(owner: Owner) -> Self {
        owner.to_string()
    }
}

/// The seven moods a diary entry can be tagged with
///
/// The declaration order is the persisted ordinal (`entries.mood`), so new
/// variants may only be appended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Mood {
    Joy,
    Confidence,
    Calm,
    Normal,
    Depressed,
    Angry,
    Tired,
}

impl Mood {
    pub const ALL: [Mood; 7] = [
        Mood::Joy,
        Mood::Confidence,
        Mood::Calm,
        Mood::Normal,
        Mood::Depressed,
        Mood::Angry,
        Mood::Tired,
    ];

    /// Integer stored in the database
    pub fn ordinal(self) -> i64 {
        match self {
            Mood::Joy => 0,
            Mood::Confidence => 1,
            Mood::Calm => 2,
            Mood::Normal => 3,
            Mood::Depressed => 4,
            Mood::Angry => 5,
            Mood::Tired => 6,
        }
    }

    pub fn from_ordinal(value: i64) -> Result<Self, DomainError> {
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.ordinal() == value)
            .ok_or_else(|| DomainError::InvalidMood(value.to_string()))
    }

    /// Stable upper-case code used in prompts and emotion flows
    pub fn code(self) -> &'static str {
        match self {
            Mood::Joy => "JOY",
            Mood::Confidence => "CONFIDENCE",
            Mood::Calm => "CALM",
            Mood::Normal => "NORMAL",
            Mood::Depressed => "DEPRESSED",
            Mood::Angry => "ANGRY",
            Mood::Tired => "TIRED",
        }
    }

    /// Human readable label
    pub fn label(self) -> &'static str {
        match self {
            Mood::Joy => "Joy",
            Mood::Confidence => "Confidence",
            Mood::Calm => "Calm",
            Mood::Normal => "Normal",
            Mood::Depressed => "Depressed",
            Mood::Angry => "Angry",
            Mood::Tired => "Tired",
        }
    }
}

impl FromStr for Mood {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Mood::ALL
            .iter()
            .copied()
            .find(|m| m.code().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::InvalidMood(s.to_string()))
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parse a `YYYY-MM-DD` calendar date
pub fn parse_ymd(s: &str) -> Result<NaiveDate, DomainError> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| DomainError::InvalidDate(s.to_string()))
}

/// A calendar month, persisted as `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct YearMonth {
    first_day: NaiveDate,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Result<Self, DomainError> {
        if !(1..=9999).contains(&year) {
            return Err(DomainError::InvalidYearMonth(format!("{}-{}", year, month)));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|first_day| Self { first_day })
            .ok_or_else(|| DomainError::InvalidYearMonth(format!("{}-{}", year, month)))
    }

    /// The month a date falls in
    pub fn of(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    pub fn last_day(&self) -> NaiveDate {
        self.first_day
            .checked_add_months(Months::new(1))
            .and_then(|d| d.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }

    pub fn previous(&self) -> Self {
        self.first_day
            .checked_sub_months(Months::new(1))
            .map(|first_day| Self { first_day })
            .unwrap_or(*self)
    }

    pub fn next(&self) -> Self {
        self.first_day
            .checked_add_months(Months::new(1))
            .map(|first_day| Self { first_day })
            .unwrap_or(*self)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.first_day && date <= self.last_day()
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl FromStr for YearMonth {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidYearMonth(s.to_string());
        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if year.len() != 4 || month.len() != 2 {
            return Err(invalid());
        }
        let year = year.parse::<i32>().map_err(|_| invalid())?;
        let month = month.parse::<u32>().map_err(|_| invalid())?;
        YearMonth::new(year, month).map_err(|_| invalid())
    }
}

impl TryFrom<String> for YearMonth {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<YearMonth> for String {
    fn from(ym: YearMonth) -> Self {
        ym.to_string()
    }
}
