/// Monthly summaries on demand
///
/// Only the month before today is ever generated; any other month is served
/// from the cache or not at all.

use chrono::{Local, NaiveDate, Utc};
use tracing::info;

use crate::analytics::MonthlyAnalyzer;
use crate::domain::{MonthlySummary, Owner, YearMonth};
use crate::storage::{EntryStore, MonthlyStore};
use crate::AppResult;

use super::DiaryService;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl DiaryService {
    /// Cached summary of last month, generating it from that month's entries
    /// on first access; `None` when last month has no entries
    pub fn ensure_last_month_monthly_summary(&self, owner: &Owner) -> AppResult<Option<MonthlySummary>> {
        self.ensure_last_month_monthly_summary_on(owner, today())
    }

    /// Same as `ensure_last_month_monthly_summary` with an explicit "today"
    pub fn ensure_last_month_monthly_summary_on(
        &self,
        owner: &Owner,
        today: NaiveDate,
    ) -> AppResult<Option<MonthlySummary>> {
        let last_month = YearMonth::of(today).previous();

        let (cached, entries) = self.storage.read(|conn| {
            match MonthlyStore::new(conn).get(owner, last_month)? {
                Some(summary) => Ok((Some(summary), Vec::new())),
                None => Ok((None, EntryStore::new(conn).get_by_month(owner, last_month)?)),
            }
        })?;
        if cached.is_some() {
            return Ok(cached);
        }

        let Some(summary) = MonthlyAnalyzer::summarize(owner, last_month, &entries, Utc::now()) else {
            return Ok(None);
        };
        self.storage.write(|tx| MonthlyStore::new(tx).upsert(&summary))?;
        info!("Generated monthly summary {} for {}", last_month, owner);
        Ok(Some(summary))
    }

    /// Summary for any month; only last month can be generated on demand
    pub fn get_monthly_summary(&self, owner: &Owner, ym: YearMonth) -> AppResult<Option<MonthlySummary>> {
        self.get_monthly_summary_on(owner, ym, today())
    }

    pub fn get_monthly_summary_on(
        &self,
        owner: &Owner,
        ym: YearMonth,
        today: NaiveDate,
    ) -> AppResult<Option<MonthlySummary>> {
        if ym == YearMonth::of(today).previous() {
            return self.ensure_last_month_monthly_summary_on(owner, today);
        }
        Ok(self.storage.read(|conn| MonthlyStore::new(conn).get(owner, ym))?)
    }

    /// Stored summaries of one year, January first
    pub fn get_monthly_summaries_for_year(&self, owner: &Owner, year: i32) -> AppResult<Vec<MonthlySummary>> {
        Ok(self
            .storage
            .read(|conn| MonthlyStore::new(conn).get_year(owner, year))?)
    }

    /// The tag used most often last month
    pub fn get_last_month_top_tag(&self, owner: &Owner) -> AppResult<Option<String>> {
        self.get_last_month_top_tag_on(owner, today())
    }

    pub fn get_last_month_top_tag_on(&self, owner: &Owner, today: NaiveDate) -> AppResult<Option<String>> {
        let last_month = YearMonth::of(today).previous();
        let entries = self.get_entries_by_month(owner, last_month)?;
        Ok(MonthlyAnalyzer::top_tag(&entries))
    }
}
