/// Diary service: the façade every caller goes through
///
/// `DiaryService` is constructed once with its storage, analysis provider and
/// session store, then passed by reference to whoever needs it. Each
/// operation is a single request/response returning `AppResult`.
///
/// Saving an entry and analyzing it are independent: the entry is committed
/// before the provider is called, and an analysis failure only downgrades the
/// returned mind card to the default one.
///
/// The synchronous methods block on SQLite and are meant for blocking
/// contexts. The async methods move their store calls onto tokio's blocking
/// pool, so they are safe to drive from a runtime worker.

mod account;
mod monthly;

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use crate::analytics::BadgeEngine;
use crate::config::DEFAULT_TIMEOUT;
use crate::domain::{
    AiAnalysis, BadgeId, DiaryEntry, EntryId, MindCardDetail, MindCardPreview, Mood, Owner,
    YearMonth,
};
use crate::provider::{AnalysisProvider, AnalysisRequest, ProviderError};
use crate::session::SessionStore;
use crate::storage::{AnalysisStore, EntryStore, SqliteStorage};
use crate::{AppError, AppResult};

pub struct DiaryService {
    storage: Arc<SqliteStorage>,
    provider: Box<dyn AnalysisProvider>,
    session: Box<dyn SessionStore>,
    analysis_timeout: Duration,
}

impl DiaryService {
    pub fn new(
        storage: SqliteStorage,
        provider: Box<dyn AnalysisProvider>,
        session: Box<dyn SessionStore>,
    ) -> Self {
        Self {
            storage: Arc::new(storage),
            provider,
            session,
            analysis_timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Upper bound on one provider call, on top of any transport timeout
    pub fn with_analysis_timeout(mut self, timeout: Duration) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn storage(&self) -> &SqliteStorage {
        &self.storage
    }

    // ---- entries ----

    /// Insert or replace the owner's entry for that date, then check badges
    ///
    /// A badge evaluation failure is logged and does not fail the save.
    pub fn upsert_entry(&self, entry: &DiaryEntry) -> AppResult<EntryId> {
        Self::store_entry(&self.storage, entry)
    }

    fn store_entry(storage: &SqliteStorage, entry: &DiaryEntry) -> AppResult<EntryId> {
        let id = storage.write(|tx| EntryStore::new(tx).upsert(entry))?;
        info!("Saved entry {} for {} on {}", id, entry.owner, entry.date);

        if let Err(e) = storage.write(|tx| BadgeEngine::new(tx).check_and_grant(&entry.owner)) {
            warn!("Badge check failed for {}: {}", entry.owner, e);
        }
        Ok(id)
    }

    fn load_entry(storage: &SqliteStorage, id: EntryId) -> AppResult<DiaryEntry> {
        storage
            .read(|conn| EntryStore::new(conn).get_by_id(id))?
            .ok_or_else(|| AppError::NotFound(format!("entry {}", id)))
    }

    /// Run a store closure on the blocking thread pool
    async fn blocking<T, F>(&self, f: F) -> AppResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&SqliteStorage) -> AppResult<T> + Send + 'static,
    {
        let storage = Arc::clone(&self.storage);
        tokio::task::spawn_blocking(move || f(&storage))
            .await
            .map_err(|e| AppError::Internal(format!("storage task failed: {}", e)))?
    }

    pub fn check_and_grant_badges(&self, owner: &Owner) -> AppResult<Vec<BadgeId>> {
        Ok(self
            .storage
            .write(|tx| BadgeEngine::new(tx).check_and_grant(owner))?)
    }

    pub fn get_entry(&self, id: EntryId) -> AppResult<DiaryEntry> {
        Self::load_entry(&self.storage, id)
    }

    /// Like `get_entry`, but another owner's entry is reported as missing
    pub fn get_owned_entry(&self, owner: &Owner, id: EntryId) -> AppResult<DiaryEntry> {
        match self.get_entry(id)? {
            entry if entry.owner == *owner => Ok(entry),
            _ => Err(AppError::NotFound(format!("entry {}", id))),
        }
    }

    pub fn get_entry_by_date(&self, owner: &Owner, date: NaiveDate) -> AppResult<Option<DiaryEntry>> {
        Ok(self
            .storage
            .read(|conn| EntryStore::new(conn).get_by_date(owner, date))?)
    }

    pub fn get_entries_by_month(&self, owner: &Owner, ym: YearMonth) -> AppResult<Vec<DiaryEntry>> {
        Ok(self
            .storage
            .read(|conn| EntryStore::new(conn).get_by_month(owner, ym))?)
    }

    pub fn get_entries_by_week(
        &self,
        owner: &Owner,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DiaryEntry>> {
        if end < start {
            return Err(AppError::Validation("Week end is before its start".to_string()));
        }
        Ok(self
            .storage
            .read(|conn| EntryStore::new(conn).get_by_week(owner, start, end))?)
    }

    pub fn get_mood_map_by_month(
        &self,
        owner: &Owner,
        ym: YearMonth,
    ) -> AppResult<BTreeMap<NaiveDate, Mood>> {
        Ok(self
            .storage
            .read(|conn| EntryStore::new(conn).get_mood_map_by_month(owner, ym))?)
    }

    /// Delete one of the owner's entries together with its analysis
    pub fn delete_entry(&self, owner: &Owner, id: EntryId) -> AppResult<()> {
        let deleted = self.storage.write(|tx| {
            let store = EntryStore::new(tx);
            match store.get_by_id(id)? {
                Some(entry) if entry.owner == *owner => store.delete(id),
                _ => Ok(false),
            }
        })?;
        if !deleted {
            return Err(AppError::NotFound(format!("entry {}", id)));
        }
        info!("Deleted entry {} of {}", id, owner);
        Ok(())
    }

    // ---- mind cards ----

    /// Save the entry and build its mind card
    ///
    /// Succeeds whenever the entry itself was saved. If analysis fails for any
    /// reason the card falls back to the default comfort text and mission.
    pub async fn save_entry_and_prepare_mind_card(&self, entry: DiaryEntry) -> AppResult<MindCardPreview> {
        let (id, stored) = self
            .blocking(move |storage| {
                let id = Self::store_entry(storage, &entry)?;
                Ok((id, Self::load_entry(storage, id)?))
            })
            .await?;

        let analysis = match self.run_analysis_safe(id).await {
            Ok(analysis) => Some(analysis),
            Err(e) => {
                warn!("Analysis for entry {} failed, using default card: {}", id, e);
                None
            }
        };
        Ok(MindCardPreview::build(id, &stored, analysis.as_ref()))
    }

    /// Analyze a stored entry and cache the result
    ///
    /// Provider failures come back as `Network` or `Parse` errors; nothing
    /// about the entry itself changes.
    pub async fn run_analysis_safe(&self, entry_id: EntryId) -> AppResult<AiAnalysis> {
        let entry = self
            .blocking(move |storage| Self::load_entry(storage, entry_id))
            .await?;
        let request = AnalysisRequest::from_entry(&entry);

        let payload = tokio::time::timeout(self.analysis_timeout, self.provider.analyze(&request))
            .await
            .map_err(|_| ProviderError::Timeout(self.analysis_timeout))??;

        let mut analysis = AiAnalysis::from_payload(entry_id, payload);
        let record = analysis.clone();
        let analysis_id = self
            .blocking(move |storage| Ok(storage.write(|tx| AnalysisStore::new(tx).upsert(&record))?))
            .await?;
        analysis.id = Some(analysis_id);
        debug!("Cached analysis {} for entry {}", analysis_id, entry_id);
        Ok(analysis)
    }

    /// Card for an entry; the default card when it has not been analyzed
    pub fn get_mind_card_preview_by_entry_id(&self, entry_id: EntryId) -> AppResult<MindCardPreview> {
        let (entry, analysis) = self.storage.read(|conn| {
            let entry = EntryStore::new(conn).get_by_id(entry_id)?;
            let analysis = AnalysisStore::new(conn).get_by_entry_id(entry_id)?;
            Ok((entry, analysis))
        })?;
        let entry = entry.ok_or_else(|| AppError::NotFound(format!("entry {}", entry_id)))?;
        Ok(MindCardPreview::build(entry_id, &entry, analysis.as_ref()))
    }

    /// Full analysis view; always exactly three mission slots
    pub fn get_mind_card_detail_by_entry_id(&self, entry_id: EntryId) -> AppResult<MindCardDetail> {
        let analysis = self
            .storage
            .read(|conn| AnalysisStore::new(conn).get_by_entry_id(entry_id))?
            .ok_or_else(|| AppError::NotFound(format!("analysis for entry {}", entry_id)))?;
        Ok(MindCardDetail::from_analysis(&analysis))
    }

    /// Returns false when the owner has no entry with that id
    pub fn set_entry_favorite(&self, owner: &Owner, entry_id: EntryId, value: bool) -> AppResult<bool> {
        let changed = self
            .storage
            .write(|tx| EntryStore::new(tx).set_favorite(owner, entry_id, value))?;
        debug!("Favorite {} on entry {}: {}", value, entry_id, changed);
        Ok(changed)
    }

    /// Favorite cards of the owner, newest first
    pub fn get_mind_card_archive(&self, owner: &Owner) -> AppResult<Vec<MindCardPreview>> {
        Ok(self.storage.read(|conn| {
            let analyses = AnalysisStore::new(conn);
            let mut cards = Vec::new();
            for entry in EntryStore::new(conn).get_favorites(owner)? {
                let Some(id) = entry.id else { continue };
                let analysis = analyses.get_by_entry_id(id)?;
                cards.push(MindCardPreview::build(id, &entry, analysis.as_ref()));
            }
            Ok(cards)
        })?)
    }
}
