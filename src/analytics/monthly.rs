/// Monthly analyzer: condense one month of entries into a summary
///
/// The summary is computed locally from mood and tag counts. The month is
/// split into thirds (days 1-10, 11-20, 21-end) to describe how the mood
/// moved; consecutive thirds with the same dominant mood collapse into one
/// step of the flow.

use chrono::{DateTime, Datelike, Utc};

use crate::analytics::rank_by_frequency;
use crate::domain::{DiaryEntry, Mood, MonthlySummary, Owner, YearMonth, MAX_KEYWORDS};

const FLOW_SEPARATOR: &str = " -> ";

pub struct MonthlyAnalyzer;

impl MonthlyAnalyzer {
    /// Build the summary for `ym`, or `None` when the month has no entries
    ///
    /// Entries outside `ym` are ignored.
    pub fn summarize(
        owner: &Owner,
        ym: YearMonth,
        entries: &[DiaryEntry],
        now: DateTime<Utc>,
    ) -> Option<MonthlySummary> {
        let mut month: Vec<&DiaryEntry> = entries.iter().filter(|e| ym.contains(e.date)).collect();
        if month.is_empty() {
            return None;
        }
        month.sort_by_key(|e| e.date);

        let moods = rank_by_frequency(month.iter().map(|e| e.mood));
        let (dominant, dominant_count) = moods.first().copied()?;
        let keywords = Self::keywords(&month);

        let one_line_summary = format!(
            "A month that leaned {} ({} of {} entries).",
            dominant.label().to_lowercase(),
            dominant_count,
            month.len()
        );
        let detail_summary = Self::detail(ym, &month, &moods, &keywords);

        Some(
            MonthlySummary {
                owner: owner.clone(),
                year_month: ym,
                dominant_mood: dominant,
                one_line_summary,
                detail_summary,
                emotion_flow: Self::emotion_flow(&month),
                keywords: Vec::new(),
                updated_at: now,
            }
            .with_keywords(keywords),
        )
    }

    /// The most used tag in the given entries, if any tag was used
    pub fn top_tag(entries: &[DiaryEntry]) -> Option<String> {
        rank_by_frequency(entries.iter().flat_map(|e| e.tags.iter()))
            .first()
            .map(|(tag, _)| tag.to_string())
    }

    fn keywords(month: &[&DiaryEntry]) -> Vec<String> {
        rank_by_frequency(month.iter().flat_map(|e| e.tags.iter()))
            .into_iter()
            .take(MAX_KEYWORDS)
            .map(|(tag, _)| tag.clone())
            .collect()
    }

    fn emotion_flow(month: &[&DiaryEntry]) -> String {
        let mut flow: Vec<Mood> = Vec::new();
        for third in 0..3u32 {
            let segment = month
                .iter()
                .filter(|e| ((e.date.day() - 1) / 10).min(2) == third)
                .map(|e| e.mood);
            if let Some((mood, _)) = rank_by_frequency(segment).first() {
                if flow.last() != Some(mood) {
                    flow.push(*mood);
                }
            }
        }
        flow.iter()
            .map(|m| m.code())
            .collect::<Vec<_>>()
            .join(FLOW_SEPARATOR)
    }

    fn detail(ym: YearMonth, month: &[&DiaryEntry], moods: &[(Mood, usize)], keywords: &[String]) -> String {
        let breakdown = moods
            .iter()
            .map(|(mood, count)| format!("{} {}", mood.label(), count))
            .collect::<Vec<_>>()
            .join(", ");

        let mut detail = format!(
            "You wrote {} entries in {}. Moods: {}.",
            month.len(),
            ym,
            breakdown
        );
        if !keywords.is_empty() {
            detail.push_str(&format!(" You wrote most about {}.", keywords.join(", ")));
        }
        detail
    }
}
