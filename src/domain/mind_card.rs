/// Mind card views: a diary entry bundled with its (cached or default) analysis
///
/// The preview is what the home screen and the archive show: one comfort
/// line and one mission. The detail view carries the full analysis and always
/// exposes exactly three mission slots.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::{AiAnalysis, DiaryEntry, EntryId, Mood};

pub const DEFAULT_COMFORT: &str =
    "You did well to write today down. Whatever the day held, it is okay to rest now.";
pub const DEFAULT_MISSION: &str = "Drink a glass of water and take three slow breaths.";

/// Number of mission slots shown on the detail card
pub const DETAIL_MISSION_SLOTS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindCardPreview {
    pub entry_id: EntryId,
    pub date: NaiveDate,
    pub title: String,
    pub mood: Mood,
    pub tags: Vec<String>,
    pub comfort_preview: String,
    pub mission: String,
}

impl MindCardPreview {
    /// Build a preview from an entry and, if present, its analysis
    ///
    /// Comfort prefers the analysis summary, then the first two sentences of
    /// the full text; the mission prefers the first action, then the mission
    /// summary. Anything still blank falls back to the defaults.
    pub fn build(entry_id: EntryId, entry: &DiaryEntry, analysis: Option<&AiAnalysis>) -> Self {
        let comfort = analysis
            .and_then(|a| {
                non_blank(&a.summary).or_else(|| non_blank(&first_sentences(&a.full_text, 2)))
            })
            .unwrap_or_else(|| DEFAULT_COMFORT.to_string());

        let mission = analysis
            .and_then(|a| {
                a.actions
                    .iter()
                    .find_map(|action| non_blank(action))
                    .or_else(|| non_blank(&a.mission_summary))
            })
            .unwrap_or_else(|| DEFAULT_MISSION.to_string());

        Self {
            entry_id,
            date: entry.date,
            title: entry.title.clone(),
            mood: entry.mood,
            tags: entry.tags.clone(),
            comfort_preview: comfort,
            mission,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MindCardDetail {
    pub entry_id: EntryId,
    pub summary: String,
    pub trigger_pattern: String,
    pub hashtags: Vec<String>,
    /// Always exactly `DETAIL_MISSION_SLOTS` long; missing slots are empty
    pub missions: Vec<String>,
    pub mission_summary: String,
    pub full_text: String,
}

impl MindCardDetail {
    pub fn from_analysis(analysis: &AiAnalysis) -> Self {
        Self {
            entry_id: analysis.entry_id,
            summary: analysis.summary.clone(),
            trigger_pattern: analysis.trigger_pattern.clone(),
            hashtags: analysis.hashtags.clone(),
            missions: normalize_missions(&analysis.actions),
            mission_summary: analysis.mission_summary.clone(),
            full_text: analysis.full_text.clone(),
        }
    }
}

/// Pad or truncate an action list to exactly three slots
pub fn normalize_missions(actions: &[String]) -> Vec<String> {
    let mut missions: Vec<String> = actions.iter().take(DETAIL_MISSION_SLOTS).cloned().collect();
    missions.resize(DETAIL_MISSION_SLOTS, String::new());
    missions
}

fn non_blank(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// The first `count` sentences of a text, split after `.`, `!` or `?`
fn first_sentences(text: &str, count: usize) -> String {
    let mut out = String::new();
    let mut taken = 0;
    for ch in text.trim().chars() {
        out.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            taken += 1;
            if taken == count {
                break;
            }
        }
    }
    out.trim().to_string()
}
