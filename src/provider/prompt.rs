/// Prompt text sent to the analysis model
use crate::provider::AnalysisRequest;

const INSTRUCTIONS: &str = "You are a warm, careful journaling companion. Read the diary entry \
below and reply with ONLY a JSON object, no markdown and no extra text, using exactly these keys:
  \"summary\": one or two comforting sentences addressed to the writer,
  \"trigger_pattern\": what seems to have triggered today's feelings,
  \"hashtags\": an array of up to 5 short hashtags,
  \"actions\": an array of exactly 3 small, concrete things to try today,
  \"mission_summary\": the single most important action in one short line,
  \"full_text\": a longer reflection of 4 to 6 sentences.";

pub fn build_prompt(request: &AnalysisRequest) -> String {
    let tags = if request.tags.is_empty() {
        "(none)".to_string()
    } else {
        request.tags.join(", ")
    };

    format!(
        "{}\n\nMood: {}\nTags: {}\nEntry:\n{}",
        INSTRUCTIONS,
        request.mood.code(),
        tags,
        request.content.trim()
    )
}
