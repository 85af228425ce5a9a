//! Tone-Steered Prompt Construction
//!
//! Tone is controlled entirely through the instruction text: a tone template
//! is picked from a fixed table, followed by the same structural guidance for
//! every tone, followed by the trimmed user message.
//!
//! ## Prompt Layout
//!
//! 1. **Tone**: one sentence describing the voice of the reply
//! 2. **Structure**: length, no verbatim quoting, acknowledge → help → ask
//! 3. **User message**: the user's text, trimmed

use crate::types::Sentiment;

/// Tone templates keyed by canonical sentiment name
pub const TONE_TEMPLATES: &[(&str, &str)] = &[
    (
        "positive",
        "Write a warm, optimistic paragraph like a supportive friend.",
    ),
    ("neutral", "Write a balanced, calm, factual paragraph."),
    (
        "negative",
        "Write an empathetic paragraph that acknowledges concerns and offers reassurance.",
    ),
];

/// Template used for any tone not in [`TONE_TEMPLATES`]
pub const DEFAULT_TONE_TEMPLATE: &str = "Write a clear, helpful paragraph.";

/// Structural guidance shared by every tone
pub const STRUCTURE_INSTRUCTIONS: &str = "Keep it cohesive (4-6 sentences). \
Do not quote or repeat the user's wording verbatim. \
Acknowledge what they said, add something helpful, and end with one open-ended question.";

/// Look up the tone template for a tone name.
///
/// Keys are matched exactly; anything else gets [`DEFAULT_TONE_TEMPLATE`].
pub fn tone_template(tone: &str) -> &'static str {
    TONE_TEMPLATES
        .iter()
        .find(|(key, _)| *key == tone)
        .map(|(_, template)| *template)
        .unwrap_or(DEFAULT_TONE_TEMPLATE)
}

/// Build the generation instruction for `user_text` in the given tone.
pub fn build_prompt(user_text: &str, tone: &str) -> String {
    format!(
        "{} {} User message: {}",
        tone_template(tone),
        STRUCTURE_INSTRUCTIONS,
        user_text.trim()
    )
}

/// [`build_prompt`] for a canonical sentiment
pub fn build_prompt_for(user_text: &str, sentiment: Sentiment) -> String {
    build_prompt(user_text, sentiment.as_str())
}
