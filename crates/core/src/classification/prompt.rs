//! Prompt sent to the focus judge

/// Build the instruction for judging one screen description.
///
/// The reply format matches what [`super::parser::parse_model_output`] reads.
pub fn build_judge_prompt(screen_description: &str) -> String {
    format!(
        r#"You rate how focused a person is on productive work, based on a description of their screen.

Screen description: "{screen_description}"

Score bands:
- 90-100: deep productive work (coding, writing, research, learning)
- 70-89: mostly work-related
- 50-69: working with some distractions
- 30-49: mostly distracted (social media, entertainment, shopping)
- 0-29: not working at all (games, videos, unrelated content)

Reply with a single JSON object and nothing else:
{{"focusScore": <0-100>, "explanation": "<one sentence>", "category": "<short label>", "isProductive": <true|false>}}"#
    )
}
