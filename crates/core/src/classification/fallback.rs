//! Deterministic keyword classifier
//!
//! Used whenever the external judge is disabled, fails, times out, or answers
//! with something that cannot be parsed.

use focusflow_domain::constants::NEUTRAL_FOCUS_SCORE;
use focusflow_domain::Classification;

const PRODUCTIVE_KEYWORDS: &[&str] = &[
    "code",
    "coding",
    "programming",
    "development",
    "vscode",
    "ide",
    "document",
    "writing",
    "editor",
    "research",
    "study",
    "learning",
    "work",
    "project",
    "analysis",
    "spreadsheet",
    "presentation",
    "terminal",
    "command",
    "database",
    "api",
    "documentation",
];

const DISTRACTION_KEYWORDS: &[&str] = &[
    "youtube",
    "netflix",
    "facebook",
    "instagram",
    "twitter",
    "tiktok",
    "games",
    "gaming",
    "entertainment",
    "shopping",
    "social media",
    "chat",
    "messaging",
    "news",
    "reddit",
    "memes",
];

/// Label for work-like screens
pub const CATEGORY_PRODUCTIVE: &str = "Productive Work";
/// Label for leisure screens
pub const CATEGORY_DISTRACTION: &str = "Distraction";
/// Label when no keyword decides
pub const CATEGORY_GENERAL: &str = "General";

/// Keyword-count heuristic over a lower-cased screen description.
///
/// Each keyword counts once if it appears anywhere as a substring. Ties,
/// including no matches at all, resolve to a neutral 50 labelled productive.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeywordClassifier;

impl KeywordClassifier {
    /// Score `screen_description` by keyword counts.
    pub fn classify(&self, screen_description: &str) -> Classification {
        let text = screen_description.to_lowercase();
        let productive = count_matches(&text, PRODUCTIVE_KEYWORDS);
        let distracting = count_matches(&text, DISTRACTION_KEYWORDS);

        let (score, category, is_productive) = if productive > distracting {
            ((60 + 10 * productive).min(90), CATEGORY_PRODUCTIVE, true)
        } else if distracting > productive {
            ((40 - 10 * distracting).max(10), CATEGORY_DISTRACTION, false)
        } else {
            (NEUTRAL_FOCUS_SCORE, CATEGORY_GENERAL, true)
        };

        Classification::new(
            score,
            format!(
                "Analysis based on screen content keywords. Productive indicators: \
                 {productive}, Distraction indicators: {distracting}"
            ),
            category,
            is_productive,
        )
    }
}

fn count_matches(text: &str, keywords: &[&str]) -> i64 {
    keywords.iter().filter(|keyword| text.contains(*keyword)).count() as i64
}
