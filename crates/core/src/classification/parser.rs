//! Extraction of a structured judgment from free-form model output

use focusflow_domain::constants::NEUTRAL_FOCUS_SCORE;
use focusflow_domain::Classification;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use super::fallback::CATEGORY_GENERAL;

/// Outermost `{...}` span, across newlines.
static JSON_OBJECT: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"(?s)\{.*\}").ok());

const DEFAULT_EXPLANATION: &str = "Focus analysis completed";

/// Parse the first JSON object embedded in `output`.
///
/// Missing fields fall back to neutral defaults; only the absence of a
/// parseable object yields `None`. `isProductive` is true unless the model
/// explicitly says `false`.
pub fn parse_model_output(output: &str) -> Option<Classification> {
    let span = JSON_OBJECT.as_ref()?.find(output)?;
    let value: Value = serde_json::from_str(span.as_str()).ok()?;
    let object = value.as_object()?;

    let focus_score = object
        .get("focusScore")
        .and_then(score_from_value)
        .unwrap_or(NEUTRAL_FOCUS_SCORE);
    let explanation = non_empty_str(object.get("explanation")).unwrap_or(DEFAULT_EXPLANATION);
    let category = non_empty_str(object.get("category")).unwrap_or(CATEGORY_GENERAL);
    let is_productive = object.get("isProductive").and_then(Value::as_bool) != Some(false);

    Some(Classification::new(focus_score, explanation, category, is_productive))
}

fn score_from_value(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s.trim().parse::<f64>().ok().map(|f| f.round() as i64),
        _ => None,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str).map(str::trim).filter(|s| !s.is_empty())
}
