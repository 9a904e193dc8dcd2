//! Turns raw vision-model text into a typed `AnalysisResult`.
//!
//! Model output is unreliable free text: the JSON may be wrapped in prose,
//! truncated, or carry stringified numbers. Every ambiguity degrades to
//! `NoFood` instead of fabricating nutrition data, and `interpret` never
//! fails.

use serde_json::Value;

use crate::models::{AnalysisResult, NutritionItem};

/// Interpret a raw model response. Total: always returns a value.
pub fn interpret(raw: &str) -> AnalysisResult {
    let Some(span) = find_json_object(raw) else {
        log::debug!("🔍 No JSON object found in model response, assuming no food");
        return AnalysisResult::NoFood;
    };

    let value: Value = match serde_json::from_str(span) {
        Ok(value) => value,
        Err(err) => {
            log::debug!("🔍 Extracted span is not valid JSON ({}), assuming no food", err);
            return AnalysisResult::NoFood;
        }
    };

    classify(&value)
}

/// Locate the first balanced `{...}` span in free text.
///
/// Quotes and escapes are respected so braces inside string values do not
/// unbalance the scan. Returns `None` when the first `{` never closes.
fn find_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Decide between `NoFood` and a normalized item list.
///
/// An explicit `has_food: false`, a missing or empty `items` array, or any
/// other shape all mean "no food". Only a non-empty `items` array produces
/// items.
fn classify(value: &Value) -> AnalysisResult {
    if value.get("has_food").and_then(Value::as_bool) == Some(false) {
        return AnalysisResult::NoFood;
    }

    match value.get("items").and_then(Value::as_array) {
        Some(items) if !items.is_empty() => {
            AnalysisResult::from_items(items.iter().map(normalize_item).collect())
        }
        _ => AnalysisResult::NoFood,
    }
}

fn normalize_item(raw: &Value) -> NutritionItem {
    NutritionItem {
        // Empty names are allowed; the display layer substitutes a generic label.
        name: raw
            .get("item_name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        calories: coerce_number(raw.get("total_calories")),
        protein_grams: coerce_number(raw.get("total_protein")),
        carbs_grams: coerce_number(raw.get("total_carbs")),
        fats_grams: coerce_number(raw.get("total_fats")),
    }
}

/// Lenient numeric coercion: numbers pass through, numeric strings are
/// parsed, anything else becomes 0. Negative and non-finite values clamp
/// to 0.
fn coerce_number(value: Option<&Value>) -> f64 {
    let n = match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_finite() && n > 0.0 {
        n
    } else {
        0.0
    }
}
