//! JSON parsing of discovery responses.
//!
//! Accepts a single object or an array of objects with fields
//! `{type, name, confidence, reasoning}`. Markdown code fences are stripped
//! before parsing. Confidences slightly outside [0, 1] are clamped; grossly
//! out-of-range values are rejected as parse failures.

use super::{DiscoveryKind, DiscoveryMatch, DiscoveryResult, LlmResponse};
use crate::error::DiscoveryError;
use regex::Regex;
use std::sync::LazyLock;

/// Tolerance for floating-point slop in reported confidences.
const CONFIDENCE_SLACK: f64 = 0.01;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").expect("fence pattern is valid")
});

/// Parse an LLM response into a ranked discovery result.
pub fn parse_response(response: &LlmResponse) -> Result<DiscoveryResult, DiscoveryError> {
    let mut matches = parse_matches(&response.text)?;
    matches.sort_by(|a, b| {
        b.confidence
            .partial_cmp(&a.confidence)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(DiscoveryResult {
        matches,
        raw_response: response.text.clone(),
        model: response.model.clone(),
        prompt_tokens: response.prompt_tokens,
        completion_tokens: response.completion_tokens,
    })
}

fn parse_matches(text: &str) -> Result<Vec<DiscoveryMatch>, DiscoveryError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let json_text = match CODE_FENCE.captures(trimmed) {
        Some(captures) => captures.get(1).map_or(trimmed, |m| m.as_str()),
        None => trimmed,
    };

    let value: serde_json::Value = serde_json::from_str(json_text)
        .map_err(|e| DiscoveryError::Parse(format!("invalid JSON: {e}")))?;

    match value {
        serde_json::Value::Object(_) => Ok(vec![validate_match(&value)?]),
        serde_json::Value::Array(items) => items.iter().map(validate_match).collect(),
        other => Err(DiscoveryError::Parse(format!(
            "expected JSON object or array, got {}",
            json_type_name(&other)
        ))),
    }
}

fn validate_match(value: &serde_json::Value) -> Result<DiscoveryMatch, DiscoveryError> {
    let object = value
        .as_object()
        .ok_or_else(|| DiscoveryError::Parse("match entries must be objects".to_string()))?;

    for field in ["type", "name", "confidence", "reasoning"] {
        if !object.contains_key(field) {
            return Err(DiscoveryError::Parse(format!(
                "missing required field '{field}'"
            )));
        }
    }

    let kind = match object["type"].as_str() {
        Some("task") => DiscoveryKind::Task,
        Some("skill") => DiscoveryKind::Skill,
        Some(other) => {
            return Err(DiscoveryError::Parse(format!(
                "invalid type '{other}', must be 'task' or 'skill'"
            )))
        }
        None => return Err(DiscoveryError::Parse("'type' must be a string".to_string())),
    };

    let name = object["name"]
        .as_str()
        .filter(|n| !n.is_empty())
        .ok_or_else(|| DiscoveryError::Parse("'name' must be a non-empty string".to_string()))?;

    let confidence = object["confidence"]
        .as_f64()
        .ok_or_else(|| DiscoveryError::Parse("'confidence' must be a number".to_string()))?;
    let confidence = clamp_confidence(confidence)?;

    let reasoning = object["reasoning"]
        .as_str()
        .filter(|r| !r.is_empty())
        .ok_or_else(|| {
            DiscoveryError::Parse("'reasoning' must be a non-empty string".to_string())
        })?;

    Ok(DiscoveryMatch {
        kind,
        name: name.to_string(),
        confidence,
        reasoning: reasoning.to_string(),
    })
}

fn clamp_confidence(confidence: f64) -> Result<f64, DiscoveryError> {
    if confidence < -CONFIDENCE_SLACK {
        return Err(DiscoveryError::Parse(format!(
            "confidence {confidence} is below 0.0"
        )));
    }
    if confidence > 1.0 + CONFIDENCE_SLACK {
        return Err(DiscoveryError::Parse(format!(
            "confidence {confidence} is above 1.0"
        )));
    }
    Ok(confidence.clamp(0.0, 1.0))
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
