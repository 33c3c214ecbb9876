//! Response Normalizer: turns raw model text into validated job description records.
//!
//! Stages: `sanitize` (text → candidate JSON text) → strict decode → shape check
//! per element (`validate_candidate`) → `Normalized`. Never fails: unusable output
//! degrades to a single fallback record. Logging is left to the caller, which can
//! tell real output from the fallback through the `Normalized` variant.

use std::fmt;
use std::str::FromStr;

use serde::de::IgnoredAny;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::models::job_description::JobDescriptionRecord;

// ────────────────────────────────────────────────────────────────────────────
// Sanitize stage
// ────────────────────────────────────────────────────────────────────────────

/// How much the raw model text is massaged before JSON decoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonExtraction {
    /// Decode the text exactly as the model produced it.
    #[default]
    Strict,
    /// Strip markdown code fences and surrounding prose before decoding.
    Lenient,
}

#[derive(Debug, Error)]
#[error("unknown JSON extraction mode '{0}'")]
pub struct UnknownExtractionMode(String);

impl FromStr for JsonExtraction {
    type Err = UnknownExtractionMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(JsonExtraction::Strict),
            "lenient" => Ok(JsonExtraction::Lenient),
            other => Err(UnknownExtractionMode(other.to_string())),
        }
    }
}

/// Produces the text handed to the JSON decoder.
pub fn sanitize(raw: &str, mode: JsonExtraction) -> &str {
    match mode {
        JsonExtraction::Strict => raw,
        JsonExtraction::Lenient => extract_json_span(strip_json_fences(raw)),
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let Some(stripped) = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"))
    else {
        return text;
    };
    let stripped = stripped.trim_start();
    stripped
        .strip_suffix("```")
        .map(|s| s.trim())
        .unwrap_or(stripped)
}

/// Cuts the text down to the first span that decodes as JSON, trying each opening
/// bracket in turn against the last matching closing bracket. Brackets in leading
/// prose (`"the [3] variations"`) are skipped. Returns the input unchanged if no
/// span decodes.
fn extract_json_span(text: &str) -> &str {
    text.match_indices(&['[', '{'][..])
        .filter_map(|(start, open)| {
            let close = if open == "[" { ']' } else { '}' };
            let end = text.rfind(close).filter(|end| *end > start)?;
            Some(&text[start..=end])
        })
        .find(|span| serde_json::from_str::<IgnoredAny>(span).is_ok())
        .unwrap_or(text)
}

// ────────────────────────────────────────────────────────────────────────────
// Shape validation
// ────────────────────────────────────────────────────────────────────────────

/// A single reason a decoded element was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldIssue {
    NotAnObject,
    Missing(&'static str),
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldIssue::NotAnObject => write!(f, "element is not a JSON object"),
            FieldIssue::Missing(field) => write!(f, "missing field '{field}'"),
            FieldIssue::WrongType { field, expected } => {
                write!(f, "field '{field}' is not {expected}")
            }
        }
    }
}

/// Checks one decoded element against the six-field record shape.
///
/// Unknown keys are ignored. All field problems are collected, not just the first.
/// `experience` accepts integers, integral floats and integer strings.
pub fn validate_candidate(value: &Value) -> Result<JobDescriptionRecord, Vec<FieldIssue>> {
    let Some(object) = value.as_object() else {
        return Err(vec![FieldIssue::NotAnObject]);
    };

    let mut issues = Vec::new();

    let designation = string_field(object, "designation", &mut issues);
    let experience = integer_field(object, "experience", &mut issues);
    let skills = string_list_field(object, "skills", &mut issues);
    let description = string_field(object, "description", &mut issues);
    let responsibilities = string_list_field(object, "responsibilities", &mut issues);
    let requirements = string_list_field(object, "requirements", &mut issues);

    match (
        designation,
        experience,
        skills,
        description,
        responsibilities,
        requirements,
    ) {
        (
            Some(designation),
            Some(experience),
            Some(skills),
            Some(description),
            Some(responsibilities),
            Some(requirements),
        ) => Ok(JobDescriptionRecord {
            designation,
            experience,
            skills,
            description,
            responsibilities,
            requirements,
        }),
        _ => Err(issues),
    }
}

fn field<'a>(
    object: &'a Map<String, Value>,
    name: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<&'a Value> {
    let value = object.get(name);
    if value.is_none() {
        issues.push(FieldIssue::Missing(name));
    }
    value
}

fn string_field(
    object: &Map<String, Value>,
    name: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<String> {
    let value = field(object, name, issues)?;
    match value.as_str() {
        Some(s) => Some(s.to_string()),
        None => {
            issues.push(FieldIssue::WrongType {
                field: name,
                expected: "a string",
            });
            None
        }
    }
}

fn integer_field(
    object: &Map<String, Value>,
    name: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<i64> {
    let value = field(object, name, issues)?;
    let parsed = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= i64::MIN as f64 && *f <= i64::MAX as f64)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    if parsed.is_none() {
        issues.push(FieldIssue::WrongType {
            field: name,
            expected: "an integer",
        });
    }
    parsed
}

fn string_list_field(
    object: &Map<String, Value>,
    name: &'static str,
    issues: &mut Vec<FieldIssue>,
) -> Option<Vec<String>> {
    let value = field(object, name, issues)?;
    let list = value.as_array().and_then(|items| {
        items
            .iter()
            .map(|item| item.as_str().map(str::to_string))
            .collect::<Option<Vec<_>>>()
    });
    if list.is_none() {
        issues.push(FieldIssue::WrongType {
            field: name,
            expected: "a list of strings",
        });
    }
    list
}

// ────────────────────────────────────────────────────────────────────────────
// Normalize
// ────────────────────────────────────────────────────────────────────────────

/// Why the fallback record was substituted.
#[derive(Debug, Clone, PartialEq)]
pub enum FallbackReason {
    /// The sanitized text was not valid JSON.
    MalformedJson(String),
    /// Valid JSON, but neither an array nor an object.
    UnexpectedShape(&'static str),
    /// Every candidate element failed shape validation.
    EmptyAcceptedBatch { rejected: usize },
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FallbackReason::MalformedJson(e) => write!(f, "malformed JSON: {e}"),
            FallbackReason::UnexpectedShape(kind) => {
                write!(f, "expected a JSON array or object, got {kind}")
            }
            FallbackReason::EmptyAcceptedBatch { rejected } => {
                write!(f, "all {rejected} candidate elements failed validation")
            }
        }
    }
}

/// Outcome of normalization, tagged so callers can observe fallbacks.
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
    Parsed {
        records: Vec<JobDescriptionRecord>,
        /// Per-element rejections, by index in the decoded batch.
        rejected: Vec<(usize, Vec<FieldIssue>)>,
    },
    Fallback {
        record: JobDescriptionRecord,
        reason: FallbackReason,
    },
}

impl Normalized {
    #[cfg(test)]
    pub fn is_fallback(&self) -> bool {
        matches!(self, Normalized::Fallback { .. })
    }

    /// The public, always non-empty record list.
    pub fn into_records(self) -> Vec<JobDescriptionRecord> {
        match self {
            Normalized::Parsed { records, .. } => records,
            Normalized::Fallback { record, .. } => vec![record],
        }
    }
}

/// Parses, validates and, when necessary, replaces the model's reply.
///
/// `designation_lower`, `years_of_experience` and `cleaned_skills` only feed the
/// fallback record; accepted records carry whatever the model emitted.
pub fn normalize(
    raw: &str,
    mode: JsonExtraction,
    designation_lower: &str,
    years_of_experience: u32,
    cleaned_skills: &[String],
) -> Normalized {
    let fallback = |reason| Normalized::Fallback {
        record: JobDescriptionRecord::fallback(
            designation_lower,
            years_of_experience,
            cleaned_skills,
        ),
        reason,
    };

    let decoded: Value = match serde_json::from_str(sanitize(raw, mode)) {
        Ok(value) => value,
        Err(e) => return fallback(FallbackReason::MalformedJson(e.to_string())),
    };

    let candidates = match decoded {
        Value::Array(items) => items,
        Value::Object(object) => vec![Value::Object(object)],
        Value::Null => return fallback(FallbackReason::UnexpectedShape("null")),
        Value::Bool(_) => return fallback(FallbackReason::UnexpectedShape("a boolean")),
        Value::Number(_) => return fallback(FallbackReason::UnexpectedShape("a number")),
        Value::String(_) => return fallback(FallbackReason::UnexpectedShape("a string")),
    };

    let mut records = Vec::with_capacity(candidates.len());
    let mut rejected = Vec::new();

    for (index, candidate) in candidates.iter().enumerate() {
        match validate_candidate(candidate) {
            Ok(record) => records.push(record),
            Err(issues) => rejected.push((index, issues)),
        }
    }

    if records.is_empty() {
        return fallback(FallbackReason::EmptyAcceptedBatch {
            rejected: rejected.len(),
        });
    }

    Normalized::Parsed { records, rejected }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
