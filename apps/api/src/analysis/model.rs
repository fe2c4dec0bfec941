//! Analysis schema — the typed counterpart of the JSON contract in `analysis::prompts`.
//!
//! Model output is not contractually bound to the schema, so every field is
//! coerced on the way in: numbers may arrive as `"8/10"` or `"75%"`, lists as a
//! single string. Only `skills`, `experience`, `resume_quality_score` and
//! `summary` are required; a response missing any of them is a schema violation.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Bumped whenever a field name in the prompt schema changes.
pub const ANALYSIS_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub skills: Skills,
    pub experience: Experience,
    #[serde(default, deserialize_with = "string_list")]
    pub education: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub certifications: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub leadership_roles: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub missing_keywords: Vec<String>,
    /// 1 – 10
    #[serde(deserialize_with = "quality_score")]
    pub resume_quality_score: f64,
    /// 0 – 100
    #[serde(default, deserialize_with = "match_percentage")]
    pub job_match_percentage: f64,
    #[serde(default, deserialize_with = "string_list")]
    pub actionable_improvements: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub missing_sections: Vec<String>,
    #[serde(deserialize_with = "text")]
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Skills {
    #[serde(default, deserialize_with = "string_list")]
    pub technical: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub soft_skills: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    #[serde(default, deserialize_with = "years")]
    pub total_years: f64,
    #[serde(default, deserialize_with = "string_list")]
    pub positions: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub industries: Vec<String>,
    #[serde(default, deserialize_with = "string_list")]
    pub notable_projects: Vec<String>,
    #[serde(default, deserialize_with = "text")]
    pub career_level: String,
}

/// What the AI client hands back: insights, or the terminal error record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisOutcome {
    Degraded { error: String },
    Insights(AnalysisResult),
}

impl AnalysisOutcome {
    pub fn is_degraded(&self) -> bool {
        matches!(self, AnalysisOutcome::Degraded { .. })
    }

    pub fn insights(&self) -> Option<&AnalysisResult> {
        match self {
            AnalysisOutcome::Insights(result) => Some(result),
            AnalysisOutcome::Degraded { .. } => None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Lenient field decoders
// ────────────────────────────────────────────────────────────────────────────

fn string_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Array(items) => items.into_iter().filter_map(scalar_to_string).collect(),
        Value::Null => Vec::new(),
        other => scalar_to_string(other).into_iter().collect(),
    })
}

fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(scalar_to_string(value).unwrap_or_default())
}

fn years<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_number(&value).unwrap_or(0.0).max(0.0))
}

fn quality_score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    lenient_number(&value)
        .map(|score| score.clamp(1.0, 10.0))
        .ok_or_else(|| serde::de::Error::custom(format!("invalid resume_quality_score: {value}")))
}

fn match_percentage<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(lenient_number(&value).unwrap_or(0.0).clamp(0.0, 100.0))
}

fn scalar_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Reads a number from a JSON number or from the leading numeric token of a
/// string such as `"8/10"`, `"75%"` or `"5+ years"`.
fn lenient_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => leading_number(s),
        _ => None,
    }
}

fn leading_number(s: &str) -> Option<f64> {
    let start = s.find(|c: char| c.is_ascii_digit())?;
    let token: String = s[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    token.trim_end_matches('.').parse::<f64>().ok()
}
