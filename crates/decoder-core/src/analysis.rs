//! Typed shape of the comment analysis produced by the external engine.
//!
//! Raw engine output is parsed once, here. Everything downstream works on
//! [`AnalysisResult`] and never touches untyped JSON.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }

    /// Capitalized form for headings.
    pub fn title(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Tactic {
    pub name: String,
    /// Expected in [0, 1]; not enforced.
    pub confidence: f64,
    /// Literal quotes from the comment backing this tactic.
    #[serde(default)]
    pub evidence_phrases: Vec<String>,
}

impl Tactic {
    /// Confidence as a whole percent, clamped to 0..=100. NaN reads as 0.
    pub fn confidence_percent(&self) -> u8 {
        let c = if self.confidence.is_nan() {
            0.0
        } else {
            self.confidence.clamp(0.0, 1.0)
        };
        (c * 100.0).round() as u8
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Risk {
    pub level: RiskLevel,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub contains_hate_or_slur: bool,
    #[serde(default)]
    pub contains_threat: bool,
    #[serde(default)]
    pub sexual_harassment: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct RecommendedAction {
    pub primary: String,
    pub why: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct AnalysisResult {
    pub likely_goal: String,
    #[serde(default)]
    pub tactics: Vec<Tactic>,
    pub translation_plain: String,
    pub translation_intent: String,
    pub risk: Risk,
    pub recommended_action: RecommendedAction,
    /// Suggested reply per strategy; `None` or empty when the engine produced none.
    #[serde(default)]
    pub replies: BTreeMap<String, Option<String>>,
    #[serde(default)]
    pub coach_notes: Vec<String>,
}

impl AnalysisResult {
    pub fn is_high_risk(&self) -> bool {
        self.risk.level == RiskLevel::High
    }

    /// Replies that are present and non-empty, in strategy key order.
    pub fn available_replies(&self) -> impl Iterator<Item = (&str, &str)> {
        self.replies.iter().filter_map(|(k, v)| match v.as_deref() {
            Some(text) if !text.is_empty() => Some((k.as_str(), text)),
            _ => None,
        })
    }
}

/// Parse raw engine output into an [`AnalysisResult`].
///
/// The outermost JSON object is extracted first, so prose or code fences around
/// it are ignored. Anything that does not fit the schema, including an unknown
/// risk level, is rejected rather than coerced.
pub fn parse_analysis(raw: &str) -> Result<AnalysisResult, AnalysisError> {
    let json = extract_json_object(raw).ok_or(AnalysisError::NoPayload)?;
    serde_json::from_str(json).map_err(|e| {
        tracing::warn!(error = %e, "rejecting analysis payload");
        AnalysisError::Contract(e.to_string())
    })
}

fn extract_json_object(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&raw[start..=end])
}

/// JSON Schema the analysis engine's output must satisfy.
pub fn analysis_schema() -> Result<String, serde_json::Error> {
    let schema = schemars::schema_for!(AnalysisResult);
    serde_json::to_string_pretty(&schema)
}
