//! Response schemas sent to the collaborator, and the checks applied to what comes back.
//!
//! The collaborator is an LLM: a response that parses can still break the contract.
//! Anything that fails here is reported as `LlmError::Schema`, never trusted.

use serde_json::{json, Value};

use crate::llm_client::LlmError;
use crate::models::analysis::PolicyAnalysisResult;
use crate::models::media::ThemeResult;

/// Palette slots requested from theme extraction, in display order.
pub const THEME_SLOTS: [&str; 5] = ["primary", "secondary", "accent", "neutral", "background"];

fn string_array() -> Value {
    json!({ "type": "ARRAY", "items": { "type": "STRING" } })
}

/// Schema for the primary analysis. `imageAnalysis` becomes required when images were sent.
pub fn analysis_schema(require_image_analysis: bool) -> Value {
    let image_analysis = json!({
        "type": "OBJECT",
        "properties": {
            "policyViolations": string_array(),
            "layoutFeedback": string_array(),
            "brandingFeedback": string_array(),
            "layoutSuggestions": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING" },
                        "description": { "type": "STRING" }
                    },
                    "required": ["name", "description"]
                }
            }
        },
        "required": ["policyViolations", "layoutFeedback", "brandingFeedback", "layoutSuggestions"]
    });

    let mut required = vec!["status", "summary", "violations", "suggestions", "fixedContent"];
    if require_image_analysis {
        required.push("imageAnalysis");
    }

    json!({
        "type": "OBJECT",
        "properties": {
            "status": {
                "type": "STRING",
                "enum": ["compliant", "non_compliant", "warning"]
            },
            "summary": { "type": "STRING" },
            "violations": {
                "type": "ARRAY",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "rule": { "type": "STRING" },
                        "explanation": { "type": "STRING" },
                        "severity": { "type": "STRING", "enum": ["high", "medium", "low"] }
                    },
                    "required": ["rule", "explanation", "severity"]
                }
            },
            "suggestions": string_array(),
            "fixedContent": { "type": "STRING" },
            "imageAnalysis": image_analysis
        },
        "required": required
    })
}

pub fn theme_schema() -> Value {
    let slots: serde_json::Map<String, Value> = THEME_SLOTS
        .iter()
        .map(|slot| {
            (
                slot.to_string(),
                json!({ "type": "STRING", "description": "Hex colour, e.g. #1A2B3C" }),
            )
        })
        .collect();

    json!({
        "type": "OBJECT",
        "properties": {
            "colors": {
                "type": "OBJECT",
                "properties": slots,
                "required": THEME_SLOTS
            },
            "explanation": { "type": "STRING" }
        },
        "required": ["colors", "explanation"]
    })
}

/// Post-parse checks on the primary analysis.
///
/// Enhancement fields belong to this service, so anything the model put there is dropped.
pub fn check_analysis(mut result: PolicyAnalysisResult) -> Result<PolicyAnalysisResult, LlmError> {
    if result.summary.trim().is_empty() {
        return Err(LlmError::Schema("analysis summary is empty".to_string()));
    }
    if let Some(v) = result.violations.iter().find(|v| v.rule.trim().is_empty()) {
        return Err(LlmError::Schema(format!(
            "violation without a rule name: {:?}",
            v.explanation
        )));
    }
    result.generated_image = None;
    result.lifestyle_content = None;
    Ok(result)
}

/// Every requested slot present, every value a `#RRGGBB` colour. Hex is upper-cased.
pub fn check_theme(mut theme: ThemeResult) -> Result<ThemeResult, LlmError> {
    for slot in THEME_SLOTS {
        match theme.colors.get_mut(slot) {
            Some(hex) if is_hex_color(hex) => *hex = hex.to_ascii_uppercase(),
            Some(hex) => {
                return Err(LlmError::Schema(format!(
                    "colour slot '{slot}' is not a hex colour: {hex:?}"
                )))
            }
            None => return Err(LlmError::Schema(format!("colour slot '{slot}' missing"))),
        }
    }
    Ok(theme)
}

pub fn is_hex_color(value: &str) -> bool {
    value
        .strip_prefix('#')
        .is_some_and(|hex| hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
