//! Policy analysis shapes. These mirror the collaborator's JSON contract,
//! hence camelCase on the wire.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceStatus {
    Compliant,
    NonCompliant,
    Warning,
}

impl ComplianceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "Compliant",
            ComplianceStatus::NonCompliant => "Non-compliant",
            ComplianceStatus::Warning => "Warning",
        }
    }

    /// Badge colour used by the printable report.
    pub fn color(&self) -> &'static str {
        match self {
            ComplianceStatus::Compliant => "#22c55e",
            ComplianceStatus::NonCompliant => "#ef4444",
            ComplianceStatus::Warning => "#f59e0b",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    pub rule: String,
    pub explanation: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSuggestion {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub policy_violations: Vec<String>,
    pub layout_feedback: Vec<String>,
    pub branding_feedback: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout_suggestions: Option<Vec<LayoutSuggestion>>,
}

impl ImageAnalysis {
    /// Layout feedback flattened into one sentence list for follow-up prompts.
    pub fn layout_brief(&self) -> String {
        self.layout_feedback.join(". ")
    }

    /// `name: description` pairs of the creative suggestions.
    pub fn suggestions_brief(&self) -> String {
        self.layout_suggestions
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|s| format!("{}: {}", s.name, s.description))
            .collect::<Vec<_>>()
            .join(". ")
    }
}

/// Full analysis result. `generated_image` and `lifestyle_content` are filled by
/// the best-effort enhancement calls and stay `None` when those fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicyAnalysisResult {
    pub status: ComplianceStatus,
    pub summary: String,
    pub violations: Vec<Violation>,
    pub suggestions: Vec<String>,
    pub fixed_content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_analysis: Option<ImageAnalysis>,
    /// Base64 image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub generated_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle_content: Option<String>,
}

/// Kind of ad being checked. `ImageAd` requires at least one image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    TextPost,
    ImageAd,
    VideoScript,
    LandingPage,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::TextPost => "Text post",
            ContentType::ImageAd => "Image ad",
            ContentType::VideoScript => "Video script",
            ContentType::LandingPage => "Landing page",
        }
    }

    pub fn requires_images(&self) -> bool {
        matches!(self, ContentType::ImageAd)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckType {
    FacebookPolicy,
    AdvertisingLaw,
    Comprehensive,
}

impl CheckType {
    pub fn label(&self) -> &'static str {
        match self {
            CheckType::FacebookPolicy => "Facebook advertising policy",
            CheckType::AdvertisingLaw => "Local advertising law",
            CheckType::Comprehensive => "Comprehensive (policy and law)",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_result_parses_collaborator_shape() {
        let result: PolicyAnalysisResult = serde_json::from_value(json!({
            "status": "non_compliant",
            "summary": "Health claim detected",
            "violations": [{"rule": "Health claims", "explanation": "Cures", "severity": "high"}],
            "suggestions": ["Remove the cure claim"],
            "fixedContent": "Supports wellbeing",
            "imageAnalysis": {
                "policyViolations": [],
                "layoutFeedback": ["Center the product"],
                "brandingFeedback": []
            }
        }))
        .unwrap();
        assert_eq!(result.status, ComplianceStatus::NonCompliant);
        assert_eq!(result.violations[0].severity, Severity::High);
        assert!(result.image_analysis.unwrap().layout_suggestions.is_none());
        assert!(result.generated_image.is_none());
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let parsed: Result<PolicyAnalysisResult, _> = serde_json::from_value(json!({
            "status": "probably_fine",
            "summary": "",
            "violations": [],
            "suggestions": [],
            "fixedContent": ""
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let parsed: Result<Violation, _> = serde_json::from_value(json!({
            "rule": "r", "explanation": "e", "severity": "critical"
        }));
        assert!(parsed.is_err());
    }

    #[test]
    fn test_optional_fields_are_omitted_when_absent() {
        let result = PolicyAnalysisResult {
            status: ComplianceStatus::Compliant,
            summary: "ok".to_string(),
            violations: vec![],
            suggestions: vec![],
            fixed_content: "text".to_string(),
            image_analysis: None,
            generated_image: None,
            lifestyle_content: None,
        };
        let value = serde_json::to_value(&result).unwrap();
        assert!(value.get("generatedImage").is_none());
        assert!(value.get("lifestyleContent").is_none());
        assert_eq!(value["fixedContent"], "text");
    }

    #[test]
    fn test_suggestions_brief_joins_pairs() {
        let analysis = ImageAnalysis {
            policy_violations: vec![],
            layout_feedback: vec!["Less clutter".to_string(), "Bigger logo".to_string()],
            branding_feedback: vec![],
            layout_suggestions: Some(vec![LayoutSuggestion {
                name: "Rule of thirds".to_string(),
                description: "Product on the left third".to_string(),
            }]),
        };
        assert_eq!(analysis.layout_brief(), "Less clutter. Bigger logo");
        assert_eq!(
            analysis.suggestions_brief(),
            "Rule of thirds: Product on the left third"
        );
    }

    #[test]
    fn test_only_image_ads_require_images() {
        assert!(ContentType::ImageAd.requires_images());
        assert!(!ContentType::TextPost.requires_images());
        assert!(!ContentType::LandingPage.requires_images());
    }
}
