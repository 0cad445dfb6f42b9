//! Scripted collaborator for tests. Counts every call so tests can assert
//! that validation failures never reach the network.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{AdCollaborator, PolicyCheckRequest, ALBUM_DETAIL_COUNT};
use crate::llm_client::LlmError;
use crate::models::analysis::{
    ComplianceStatus, ImageAnalysis, LayoutSuggestion, PolicyAnalysisResult, Severity, Violation,
};
use crate::models::media::{AlbumImage, GeneratedAlbum, ImageInput, ThemeResult};

pub const DEMO_IMAGE_DATA: &str = "ZGVtbw==";
pub const LIFESTYLE_TEXT: &str = "Just landed. Only three left, message me!";

#[derive(Default)]
pub struct MockCollaborator {
    /// `None` makes the primary call fail.
    pub analysis: Option<PolicyAnalysisResult>,
    pub demo_image_fails: bool,
    /// Demo call succeeds but the model sends no image.
    pub demo_image_empty: bool,
    pub lifestyle_fails: bool,
    /// Misbehaving collaborator that flags a model on every album shot.
    pub album_ignores_model_toggle: bool,
    pub analysis_calls: AtomicUsize,
    pub demo_image_calls: AtomicUsize,
    pub lifestyle_calls: AtomicUsize,
    pub other_calls: AtomicUsize,
}

fn mock_failure(what: &str) -> LlmError {
    LlmError::Api {
        status: 500,
        message: format!("mock {what} failure"),
    }
}

pub fn sample_image_analysis() -> ImageAnalysis {
    ImageAnalysis {
        policy_violations: vec!["Text covers roughly 35% of the image".to_string()],
        layout_feedback: vec!["Move the product to the left third".to_string()],
        branding_feedback: vec!["Logo is too small".to_string()],
        layout_suggestions: Some(vec![LayoutSuggestion {
            name: "Rule of thirds".to_string(),
            description: "Product left, CTA right".to_string(),
        }]),
    }
}

pub fn sample_result(with_image_analysis: bool) -> PolicyAnalysisResult {
    PolicyAnalysisResult {
        status: ComplianceStatus::NonCompliant,
        summary: "The ad makes an unverifiable health claim.".to_string(),
        violations: vec![Violation {
            rule: "Misleading health claims".to_string(),
            explanation: "\"Cures acne in 2 days\" cannot be substantiated.".to_string(),
            severity: Severity::High,
        }],
        suggestions: vec!["Shorten, then emphasize CTA".to_string()],
        fixed_content: "Helps your skin feel clearer.".to_string(),
        image_analysis: with_image_analysis.then(sample_image_analysis),
        generated_image: None,
        lifestyle_content: None,
    }
}

pub fn sample_image() -> ImageInput {
    ImageInput {
        data: "aW1hZ2U=".to_string(),
        mime_type: "image/png".to_string(),
    }
}

impl MockCollaborator {
    pub fn with_analysis(result: PolicyAnalysisResult) -> Self {
        Self {
            analysis: Some(result),
            ..Default::default()
        }
    }

    pub fn total_calls(&self) -> usize {
        self.analysis_calls.load(Ordering::SeqCst)
            + self.demo_image_calls.load(Ordering::SeqCst)
            + self.lifestyle_calls.load(Ordering::SeqCst)
            + self.other_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AdCollaborator for MockCollaborator {
    async fn analyze_policy(
        &self,
        _request: &PolicyCheckRequest,
    ) -> Result<PolicyAnalysisResult, LlmError> {
        self.analysis_calls.fetch_add(1, Ordering::SeqCst);
        self.analysis.clone().ok_or_else(|| mock_failure("analysis"))
    }

    async fn generate_demo_image(
        &self,
        _source: &ImageInput,
        _analysis: &ImageAnalysis,
    ) -> Result<Option<ImageInput>, LlmError> {
        self.demo_image_calls.fetch_add(1, Ordering::SeqCst);
        if self.demo_image_fails {
            return Err(mock_failure("demo image"));
        }
        if self.demo_image_empty {
            return Ok(None);
        }
        Ok(Some(ImageInput {
            data: DEMO_IMAGE_DATA.to_string(),
            mime_type: "image/png".to_string(),
        }))
    }

    async fn generate_lifestyle_content(
        &self,
        _analysis: &ImageAnalysis,
        _original_content: &str,
    ) -> Result<String, LlmError> {
        self.lifestyle_calls.fetch_add(1, Ordering::SeqCst);
        if self.lifestyle_fails {
            return Err(mock_failure("lifestyle"));
        }
        Ok(LIFESTYLE_TEXT.to_string())
    }

    async fn edit_image(
        &self,
        image: &ImageInput,
        _instruction: &str,
    ) -> Result<Option<ImageInput>, LlmError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(image.clone()))
    }

    async fn extract_theme(&self, _logo: &ImageInput) -> Result<ThemeResult, LlmError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        let colors: BTreeMap<String, String> = [
            ("primary", "#1D4ED8"),
            ("secondary", "#F59E0B"),
            ("accent", "#10B981"),
            ("neutral", "#6B7280"),
            ("background", "#111827"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        Ok(ThemeResult {
            colors,
            explanation: "Blue conveys trust; amber adds energy.".to_string(),
        })
    }

    async fn generate_album(
        &self,
        source: &ImageInput,
        include_model: bool,
    ) -> Result<GeneratedAlbum, LlmError> {
        self.other_calls.fetch_add(1, Ordering::SeqCst);
        let flagged = include_model || self.album_ignores_model_toggle;
        let shot = |model: bool| AlbumImage {
            data: source.data.clone(),
            mime_type: source.mime_type.clone(),
            includes_model: model,
        };
        Ok(GeneratedAlbum {
            hero: shot(flagged),
            details: (0..ALBUM_DETAIL_COUNT)
                .map(|i| shot(flagged && (i == 4 || self.album_ignores_model_toggle)))
                .collect(),
        })
    }
}
