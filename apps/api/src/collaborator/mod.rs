//! The external AI collaborator, seen through its request/response contract.
//!
//! `AppState` holds an `Arc<dyn AdCollaborator>`. Production wires in
//! `GeminiCollaborator`; tests substitute a scripted mock.

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::debug;

use crate::llm_client::types::{InlineData, Part};
use crate::llm_client::{LlmClient, LlmError, ANALYSIS_MODEL, IMAGE_MODEL, TEXT_MODEL};
use crate::models::analysis::{CheckType, ContentType, ImageAnalysis, PolicyAnalysisResult};
use crate::models::media::{strip_data_url, AlbumImage, GeneratedAlbum, ImageInput, ThemeResult};

#[cfg(test)]
pub mod mock;
pub mod prompts;
pub mod schema;

/// Detail shots generated per album. The collage picks 3 of them.
pub const ALBUM_DETAIL_COUNT: usize = 6;

/// Everything the primary analysis call needs.
#[derive(Debug, Clone)]
pub struct PolicyCheckRequest {
    pub content: String,
    pub content_type: ContentType,
    pub check_type: CheckType,
    pub images: Vec<ImageInput>,
}

#[async_trait]
pub trait AdCollaborator: Send + Sync {
    /// Primary analysis. The result has already passed boundary checks.
    async fn analyze_policy(
        &self,
        request: &PolicyCheckRequest,
    ) -> Result<PolicyAnalysisResult, LlmError>;

    /// Redesigns `source` from the feedback. `Ok(None)` when the model returned no image.
    async fn generate_demo_image(
        &self,
        source: &ImageInput,
        analysis: &ImageAnalysis,
    ) -> Result<Option<ImageInput>, LlmError>;

    async fn generate_lifestyle_content(
        &self,
        analysis: &ImageAnalysis,
        original_content: &str,
    ) -> Result<String, LlmError>;

    async fn edit_image(
        &self,
        image: &ImageInput,
        instruction: &str,
    ) -> Result<Option<ImageInput>, LlmError>;

    async fn extract_theme(&self, logo: &ImageInput) -> Result<ThemeResult, LlmError>;

    /// One hero plus `ALBUM_DETAIL_COUNT` detail shots of the product in `source`.
    async fn generate_album(
        &self,
        source: &ImageInput,
        include_model: bool,
    ) -> Result<GeneratedAlbum, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Album shot plan
// ────────────────────────────────────────────────────────────────────────────

struct AlbumShot {
    brief: &'static str,
    /// Whether a human model may appear when the caller allows one.
    allows_model: bool,
}

static HERO_SHOT: AlbumShot = AlbumShot {
    brief: "a hero lifestyle shot of the product in an aspirational real-world setting.",
    allows_model: true,
};

static DETAIL_SHOTS: [AlbumShot; ALBUM_DETAIL_COUNT] = [
    AlbumShot {
        brief: "a macro close-up of the material texture and finish.",
        allows_model: false,
    },
    AlbumShot {
        brief: "a top-down flat lay with a few complementary props.",
        allows_model: false,
    },
    AlbumShot {
        brief: "a three-quarter angle view on a minimal plinth.",
        allows_model: false,
    },
    AlbumShot {
        brief: "a close-up of hardware, stitching or closures.",
        allows_model: false,
    },
    AlbumShot {
        brief: "the product being used or worn, showing scale.",
        allows_model: true,
    },
    AlbumShot {
        brief: "a clean back or side view on a seamless background.",
        allows_model: false,
    },
];

// ────────────────────────────────────────────────────────────────────────────
// Gemini implementation
// ────────────────────────────────────────────────────────────────────────────

pub struct GeminiCollaborator {
    llm: LlmClient,
}

impl GeminiCollaborator {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

/// Gemini wants bare base64 in `inlineData.data`, never a data URL.
fn image_part(image: &ImageInput) -> Part {
    Part::inline(image.mime_type.clone(), strip_data_url(&image.data).trim())
}

fn into_image(inline: InlineData) -> ImageInput {
    ImageInput {
        data: inline.data,
        mime_type: inline.mime_type,
    }
}

#[async_trait]
impl AdCollaborator for GeminiCollaborator {
    async fn analyze_policy(
        &self,
        request: &PolicyCheckRequest,
    ) -> Result<PolicyAnalysisResult, LlmError> {
        let prompt =
            prompts::build_analysis_prompt(&request.content, request.content_type, request.check_type);
        let mut parts = vec![Part::text(prompt)];
        parts.extend(request.images.iter().map(image_part));

        let result: PolicyAnalysisResult = self
            .llm
            .call_json(
                ANALYSIS_MODEL,
                parts,
                schema::analysis_schema(!request.images.is_empty()),
                0.2,
            )
            .await?;

        schema::check_analysis(result)
    }

    async fn generate_demo_image(
        &self,
        source: &ImageInput,
        analysis: &ImageAnalysis,
    ) -> Result<Option<ImageInput>, LlmError> {
        let parts = vec![
            image_part(source),
            Part::text(prompts::build_demo_image_prompt(analysis)),
        ];
        Ok(self.llm.call_image(IMAGE_MODEL, parts).await?.map(into_image))
    }

    async fn generate_lifestyle_content(
        &self,
        analysis: &ImageAnalysis,
        original_content: &str,
    ) -> Result<String, LlmError> {
        let prompt = prompts::build_lifestyle_prompt(analysis, original_content);
        self.llm.call_text(TEXT_MODEL, &prompt, 0.9).await
    }

    async fn edit_image(
        &self,
        image: &ImageInput,
        instruction: &str,
    ) -> Result<Option<ImageInput>, LlmError> {
        let parts = vec![
            image_part(image),
            Part::text(prompts::build_edit_prompt(instruction)),
        ];
        Ok(self.llm.call_image(IMAGE_MODEL, parts).await?.map(into_image))
    }

    async fn extract_theme(&self, logo: &ImageInput) -> Result<ThemeResult, LlmError> {
        let parts = vec![image_part(logo), Part::text(prompts::build_theme_prompt())];
        let theme: ThemeResult = self
            .llm
            .call_json(TEXT_MODEL, parts, schema::theme_schema(), 0.4)
            .await?;
        schema::check_theme(theme)
    }

    async fn generate_album(
        &self,
        source: &ImageInput,
        include_model: bool,
    ) -> Result<GeneratedAlbum, LlmError> {
        let shots = std::iter::once(&HERO_SHOT).chain(DETAIL_SHOTS.iter());
        let mut tasks = JoinSet::new();

        for (index, shot) in shots.enumerate() {
            let llm = self.llm.clone();
            let with_model = include_model && shot.allows_model;
            let parts = vec![
                image_part(source),
                Part::text(prompts::build_album_shot_prompt(shot.brief, with_model)),
            ];
            tasks.spawn(async move {
                let image = llm.call_image(IMAGE_MODEL, parts).await;
                (index, with_model, image)
            });
        }

        let mut slots: Vec<Option<AlbumImage>> = vec![None; ALBUM_DETAIL_COUNT + 1];
        while let Some(joined) = tasks.join_next().await {
            let (index, with_model, image) = joined?;
            let inline = image?.ok_or_else(|| {
                LlmError::Schema(format!("album shot {index} came back without an image"))
            })?;
            debug!(index, "Album shot generated");
            slots[index] = Some(AlbumImage {
                data: inline.data,
                mime_type: inline.mime_type,
                includes_model: with_model,
            });
        }

        let mut images = slots.into_iter().flatten();
        let hero = images
            .next()
            .ok_or_else(|| LlmError::Schema("album hero shot missing".to_string()))?;
        let details: Vec<AlbumImage> = images.collect();
        if details.len() != ALBUM_DETAIL_COUNT {
            return Err(LlmError::Schema(format!(
                "expected {ALBUM_DETAIL_COUNT} detail shots, got {}",
                details.len()
            )));
        }

        Ok(GeneratedAlbum { hero, details })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inline_data(image: &ImageInput) -> serde_json::Value {
        serde_json::to_value(image_part(image)).unwrap()["inlineData"].clone()
    }

    #[test]
    fn test_image_part_strips_data_url_prefix() {
        let image = ImageInput {
            data: "data:image/png;base64,aGk=".to_string(),
            mime_type: "image/png".to_string(),
        };
        let inline = inline_data(&image);
        assert_eq!(inline["data"], "aGk=");
        assert_eq!(inline["mimeType"], "image/png");
    }

    #[test]
    fn test_image_part_keeps_raw_base64() {
        let image = ImageInput {
            data: "aGk=".to_string(),
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(inline_data(&image)["data"], "aGk=");
    }
}
