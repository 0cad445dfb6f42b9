//! Prompt templates for every collaborator task.
//! Templates use `{placeholder}` markers filled by the builders below.

use crate::llm_client::prompts::{
    JSON_ONLY_INSTRUCTION, NO_TEXT_IN_IMAGE_INSTRUCTION, PLAIN_TEXT_ONLY_INSTRUCTION,
};
use crate::models::analysis::{CheckType, ContentType, ImageAnalysis};
use crate::template::fill;

const ANALYSIS_PROMPT_TEMPLATE: &str = "\
You are an expert in Facebook advertising policy, local advertising law and an experienced \
creative director. Analyse the supplied ad content (text and images), identify potential \
violations, suggest improvements and provide a corrected version of the text.

Context:
- Content type: {content_type}
- Check type: {check_type}

Text to check:
---
{content}
---

For every attached image:
1. Policy: look for violations. Estimate text density; if text seems to cover more than 20% \
of the image, report it in policyViolations. Also flag violence, adult content, misleading \
claims and banned brands.
2. Layout: assess composition, balance and focal point against the seven composition \
principles (centre, rule of thirds, diagonal, leading lines, symmetry, asymmetry, golden ratio).
3. Branding: assess consistency and clarity of logo, colours and fonts.
4. Layout suggestions: propose 2-3 alternative layouts, each with a short name and a \
description of where product, text, logo and call to action go.

Output: status, summary, violations (rule, explanation, severity), suggestions, fixedContent \
(the corrected text, or the original text if it already complies or none was given), and \
imageAnalysis only when images were supplied.

{json_only}";

const DEMO_IMAGE_PROMPT_TEMPLATE: &str = "\
As a creative director, redesign the supplied image using the expert feedback below. \
Keep the core subject and product; improve composition and layout.

{no_text}

Layout improvements: {layout_feedback}
Creative suggestions: {layout_suggestions}

Generate a new image that implements these suggestions. Only output the image.";

const LIFESTYLE_PROMPT_TEMPLATE: &str = "\
You are a top social-media seller of premium goods. Your voice is casual, trend-aware and \
persuasive while still sounding upscale.

Write a SHORT sales post (3 to 5 sentences) for the product in the image. Brevity first: \
after reading it the customer should want to message you straight away.

Original text from the user, for reference only (reuse good ideas or product facts, never \
copy verbatim):
---
{original_content}
---

Image analysis: {layout_feedback}
Creative suggestions: {layout_suggestions}

{plain_text}";

const EDIT_PROMPT_TEMPLATE: &str = "\
Edit the supplied image according to this instruction, changing nothing else:

{instruction}

{no_text}";

const THEME_PROMPT_TEMPLATE: &str = "\
You are a brand designer. Extract a colour palette from the supplied logo and fill the slots \
primary, secondary, accent, neutral and background with hex colours (#RRGGBB). Then explain \
in a short paragraph why the palette fits the brand and how to use it in ads.

{json_only}";

const ALBUM_SHOT_PROMPT_TEMPLATE: &str = "\
You are a commercial product photographer. Using the supplied product photo, produce one \
new photograph of the same product: {shot_brief}

Keep the product identical in shape, colour and branding. Studio-quality lighting.
{model_rule}

{no_text}";

const WITH_MODEL_RULE: &str = "A tasteful human model may appear where it suits the shot.";
const WITHOUT_MODEL_RULE: &str = "Do NOT show any people, faces, hands or body parts.";

fn or_placeholder(text: &str, placeholder: &str) -> String {
    if text.trim().is_empty() {
        placeholder.to_string()
    } else {
        text.to_string()
    }
}

pub fn build_analysis_prompt(content: &str, content_type: ContentType, check_type: CheckType) -> String {
    let content = or_placeholder(content, "(no text supplied)");
    fill(
        ANALYSIS_PROMPT_TEMPLATE,
        &[
            ("{content_type}", content_type.label()),
            ("{check_type}", check_type.label()),
            ("{content}", content.as_str()),
            ("{json_only}", JSON_ONLY_INSTRUCTION),
        ],
    )
}

pub fn build_demo_image_prompt(analysis: &ImageAnalysis) -> String {
    let layout_feedback = or_placeholder(&analysis.layout_brief(), "none");
    let layout_suggestions = or_placeholder(&analysis.suggestions_brief(), "none");
    fill(
        DEMO_IMAGE_PROMPT_TEMPLATE,
        &[
            ("{no_text}", NO_TEXT_IN_IMAGE_INSTRUCTION),
            ("{layout_feedback}", layout_feedback.as_str()),
            ("{layout_suggestions}", layout_suggestions.as_str()),
        ],
    )
}

pub fn build_lifestyle_prompt(analysis: &ImageAnalysis, original_content: &str) -> String {
    let original_content = or_placeholder(original_content, "(no original text)");
    let layout_feedback = or_placeholder(&analysis.layout_brief(), "none");
    let layout_suggestions = or_placeholder(&analysis.suggestions_brief(), "none");
    fill(
        LIFESTYLE_PROMPT_TEMPLATE,
        &[
            ("{original_content}", original_content.as_str()),
            ("{layout_feedback}", layout_feedback.as_str()),
            ("{layout_suggestions}", layout_suggestions.as_str()),
            ("{plain_text}", PLAIN_TEXT_ONLY_INSTRUCTION),
        ],
    )
}

pub fn build_edit_prompt(instruction: &str) -> String {
    fill(
        EDIT_PROMPT_TEMPLATE,
        &[
            ("{instruction}", instruction.trim()),
            ("{no_text}", NO_TEXT_IN_IMAGE_INSTRUCTION),
        ],
    )
}

pub fn build_theme_prompt() -> String {
    fill(THEME_PROMPT_TEMPLATE, &[("{json_only}", JSON_ONLY_INSTRUCTION)])
}

pub fn build_album_shot_prompt(shot_brief: &str, with_model: bool) -> String {
    let model_rule = if with_model {
        WITH_MODEL_RULE
    } else {
        WITHOUT_MODEL_RULE
    };
    fill(
        ALBUM_SHOT_PROMPT_TEMPLATE,
        &[
            ("{shot_brief}", shot_brief),
            ("{model_rule}", model_rule),
            ("{no_text}", NO_TEXT_IN_IMAGE_INSTRUCTION),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_prompt_fills_every_placeholder() {
        let prompt = build_analysis_prompt("Lose 10kg in 3 days!", ContentType::TextPost, CheckType::Comprehensive);
        assert!(prompt.contains("Lose 10kg in 3 days!"));
        assert!(prompt.contains("Text post"));
        assert!(!prompt.contains("{content"));
        assert!(!prompt.contains("{json_only}"));
    }

    #[test]
    fn test_analysis_prompt_marks_missing_text() {
        let prompt = build_analysis_prompt("  ", ContentType::ImageAd, CheckType::FacebookPolicy);
        assert!(prompt.contains("(no text supplied)"));
    }

    #[test]
    fn test_album_prompt_forbids_people_without_model() {
        let prompt = build_album_shot_prompt("macro texture close-up", false);
        assert!(prompt.contains(WITHOUT_MODEL_RULE));
        assert!(!prompt.contains(WITH_MODEL_RULE));
    }

    #[test]
    fn test_edit_prompt_trims_instruction() {
        let prompt = build_edit_prompt("  make the background white \n");
        assert!(prompt.contains("make the background white\n"));
    }

    #[test]
    fn test_user_text_with_placeholder_syntax_stays_literal() {
        let analysis = crate::collaborator::mock::sample_image_analysis();
        let prompt = build_lifestyle_prompt(&analysis, "My text {layout_feedback}");
        assert!(prompt.contains("My text {layout_feedback}"));

        let prompt = build_analysis_prompt("Promo {json_only}", ContentType::TextPost, CheckType::Comprehensive);
        assert!(prompt.contains("Promo {json_only}"));
    }
}
