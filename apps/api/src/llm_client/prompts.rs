// Shared prompt fragments.
// Each collaborator task defines its own prompt alongside it in collaborator/prompts.rs.
// This file contains cross-cutting fragments only.

/// Appended to every structured-output prompt.
pub const JSON_ONLY_INSTRUCTION: &str = "\
    Respond with a single JSON object that matches the provided schema. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Appended to every image generation or edit prompt.
pub const NO_TEXT_IN_IMAGE_INSTRUCTION: &str = "\
    Crucial instruction: do not render any text, words or letters in the image. \
    The image must be purely visual, focused on the product and its environment.";

/// Appended to free-text copywriting prompts.
pub const PLAIN_TEXT_ONLY_INSTRUCTION: &str = "\
    Return only the requested text. No headings, no commentary, no markdown.";
