//! Submission validation. Runs to completion before any collaborator call.
//!
//! Checks are ordered: content type, check type, image required for image ads,
//! something to analyse, file limits, then decoding. The first failure wins.

use serde::Deserialize;
use serde_json::Value;

use crate::collaborator::PolicyCheckRequest;
use crate::errors::AppError;
use crate::history::AnalysisInputs;
use crate::models::analysis::{CheckType, ContentType};
use crate::models::history::HistoryFile;
use crate::models::media::{decode_base64, strip_data_url, UploadedFile};

pub const MAX_FILES: usize = 5;
pub const MAX_FILE_BYTES: usize = 10 * 1024 * 1024;

/// Form submission. Selectors arrive as raw strings so that an unset or
/// unknown value is reported with a validation code instead of a parse error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalysisSubmission {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub check_type: Option<String>,
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

/// A decoded upload, ready for preview registration.
#[derive(Debug, Clone)]
pub struct DecodedFile {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct ValidatedSubmission {
    pub request: PolicyCheckRequest,
    pub inputs: AnalysisInputs,
    pub decoded: Vec<DecodedFile>,
}

/// Parses a snake_case selector. Blank means unset.
fn parse_selector<T: serde::de::DeserializeOwned>(raw: Option<&str>) -> Option<T> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    serde_json::from_value(Value::String(raw.to_string())).ok()
}

/// Upper bound of the decoded size of a base64 payload.
fn decoded_len_estimate(data: &str) -> usize {
    strip_data_url(data).trim().len() / 4 * 3
}

fn check_file_limits(files: &[UploadedFile]) -> Result<(), AppError> {
    if files.len() > MAX_FILES {
        return Err(AppError::validation(
            "TOO_MANY_FILES",
            format!("You can upload at most {MAX_FILES} images."),
        ));
    }
    for file in files {
        if !file.mime_type.starts_with("image/") {
            return Err(AppError::validation(
                "NOT_AN_IMAGE",
                format!("'{}' is not an image.", file.name),
            ));
        }
        if decoded_len_estimate(&file.data) > MAX_FILE_BYTES {
            return Err(AppError::validation(
                "FILE_TOO_LARGE",
                format!("'{}' exceeds the 10 MB limit.", file.name),
            ));
        }
    }
    Ok(())
}

pub fn validate_submission(submission: &AnalysisSubmission) -> Result<ValidatedSubmission, AppError> {
    let content_type: ContentType = parse_selector(submission.content_type.as_deref())
        .ok_or_else(|| {
            AppError::validation("CONTENT_TYPE_REQUIRED", "Please select a content type.")
        })?;
    let check_type: CheckType = parse_selector(submission.check_type.as_deref())
        .ok_or_else(|| AppError::validation("CHECK_TYPE_REQUIRED", "Please select a check type."))?;

    if content_type.requires_images() && submission.files.is_empty() {
        return Err(AppError::validation(
            "IMAGE_REQUIRED",
            "Image ads need at least one image.",
        ));
    }
    if submission.content.trim().is_empty() && submission.files.is_empty() {
        return Err(AppError::validation(
            "EMPTY_SUBMISSION",
            "Enter some ad text or upload at least one image.",
        ));
    }

    check_file_limits(&submission.files)?;

    let mut decoded = Vec::with_capacity(submission.files.len());
    for file in &submission.files {
        let bytes = decode_base64(&file.data)
            .map_err(|e| AppError::FileRead(format!("'{}': {e}", file.name)))?;
        if bytes.len() > MAX_FILE_BYTES {
            return Err(AppError::validation(
                "FILE_TOO_LARGE",
                format!("'{}' exceeds the 10 MB limit.", file.name),
            ));
        }
        decoded.push(DecodedFile {
            mime_type: file.mime_type.clone(),
            bytes,
        });
    }

    let images = submission.files.iter().map(UploadedFile::as_image).collect();
    let files = submission
        .files
        .iter()
        .map(|f| HistoryFile {
            name: f.name.clone(),
            data_url: f.as_image().data_url(),
        })
        .collect();

    Ok(ValidatedSubmission {
        request: PolicyCheckRequest {
            content: submission.content.clone(),
            content_type,
            check_type,
            images,
        },
        inputs: AnalysisInputs {
            files,
            content: submission.content.clone(),
            content_type,
            check_type,
        },
        decoded,
    })
}
