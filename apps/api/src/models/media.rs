use std::collections::BTreeMap;

use base64::Engine;
use serde::{Deserialize, Serialize};

/// An image payload as sent to and from the collaborator: base64 bytes plus MIME type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageInput {
    pub data: String,
    pub mime_type: String,
}

impl ImageInput {
    pub fn decode(&self) -> Result<Vec<u8>, base64::DecodeError> {
        decode_base64(&self.data)
    }

    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, strip_data_url(&self.data))
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }
}

/// A file picked in the submission form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub data: String,
}

impl UploadedFile {
    pub fn as_image(&self) -> ImageInput {
        ImageInput {
            data: strip_data_url(&self.data).to_string(),
            mime_type: self.mime_type.clone(),
        }
    }
}

/// One shot of a generated album.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumImage {
    pub data: String,
    pub mime_type: String,
    /// Set when the shot features a human model.
    #[serde(default)]
    pub includes_model: bool,
}

/// A hero lifestyle shot plus ordered detail shots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedAlbum {
    pub hero: AlbumImage,
    pub details: Vec<AlbumImage>,
}

impl GeneratedAlbum {
    /// Hero first, then details in order.
    pub fn images(&self) -> impl Iterator<Item = &AlbumImage> {
        std::iter::once(&self.hero).chain(self.details.iter())
    }
}

/// Brand palette extracted from a logo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeResult {
    /// Slot name → `#RRGGBB`.
    pub colors: BTreeMap<String, String>,
    pub explanation: String,
}

/// Drops a `data:<mime>;base64,` prefix if present.
pub fn strip_data_url(data: &str) -> &str {
    if data.starts_with("data:") {
        data.split_once(',').map(|(_, b64)| b64).unwrap_or(data)
    } else {
        data
    }
}

/// MIME type declared by a `data:<mime>;base64,` URL.
pub fn data_url_mime(data: &str) -> Option<&str> {
    data.strip_prefix("data:")?
        .split_once(';')
        .map(|(mime, _)| mime)
        .filter(|mime| !mime.is_empty())
}

/// Decodes raw base64 or a base64 data URL.
pub fn decode_base64(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(strip_data_url(data).trim())
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}
