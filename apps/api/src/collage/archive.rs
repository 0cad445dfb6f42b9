//! Zip bundle of an album's individual images.

use std::io::{Cursor, Write};

use super::compositor::file_stem;
use crate::errors::AppError;
use crate::models::media::{decode_base64, GeneratedAlbum};

/// Entry names: `{base}-1-hero.png`, then `{base}-2-detail-{n}.png` with `n` from 1.
pub fn entry_names(base: &str, detail_count: usize) -> Vec<String> {
    std::iter::once(format!("{base}-1-hero.png"))
        .chain((1..=detail_count).map(|n| format!("{base}-2-detail-{n}.png")))
        .collect()
}

/// Zips hero and details, named after the source file. Returns `(file_name, bytes)`.
pub fn bundle_album(
    album: &GeneratedAlbum,
    source_name: Option<&str>,
) -> Result<(String, Vec<u8>), AppError> {
    let base = file_stem(source_name);
    let names = entry_names(base, album.details.len());

    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options: zip::write::FileOptions<'_, ()> =
        zip::write::FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (index, (name, image)) in names.iter().zip(album.images()).enumerate() {
        let bytes = decode_base64(&image.data)
            .map_err(|e| AppError::FileRead(format!("album image {index}: {e}")))?;
        zip.start_file(name.as_str(), options)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("zip entry {name}: {e}")))?;
        zip.write_all(&bytes)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("zip write {name}: {e}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|e| AppError::Internal(anyhow::anyhow!("zip finish: {e}")))?;

    Ok((format!("{base}-album.zip"), cursor.into_inner()))
}
