//! Product album collages: geometry, composition and download bundles.

pub mod archive;
pub mod compositor;
pub mod handlers;
pub mod layout;

pub use compositor::CompositeError;

use std::collections::HashSet;

use crate::errors::AppError;
use crate::models::media::{AlbumImage, GeneratedAlbum};

/// Details per collage, next to the hero.
pub const COLLAGE_DETAIL_COUNT: usize = 3;

/// Hero plus the chosen details, in selection order.
///
/// Exactly three distinct, in-range detail indices are required.
pub fn select_details(
    album: &GeneratedAlbum,
    indices: &[usize],
) -> Result<[AlbumImage; 4], AppError> {
    let distinct: HashSet<usize> = indices.iter().copied().collect();
    if indices.len() != COLLAGE_DETAIL_COUNT || distinct.len() != COLLAGE_DETAIL_COUNT {
        return Err(AppError::validation(
            "INVALID_SELECTION",
            format!("Select exactly {COLLAGE_DETAIL_COUNT} different detail images."),
        ));
    }
    if let Some(bad) = indices.iter().find(|&&i| i >= album.details.len()) {
        return Err(AppError::validation(
            "INVALID_SELECTION",
            format!(
                "Detail {bad} does not exist; the album has {} details.",
                album.details.len()
            ),
        ));
    }

    Ok([
        album.hero.clone(),
        album.details[indices[0]].clone(),
        album.details[indices[1]].clone(),
        album.details[indices[2]].clone(),
    ])
}
