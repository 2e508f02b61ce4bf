//! `od_scan` - Barcode labels for Opsdeck inventory
//!
//! This crate provides:
//! - Random label generation for newly stocked products
//! - QR decoding of uploaded label images
//!
//! Decoding delegates entirely to the `image` + `rqrr` crates; there is no
//! computer vision here, only the seam the inventory screen calls through.

use rand::Rng;
use thiserror::Error;
use tracing::debug;

/// Scan errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Label prefix used when none is configured.
pub const DEFAULT_LABEL_PREFIX: &str = "CBW";

/// Generate a random six-digit barcode label, e.g. `CBW-482913`.
#[must_use]
pub fn generate_label(prefix: &str) -> String {
    let mut rng = rand::thread_rng();
    format!("{prefix}-{}", rng.gen_range(100_000..=999_999))
}

/// Decode the first readable QR code in an encoded image buffer.
///
/// Returns `Ok(None)` when the image decodes but contains no readable code.
///
/// # Errors
///
/// Returns [`ScanError::Image`] when the buffer is not a decodable image.
pub fn decode_image(bytes: &[u8]) -> Result<Option<String>, ScanError> {
    let gray = image::load_from_memory(bytes)?.to_luma8();
    let mut prepared = rqrr::PreparedImage::prepare(gray);
    for grid in prepared.detect_grids() {
        match grid.decode() {
            Ok((_, content)) => return Ok(Some(content)),
            Err(e) => debug!(error = %e, "Grid detected but not decodable"),
        }
    }
    Ok(None)
}
