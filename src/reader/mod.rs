mod alignment;
mod binarize;
mod deqr;
mod detector;
mod finder;
pub mod utils;

pub use alignment::{expected_alignment, locate_alignment};
pub use binarize::binarize;
pub use deqr::Decoded;
pub use detector::{detect, Detected, Detections};
pub use finder::{group_finders, locate_finders, FinderPatternGroup, Pattern};

use image::GrayImage;
use tracing::{debug, debug_span};

use crate::common::{
    error::{QRError, QRResult},
    matrix::BitMatrix,
};

// Reader
//------------------------------------------------------------------------------

/// Reads QR symbols from binarized or grayscale images.
///
/// Candidates are pulled from [`detect`] until one decodes. A candidate that fails
/// to decode as is gets a single retry with its grid transposed, which covers
/// symbols printed or captured mirrored.
pub struct QRReader;

impl QRReader {
    // First symbol that decodes. Fails with the last decode error, or SymbolNotFound
    // when no candidate was detected.
    pub fn read(img: &BitMatrix) -> QRResult<Decoded> {
        let span = debug_span!("read", width = img.width(), height = img.height());
        let _guard = span.enter();

        let mut dets = detect(img);
        let mut last_err = None;
        while let Some(det) = dets.next() {
            match Self::decode(&det.grid) {
                Ok(decoded) => {
                    dets.accept();
                    return Ok(decoded);
                }
                Err(e) => last_err = Some(e),
            }
        }
        Err(last_err.unwrap_or(QRError::SymbolNotFound))
    }

    // Every symbol that decodes, in detection order
    pub fn read_all(img: &BitMatrix) -> Vec<Decoded> {
        let span = debug_span!("read_all", width = img.width(), height = img.height());
        let _guard = span.enter();

        let mut res = Vec::new();
        let mut dets = detect(img);
        while let Some(det) = dets.next() {
            if let Ok(decoded) = Self::decode(&det.grid) {
                dets.accept();
                res.push(decoded);
            }
        }
        debug!("Decoded {} symbols", res.len());
        res
    }

    pub fn read_image(img: &GrayImage) -> QRResult<Decoded> {
        Self::read(&binarize(img)?)
    }

    pub fn read_all_image(img: &GrayImage) -> QRResult<Vec<Decoded>> {
        Ok(Self::read_all(&binarize(img)?))
    }

    // Decodes a module grid, retrying once transposed. The first error wins if both fail.
    pub fn decode(grid: &BitMatrix) -> QRResult<Decoded> {
        let err = match deqr::decode_grid(grid, false) {
            Ok(decoded) => return Ok(decoded),
            Err(e) => e,
        };
        if grid.width() != grid.height() {
            return Err(err);
        }
        debug!("Decode failed: {err}, retrying mirrored");

        let mut mirrored = grid.clone();
        mirrored.mirror();
        deqr::decode_grid(&mirrored, true).map_err(|_| err)
    }
}
