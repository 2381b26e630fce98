use image::{GrayImage, Luma};
use tracing::trace;

use crate::common::{
    error::{QRError, QRResult},
    matrix::BitMatrix,
};

const LUMINANCE_BITS: u32 = 5;
const LUMINANCE_SHIFT: u32 = 8 - LUMINANCE_BITS;
const LUMINANCE_BUCKETS: usize = 1 << LUMINANCE_BITS;

// Global histogram binarizer
//------------------------------------------------------------------------------

// Thresholds the whole image at the valley between its two dominant luminance peaks.
// Pixels strictly darker than the threshold are set.
pub fn binarize(img: &GrayImage) -> QRResult<BitMatrix> {
    let (w, h) = img.dimensions();
    if w == 0 || h == 0 {
        return Err(QRError::SymbolNotFound);
    }

    let mut buckets = [0u64; LUMINANCE_BUCKETS];
    for Luma([l]) in img.pixels() {
        buckets[(*l >> LUMINANCE_SHIFT) as usize] += 1;
    }
    let threshold = estimate_threshold(&buckets).unwrap_or_else(|| mean_luminance(img));
    trace!("Binarizing {w}x{h} image at threshold {threshold}");

    let mut mat = BitMatrix::new(w as usize, h as usize);
    for (x, y, Luma([l])) in img.enumerate_pixels() {
        if *l < threshold {
            mat.set(x as usize, y as usize);
        }
    }
    Ok(mat)
}

// None when the histogram has no second peak far enough from the first
fn estimate_threshold(buckets: &[u64; LUMINANCE_BUCKETS]) -> Option<u8> {
    let (first_peak, &max_count) = buckets.iter().enumerate().max_by_key(|&(i, c)| (c, !i))?;

    // Second peak favours distance from the first
    let (second_peak, _) = buckets
        .iter()
        .enumerate()
        .map(|(i, &c)| (i, c * (i.abs_diff(first_peak) as u64).pow(2)))
        .filter(|&(_, score)| score > 0)
        .max_by_key(|&(i, score)| (score, !i))?;

    let (lo, hi) = (first_peak.min(second_peak), first_peak.max(second_peak));
    if hi - lo <= LUMINANCE_BUCKETS / 16 {
        return None;
    }

    // Deepest valley, skewed towards the light peak
    let mut best = hi - 1;
    let mut best_score = 0;
    for x in (lo + 1..hi).rev() {
        let from_lo = (x - lo) as u64;
        let score = from_lo * from_lo * (hi - x) as u64 * (max_count - buckets[x]);
        if score > best_score {
            best = x;
            best_score = score;
        }
    }
    Some((best << LUMINANCE_SHIFT) as u8)
}

fn mean_luminance(img: &GrayImage) -> u8 {
    let sum: u64 = img.pixels().map(|Luma([l])| *l as u64).sum();
    (sum / (img.width() as u64 * img.height() as u64)) as u8
}
