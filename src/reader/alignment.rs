use tracing::trace;

use super::{
    finder::{merge_hit, FinderPatternGroup, LineScanner, Pattern},
    utils::{
        cross_check,
        geometry::{Point, Y},
        ratio_noise,
    },
};
use crate::common::matrix::BitMatrix;

const ALIGNMENT_RATIO: [f64; 3] = [1.0, 1.0, 1.0];

// Half the side of the search square, in modules
const SEARCH_RADIUS: f64 = 5.0;

// Locate alignment
//------------------------------------------------------------------------------

// Where the bottom right alignment centre sits if the symbol were a parallelogram
pub fn expected_alignment(group: &FinderPatternGroup) -> Point {
    let tl = group.top_left.centre();
    let ratio = 1.0 - 3.0 / (group.size() - 7) as f64;
    tl + (group.bottom_right() - tl) * ratio
}

// Candidate centres of the bottom right alignment pattern, best first. The expected
// position always comes last.
pub fn locate_alignment(img: &BitMatrix, group: &FinderPatternGroup) -> Vec<Point> {
    let ms = group.module_size();
    let expected = expected_alignment(group);
    let radius = SEARCH_RADIUS * ms;

    let clamp = |v: f64, hi: usize| v.max(0.0).min(hi as f64 - 1.0) as usize;
    let (left, right) =
        (clamp(expected.x - radius, img.width()), clamp(expected.x + radius, img.width()));
    let (top, bottom) =
        (clamp(expected.y - radius, img.height()), clamp(expected.y + radius, img.height()));

    let mut hits = Vec::new();
    let mut scanner = LineScanner::new();
    for y in top..=bottom {
        scanner.reset();
        for x in left..=right {
            let dark = img.get(x, y);
            if scanner.advance(dark) && dark {
                if let Some(hit) = confirm_alignment(img, &scanner, x, y, ms) {
                    merge_hit(&mut hits, hit);
                }
            }
        }
        if scanner.advance(true) {
            if let Some(hit) = confirm_alignment(img, &scanner, right + 1, y, ms) {
                merge_hit(&mut hits, hit);
            }
        }
    }
    trace!("Alignment search around {expected:?}: {} patterns", hits.len());

    let key = |p: &Pattern| p.centre().dist(expected) / ms + p.noise;
    hits.sort_by(|a, b| key(a).total_cmp(&key(b)));

    let mut res: Vec<Point> = hits.iter().map(Pattern::centre).collect();
    res.push(expected);
    res
}

// Cross-checks a light-dark-light row hit ending right before `end`
fn confirm_alignment(
    img: &BitMatrix,
    scanner: &LineScanner,
    end: usize,
    y: usize,
    module_size: f64,
) -> Option<Pattern> {
    let is_module =
        |runs: &[u32]| runs.iter().all(|&r| (r as f64 - module_size).abs() <= module_size / 2.0);

    let runs = scanner.closed_runs(3)?;
    if !is_module(runs) {
        return None;
    }
    let cx = end as f64 - runs[2] as f64 - runs[1] as f64 / 2.0;

    let seed = (cx.floor() as i32, y as i32);
    let max_run = (module_size * 2.0).ceil() as u32;
    let vert = cross_check::<Y>(img, seed, 3, max_run)?;
    if !is_module(&vert.runs) {
        return None;
    }
    let cy = seed.1 as f64 + 0.5 + vert.offset;

    let total = runs.iter().sum::<u32>() + vert.total();
    let noise =
        (ratio_noise(runs, &ALIGNMENT_RATIO) + ratio_noise(&vert.runs, &ALIGNMENT_RATIO)) / 2.0;
    Some(Pattern::new(cx, cy, total as f64 / 6.0, noise))
}
