pub mod geometry;
pub mod homography;

use geometry::Axis;

use crate::common::matrix::BitMatrix;

pub(crate) fn in_bounds(img: &BitMatrix, (x, y): (i32, i32)) -> bool {
    x >= 0 && y >= 0 && (x as usize) < img.width() && (y as usize) < img.height()
}

// Run check
//------------------------------------------------------------------------------

// Runs measured through a seed along an axis
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CrossRuns {
    pub runs: Vec<u32>,
    // Centre of the middle run relative to the seed pixel's centre, in steps
    pub offset: f64,
}

impl CrossRuns {
    pub fn total(&self) -> u32 {
        self.runs.iter().sum()
    }
}

// Measures `len` alternating runs centred on the dark run holding `seed`. Fails when a
// run hits the border before the outermost one, or grows past `max_run`.
pub(crate) fn cross_check<A: Axis>(
    img: &BitMatrix,
    seed: (i32, i32),
    len: usize,
    max_run: u32,
) -> Option<CrossRuns> {
    debug_assert!(len % 2 == 1, "Run count must be odd");

    if !in_bounds(img, seed) || !img.get(seed.0 as usize, seed.1 as usize) {
        return None;
    }

    let half = len / 2 + 1;
    let fwd = count_runs::<A>(img, seed, 1, half, max_run)?;
    let bwd = count_runs::<A>(img, seed, -1, half, max_run)?;

    let mut runs = Vec::with_capacity(len);
    runs.extend(bwd[1..].iter().rev());
    runs.push(fwd[0] + bwd[0] - 1);
    runs.extend(&fwd[1..]);

    let offset = (fwd[0] as f64 - bwd[0] as f64) / 2.0;
    Some(CrossRuns { runs, offset })
}

// Runs from the seed outwards, the first one includes the seed
fn count_runs<A: Axis>(
    img: &BitMatrix,
    seed: (i32, i32),
    dir: i32,
    count: usize,
    max_run: u32,
) -> Option<Vec<u32>> {
    let mut runs = vec![0u32; count];
    let mut idx = 0;
    let mut dark = true;
    let mut p = seed;
    loop {
        let inside = in_bounds(img, p);
        if inside && img.get(p.0 as usize, p.1 as usize) == dark {
            runs[idx] += 1;
            if runs[idx] > max_run {
                return None;
            }
            p = A::step(p, dir);
            continue;
        }
        if idx + 1 == count {
            break;
        }
        if !inside {
            return None;
        }
        idx += 1;
        dark = !dark;
    }
    Some(runs)
}

// True if every run is within 3/4 of a module from its share of the total
pub(crate) fn matches_ratio(runs: &[u32], ratio: &[f64]) -> bool {
    if runs.len() != ratio.len() {
        return false;
    }
    let module = runs.iter().sum::<u32>() as f64 / ratio.iter().sum::<f64>();
    let tol = module * 3.0 / 4.0;
    runs.iter().zip(ratio).all(|(&rl, r)| (rl as f64 - r * module).abs() <= tol)
}

// Mean deviation from the ideal run lengths, in modules
pub(crate) fn ratio_noise(runs: &[u32], ratio: &[f64]) -> f64 {
    let total = runs.iter().sum::<u32>() as f64;
    if total == 0.0 {
        return f64::INFINITY;
    }
    let module = total / ratio.iter().sum::<f64>();
    let dev: f64 = runs.iter().zip(ratio).map(|(&rl, r)| (rl as f64 - r * module).abs()).sum();
    dev / module / runs.len() as f64
}
