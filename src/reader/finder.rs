use tracing::trace;

use super::utils::{
    cross_check,
    geometry::{AntiDiagonal, Axis, BresenhamLine, Diagonal, Point, X, Y},
    in_bounds, matches_ratio, ratio_noise, CrossRuns,
};
use crate::common::matrix::BitMatrix;

pub(crate) const FINDER_RATIO: [f64; 5] = [1.0, 1.0, 3.0, 1.0, 1.0];

const MIN_HITS: usize = 3;
const MAX_NOISE: f64 = 0.4;

// Line scanner
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub(crate) struct LineScanner {
    buffer: [u32; 6],   // Run lengths, the last one is still growing
    prev: Option<bool>, // Color of the growing run
    flips: u32,         // Count of color changes
}

impl LineScanner {
    pub fn new() -> Self {
        Self { buffer: [0; 6], prev: None, flips: 0 }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // Feeds the next pixel. Returns true when it closes a run.
    pub fn advance(&mut self, dark: bool) -> bool {
        if self.prev == Some(dark) {
            self.buffer[5] += 1;
            return false;
        }

        let closed = self.prev.is_some();
        self.buffer.rotate_left(1);
        self.buffer[5] = 1;
        self.prev = Some(dark);
        self.flips += 1;
        closed
    }

    // Last `n` closed runs, oldest first
    pub fn closed_runs(&self, n: usize) -> Option<&[u32]> {
        debug_assert!(n < self.buffer.len(), "Scanner holds at most 5 closed runs");
        (self.flips as usize > n).then(|| &self.buffer[5 - n..5])
    }
}

// Pattern
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pattern {
    pub x: f64,
    pub y: f64,
    pub module_size: f64,
    pub noise: f64,
    pub count: usize,
}

impl Pattern {
    pub fn new(x: f64, y: f64, module_size: f64, noise: f64) -> Self {
        Self { x, y, module_size, noise, count: 1 }
    }

    pub fn centre(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn about_equals(&self, module_size: f64, x: f64, y: f64) -> bool {
        if (x - self.x).abs() > module_size || (y - self.y).abs() > module_size {
            return false;
        }
        let diff = (module_size - self.module_size).abs();
        diff <= 1.0 || diff <= self.module_size
    }

    // Average weighted by the number of hits behind each side
    pub fn combine(&self, other: &Pattern) -> Pattern {
        let (n, m) = (self.count as f64, other.count as f64);
        let avg = |a: f64, b: f64| (a * n + b * m) / (n + m);
        Pattern {
            x: avg(self.x, other.x),
            y: avg(self.y, other.y),
            module_size: avg(self.module_size, other.module_size),
            noise: avg(self.noise, other.noise),
            count: self.count + other.count,
        }
    }
}

pub(crate) fn merge_hit(patterns: &mut Vec<Pattern>, hit: Pattern) {
    match patterns.iter_mut().find(|p| p.about_equals(hit.module_size, hit.x, hit.y)) {
        Some(p) => *p = p.combine(&hit),
        None => patterns.push(hit),
    }
}

// Locate finders
//------------------------------------------------------------------------------

pub fn locate_finders(img: &BitMatrix) -> Vec<Pattern> {
    let (w, h) = (img.width(), img.height());
    let mut patterns = Vec::new();
    let mut scanner = LineScanner::new();

    for y in 0..h {
        scanner.reset();
        for x in 0..w {
            let dark = img.get(x, y);
            if scanner.advance(dark) && !dark {
                if let Some(hit) = confirm_finder(img, &scanner, x, y) {
                    merge_hit(&mut patterns, hit);
                }
            }
        }

        // Closes a pattern touching the right edge
        if scanner.advance(false) {
            if let Some(hit) = confirm_finder(img, &scanner, w, y) {
                merge_hit(&mut patterns, hit);
            }
        }
    }

    let raw = patterns.len();
    patterns.retain(|p| p.count >= MIN_HITS && p.noise <= MAX_NOISE);
    trace!("Finder scan: {raw} raw patterns, {} kept", patterns.len());
    patterns
}

// Cross-checks a 1:1:3:1:1 row hit ending right before `end` vertically, horizontally
// and along both diagonals
fn confirm_finder(img: &BitMatrix, scanner: &LineScanner, end: usize, y: usize) -> Option<Pattern> {
    let runs = scanner.closed_runs(5)?;
    if !matches_ratio(runs, &FINDER_RATIO) {
        return None;
    }

    let total: u32 = runs.iter().sum();
    let cx = end as f64 - (runs[4] + runs[3]) as f64 - runs[2] as f64 / 2.0;

    let seed = (cx.floor() as i32, y as i32);
    let vert = check_axis::<Y>(img, seed, total)?;
    let cy = seed.1 as f64 + 0.5 + vert.offset;

    let seed = (cx.floor() as i32, cy.floor() as i32);
    let horz = check_axis::<X>(img, seed, total)?;
    let cx = seed.0 as f64 + 0.5 + horz.offset;

    let seed = (cx.floor() as i32, cy.floor() as i32);
    let diag = check_axis::<Diagonal>(img, seed, total)?;
    let anti = check_axis::<AntiDiagonal>(img, seed, total)?;

    let module_size = (horz.total() + vert.total()) as f64 / 14.0;
    let noise = [&vert, &horz, &diag, &anti]
        .iter()
        .map(|r| ratio_noise(&r.runs, &FINDER_RATIO))
        .sum::<f64>()
        / 4.0;
    Some(Pattern::new(cx, cy, module_size, noise))
}

fn check_axis<A: Axis>(img: &BitMatrix, seed: (i32, i32), total: u32) -> Option<CrossRuns> {
    let res = cross_check::<A>(img, seed, 5, total)?;
    let close = 5 * res.total().abs_diff(total) < 2 * total;
    (close && matches_ratio(&res.runs, &FINDER_RATIO)).then_some(res)
}

// Finder pattern group
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct FinderPatternGroup {
    pub top_left: Pattern,
    pub top_right: Pattern,
    pub bottom_left: Pattern,
    ids: [usize; 3],
    size: usize,
    score: f64,
}

impl FinderPatternGroup {
    pub fn module_size(&self) -> f64 {
        (self.top_left.module_size + self.top_right.module_size + self.bottom_left.module_size)
            / 3.0
    }

    // Estimated modules per side
    pub fn size(&self) -> usize {
        self.size
    }

    // Synthesized fourth corner
    pub fn bottom_right(&self) -> Point {
        self.top_right.centre() + self.bottom_left.centre() - self.top_left.centre()
    }

    // True if the point lies inside the quadrilateral of the three centres and the
    // synthesized fourth corner
    pub fn contains(&self, p: Point) -> bool {
        let quad = [
            self.top_left.centre(),
            self.top_right.centre(),
            self.bottom_right(),
            self.bottom_left.centre(),
        ];
        let sides: Vec<f64> =
            (0..4).map(|i| (quad[(i + 1) % 4] - quad[i]).cross(p - quad[i])).collect();
        sides.iter().all(|&s| s >= 0.0) || sides.iter().all(|&s| s <= 0.0)
    }

    pub(crate) fn shares_pattern(&self, other: &FinderPatternGroup) -> bool {
        self.ids.iter().any(|id| other.ids.contains(id))
    }

    pub(crate) fn is_nested_in(&self, other: &FinderPatternGroup) -> bool {
        [self.top_left, self.top_right, self.bottom_left].iter().all(|p| other.contains(p.centre()))
    }
}

// Groups finders into plausible symbols, most square first
pub fn group_finders(img: &BitMatrix, patterns: &[Pattern]) -> Vec<FinderPatternGroup> {
    let n = patterns.len();
    let mut groups = Vec::new();
    for i in 0..n {
        for j in i + 1..n {
            for k in j + 1..n {
                if let Some(g) = make_group(img, patterns, [i, j, k]) {
                    groups.push(g);
                }
            }
        }
    }
    groups.sort_by(|a, b| a.score.total_cmp(&b.score));
    trace!("Grouping: {n} patterns, {} groups", groups.len());
    groups
}

fn make_group(
    img: &BitMatrix,
    patterns: &[Pattern],
    ids: [usize; 3],
) -> Option<FinderPatternGroup> {
    let pts = ids.map(|i| patterns[i]);
    let [a, b, c] = pts;

    let sizes = [a.module_size, b.module_size, c.module_size];
    let min = sizes.iter().copied().fold(f64::INFINITY, f64::min);
    let max = sizes.iter().copied().fold(0.0, f64::max);
    if max > min * 1.4 {
        return None;
    }

    // The side opposite to top left is the longest
    let (ca, cb, cc) = (a.centre(), b.centre(), c.centre());
    let (ab, bc, ac) = (ca.dist(cb), cb.dist(cc), ca.dist(cc));
    let [t, mut r, mut l] = if bc >= ab && bc >= ac {
        [0, 1, 2]
    } else if ac >= ab {
        [1, 0, 2]
    } else {
        [2, 0, 1]
    };
    let (tl, tr, bl) = (pts[t].centre(), pts[r].centre(), pts[l].centre());
    if (tr - tl).cross(bl - tl) < 0.0 {
        std::mem::swap(&mut r, &mut l);
    }
    let (tr, bl) = (pts[r].centre(), pts[l].centre());

    let (u, v) = (tr - tl, bl - tl);
    let angle = (u.dot(v) / (u.dist(Point::default()) * v.dist(Point::default())))
        .clamp(-1.0, 1.0)
        .acos()
        .to_degrees();
    if !(40.0..=140.0).contains(&angle) {
        trace!("Rejected group {ids:?}: Top left angle {angle:.1}");
        return None;
    }

    let module = (a.module_size + b.module_size + c.module_size) / 3.0;
    let Some(size) = estimate_size(tl, tr, bl, module) else {
        trace!("Rejected group {ids:?}: Invalid size");
        return None;
    };

    if !timing_lines_match(img, tl, tr, bl, size) {
        trace!("Rejected group {ids:?}: Timing lines of size {size} not found");
        return None;
    }

    let squareness = (1.0 - tl.dist(tr) / tl.dist(bl)).abs();
    let spread = (max - min) / max;
    let score = squareness + (angle - 90.0).abs() / 90.0 + spread;

    Some(FinderPatternGroup {
        top_left: pts[t],
        top_right: pts[r],
        bottom_left: pts[l],
        ids: [ids[t], ids[r], ids[l]],
        size,
        score,
    })
}

fn estimate_size(tl: Point, tr: Point, bl: Point, module: f64) -> Option<usize> {
    let across = (tl.dist(tr) / module).round() as usize;
    let down = (tl.dist(bl) / module).round() as usize;
    let size = (across + down) / 2 + 7;
    let size = match size & 3 {
        0 => size + 1,
        2 => size - 1,
        3 => return None,
        _ => size,
    };
    (21..=177).contains(&size).then_some(size)
}

// Walks both timing lines on an affine estimate of the grid, between the separators
fn timing_lines_match(img: &BitMatrix, tl: Point, tr: Point, bl: Point, size: usize) -> bool {
    let span = (size - 7) as f64;
    let (ex, ey) = ((tr - tl) * (1.0 / span), (bl - tl) * (1.0 / span));
    let at = |u: f64, v: f64| tl + ex * (u - 3.5) + ey * (v - 3.5);

    let far = size as f64 - 7.5;
    let expected = size - 14;
    [(at(7.5, 6.5), at(far, 6.5)), (at(6.5, 7.5), at(6.5, far))].iter().all(|&(from, to)| {
        count_line_runs(img, from.pixel(), to.pixel())
            .is_some_and(|runs| 4 * runs >= 3 * expected && 4 * runs <= 5 * expected)
    })
}

fn count_line_runs(img: &BitMatrix, from: (i32, i32), to: (i32, i32)) -> Option<usize> {
    let mut runs = 0;
    let mut prev = None;
    for p in BresenhamLine::new(from, to) {
        if !in_bounds(img, p) {
            return None;
        }
        let dark = img.get(p.0 as usize, p.1 as usize);
        if prev != Some(dark) {
            runs += 1;
            prev = Some(dark);
        }
    }
    Some(runs)
}

#[cfg(test)]
mod finder_tests {
    use super::{
        estimate_size, group_finders, locate_finders, LineScanner, Pattern, FINDER_RATIO,
    };
    use crate::{
        builder::QRBuilder,
        common::{codec::Segment, matrix::BitMatrix, metadata::ECLevel},
        reader::utils::{geometry::Point, matches_ratio},
    };

    fn symbol_image(text: &str, module_size: usize) -> BitMatrix {
        let segs = [Segment::auto(text)];
        let qr = QRBuilder::new(&segs).ec_level(ECLevel::L).build().unwrap();
        qr.to_bit_matrix(module_size, 4)
    }

    fn find_near(patterns: &[Pattern], x: f64, y: f64) -> Option<&Pattern> {
        patterns.iter().find(|p| p.centre().dist(Point::new(x, y)) < 0.5)
    }

    #[test]
    fn test_line_scanner() {
        let mut scn = LineScanner::new();
        let row = [1, 1, 0, 0, 1, 1, 1, 1, 1, 1, 0, 0, 1, 1, 0];
        let closed: Vec<bool> = row.iter().map(|&b| scn.advance(b == 1)).collect();
        assert_eq!(closed.iter().filter(|&&c| c).count(), 5);
        assert!(!closed[0] && closed[2] && closed[14]);

        let runs = scn.closed_runs(5).unwrap();
        assert_eq!(runs, [2, 2, 6, 2, 2]);
        assert!(matches_ratio(runs, &FINDER_RATIO));

        scn.reset();
        assert_eq!(scn.closed_runs(1), None);
    }

    #[test]
    fn test_pattern_combine() {
        let a = Pattern::new(10.0, 10.0, 4.0, 0.0);
        let b = Pattern::new(11.0, 13.0, 4.0, 0.2);
        assert!(a.about_equals(b.module_size, b.x, b.y));
        assert!(!a.about_equals(4.0, 15.0, 10.0));
        assert!(!a.about_equals(9.0, 10.0, 10.0));

        let c = a.combine(&a).combine(&b);
        assert_eq!(c.count, 3);
        assert!((c.x - 31.0 / 3.0).abs() < 1e-9);
        assert!((c.y - 11.0).abs() < 1e-9);
        assert!((c.noise - 0.2 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_locate_finders() {
        let img = symbol_image("HELLO WORLD", 4);
        let patterns = locate_finders(&img);
        for (x, y) in [(30.0, 30.0), (86.0, 30.0), (30.0, 86.0)] {
            let p = find_near(&patterns, x, y).unwrap();
            assert!((p.module_size - 4.0).abs() < 1e-9);
            // Diagonal runs step over the stair edges of a rendered symbol
            assert!(p.noise < 0.05, "noise {}", p.noise);
            assert_eq!(p.count, 12);
        }
    }

    #[test]
    fn test_locate_finders_blank() {
        assert!(locate_finders(&BitMatrix::new(40, 30)).is_empty());
    }

    #[test]
    fn test_group_finders() {
        let img = symbol_image("HELLO WORLD", 4);
        let patterns = locate_finders(&img);
        let groups = group_finders(&img, &patterns);
        let g = &groups[0];
        assert_eq!(g.top_left.centre(), Point::new(30.0, 30.0));
        assert_eq!(g.top_right.centre(), Point::new(86.0, 30.0));
        assert_eq!(g.bottom_left.centre(), Point::new(30.0, 86.0));
        assert_eq!(g.size(), 21);
        assert_eq!(g.bottom_right(), Point::new(86.0, 86.0));
        assert!((g.module_size() - 4.0).abs() < 1e-9);
        assert!(g.contains(Point::new(50.0, 60.0)));
        assert!(!g.contains(Point::new(90.0, 60.0)));
    }

    #[test]
    fn test_group_orientation_from_cross_product() {
        // Transposed image swaps the roles of the outer finders back
        let img = symbol_image("HELLO WORLD", 3);
        let mut t = img.clone();
        t.mirror();
        let patterns = locate_finders(&t);
        let g = &group_finders(&t, &patterns)[0];
        let (tl, tr, bl) = (g.top_left.centre(), g.top_right.centre(), g.bottom_left.centre());
        assert!((tr - tl).cross(bl - tl) > 0.0);
        assert!(tr.x > tl.x && bl.y > tl.y);
    }

    #[test]
    fn test_estimate_size() {
        let tl = Point::new(0.0, 0.0);
        assert_eq!(estimate_size(tl, Point::new(14.0, 0.0), Point::new(0.0, 14.0), 1.0), Some(21));
        assert_eq!(estimate_size(tl, Point::new(17.0, 0.0), Point::new(0.0, 17.0), 1.0), Some(25));
        assert_eq!(estimate_size(tl, Point::new(19.0, 0.0), Point::new(0.0, 19.0), 1.0), Some(25));
        assert_eq!(estimate_size(tl, Point::new(16.0, 0.0), Point::new(0.0, 16.0), 1.0), None);
        assert_eq!(estimate_size(tl, Point::new(10.0, 0.0), Point::new(0.0, 10.0), 1.0), None);
    }
}
