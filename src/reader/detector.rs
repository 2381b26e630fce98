use std::vec;

use tracing::{debug, trace};

use super::{
    alignment::locate_alignment,
    finder::{group_finders, locate_finders, FinderPatternGroup},
    utils::{geometry::Point, homography::Homography},
};
use crate::common::{
    error::{QRError, QRResult},
    matrix::BitMatrix,
};

// Smallest symbol carrying a bottom right alignment pattern
const MIN_ALIGNED_SIZE: usize = 25;

// Detected candidate
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Detected {
    // One bit per module, true for dark
    pub grid: BitMatrix,
    pub group: FinderPatternGroup,
    // Image position used for the bottom right alignment pattern, if any
    pub alignment: Option<Point>,
}

// Detections
//------------------------------------------------------------------------------

/// Lazily yields resampled symbol candidates from a binarized image.
///
/// Every finder group is tried with its alignment alternatives in order. Calling
/// [`Detections::accept`] after a successful decode consumes the group of the last
/// candidate, so neither its remaining alternatives nor groups overlapping it are
/// tried again.
pub struct Detections<'a> {
    img: &'a BitMatrix,
    groups: Option<Vec<FinderPatternGroup>>,
    next_group: usize,
    // Group being sampled along with its untried alignment alternatives
    current: Option<(usize, vec::IntoIter<Option<Point>>)>,
    last: Option<usize>,
    accepted: Vec<usize>,
}

pub fn detect(img: &BitMatrix) -> Detections<'_> {
    Detections {
        img,
        groups: None,
        next_group: 0,
        current: None,
        last: None,
        accepted: Vec::new(),
    }
}

impl Detections<'_> {
    // Marks the group of the last yielded candidate as consumed
    pub fn accept(&mut self) {
        let Some(gi) = self.last.take() else {
            return;
        };
        debug!("Accepted group {gi}");
        self.accepted.push(gi);
        if self.current.as_ref().is_some_and(|(cur, _)| *cur == gi) {
            self.current = None;
        }
    }

    fn is_consumed(groups: &[FinderPatternGroup], accepted: &[usize], gi: usize) -> bool {
        let g = &groups[gi];
        accepted.iter().any(|&a| {
            a == gi || g.shares_pattern(&groups[a]) || g.is_nested_in(&groups[a])
        })
    }
}

impl Iterator for Detections<'_> {
    type Item = Detected;

    fn next(&mut self) -> Option<Self::Item> {
        let img = self.img;
        let groups = self.groups.get_or_insert_with(|| {
            let patterns = locate_finders(img);
            group_finders(img, &patterns)
        });

        loop {
            if let Some((gi, alts)) = self.current.as_mut() {
                let gi = *gi;
                if let Some(alignment) = alts.next() {
                    let group = &groups[gi];
                    match sample_symbol(img, group, alignment) {
                        Ok(grid) => {
                            debug!(
                                "Candidate from group {gi}: Size {}, Alignment {alignment:?}",
                                group.size()
                            );
                            self.last = Some(gi);
                            return Some(Detected { grid, group: group.clone(), alignment });
                        }
                        Err(e) => {
                            trace!("Rejected candidate from group {gi}: {e}");
                            continue;
                        }
                    }
                }
                self.current = None;
            }

            let gi = self.next_group;
            if gi >= groups.len() {
                return None;
            }
            self.next_group += 1;

            if Self::is_consumed(groups, &self.accepted, gi) {
                trace!("Skipped group {gi}: Overlaps an accepted symbol");
                continue;
            }
            self.current = Some((gi, alignment_alternatives(img, &groups[gi]).into_iter()));
        }
    }
}

// None stands for the synthesized bottom right corner
fn alignment_alternatives(img: &BitMatrix, group: &FinderPatternGroup) -> Vec<Option<Point>> {
    if group.size() < MIN_ALIGNED_SIZE {
        return vec![None];
    }
    locate_alignment(img, group).into_iter().map(Some).collect()
}

// Sampling
//------------------------------------------------------------------------------

fn sample_symbol(
    img: &BitMatrix,
    group: &FinderPatternGroup,
    alignment: Option<Point>,
) -> QRResult<BitMatrix> {
    let size = group.size();
    let h = module_to_image(group, alignment)?;
    validate_timing(img, &h, size, group.module_size())?;
    resample(img, &h, size, group.module_size())
}

fn module_to_image(group: &FinderPatternGroup, alignment: Option<Point>) -> QRResult<Homography> {
    let s = group.size() as f64;
    let (corner, corner_img) = match alignment {
        Some(p) => (Point::new(s - 6.5, s - 6.5), p),
        None => (Point::new(s - 3.5, s - 3.5), group.bottom_right()),
    };
    let src = [Point::new(3.5, 3.5), Point::new(s - 3.5, 3.5), Point::new(3.5, s - 3.5), corner];
    let dst = [
        group.top_left.centre(),
        group.top_right.centre(),
        group.bottom_left.centre(),
        corner_img,
    ];
    Homography::compute(src, dst)
}

// Reads the pixel under a module centre. Fails if it lands more than a module outside.
fn read_module(
    img: &BitMatrix,
    h: &Homography,
    x: usize,
    y: usize,
    module_size: f64,
) -> QRResult<bool> {
    let p = h.map(x as f64 + 0.5, y as f64 + 0.5)?;
    let slack = module_size.max(1.0);
    let (w, ht) = (img.width() as f64, img.height() as f64);
    if p.x < -slack || p.y < -slack || p.x >= w + slack || p.y >= ht + slack {
        return Err(QRError::SymbolNotFound);
    }
    let px = p.x.floor().clamp(0.0, w - 1.0) as usize;
    let py = p.y.floor().clamp(0.0, ht - 1.0) as usize;
    Ok(img.get(px, py))
}

// Both timing lines must mostly alternate
fn validate_timing(img: &BitMatrix, h: &Homography, size: usize, module_size: f64) -> QRResult<()> {
    let mut total = 0;
    let mut mismatches = 0;
    for k in 8..size - 8 {
        for (x, y) in [(k, 6), (6, k)] {
            let expected = k & 1 == 0;
            total += 1;
            if !read_module(img, h, x, y, module_size).is_ok_and(|dark| dark == expected) {
                mismatches += 1;
            }
        }
    }
    if 4 * mismatches > total {
        return Err(QRError::SymbolNotFound);
    }
    Ok(())
}

fn resample(img: &BitMatrix, h: &Homography, size: usize, module_size: f64) -> QRResult<BitMatrix> {
    let mut grid = BitMatrix::square(size);
    for y in 0..size {
        for x in 0..size {
            if read_module(img, h, x, y, module_size)? {
                grid.set(x, y);
            }
        }
    }
    Ok(grid)
}

#[cfg(test)]
mod detector_tests {
    use super::detect;
    use crate::{
        builder::QRBuilder,
        common::{codec::Segment, matrix::BitMatrix, metadata::Version},
    };

    fn paste(dst: &mut BitMatrix, src: &BitMatrix, left: usize, top: usize) {
        for y in 0..src.height() {
            for x in 0..src.width() {
                if src.get(x, y) {
                    dst.set(left + x, top + y);
                }
            }
        }
    }

    #[test]
    fn test_detect_v1() {
        let segs = [Segment::auto("DETECT ME")];
        let qr = QRBuilder::new(&segs).build().unwrap();
        let img = qr.to_bit_matrix(4, 4);

        let mut dets = detect(&img);
        let det = dets.next().unwrap();
        assert_eq!(&det.grid, qr.matrix());
        assert_eq!(det.alignment, None);
        dets.accept();
        assert!(dets.next().is_none());
    }

    #[test]
    fn test_detect_v3_alignment() {
        let segs = [Segment::auto("0123456789")];
        let qr = QRBuilder::new(&segs).version(Version::new(3).unwrap()).build().unwrap();
        let img = qr.to_bit_matrix(3, 4);

        let det = detect(&img).next().unwrap();
        assert_eq!(&det.grid, qr.matrix());
        assert!(det.alignment.is_some());
    }

    #[test]
    fn test_reject_pulls_alternatives() {
        let segs = [Segment::auto("0123456789")];
        let qr = QRBuilder::new(&segs).version(Version::new(2).unwrap()).build().unwrap();
        let img = qr.to_bit_matrix(4, 4);

        // Found alignment and the expected point give the same sampling here
        let grids: Vec<_> = detect(&img).map(|d| d.grid).collect();
        assert_eq!(&grids[0], qr.matrix());
        assert!(grids.iter().filter(|&g| g == qr.matrix()).count() >= 2);
    }

    #[test]
    fn test_detect_two_symbols() {
        let segs_a = [Segment::auto("FIRST")];
        let segs_b = [Segment::auto("SECOND")];
        let qr_a = QRBuilder::new(&segs_a).build().unwrap();
        let qr_b = QRBuilder::new(&segs_b).build().unwrap();
        let (a, b) = (qr_a.to_bit_matrix(3, 4), qr_b.to_bit_matrix(3, 4));

        let mut img = BitMatrix::new(a.width() + b.width(), a.height());
        paste(&mut img, &a, 0, 0);
        paste(&mut img, &b, a.width(), 0);

        let mut dets = detect(&img);
        let mut found = Vec::new();
        while let Some(det) = dets.next() {
            if &det.grid == qr_a.matrix() || &det.grid == qr_b.matrix() {
                found.push(det.grid);
                dets.accept();
            }
        }
        assert_eq!(found.len(), 2);
        assert_ne!(found[0], found[1]);
    }

    #[test]
    fn test_detect_blank() {
        let img = BitMatrix::new(120, 80);
        assert!(detect(&img).next().is_none());
    }
}
