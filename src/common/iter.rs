use super::metadata::Version;

// Iterator over the encoding region of a symbol in placement order
//------------------------------------------------------------------------------

// Walks column pairs from the right edge, alternating upward and downward, and
// yields (x, y) of every module not reserved for a function pattern.
pub struct EncRegionIter {
    version: Version,
    size: i32,
    // Right column of the current pair
    col: i32,
    row: i32,
    // 0 for the right column of the pair, 1 for the left
    sub: i32,
    upward: bool,
}

impl EncRegionIter {
    pub fn new(version: Version) -> Self {
        let size = version.width() as i32;
        Self { version, size, col: size - 1, row: size - 1, sub: 0, upward: true }
    }

    // Advances one step along the zigzag, returns false once the region is exhausted
    fn advance(&mut self) -> bool {
        if self.sub == 0 {
            self.sub = 1;
            return true;
        }
        self.sub = 0;

        let next_row = if self.upward { self.row - 1 } else { self.row + 1 };
        if (0..self.size).contains(&next_row) {
            self.row = next_row;
            return true;
        }

        self.upward = !self.upward;
        self.col -= 2;
        if self.col == 6 {
            self.col = 5;
        }
        self.col >= 0
    }
}

impl Iterator for EncRegionIter {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        while self.col >= 0 {
            let (x, y) = (self.col - self.sub, self.row);
            let reserved = is_reserved(self.version, x, y);
            if !self.advance() {
                self.col = -1;
            }
            if !reserved {
                return Some((x, y));
            }
        }
        None
    }
}

// True for modules taken by finders, separators, timing, alignment, format & version info
pub fn is_reserved(version: Version, x: i32, y: i32) -> bool {
    let size = version.width() as i32;

    // Finders with separators and format info
    if (x < 9 && y < 9) || (x >= size - 8 && y < 9) || (x < 9 && y >= size - 8) {
        return true;
    }

    if x == 6 || y == 6 {
        return true;
    }

    if version.has_version_info()
        && ((x < 6 && (size - 11..size - 8).contains(&y))
            || (y < 6 && (size - 11..size - 8).contains(&x)))
    {
        return true;
    }

    let ap = version.alignment_pattern();
    let last = ap.len().saturating_sub(1);
    ap.iter().enumerate().any(|(i, &cy)| {
        ap.iter().enumerate().any(|(j, &cx)| {
            let overlaps_finder =
                (i == 0 && j == 0) || (i == 0 && j == last) || (i == last && j == 0);
            !overlaps_finder && (x - cx).abs() <= 2 && (y - cy).abs() <= 2
        })
    })
}

#[cfg(test)]
mod iter_tests {
    use std::collections::HashSet;

    use super::{is_reserved, EncRegionIter};
    use crate::common::metadata::Version;

    #[test]
    fn test_first_steps() {
        let ver = Version::new(1).unwrap();
        let coords: Vec<_> = EncRegionIter::new(ver).take(10).collect();
        assert_eq!(
            coords,
            vec![
                (20, 20),
                (19, 20),
                (20, 19),
                (19, 19),
                (20, 18),
                (19, 18),
                (20, 17),
                (19, 17),
                (20, 16),
                (19, 16)
            ]
        );
    }

    #[test]
    fn test_turns_at_top() {
        // Column pair 20/19 runs up rows 20..9, then pair 18/17 starts downward from row 9
        let ver = Version::new(1).unwrap();
        let coords: Vec<_> = EncRegionIter::new(ver).skip(24).take(4).collect();
        assert_eq!(coords, vec![(18, 9), (17, 9), (18, 10), (17, 10)]);
    }

    #[test]
    fn test_region_matches_capacity() {
        for ver in Version::all() {
            let coords: Vec<_> = EncRegionIter::new(ver).collect();
            assert_eq!(coords.len(), ver.raw_modules(), "{ver:?}");
            let unique: HashSet<_> = coords.iter().collect();
            assert_eq!(unique.len(), coords.len(), "{ver:?}");
            assert!(coords.iter().all(|&(x, y)| !is_reserved(ver, x, y) && x != 6));
        }
    }

    #[test]
    fn test_reserved() {
        let ver = Version::new(7).unwrap();
        assert!(is_reserved(ver, 8, 8));
        assert!(is_reserved(ver, 37, 8));
        assert!(!is_reserved(ver, 36, 9));
        assert!(is_reserved(ver, 8, 37));
        assert!(is_reserved(ver, 20, 6));
        assert!(is_reserved(ver, 24, 24));
        assert!(is_reserved(ver, 5, 34));
        assert!(is_reserved(ver, 34, 0));
        assert!(!is_reserved(ver, 9, 9));
        assert!(!is_reserved(ver, 9, 22));
        assert!(!is_reserved(ver, 44, 44));
    }
}
