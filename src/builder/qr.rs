use crate::common::{
    bit_utils::BitStream,
    iter::{is_reserved, EncRegionIter},
    mask::{compute_total_penalty, MaskPattern},
    matrix::{BitMatrix, ByteMatrix},
    metadata::{
        format_info, ECLevel, Version, DARK_MODULE, FORMAT_INFO_COORDS_MAIN,
        FORMAT_INFO_COORDS_SIDE, VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
    },
};

// Symbol under construction
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub(crate) struct QR {
    grid: ByteMatrix,
    ver: Version,
    ecl: ECLevel,
}

impl QR {
    pub fn new(ver: Version, ecl: ECLevel) -> Self {
        Self { grid: ByteMatrix::new(ver.width()), ver, ecl }
    }

    pub fn grid(&self) -> &ByteMatrix {
        &self.grid
    }

    pub fn width(&self) -> usize {
        self.grid.size()
    }

    pub fn to_bit_matrix(&self) -> BitMatrix {
        debug_assert!(
            (0..self.width() as i32)
                .all(|y| (0..self.width() as i32).all(|x| !self.grid.is_unset(x, y))),
            "Unset module found in a finished symbol"
        );
        self.grid.to_bit_matrix()
    }
}

// Finder pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_finder_patterns(&mut self) {
        self.draw_finder_pattern_at(3, 3);
        self.draw_finder_pattern_at(-4, 3);
        self.draw_finder_pattern_at(3, -4);
    }

    // Draws the 7x7 pattern along with the separator on its inner sides
    fn draw_finder_pattern_at(&mut self, x: i32, y: i32) {
        let (dx_left, dx_right): (i32, i32) = if x > 0 { (-3, 4) } else { (-4, 3) };
        let (dy_top, dy_bottom): (i32, i32) = if y > 0 { (-3, 4) } else { (-4, 3) };
        for j in dy_top..=dy_bottom {
            for i in dx_left..=dx_right {
                let dark = !matches!(i32::max(i.abs(), j.abs()), 2 | 4);
                self.grid.set(x + i, y + j, dark);
            }
        }
    }
}

// Timing pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_timing_pattern(&mut self) {
        let w = self.width() as i32;
        for k in 8..w - 8 {
            self.grid.set(k, 6, k & 1 == 0);
            self.grid.set(6, k, k & 1 == 0);
        }
    }
}

// Alignment pattern
//------------------------------------------------------------------------------

impl QR {
    fn draw_alignment_patterns(&mut self) {
        let poses = self.ver.alignment_pattern();
        for &y in poses {
            for &x in poses {
                self.draw_alignment_pattern_at(x, y)
            }
        }
    }

    fn draw_alignment_pattern_at(&mut self, x: i32, y: i32) {
        let last = self.width() as i32 - 7;
        if (x == 6 && (y == 6 || y == last)) || (x == last && y == 6) {
            return;
        }
        for j in -2..=2 {
            for i in -2..=2 {
                let dark = matches!((i, j), (-2 | 2, _) | (_, -2 | 2) | (0, 0));
                self.grid.set(x + i, y + j, dark);
            }
        }
    }
}

// Format & version info
//------------------------------------------------------------------------------

impl QR {
    fn reserve_format_area(&mut self) {
        self.draw_format_info(0);
    }

    pub fn draw_format_info(&mut self, info: u32) {
        self.draw_number(info, &FORMAT_INFO_COORDS_MAIN);
        self.draw_number(info, &FORMAT_INFO_COORDS_SIDE);
    }

    fn draw_dark_module(&mut self) {
        let (x, y) = DARK_MODULE;
        self.grid.set(x, y, true);
    }

    fn draw_version_info(&mut self) {
        if !self.ver.has_version_info() {
            return;
        }
        let info = self.ver.version_info();
        self.draw_number(info, &VERSION_INFO_COORDS_BL);
        self.draw_number(info, &VERSION_INFO_COORDS_TR);
    }

    // Coordinates are ordered from the most significant bit
    fn draw_number(&mut self, number: u32, coords: &[(i32, i32)]) {
        let bit_len = coords.len();
        for (i, &(x, y)) in coords.iter().enumerate() {
            self.grid.set(x, y, (number >> (bit_len - 1 - i)) & 1 == 1);
        }
    }
}

// All function patterns
//------------------------------------------------------------------------------

impl QR {
    pub fn draw_all_function_patterns(&mut self) {
        self.draw_finder_patterns();
        self.draw_timing_pattern();
        self.draw_alignment_patterns();
        self.reserve_format_area();
        self.draw_dark_module();
        self.draw_version_info();
    }
}

// Encoding region
//------------------------------------------------------------------------------

impl QR {
    // Places the codewords along the zigzag, leftover remainder modules stay light
    pub fn draw_encoding_region(&mut self, payload: &[u8]) {
        debug_assert_eq!(
            payload.len(),
            self.ver.total_codewords(),
            "Payload doesn't fill the symbol"
        );

        let bits = BitStream::from(payload);
        let mut coords = EncRegionIter::new(self.ver);
        for (bit, (x, y)) in bits.iter().zip(coords.by_ref()) {
            self.grid.set(x, y, bit);
        }
        for (x, y) in coords {
            self.grid.set(x, y, false);
        }
    }

    // Inverts data modules where the mask function holds and writes the matching format info
    pub fn apply_mask(&mut self, mask: MaskPattern) {
        let mask_fn = mask.mask_function();
        let w = self.width() as i32;
        for y in 0..w {
            for x in 0..w {
                if mask_fn(x, y) && !is_reserved(self.ver, x, y) {
                    let dark = self.grid.is_dark(x, y);
                    self.grid.set(x, y, !dark);
                }
            }
        }
        self.draw_format_info(format_info(self.ecl, mask));
    }

    // Mask with the lowest penalty, the lower pattern wins a tie
    pub fn best_mask(&self) -> MaskPattern {
        MaskPattern::all()
            .min_by_key(|&m| {
                let mut candidate = self.clone();
                candidate.apply_mask(m);
                compute_total_penalty(candidate.grid())
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod qr_tests {
    use super::QR;
    use crate::common::{
        iter::is_reserved,
        mask::{compute_total_penalty, MaskPattern},
        metadata::{
            format_info, ECLevel, Version, FORMAT_INFO_COORDS_MAIN, FORMAT_INFO_COORDS_SIDE,
            VERSION_INFO_COORDS_BL, VERSION_INFO_COORDS_TR,
        },
    };

    fn read_number(qr: &QR, coords: &[(i32, i32)]) -> u32 {
        coords.iter().fold(0, |acc, &(x, y)| (acc << 1) | qr.grid().is_dark(x, y) as u32)
    }

    #[test]
    fn test_function_patterns_v1() {
        let mut qr = QR::new(Version::new(1).unwrap(), ECLevel::L);
        qr.draw_all_function_patterns();
        qr.draw_format_info(format_info(ECLevel::L, MaskPattern::new(0).unwrap()));
        assert_eq!(
            qr.grid().to_debug_str(),
            "\n\
             #######..????.#######\n\
             #.....#..????.#.....#\n\
             #.###.#.#????.#.###.#\n\
             #.###.#..????.#.###.#\n\
             #.###.#..????.#.###.#\n\
             #.....#..????.#.....#\n\
             #######.#.#.#.#######\n\
             ........#????........\n\
             ###.#####????##...#..\n\
             ??????.??????????????\n\
             ??????#??????????????\n\
             ??????.??????????????\n\
             ??????#??????????????\n\
             ........#????????????\n\
             #######.#????????????\n\
             #.....#.#????????????\n\
             #.###.#.#????????????\n\
             #.###.#..????????????\n\
             #.###.#.#????????????\n\
             #.....#.#????????????\n\
             #######.#????????????\n"
        );
    }

    #[test]
    fn test_function_patterns_match_reserved_area() {
        for v in [1, 2, 7, 14, 40] {
            let ver = Version::new(v).unwrap();
            let mut qr = QR::new(ver, ECLevel::M);
            qr.draw_all_function_patterns();
            let w = ver.width() as i32;
            for y in 0..w {
                for x in 0..w {
                    assert_eq!(
                        qr.grid().is_unset(x, y),
                        !is_reserved(ver, x, y),
                        "Version {v} module ({x}, {y})"
                    );
                }
            }
        }
    }

    #[test]
    fn test_alignment_patterns_v7() {
        let mut qr = QR::new(Version::new(7).unwrap(), ECLevel::L);
        qr.draw_all_function_patterns();
        let g = qr.grid();
        for (x, y) in [(22, 22), (6, 22), (22, 6), (38, 22), (22, 38), (38, 38)] {
            assert!(g.is_dark(x, y));
            assert!(!g.is_dark(x + 1, y));
            assert!(!g.is_dark(x, y - 1));
            assert!(g.is_dark(x + 2, y + 2));
            assert!(g.is_dark(x - 2, y));
        }
    }

    #[test]
    fn test_version_info() {
        for v in [7, 21, 40] {
            let ver = Version::new(v).unwrap();
            let mut qr = QR::new(ver, ECLevel::L);
            qr.draw_all_function_patterns();
            assert_eq!(read_number(&qr, &VERSION_INFO_COORDS_BL), ver.version_info());
            assert_eq!(read_number(&qr, &VERSION_INFO_COORDS_TR), ver.version_info());
        }
    }

    #[test]
    fn test_apply_mask() {
        let ver = Version::new(1).unwrap();
        let mut qr = QR::new(ver, ECLevel::Q);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&[0; 26]);

        let mask = MaskPattern::new(1).unwrap();
        qr.apply_mask(mask);
        let info = format_info(ECLevel::Q, mask);
        assert_eq!(read_number(&qr, &FORMAT_INFO_COORDS_MAIN), info);
        assert_eq!(read_number(&qr, &FORMAT_INFO_COORDS_SIDE), info);

        // All data bits are light, so data modules on even rows turn dark
        let f = mask.mask_function();
        for y in 0..21 {
            for x in 0..21 {
                if !is_reserved(ver, x, y) {
                    assert_eq!(qr.grid().is_dark(x, y), f(x, y));
                }
            }
        }
    }

    #[test]
    fn test_encoding_region_fills_symbol() {
        let ver = Version::new(2).unwrap();
        let mut qr = QR::new(ver, ECLevel::L);
        qr.draw_all_function_patterns();
        let payload: Vec<u8> = (0..ver.total_codewords()).map(|i| (i * 31) as u8).collect();
        qr.draw_encoding_region(&payload);
        let w = ver.width() as i32;
        assert!((0..w).all(|y| (0..w).all(|x| !qr.grid().is_unset(x, y))));
    }

    #[test]
    fn test_best_mask() {
        let ver = Version::new(1).unwrap();
        let mut qr = QR::new(ver, ECLevel::M);
        qr.draw_all_function_patterns();
        let payload: Vec<u8> = (0..26).map(|i| (i * 73 + 5) as u8).collect();
        qr.draw_encoding_region(&payload);

        let best = qr.best_mask();
        let penalty = |m: MaskPattern| {
            let mut c = qr.clone();
            c.apply_mask(m);
            compute_total_penalty(c.grid())
        };
        let best_penalty = penalty(best);
        for m in MaskPattern::all() {
            assert!(penalty(m) >= best_penalty);
            if m < best {
                assert!(penalty(m) > best_penalty);
            }
        }
    }
}
