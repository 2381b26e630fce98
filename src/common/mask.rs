use std::ops::Deref;

use super::{
    error::{QRError, QRResult},
    matrix::ByteMatrix,
};

// Mask pattern
//------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        match pattern {
            0..=7 => Ok(Self(pattern)),
            _ => Err(QRError::InvalidMaskingPattern),
        }
    }

    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(MaskPattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Each function takes (column, row) and returns true where the module is inverted
mod mask_functions {
    pub fn checkerboard(x: i32, y: i32) -> bool {
        (x + y) & 1 == 0
    }

    pub fn horizontal_lines(_: i32, y: i32) -> bool {
        y & 1 == 0
    }

    pub fn vertical_lines(x: i32, _: i32) -> bool {
        x % 3 == 0
    }

    pub fn diagonal_lines(x: i32, y: i32) -> bool {
        (x + y) % 3 == 0
    }

    pub fn large_checkerboard(x: i32, y: i32) -> bool {
        ((y >> 1) + (x / 3)) & 1 == 0
    }

    pub fn fields(x: i32, y: i32) -> bool {
        ((x * y) & 1) + ((x * y) % 3) == 0
    }

    pub fn diamonds(x: i32, y: i32) -> bool {
        (((x * y) & 1) + ((x * y) % 3)) & 1 == 0
    }

    pub fn meadow(x: i32, y: i32) -> bool {
        (((x + y) & 1) + ((x * y) % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i32, i32) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Mask pattern is validated on construction"),
        }
    }
}


// Penalty scoring
//------------------------------------------------------------------------------

pub fn compute_total_penalty(m: &ByteMatrix) -> u32 {
    compute_adjacent_penalty(m)
        + compute_block_penalty(m)
        + compute_finder_pattern_penalty(m, true)
        + compute_finder_pattern_penalty(m, false)
        + compute_balance_penalty(m)
}

// Runs of 5 or more same coloured modules in a row or column
fn compute_adjacent_penalty(m: &ByteMatrix) -> u32 {
    let w = m.size() as i32;
    let mut pen = 0;
    for is_hor in [true, false] {
        for i in 0..w {
            let get = |j: i32| if is_hor { m.is_dark(j, i) } else { m.is_dark(i, j) };
            let mut last = get(0);
            let mut run = 1;
            for j in 1..w {
                let clr = get(j);
                if clr == last {
                    run += 1;
                    continue;
                }
                if run >= 5 {
                    pen += run - 2;
                }
                last = clr;
                run = 1;
            }
            if run >= 5 {
                pen += run - 2;
            }
        }
    }
    pen
}

fn compute_block_penalty(m: &ByteMatrix) -> u32 {
    let w = m.size() as i32;
    let mut pen = 0;
    for y in 0..w - 1 {
        for x in 0..w - 1 {
            let clr = m.is_dark(x, y);
            if clr == m.is_dark(x + 1, y)
                && clr == m.is_dark(x, y + 1)
                && clr == m.is_dark(x + 1, y + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// 1:1:3:1:1 runs with 4 light modules on either side, cells outside the symbol are light
fn compute_finder_pattern_penalty(m: &ByteMatrix, is_hor: bool) -> u32 {
    const PATTERN: [bool; 7] = [true, false, true, true, true, false, true];
    let w = m.size() as i32;
    let mut pen = 0;
    for i in 0..w {
        let get = |j: i32| {
            if !(0..w).contains(&j) {
                return false;
            }
            if is_hor {
                m.is_dark(j, i)
            } else {
                m.is_dark(i, j)
            }
        };
        for j in 0..w - 6 {
            if !(j..j + 7).map(get).eq(PATTERN) {
                continue;
            }
            if !(j - 4..j).any(get) || !(j + 7..j + 11).any(get) {
                pen += 40;
            }
        }
    }
    pen
}

fn compute_balance_penalty(m: &ByteMatrix) -> u32 {
    let w = m.size() as i32;
    let total = (w * w) as u32;
    let dark = (0..w)
        .flat_map(|y| (0..w).map(move |x| (x, y)))
        .filter(|&(x, y)| m.is_dark(x, y))
        .count() as u32;
    let dev = (dark * 2).abs_diff(total);
    dev * 10 / total * 10
}

#[cfg(test)]
mod penalty_tests {
    use super::{
        compute_adjacent_penalty, compute_balance_penalty, compute_block_penalty,
        compute_finder_pattern_penalty, compute_total_penalty,
    };
    use crate::common::matrix::ByteMatrix;

    fn from_rows(rows: &[&str]) -> ByteMatrix {
        let mut m = ByteMatrix::new(rows.len());
        for (y, row) in rows.iter().enumerate() {
            for (x, c) in row.chars().enumerate() {
                m.set(x as i32, y as i32, c == '#');
            }
        }
        m
    }

    #[test]
    fn test_all_light() {
        let m = from_rows(&["....."; 5]);
        assert_eq!(compute_adjacent_penalty(&m), 30);
        assert_eq!(compute_block_penalty(&m), 48);
        assert_eq!(compute_balance_penalty(&m), 100);
        assert_eq!(compute_total_penalty(&m), 178);
    }

    #[test]
    fn test_checkerboard() {
        let m = from_rows(&["#.#.#", ".#.#.", "#.#.#", ".#.#.", "#.#.#"]);
        assert_eq!(compute_total_penalty(&m), 0);
    }

    #[test]
    fn test_adjacent_runs() {
        let m = from_rows(&["######", "#.#.#.", ".#.#.#", "#.#.#.", ".#.#.#", "#.#.#."]);
        // Row of 6 scores 4, no column run reaches 5
        assert_eq!(compute_adjacent_penalty(&m), 4);
    }

    #[test]
    fn test_finder_like_run() {
        let mut rows = vec!["..........."; 11];
        rows[0] = "....#.###.#";
        let m = from_rows(&rows);
        assert_eq!(compute_finder_pattern_penalty(&m, true), 40);
        assert_eq!(compute_finder_pattern_penalty(&m, false), 0);

        rows[0] = "#...#.###.#";
        let m = from_rows(&rows);
        // Light tail lies outside the symbol
        assert_eq!(compute_finder_pattern_penalty(&m, true), 40);

        let mut rows = vec!["..........."; 11];
        rows[0] = "#.#.###.#.#";
        let m = from_rows(&rows);
        assert_eq!(compute_finder_pattern_penalty(&m, true), 0);
    }

    #[test]
    fn test_balance() {
        // 10 of 16 dark: |20 - 16| * 10 / 16 = 2
        let m = from_rows(&["####", "####", "##..", "...."]);
        assert_eq!(compute_balance_penalty(&m), 20);
    }
}
