// Bit matrix with rows packed into 32 bit words
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitMatrix {
    width: usize,
    height: usize,
    // Words per row
    row_size: usize,
    bits: Vec<u32>,
}

impl BitMatrix {
    pub fn new(width: usize, height: usize) -> Self {
        assert!(width > 0 && height > 0, "Matrix dimensions must be positive");
        let row_size = width.div_ceil(32);
        Self { width, height, row_size, bits: vec![0; row_size * height] }
    }

    pub fn square(size: usize) -> Self {
        Self::new(size, size)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> (usize, u32) {
        assert!(
            x < self.width && y < self.height,
            "Coordinate out of range: ({x}, {y}), Dimensions {}x{}",
            self.width,
            self.height
        );
        (y * self.row_size + (x >> 5), 1 << (x & 31))
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        let (i, mask) = self.offset(x, y);
        self.bits[i] & mask != 0
    }

    pub fn set(&mut self, x: usize, y: usize) {
        let (i, mask) = self.offset(x, y);
        self.bits[i] |= mask;
    }

    pub fn unset(&mut self, x: usize, y: usize) {
        let (i, mask) = self.offset(x, y);
        self.bits[i] &= !mask;
    }

    pub fn set_to(&mut self, x: usize, y: usize, bit: bool) {
        if bit {
            self.set(x, y);
        } else {
            self.unset(x, y);
        }
    }

    pub fn flip(&mut self, x: usize, y: usize) {
        let (i, mask) = self.offset(x, y);
        self.bits[i] ^= mask;
    }

    // Inverts every cell, padding bits past the row width stay clear
    pub fn flip_all(&mut self) {
        let tail = self.width & 31;
        let last_mask = if tail == 0 { u32::MAX } else { (1 << tail) - 1 };
        for row in self.bits.chunks_exact_mut(self.row_size) {
            row.iter_mut().for_each(|w| *w = !*w);
            if let Some(last) = row.last_mut() {
                *last &= last_mask;
            }
        }
    }

    pub fn set_region(&mut self, left: usize, top: usize, width: usize, height: usize) {
        assert!(
            left + width <= self.width && top + height <= self.height,
            "Region exceeds matrix: ({left}, {top}) {width}x{height}"
        );
        for y in top..top + height {
            for x in left..left + width {
                self.set(x, y);
            }
        }
    }

    // Transposes a square matrix across its main diagonal
    pub fn mirror(&mut self) {
        assert!(self.width == self.height, "Only square matrices can be mirrored");
        for y in 0..self.height {
            for x in y + 1..self.width {
                let (a, b) = (self.get(x, y), self.get(y, x));
                if a != b {
                    self.flip(x, y);
                    self.flip(y, x);
                }
            }
        }
    }

    pub fn count_ones(&self) -> usize {
        self.bits.iter().map(|w| w.count_ones() as usize).sum()
    }

    pub fn to_debug_str(&self) -> String {
        let mut res = String::with_capacity((self.width + 1) * self.height + 1);
        res.push('\n');
        for y in 0..self.height {
            for x in 0..self.width {
                res.push(if self.get(x, y) { '#' } else { '.' });
            }
            res.push('\n');
        }
        res
    }
}

#[cfg(test)]
mod bit_matrix_tests {
    use super::BitMatrix;

    #[test]
    fn test_set_get() {
        let mut m = BitMatrix::new(45, 7);
        m.set(0, 0);
        m.set(31, 3);
        m.set(32, 3);
        m.set(44, 6);
        assert!(m.get(0, 0));
        assert!(m.get(31, 3));
        assert!(m.get(32, 3));
        assert!(m.get(44, 6));
        assert!(!m.get(33, 3));
        assert_eq!(m.count_ones(), 4);
        m.unset(31, 3);
        assert!(!m.get(31, 3));
        m.set_to(1, 1, true);
        assert!(m.get(1, 1));
        m.flip(1, 1);
        assert!(!m.get(1, 1));
    }

    #[test]
    #[should_panic]
    fn test_out_of_range() {
        let m = BitMatrix::new(21, 21);
        m.get(21, 0);
    }

    #[test]
    fn test_flip_all_twice() {
        let mut m = BitMatrix::new(37, 5);
        m.set_region(3, 1, 30, 2);
        let orig = m.clone();
        m.flip_all();
        assert_eq!(m.count_ones(), 37 * 5 - 60);
        assert!(!m.get(3, 1));
        assert!(m.get(0, 0));
        m.flip_all();
        assert_eq!(m, orig);
    }

    #[test]
    fn test_set_region() {
        let mut m = BitMatrix::square(6);
        m.set_region(1, 2, 3, 2);
        let exp = "\n\
                   ......\n\
                   ......\n\
                   .###..\n\
                   .###..\n\
                   ......\n\
                   ......\n";
        assert_eq!(m.to_debug_str(), exp);
    }

    #[test]
    fn test_mirror() {
        let mut m = BitMatrix::square(4);
        m.set(3, 0);
        m.set(1, 2);
        m.set(2, 2);
        let orig = m.clone();
        m.mirror();
        assert!(m.get(0, 3));
        assert!(m.get(2, 1));
        assert!(m.get(2, 2));
        assert!(!m.get(3, 0));
        m.mirror();
        assert_eq!(m, orig);
    }
}

// Byte matrix used while constructing a symbol, -1 marks an unset cell
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteMatrix {
    size: usize,
    cells: Vec<i8>,
}

impl ByteMatrix {
    pub const UNSET: i8 = -1;

    pub fn new(size: usize) -> Self {
        Self { size, cells: vec![Self::UNSET; size * size] }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    // Negative coordinates wrap around from the far edge
    #[inline]
    fn coord_to_index(&self, x: i32, y: i32) -> usize {
        let w = self.size as i32;
        debug_assert!(-w <= x && x < w, "Column out of range: {x}");
        debug_assert!(-w <= y && y < w, "Row out of range: {y}");
        let x = if x < 0 { x + w } else { x };
        let y = if y < 0 { y + w } else { y };
        (y * w + x) as usize
    }

    pub fn get(&self, x: i32, y: i32) -> i8 {
        self.cells[self.coord_to_index(x, y)]
    }

    pub fn is_dark(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == 1
    }

    pub fn is_unset(&self, x: i32, y: i32) -> bool {
        self.get(x, y) == Self::UNSET
    }

    pub fn set(&mut self, x: i32, y: i32, dark: bool) {
        let i = self.coord_to_index(x, y);
        self.cells[i] = dark as i8;
    }

    pub fn to_bit_matrix(&self) -> BitMatrix {
        let mut res = BitMatrix::square(self.size);
        for (i, &c) in self.cells.iter().enumerate() {
            if c == 1 {
                res.set(i % self.size, i / self.size);
            }
        }
        res
    }

    pub fn to_debug_str(&self) -> String {
        let w = self.size as i32;
        let mut res = String::with_capacity((self.size + 1) * self.size + 1);
        res.push('\n');
        for y in 0..w {
            for x in 0..w {
                let c = match self.get(x, y) {
                    Self::UNSET => '?',
                    0 => '.',
                    _ => '#',
                };
                res.push(c);
            }
            res.push('\n');
        }
        res
    }
}
