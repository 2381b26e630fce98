use std::fmt::Debug;
use std::mem;

use num_traits::PrimInt;

// Bit stream
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitStream {
    data: Vec<u8>,
    // Bit length
    len: usize,
    // Pointer to take bits
    cursor: usize,
}

impl BitStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bit_capacity: usize) -> Self {
        Self { data: Vec::with_capacity(bit_capacity.div_ceil(8)), len: 0, cursor: 0 }
    }

    pub fn from(inp: &[u8]) -> Self {
        Self { data: inp.to_vec(), len: inp.len() << 3, cursor: 0 }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn byte_len(&self) -> usize {
        self.len.div_ceil(8)
    }

    // Backing bytes, last byte zero padded
    pub fn data(&self) -> &[u8] {
        &self.data[..self.byte_len()]
    }

    pub fn get(&self, i: usize) -> bool {
        assert!(i < self.len, "Bit index out of range: Index {i}, Length {}", self.len);
        self.data[i >> 3] & (0x80 >> (i & 7)) != 0
    }

    pub fn set(&mut self, i: usize, bit: bool) {
        assert!(i < self.len, "Bit index out of range: Index {i}, Length {}", self.len);
        if bit {
            self.data[i >> 3] |= 0x80 >> (i & 7);
        } else {
            self.data[i >> 3] &= !(0x80 >> (i & 7));
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|i| self.get(i))
    }
}

// Push bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    // Appends the lowest `size` bits of `bits`, most significant first
    pub fn push_bits<T>(&mut self, bits: T, size: usize)
    where
        T: PrimInt + Debug,
    {
        let max_bits = mem::size_of::<T>() * 8;
        debug_assert!(
            size <= max_bits,
            "Bit count exceeds type width: Size {size}, Width {max_bits}"
        );
        debug_assert!(
            size >= max_bits - bits.leading_zeros() as usize,
            "Value doesn't fit in bit count: Size {size}, Bits {bits:?}"
        );

        for i in (0..size).rev() {
            self.push((bits >> i) & T::one() == T::one());
        }
    }

    pub fn push(&mut self, bit: bool) {
        let offset = self.len & 7;
        if offset == 0 {
            self.data.truncate(self.len >> 3);
            self.data.push(0);
        }
        if bit {
            let pos = self.len >> 3;
            self.data[pos] |= 0x80 >> offset;
        }
        self.len += 1;
    }

    // Appends whole bytes
    pub fn extend(&mut self, arr: &[u8]) {
        if self.len & 7 == 0 {
            self.data.truncate(self.len >> 3);
            self.data.extend_from_slice(arr);
            self.len += arr.len() << 3;
        } else {
            arr.iter().for_each(|&b| self.push_bits(b, 8));
        }
    }

    // Appends every bit of another stream
    pub fn append(&mut self, other: &BitStream) {
        if self.len & 7 == 0 {
            self.data.truncate(self.len >> 3);
            self.data.extend_from_slice(other.data());
            self.len += other.len;
        } else {
            other.iter().for_each(|b| self.push(b));
        }
    }

    // XORs `other` into the leading bits of this stream
    pub fn xor(&mut self, other: &BitStream) {
        assert!(
            other.len <= self.len,
            "Cannot xor a longer stream: Length {}, Other length {}",
            self.len,
            other.len
        );
        let full = other.len >> 3;
        self.data[..full].iter_mut().zip(&other.data[..full]).for_each(|(a, b)| *a ^= b);
        for i in full << 3..other.len {
            let bit = self.get(i) ^ other.get(i);
            self.set(i, bit);
        }
    }

    // Writes `out.len()` bytes starting at `bit_offset`, bits past the end read as zero
    pub fn to_bytes(&self, bit_offset: usize, out: &mut [u8]) {
        let mut pos = bit_offset;
        for byte in out.iter_mut() {
            let mut b = 0u8;
            for _ in 0..8 {
                b <<= 1;
                if pos < self.len && self.get(pos) {
                    b |= 1;
                }
                pos += 1;
            }
            *byte = b;
        }
    }
}

#[cfg(test)]
mod bit_stream_push_tests {

    use super::BitStream;

    #[test]
    fn test_len() {
        // Mode indicator, count field, numeric groups then a partial group
        let fields: [(u32, usize); 6] =
            [(0, 0), (0b0001, 4), (0b0_0000_1100, 10), (0x3e7, 10), (0x7f, 7), (0x1ffffff, 25)];
        let mut bs = BitStream::new();
        let mut total = 0;
        for (bits, size) in fields {
            bs.push_bits(bits, size);
            total += size;
            assert_eq!(bs.len(), total);
            assert_eq!(bs.byte_len(), total.div_ceil(8));
        }
        assert_eq!(bs.len(), 56);
    }

    #[test]
    #[should_panic]
    fn test_invalid_len() {
        let mut bs = BitStream::new();
        bs.push_bits(256u16, 8);
    }

    #[test]
    fn test_push() {
        let mut bs = BitStream::new();
        bs.push(false);
        assert_eq!(bs.data(), &[0b00000000]);
        bs.push(true);
        assert_eq!(bs.data(), &[0b01000000]);
    }

    #[test]
    fn test_push_bits() {
        let exp_vec = [210, 52, 141, 35, 72, 210, 183, 42, 7, 219, 91, 14, 253, 68, 120, 193];
        let mut inp = BitStream::from(&exp_vec);
        let mut out = BitStream::new();
        for n in [0, 1, 2, 3, 4, 5, 6, 7, 8, 4, 8, 9, 11, 15, 16, 5, 16] {
            let bits = inp.take_bits(n).unwrap();
            out.push_bits(bits, n);
            let out_off = out.len() & 7;
            let len = out.len() >> 3;
            assert_eq!(out.data()[..len], exp_vec[..len], "n {n}");
            if out_off > 0 {
                assert_eq!(out.data()[len] >> (8 - out_off), exp_vec[len] >> (8 - out_off));
            }
        }
    }

    #[test]
    fn test_extend_unaligned() {
        let mut bs = BitStream::new();
        bs.push_bits(0b101u8, 3);
        bs.extend(&[0xff, 0x00]);
        assert_eq!(bs.len(), 19);
        assert_eq!(bs.data(), &[0b10111111, 0b11100000, 0b00000000]);
    }

    #[test]
    fn test_append() {
        let mut a = BitStream::new();
        a.push_bits(0b11u8, 2);
        let mut b = BitStream::new();
        b.push_bits(0b0110_1u8, 5);
        a.append(&b);
        assert_eq!(a.len(), 7);
        assert_eq!(a.data(), &[0b11011010]);

        let mut c = BitStream::new();
        c.extend(&[0xab]);
        c.append(&a);
        assert_eq!(c.len(), 15);
        assert_eq!(c.data(), &[0xab, 0b11011010]);
    }
}

// Get, set, xor & bulk extraction
//------------------------------------------------------------------------------


// Take bits for bit stream
//------------------------------------------------------------------------------

impl BitStream {
    // Reads `size` (<= 32) bits from the cursor as an unsigned integer
    pub fn take_bits(&mut self, size: usize) -> Option<u32> {
        debug_assert!(size <= 32, "Cannot take more than 32 bits at once: Size {size}");
        if self.cursor + size > self.len {
            return None;
        }

        let mut res = 0u32;
        for i in self.cursor..self.cursor + size {
            res = (res << 1) | self.get(i) as u32;
        }
        self.cursor += size;
        Some(res)
    }

    pub fn remaining(&self) -> usize {
        self.len - self.cursor
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }
}
