mod version_db;

use std::ops::Deref;

pub(crate) use version_db::{ALIGNMENT_PATTERN_POSITIONS, EC_BLOCKS, REMAINDER_BITS};

use super::{
    codec::Mode,
    ec::rectify_info,
    error::{QRError, QRResult},
    mask::MaskPattern,
};

// Error correction level
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ECLevel {
    L = 0,
    M = 1,
    Q = 2,
    H = 3,
}

impl ECLevel {
    pub const ALL: [ECLevel; 4] = [ECLevel::L, ECLevel::M, ECLevel::Q, ECLevel::H];

    // 2 bit code used in format info
    pub fn bits(self) -> u8 {
        match self {
            Self::L => 0b01,
            Self::M => 0b00,
            Self::Q => 0b11,
            Self::H => 0b10,
        }
    }

    pub fn from_bits(bits: u8) -> Self {
        match bits & 0b11 {
            0b01 => Self::L,
            0b00 => Self::M,
            0b11 => Self::Q,
            _ => Self::H,
        }
    }
}


// EC block layout
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ECB {
    pub count: usize,
    pub data_codewords: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ECBlocks {
    pub ec_per_block: usize,
    groups: [ECB; 2],
}

impl ECBlocks {
    pub(crate) const fn new(
        ec_per_block: usize,
        count1: usize,
        data1: usize,
        count2: usize,
        data2: usize,
    ) -> Self {
        Self {
            ec_per_block,
            groups: [
                ECB { count: count1, data_codewords: data1 },
                ECB { count: count2, data_codewords: data2 },
            ],
        }
    }

    // Groups in symbol order, short blocks first
    pub fn groups(&self) -> impl Iterator<Item = &ECB> {
        self.groups.iter().filter(|g| g.count > 0)
    }

    pub fn num_blocks(&self) -> usize {
        self.groups().map(|g| g.count).sum()
    }

    pub fn data_codewords(&self) -> usize {
        self.groups().map(|g| g.count * g.data_codewords).sum()
    }

    pub fn total_codewords(&self) -> usize {
        self.data_codewords() + self.num_blocks() * self.ec_per_block
    }

    // Data codeword count of each block in order
    pub fn block_sizes(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups().flat_map(|g| std::iter::repeat(g.data_codewords).take(g.count))
    }
}

// Version
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version(usize);

impl Deref for Version {
    type Target = usize;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Version {
    pub const MIN: Version = Version(1);
    pub const MAX: Version = Version(40);

    pub fn new(version: usize) -> QRResult<Self> {
        match version {
            1..=40 => Ok(Self(version)),
            _ => Err(QRError::InvalidVersion),
        }
    }

    pub fn all() -> impl Iterator<Item = Version> {
        (1..=40).map(Version)
    }

    pub fn from_grid_size(size: usize) -> QRResult<Self> {
        if !(21..=177).contains(&size) || (size - 17) % 4 != 0 {
            return Err(QRError::InvalidVersionInfo);
        }
        Ok(Self((size - 17) / 4))
    }

    pub fn width(self) -> usize {
        self.0 * 4 + 17
    }

    pub fn alignment_pattern(self) -> &'static [i32] {
        ALIGNMENT_PATTERN_POSITIONS[self.0 - 1]
    }

    pub fn ec_blocks(self, ecl: ECLevel) -> &'static ECBlocks {
        &EC_BLOCKS[self.0 - 1][ecl as usize]
    }

    // Modules left for data and ecc after every function pattern and info area
    pub fn raw_modules(self) -> usize {
        let v = self.0;
        let mut res = (16 * v + 128) * v + 64;
        if v >= 2 {
            let n = v / 7 + 2;
            res -= (25 * n - 10) * n - 55;
            if v >= 7 {
                res -= 36;
            }
        }
        res
    }

    pub fn total_codewords(self) -> usize {
        self.raw_modules() >> 3
    }

    pub fn remainder_bits(self) -> usize {
        REMAINDER_BITS[self.0 - 1]
    }

    pub fn data_codewords(self, ecl: ECLevel) -> usize {
        self.ec_blocks(ecl).data_codewords()
    }

    pub fn data_bit_capacity(self, ecl: ECLevel) -> usize {
        self.data_codewords(ecl) << 3
    }

    // Bit length of the character count indicator
    pub fn char_cnt_bits(self, mode: Mode) -> usize {
        let band = match self.0 {
            1..=9 => 0,
            10..=26 => 1,
            _ => 2,
        };
        match mode {
            Mode::Numeric => [10, 12, 14][band],
            Mode::Alphanumeric => [9, 11, 13][band],
            Mode::Byte => [8, 16, 16][band],
            Mode::Kanji | Mode::Hanzi => [8, 10, 12][band],
            _ => 0,
        }
    }

    pub fn has_version_info(self) -> bool {
        self.0 >= 7
    }

    pub fn version_info(self) -> u32 {
        debug_assert!(self.has_version_info(), "Version info only exists from version 7");
        VERSION_INFOS[self.0 - 7]
    }
}


// Format & version info
//------------------------------------------------------------------------------

// Remainder of data * x^deg(poly) divided by poly over GF(2)
const fn bch_remainder(data: u32, poly: u32) -> u32 {
    let poly_deg = 31 - poly.leading_zeros();
    let mut rem = data << poly_deg;
    while rem != 0 && 31 - rem.leading_zeros() >= poly_deg {
        rem ^= poly << (31 - rem.leading_zeros() - poly_deg);
    }
    rem
}

const FORMAT_INFO_POLY: u32 = 0x537;
const FORMAT_INFO_MASK: u32 = 0x5412;
const VERSION_INFO_POLY: u32 = 0x1f25;

// Indexed by (ec level bits << 3) | mask
pub(crate) static FORMAT_INFOS: [u32; 32] = {
    let mut res = [0; 32];
    let mut i = 0;
    while i < 32 {
        res[i] = ((i as u32) << 10 | bch_remainder(i as u32, FORMAT_INFO_POLY)) ^ FORMAT_INFO_MASK;
        i += 1;
    }
    res
};

// Indexed by version - 7
pub(crate) static VERSION_INFOS: [u32; 34] = {
    let mut res = [0; 34];
    let mut i = 0;
    while i < 34 {
        let v = i as u32 + 7;
        res[i] = v << 12 | bch_remainder(v, VERSION_INFO_POLY);
        i += 1;
    }
    res
};

pub fn format_info(ecl: ECLevel, mask: MaskPattern) -> u32 {
    FORMAT_INFOS[((ecl.bits() as usize) << 3) | *mask as usize]
}

// Picks the format closest to any of the read copies, allowing up to 3 bit errors
pub fn parse_format_info(copies: &[u32]) -> QRResult<(ECLevel, MaskPattern)> {
    let info = rectify_info(copies, &FORMAT_INFOS, 3).ok_or(QRError::InvalidFormatInfo)?;
    let data = (info ^ FORMAT_INFO_MASK) >> 10;
    let ecl = ECLevel::from_bits((data >> 3) as u8);
    let mask = MaskPattern::new((data & 0b111) as u8)?;
    Ok((ecl, mask))
}

pub fn parse_version_info(info: u32) -> QRResult<Version> {
    let info = rectify_info(&[info], &VERSION_INFOS, 3).ok_or(QRError::InvalidVersionInfo)?;
    Version::new((info >> 12) as usize)
}

// Format info bit positions from bit 14 to bit 0, negative values wrap from the far edge
pub(crate) static FORMAT_INFO_COORDS_MAIN: [(i32, i32); 15] = [
    (0, 8),
    (1, 8),
    (2, 8),
    (3, 8),
    (4, 8),
    (5, 8),
    (7, 8),
    (8, 8),
    (8, 7),
    (8, 5),
    (8, 4),
    (8, 3),
    (8, 2),
    (8, 1),
    (8, 0),
];

pub(crate) static FORMAT_INFO_COORDS_SIDE: [(i32, i32); 15] = [
    (8, -1),
    (8, -2),
    (8, -3),
    (8, -4),
    (8, -5),
    (8, -6),
    (8, -7),
    (-8, 8),
    (-7, 8),
    (-6, 8),
    (-5, 8),
    (-4, 8),
    (-3, 8),
    (-2, 8),
    (-1, 8),
];

pub(crate) const DARK_MODULE: (i32, i32) = (8, -8);

// Version info bit positions from bit 17 to bit 0
pub(crate) static VERSION_INFO_COORDS_BL: [(i32, i32); 18] = version_info_coords(false);
pub(crate) static VERSION_INFO_COORDS_TR: [(i32, i32); 18] = version_info_coords(true);

const fn version_info_coords(top_right: bool) -> [(i32, i32); 18] {
    let mut res = [(0, 0); 18];
    let mut i = 0;
    while i < 18 {
        let bit = 17 - i;
        let (a, b) = ((bit / 3) as i32, (bit % 3) as i32 - 11);
        res[i] = if top_right { (b, a) } else { (a, b) };
        i += 1;
    }
    res
}
