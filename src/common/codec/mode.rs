use crate::common::error::{QRError, QRResult};

// Mode
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub enum Mode {
    Terminator = 0b0000,
    Numeric = 0b0001,
    Alphanumeric = 0b0010,
    StructuredAppend = 0b0011,
    Byte = 0b0100,
    Fnc1First = 0b0101,
    Eci = 0b0111,
    Kanji = 0b1000,
    Fnc1Second = 0b1001,
    Hanzi = 0b1101,
}

impl Mode {
    pub const BITS: usize = 4;

    pub fn bits(self) -> u8 {
        self as u8
    }

    pub fn from_bits(bits: u8) -> QRResult<Self> {
        let mode = match bits {
            0b0000 => Self::Terminator,
            0b0001 => Self::Numeric,
            0b0010 => Self::Alphanumeric,
            0b0011 => Self::StructuredAppend,
            0b0100 => Self::Byte,
            0b0101 => Self::Fnc1First,
            0b0111 => Self::Eci,
            0b1000 => Self::Kanji,
            0b1001 => Self::Fnc1Second,
            0b1101 => Self::Hanzi,
            _ => return Err(QRError::InvalidMode(bits)),
        };
        Ok(mode)
    }

    #[inline]
    pub(crate) fn alphanumeric_digit(c: char) -> Option<u16> {
        let d = match c {
            '0'..='9' => c as u16 - '0' as u16,
            'A'..='Z' => c as u16 - 'A' as u16 + 10,
            ' ' => 36,
            '$' => 37,
            '%' => 38,
            '*' => 39,
            '+' => 40,
            '-' => 41,
            '.' => 42,
            '/' => 43,
            ':' => 44,
            _ => return None,
        };
        Some(d)
    }

    #[inline]
    pub(crate) fn alphanumeric_char(digit: u16) -> char {
        debug_assert!(digit < 45, "Invalid alphanumeric digit {digit}");
        b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ $%*+-./:"[digit as usize] as char
    }

    // Bit length of a body holding `char_cnt` characters
    pub fn encoded_len(self, char_cnt: usize) -> usize {
        match self {
            Self::Numeric => (char_cnt * 10).div_ceil(3),
            Self::Alphanumeric => (char_cnt * 11).div_ceil(2),
            Self::Byte => char_cnt * 8,
            Self::Kanji | Self::Hanzi => char_cnt * 13,
            _ => 0,
        }
    }
}
