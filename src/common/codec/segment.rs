use super::{Charset, Mode};
use crate::common::{
    bit_utils::BitStream,
    error::{QRError, QRResult},
};

// Segment
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Numeric(String),
    Alphanumeric(String),
    Byte { text: String, charset: Charset },
    Kanji(String),
    Hanzi(String),
}

impl Segment {
    pub fn numeric(text: &str) -> Self {
        Self::Numeric(text.to_string())
    }

    pub fn alphanumeric(text: &str) -> Self {
        Self::Alphanumeric(text.to_string())
    }

    pub fn byte(text: &str, charset: Charset) -> Self {
        Self::Byte { text: text.to_string(), charset }
    }

    pub fn kanji(text: &str) -> Self {
        Self::Kanji(text.to_string())
    }

    pub fn hanzi(text: &str) -> Self {
        Self::Hanzi(text.to_string())
    }

    // Densest single mode that holds the whole text
    pub fn auto(text: &str) -> Self {
        if text.bytes().all(|b| b.is_ascii_digit()) {
            Self::numeric(text)
        } else if text.chars().all(|c| Mode::alphanumeric_digit(c).is_some()) {
            Self::alphanumeric(text)
        } else if text.is_ascii() {
            Self::byte(text, Charset::Iso8859_1)
        } else {
            Self::byte(text, Charset::Utf8)
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Self::Numeric(_) => Mode::Numeric,
            Self::Alphanumeric(_) => Mode::Alphanumeric,
            Self::Byte { .. } => Mode::Byte,
            Self::Kanji(_) => Mode::Kanji,
            Self::Hanzi(_) => Mode::Hanzi,
        }
    }

    // Charset announced through ECI, only byte segments carry one
    pub fn charset(&self) -> Option<Charset> {
        match self {
            Self::Byte { charset, .. } => Some(*charset),
            _ => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Self::Numeric(t) | Self::Alphanumeric(t) | Self::Kanji(t) | Self::Hanzi(t) => t,
            Self::Byte { text, .. } => text,
        }
    }

    // Packs the body and returns it along with the character count. `gs1` escapes
    // '%' and GS in alphanumeric text.
    pub(crate) fn pack(&self, gs1: bool) -> QRResult<(BitStream, usize)> {
        if self.text().is_empty() {
            return Err(QRError::EmptyData);
        }

        match self {
            Self::Numeric(t) => pack_numeric(t),
            Self::Alphanumeric(t) => pack_alphanumeric(t, gs1),
            Self::Byte { text, charset } => pack_byte(text, *charset),
            Self::Kanji(t) => pack_double_byte(t, Charset::ShiftJis, kanji_value),
            Self::Hanzi(t) => pack_double_byte(t, Charset::Gb18030, hanzi_value),
        }
    }
}

fn pack_numeric(text: &str) -> QRResult<(BitStream, usize)> {
    let digits = text.as_bytes();
    if !digits.iter().all(|b| b.is_ascii_digit()) {
        return Err(QRError::InvalidChar);
    }

    let mut bs = BitStream::with_capacity(Mode::Numeric.encoded_len(digits.len()));
    for chunk in digits.chunks(3) {
        let val = chunk.iter().fold(0u16, |n, &b| n * 10 + (b - b'0') as u16);
        bs.push_bits(val, chunk.len() * 3 + 1);
    }
    Ok((bs, digits.len()))
}

fn pack_alphanumeric(text: &str, gs1: bool) -> QRResult<(BitStream, usize)> {
    let mut digits = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '%' if gs1 => digits.extend([38, 38]),
            '\x1d' if gs1 => digits.push(38),
            _ => digits.push(Mode::alphanumeric_digit(c).ok_or(QRError::InvalidChar)?),
        }
    }

    let mut bs = BitStream::with_capacity(Mode::Alphanumeric.encoded_len(digits.len()));
    for chunk in digits.chunks(2) {
        match *chunk {
            [a, b] => bs.push_bits(a * 45 + b, 11),
            [a] => bs.push_bits(a, 6),
            _ => unreachable!(),
        }
    }
    Ok((bs, digits.len()))
}

fn pack_byte(text: &str, charset: Charset) -> QRResult<(BitStream, usize)> {
    let bytes = charset.encode(text)?;
    let mut bs = BitStream::with_capacity(bytes.len() * 8);
    bs.extend(&bytes);
    Ok((bs, bytes.len()))
}

// Each character must encode to exactly one double byte pair inside the mode's bands
fn pack_double_byte(
    text: &str,
    charset: Charset,
    to_value: fn(u16) -> Option<u16>,
) -> QRResult<(BitStream, usize)> {
    let mut bs = BitStream::new();
    let mut buf = [0u8; 4];
    let mut count = 0;
    for c in text.chars() {
        let bytes = charset.encode(c.encode_utf8(&mut buf))?;
        let &[hi, lo] = bytes.as_slice() else {
            return Err(QRError::InvalidChar);
        };
        let val = to_value(u16::from_be_bytes([hi, lo])).ok_or(QRError::InvalidChar)?;
        bs.push_bits(val, 13);
        count += 1;
    }
    Ok((bs, count))
}

fn kanji_value(code: u16) -> Option<u16> {
    let sub = match code {
        0x8140..=0x9ffc => code - 0x8140,
        0xe040..=0xebbf => code - 0xc140,
        _ => return None,
    };
    Some((sub >> 8) * 0xc0 + (sub & 0xff))
}

fn hanzi_value(code: u16) -> Option<u16> {
    if code & 0xff < 0xa1 {
        return None;
    }
    let sub = match code {
        0xa1a1..=0xaafe => code - 0xa1a1,
        0xb0a1..=0xfafe => code - 0xa6a1,
        _ => return None,
    };
    Some((sub >> 8) * 0x60 + (sub & 0xff))
}
