use encoding_rs::{
    Encoding, BIG5, EUC_KR, GB18030, ISO_8859_10, ISO_8859_13, ISO_8859_14, ISO_8859_15,
    ISO_8859_16, ISO_8859_2, ISO_8859_3, ISO_8859_4, ISO_8859_5, ISO_8859_6, ISO_8859_7,
    ISO_8859_8, SHIFT_JIS, UTF_16BE, UTF_8, WINDOWS_1250, WINDOWS_1251, WINDOWS_1252,
    WINDOWS_1254, WINDOWS_1256, WINDOWS_874,
};

use crate::common::error::{QRError, QRResult};

// Character sets addressable through ECI designators
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Charset {
    Iso8859_1,
    Iso8859_2,
    Iso8859_3,
    Iso8859_4,
    Iso8859_5,
    Iso8859_6,
    Iso8859_7,
    Iso8859_8,
    Iso8859_9,
    Iso8859_10,
    Iso8859_11,
    Iso8859_13,
    Iso8859_14,
    Iso8859_15,
    Iso8859_16,
    ShiftJis,
    Cp1250,
    Cp1251,
    Cp1252,
    Cp1256,
    Utf16Be,
    Utf8,
    Ascii,
    Big5,
    Gb18030,
    EucKr,
}

impl Charset {
    pub const ALL: [Charset; 26] = [
        Self::Iso8859_1,
        Self::Iso8859_2,
        Self::Iso8859_3,
        Self::Iso8859_4,
        Self::Iso8859_5,
        Self::Iso8859_6,
        Self::Iso8859_7,
        Self::Iso8859_8,
        Self::Iso8859_9,
        Self::Iso8859_10,
        Self::Iso8859_11,
        Self::Iso8859_13,
        Self::Iso8859_14,
        Self::Iso8859_15,
        Self::Iso8859_16,
        Self::ShiftJis,
        Self::Cp1250,
        Self::Cp1251,
        Self::Cp1252,
        Self::Cp1256,
        Self::Utf16Be,
        Self::Utf8,
        Self::Ascii,
        Self::Big5,
        Self::Gb18030,
        Self::EucKr,
    ];

    // Assigned ECI values, the first one is written by the encoder
    pub fn eci_values(self) -> &'static [u32] {
        match self {
            Self::Iso8859_1 => &[3, 1],
            Self::Iso8859_2 => &[4],
            Self::Iso8859_3 => &[5],
            Self::Iso8859_4 => &[6],
            Self::Iso8859_5 => &[7],
            Self::Iso8859_6 => &[8],
            Self::Iso8859_7 => &[9],
            Self::Iso8859_8 => &[10],
            Self::Iso8859_9 => &[11],
            Self::Iso8859_10 => &[12],
            Self::Iso8859_11 => &[13],
            Self::Iso8859_13 => &[15],
            Self::Iso8859_14 => &[16],
            Self::Iso8859_15 => &[17],
            Self::Iso8859_16 => &[18],
            Self::ShiftJis => &[20],
            Self::Cp1250 => &[21],
            Self::Cp1251 => &[22],
            Self::Cp1252 => &[23],
            Self::Cp1256 => &[24],
            Self::Utf16Be => &[25],
            Self::Utf8 => &[26],
            Self::Ascii => &[27, 170],
            Self::Big5 => &[28],
            Self::Gb18030 => &[29],
            Self::EucKr => &[30],
        }
    }

    pub fn eci(self) -> u32 {
        self.eci_values()[0]
    }

    pub fn from_eci(value: u32) -> QRResult<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.eci_values().contains(&value))
            .ok_or(QRError::InvalidEci)
    }

    // None for the sets mapped by hand
    fn encoding(self) -> Option<&'static Encoding> {
        let enc = match self {
            Self::Iso8859_1 | Self::Ascii | Self::Utf16Be | Self::Utf8 => return None,
            Self::Iso8859_2 => ISO_8859_2,
            Self::Iso8859_3 => ISO_8859_3,
            Self::Iso8859_4 => ISO_8859_4,
            Self::Iso8859_5 => ISO_8859_5,
            Self::Iso8859_6 => ISO_8859_6,
            Self::Iso8859_7 => ISO_8859_7,
            Self::Iso8859_8 => ISO_8859_8,
            Self::Iso8859_9 => WINDOWS_1254,
            Self::Iso8859_10 => ISO_8859_10,
            Self::Iso8859_11 => WINDOWS_874,
            Self::Iso8859_13 => ISO_8859_13,
            Self::Iso8859_14 => ISO_8859_14,
            Self::Iso8859_15 => ISO_8859_15,
            Self::Iso8859_16 => ISO_8859_16,
            Self::ShiftJis => SHIFT_JIS,
            Self::Cp1250 => WINDOWS_1250,
            Self::Cp1251 => WINDOWS_1251,
            Self::Cp1252 => WINDOWS_1252,
            Self::Cp1256 => WINDOWS_1256,
            Self::Big5 => BIG5,
            Self::Gb18030 => GB18030,
            Self::EucKr => EUC_KR,
        };
        Some(enc)
    }

    pub fn encode(self, text: &str) -> QRResult<Vec<u8>> {
        match self {
            Self::Iso8859_1 => text
                .chars()
                .map(|c| u8::try_from(c as u32).map_err(|_| QRError::InvalidChar))
                .collect(),
            Self::Ascii => {
                if text.is_ascii() {
                    Ok(text.as_bytes().to_vec())
                } else {
                    Err(QRError::InvalidChar)
                }
            }
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            _ => {
                let enc = self.encoding().ok_or(QRError::InvalidChar)?;
                let (bytes, _, has_err) = enc.encode(text);
                if has_err {
                    return Err(QRError::InvalidChar);
                }
                Ok(bytes.into_owned())
            }
        }
    }

    pub fn decode(self, bytes: &[u8]) -> QRResult<String> {
        match self {
            Self::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
            Self::Ascii => {
                if bytes.is_ascii() {
                    Ok(bytes.iter().map(|&b| b as char).collect())
                } else {
                    Err(QRError::InvalidCharacterEncoding)
                }
            }
            _ => {
                let enc = match self {
                    Self::Utf8 => UTF_8,
                    Self::Utf16Be => UTF_16BE,
                    _ => self.encoding().ok_or(QRError::InvalidCharacterEncoding)?,
                };
                let (text, has_err) = enc.decode_without_bom_handling(bytes);
                if has_err {
                    return Err(QRError::InvalidCharacterEncoding);
                }
                Ok(text.into_owned())
            }
        }
    }
}
