mod charset;
mod decoder;
mod encoder;
mod mode;
mod segment;

pub use charset::Charset;
pub(crate) use decoder::{decode_data, DecodedData};
pub(crate) use encoder::encode_data;
pub use mode::Mode;
pub use segment::Segment;

use super::error::{QRError, QRResult};

// FNC1 hint
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fnc1 {
    // GS1 formatted data, indicator in the first position
    Gs1,
    // Industry application, carries the AIM application indicator
    Aim(u8),
}

// Structured append
//------------------------------------------------------------------------------

// Position of a symbol in a sequence of up to 16 symbols carrying one message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructuredAppend {
    pub index: u8,
    pub count: u8,
    pub parity: u8,
}

impl StructuredAppend {
    pub fn new(index: u8, count: u8, parity: u8) -> QRResult<Self> {
        if !(1..=16).contains(&count) || index >= count {
            return Err(QRError::InvalidStructuredAppend);
        }
        Ok(Self { index, count, parity })
    }

    // XOR of every byte of the full message
    pub fn parity_of(data: &[u8]) -> u8 {
        data.iter().fold(0, |acc, &b| acc ^ b)
    }
}
