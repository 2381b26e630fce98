use std::fmt::{Debug, Display, Error, Formatter};

// Error
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Copy, Clone)]
pub enum QRError {
    // QR builder
    EmptyData,
    InvalidChar,
    DataTooLong,
    CapacityOverflow,
    InvalidVersion,
    InvalidMaskingPattern,
    InvalidStructuredAppend,

    // QR reader
    SymbolNotFound,
    SingularMatrix,
    PointAtInfinity,
    InvalidVersionInfo,
    InvalidFormatInfo,
    InvalidCodewordCount,
    TooManyError,
    InvalidMode(u8),
    CorruptDataSegment,
    InvalidCharacterEncoding,
    InvalidEci,
}

impl Display for QRError {
    fn fmt(&self, f: &mut Formatter) -> Result<(), Error> {
        let msg = match *self {
            // QR builder
            Self::EmptyData => "Empty data",
            Self::InvalidChar => "Invalid character",
            Self::DataTooLong => "Data too long for the requested version",
            Self::CapacityOverflow => "Data too long for any version",
            Self::InvalidVersion => "Invalid version",
            Self::InvalidMaskingPattern => "Invalid masking pattern",
            Self::InvalidStructuredAppend => "Invalid structured append header",

            // QR reader
            Self::SymbolNotFound => "Symbol not found",
            Self::SingularMatrix => "Cannot compute homography",
            Self::PointAtInfinity => "Projected point is at infinity",
            Self::InvalidVersionInfo => "Invalid version info detected",
            Self::InvalidFormatInfo => "Invalid format info detected",
            Self::InvalidCodewordCount => "Codeword count doesn't match version capacity",
            Self::TooManyError => "Too many errors to correct successfully",
            Self::InvalidMode(m) => return write!(f, "Invalid mode indicator {m:#06b}"),
            Self::CorruptDataSegment => "Corrupt data segment",
            Self::InvalidCharacterEncoding => "Invalid character encoding",
            Self::InvalidEci => "Unsupported ECI designator",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for QRError {}

pub type QRResult<T> = Result<T, QRError>;

#[cfg(test)]
mod error_tests {
    use super::QRError;

    #[test]
    fn test_display() {
        assert_eq!(QRError::TooManyError.to_string(), "Too many errors to correct successfully");
        assert_eq!(QRError::InvalidMode(0b1010).to_string(), "Invalid mode indicator 0b1010");
    }
}
