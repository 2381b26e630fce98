//! # qrcodec
//!
//! A QR code (ISO/IEC 18004, Model 2) encoder and decoder with Reed-Solomon error
//! correction, written for reading symbols out of real images.
//!
//! ## Features
//!
//! - **Encoding**: Numeric, alphanumeric, byte, kanji and hanzi segments, ECI charsets,
//!   FNC1 and structured append headers, automatic version and mask selection
//! - **Detection**: Finder and alignment pattern search, perspective correction through a
//!   homography and timing pattern validation of every candidate
//! - **Decoding**: Reed-Solomon correction per block, mirrored symbol retry and the AIM
//!   symbology identifier of the decoded data
//!
//! ## Quick Start
//!
//! ### Building a QR code
//!
//! ```rust
//! use qrcodec::{ECLevel, QRBuilder, Segment, Version};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Version and mask are picked automatically unless set
//! let segs = [Segment::auto("Hello, World!")];
//! let qr = QRBuilder::new(&segs).ec_level(ECLevel::L).build()?;
//! assert_eq!(qr.version(), Version::new(1)?);
//!
//! // 4 pixels per module with a 4 module quiet zone
//! let img = qr.to_bit_matrix(4, 4);
//! assert_eq!(img.width(), (21 + 8) * 4);
//! # Ok(())
//! # }
//! ```
//!
//! ### Reading a QR code
//!
//! ```rust
//! use qrcodec::{QRBuilder, QRReader, Segment};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let segs = [Segment::numeric("0123456789")];
//! let img = QRBuilder::new(&segs).build()?.to_bit_matrix(3, 4);
//!
//! let decoded = QRReader::read(&img)?;
//! assert_eq!(decoded.content, "0123456789");
//! assert_eq!(decoded.symbology, "]Q1");
//! # Ok(())
//! # }
//! ```
//!
//! Grayscale images go through [`QRReader::read_image`], which binarizes them first.
//! [`detect`] exposes the lazy candidate stream behind the reader for callers that
//! decode grids themselves.
//!
//! ## Error Correction Levels
//! - **L (Low)**: ~7% of codewords recoverable
//! - **M (Medium)**: ~15% of codewords recoverable
//! - **Q (Quartile)**: ~25% of codewords recoverable
//! - **H (High)**: ~30% of codewords recoverable

#![allow(clippy::items_after_test_module)]

pub mod builder;
pub(crate) mod common;
pub mod reader;

pub use builder::{Encoded, QRBuilder};
pub use common::bit_utils::BitStream;
pub use common::codec::{Charset, Fnc1, Mode, Segment, StructuredAppend};
pub use common::ec::{Block, ReedSolomonDecoder, ReedSolomonEncoder};
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::matrix::BitMatrix;
pub use common::metadata::{ECLevel, Version};
pub use reader::utils::geometry::Point;
pub use reader::{detect, Decoded, Detected, Detections, QRReader};
