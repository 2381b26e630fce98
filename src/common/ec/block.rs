use super::{ReedSolomonDecoder, ReedSolomonEncoder};
use crate::common::error::QRResult;

// Data codewords followed by their error correction codewords
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Block {
    codewords: Vec<u8>,
    // Data length
    dlen: usize,
}

impl Block {
    pub fn new(data: &[u8], ec_len: usize, encoder: &mut ReedSolomonEncoder) -> Self {
        let mut codewords = Vec::with_capacity(data.len() + ec_len);
        codewords.extend_from_slice(data);
        codewords.extend(encoder.encode(data, ec_len));
        Self { codewords, dlen: data.len() }
    }

    pub fn with_encoded(encoded: &[u8], dlen: usize) -> Self {
        debug_assert!(
            dlen < encoded.len(),
            "Block has no ecc: Len {}, Data len {dlen}",
            encoded.len()
        );
        Self { codewords: encoded.to_vec(), dlen }
    }

    pub fn len(&self) -> usize {
        self.codewords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codewords.is_empty()
    }

    pub fn ec_len(&self) -> usize {
        self.len() - self.dlen
    }

    pub fn data_len(&self) -> usize {
        self.dlen
    }

    pub fn full(&self) -> &[u8] {
        &self.codewords
    }

    pub fn data(&self) -> &[u8] {
        &self.codewords[..self.dlen]
    }

    pub fn ecc(&self) -> &[u8] {
        &self.codewords[self.dlen..]
    }

    // Corrects the block in place, returns the number of fixed codewords
    pub fn rectify(&mut self) -> QRResult<usize> {
        let ec_len = self.ec_len();
        ReedSolomonDecoder::decode(&mut self.codewords, ec_len)
    }
}
