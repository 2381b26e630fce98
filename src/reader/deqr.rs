use tracing::trace;

use crate::common::{
    bit_utils::BitStream,
    codec::{decode_data, Fnc1, StructuredAppend},
    ec::Block,
    error::{QRError, QRResult},
    iter::EncRegionIter,
    mask::MaskPattern,
    matrix::BitMatrix,
    metadata::{
        parse_format_info, parse_version_info, ECBlocks, ECLevel, Version,
        FORMAT_INFO_COORDS_MAIN, FORMAT_INFO_COORDS_SIDE, VERSION_INFO_COORDS_BL,
        VERSION_INFO_COORDS_TR,
    },
};

// Decoded symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub content: String,
    // AIM symbology identifier, ]Q1 to ]Q6
    pub symbology: String,
    pub fnc1: Option<Fnc1>,
    // Codewords fixed by error correction
    pub corrected: usize,
    pub structured: Option<StructuredAppend>,
    pub mask: MaskPattern,
    pub level: ECLevel,
    pub version: Version,
    // True if the symbol was read transposed
    pub mirror: bool,
}

// Decodes a module grid, one bit per module
pub(crate) fn decode_grid(grid: &BitMatrix, mirror: bool) -> QRResult<Decoded> {
    if grid.width() != grid.height() {
        return Err(QRError::InvalidVersionInfo);
    }

    let version = read_version(grid)?;
    let (level, mask) = read_format(grid)?;
    trace!("Reading version {}, level {level:?}, mask {}", *version, *mask);

    let codewords = read_codewords(grid, version, mask)?;
    let (data, corrected) = correct(&codewords, version.ec_blocks(level))?;
    let decoded = decode_data(&data, version)?;

    Ok(Decoded {
        content: decoded.content,
        symbology: decoded.symbology,
        fnc1: decoded.fnc1,
        corrected,
        structured: decoded.structured,
        mask,
        level,
        version,
        mirror,
    })
}

// Negative coordinates wrap from the far edge
fn module(grid: &BitMatrix, x: i32, y: i32) -> bool {
    let w = grid.width() as i32;
    let x = if x < 0 { x + w } else { x };
    let y = if y < 0 { y + w } else { y };
    grid.get(x as usize, y as usize)
}

// Coordinates are ordered from the most significant bit
fn read_number(grid: &BitMatrix, coords: &[(i32, i32)]) -> u32 {
    coords.iter().fold(0, |acc, &(x, y)| (acc << 1) | module(grid, x, y) as u32)
}

// Version & format
//------------------------------------------------------------------------------

fn read_version(grid: &BitMatrix) -> QRResult<Version> {
    let version = Version::from_grid_size(grid.width())?;
    if !version.has_version_info() {
        return Ok(version);
    }

    // A copy corrected into the wrong version falls through to the other copy
    for coords in [&VERSION_INFO_COORDS_BL, &VERSION_INFO_COORDS_TR] {
        match parse_version_info(read_number(grid, coords)) {
            Ok(read) if read == version => return Ok(read),
            Ok(read) => trace!("Version info {} doesn't match grid size {}", *read, grid.width()),
            Err(_) => {}
        }
    }
    Err(QRError::InvalidVersionInfo)
}

fn read_format(grid: &BitMatrix) -> QRResult<(ECLevel, MaskPattern)> {
    let main = read_number(grid, &FORMAT_INFO_COORDS_MAIN);
    let side = read_number(grid, &FORMAT_INFO_COORDS_SIDE);
    parse_format_info(&[main, side])
}

// Codewords
//------------------------------------------------------------------------------

fn read_codewords(grid: &BitMatrix, version: Version, mask: MaskPattern) -> QRResult<Vec<u8>> {
    let mask_fn = mask.mask_function();
    let mut bs = BitStream::with_capacity(version.raw_modules());
    for (x, y) in EncRegionIter::new(version) {
        let bit = grid.get(x as usize, y as usize) ^ mask_fn(x, y);
        bs.push(bit);
    }

    let total = version.total_codewords();
    if bs.len() / 8 < total {
        return Err(QRError::InvalidCodewordCount);
    }
    Ok(bs.data()[..total].to_vec())
}

// Splits interleaved codewords back into blocks, short blocks first and data before ecc
pub(crate) fn deinterleave(codewords: &[u8], ecb: &ECBlocks) -> Vec<Block> {
    let sizes: Vec<usize> = ecb.block_sizes().collect();
    let ec_len = ecb.ec_per_block;
    let mut blocks: Vec<Vec<u8>> = sizes.iter().map(|&s| Vec::with_capacity(s + ec_len)).collect();

    let mut it = codewords.iter().copied();
    let max_len = sizes.iter().copied().max().unwrap_or(0);
    for i in 0..max_len {
        for (b, &s) in blocks.iter_mut().zip(&sizes) {
            if i < s {
                b.extend(it.next());
            }
        }
    }
    for _ in 0..ec_len {
        for b in blocks.iter_mut() {
            b.extend(it.next());
        }
    }

    blocks.iter().zip(&sizes).map(|(b, &s)| Block::with_encoded(b, s)).collect()
}

// Corrects every block and returns the joined data codewords with the number of fixes
fn correct(codewords: &[u8], ecb: &ECBlocks) -> QRResult<(Vec<u8>, usize)> {
    let mut data = Vec::with_capacity(ecb.data_codewords());
    let mut corrected = 0;
    for mut block in deinterleave(codewords, ecb) {
        corrected += block.rectify()?;
        data.extend_from_slice(block.data());
    }
    Ok((data, corrected))
}
