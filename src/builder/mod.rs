mod qr;

use std::ops::Deref;

use tracing::{debug, debug_span};

use qr::QR;

use crate::common::{
    codec::{encode_data, Fnc1, Segment, StructuredAppend},
    ec::{Block, ReedSolomonEncoder},
    error::QRResult,
    mask::MaskPattern,
    matrix::BitMatrix,
    metadata::{ECBlocks, ECLevel, Version},
};

// Builder
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct QRBuilder<'a> {
    segments: &'a [Segment],
    version: Option<Version>,
    ec_level: ECLevel,
    mask: Option<MaskPattern>,
    fnc1: Option<Fnc1>,
    structured: Option<StructuredAppend>,
}

impl<'a> QRBuilder<'a> {
    pub fn new(segments: &'a [Segment]) -> Self {
        Self {
            segments,
            version: None,
            ec_level: ECLevel::M,
            mask: None,
            fnc1: None,
            structured: None,
        }
    }

    pub fn segments(&mut self, segments: &'a [Segment]) -> &mut Self {
        self.segments = segments;
        self
    }

    pub fn version(&mut self, version: Version) -> &mut Self {
        self.version = Some(version);
        self
    }

    pub fn unset_version(&mut self) -> &mut Self {
        self.version = None;
        self
    }

    pub fn ec_level(&mut self, ec_level: ECLevel) -> &mut Self {
        self.ec_level = ec_level;
        self
    }

    pub fn mask(&mut self, mask: MaskPattern) -> &mut Self {
        self.mask = Some(mask);
        self
    }

    pub fn unset_mask(&mut self) -> &mut Self {
        self.mask = None;
        self
    }

    pub fn fnc1(&mut self, fnc1: Fnc1) -> &mut Self {
        self.fnc1 = Some(fnc1);
        self
    }

    pub fn structured_append(&mut self, structured: StructuredAppend) -> &mut Self {
        self.structured = Some(structured);
        self
    }

    pub fn metadata(&self) -> String {
        let version = self.version.map_or("auto".to_string(), |v| (*v).to_string());
        let mask = self.mask.map_or("auto".to_string(), |m| (*m).to_string());
        format!("{{ Version: {version}, Ec level: {:?}, Mask: {mask} }}", self.ec_level)
    }
}

impl QRBuilder<'_> {
    pub fn build(&self) -> QRResult<Encoded> {
        let span =
            debug_span!("build", metadata = %self.metadata(), segments = self.segments.len());
        let _guard = span.enter();

        let (encoded, version) =
            encode_data(self.segments, self.ec_level, self.version, self.fnc1, self.structured)?;
        debug!("Data encoded in version {}", *version);

        let payload = Self::compute_payload(encoded.data(), version, self.ec_level);

        let mut qr = QR::new(version, self.ec_level);
        qr.draw_all_function_patterns();
        qr.draw_encoding_region(&payload);

        let mask = match self.mask {
            Some(m) => m,
            None => qr.best_mask(),
        };
        qr.apply_mask(mask);
        debug!("Applied mask {}", *mask);

        Ok(Encoded { matrix: qr.to_bit_matrix(), version, level: self.ec_level, mask })
    }

    // Data codewords interleaved across blocks, followed by the interleaved ecc
    fn compute_payload(data: &[u8], version: Version, ec_level: ECLevel) -> Vec<u8> {
        let ecb = version.ec_blocks(ec_level);
        let mut encoder = ReedSolomonEncoder::new();
        let blocks = Self::blockify(data, ecb)
            .into_iter()
            .map(|d| Block::new(d, ecb.ec_per_block, &mut encoder))
            .collect::<Vec<_>>();

        let data_blocks = blocks.iter().map(Block::data).collect::<Vec<_>>();
        let ecc_blocks = blocks.iter().map(Block::ecc).collect::<Vec<_>>();
        let mut payload = Self::interleave(&data_blocks);
        payload.extend(Self::interleave(&ecc_blocks));
        payload
    }

    pub(crate) fn blockify<'d>(data: &'d [u8], ecb: &ECBlocks) -> Vec<&'d [u8]> {
        debug_assert_eq!(
            data.len(),
            ecb.data_codewords(),
            "Data len doesn't match total size of blocks"
        );

        let mut blocks = Vec::with_capacity(ecb.num_blocks());
        let mut rest = data;
        for size in ecb.block_sizes() {
            let (block, tail) = rest.split_at(size);
            blocks.push(block);
            rest = tail;
        }
        blocks
    }

    pub(crate) fn interleave<T: Copy, V: Deref<Target = [T]>>(blocks: &[V]) -> Vec<T> {
        let max_block_size = blocks.iter().map(|b| b.len()).max().unwrap_or(0);
        let total_size = blocks.iter().map(|b| b.len()).sum::<usize>();
        let mut res = Vec::with_capacity(total_size);
        for i in 0..max_block_size {
            for b in blocks {
                if i < b.len() {
                    res.push(b[i]);
                }
            }
        }
        res
    }
}

// Encoded symbol
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Encoded {
    matrix: BitMatrix,
    version: Version,
    level: ECLevel,
    mask: MaskPattern,
}

impl Encoded {
    pub fn size(&self) -> usize {
        self.matrix.width()
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn level(&self) -> ECLevel {
        self.level
    }

    pub fn mask(&self) -> MaskPattern {
        self.mask
    }

    // True for a dark module
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.matrix.get(x, y)
    }

    pub fn matrix(&self) -> &BitMatrix {
        &self.matrix
    }

    // Scales every module to `module_size` pixels and surrounds the symbol with
    // `quiet_zone` light modules
    pub fn to_bit_matrix(&self, module_size: usize, quiet_zone: usize) -> BitMatrix {
        assert!(module_size > 0, "Module size must be positive");
        let sz = self.size();
        let total = (sz + 2 * quiet_zone) * module_size;
        let mut res = BitMatrix::square(total);
        for y in 0..sz {
            for x in 0..sz {
                if self.matrix.get(x, y) {
                    let left = (x + quiet_zone) * module_size;
                    let top = (y + quiet_zone) * module_size;
                    res.set_region(left, top, module_size, module_size);
                }
            }
        }
        res
    }
}

#[cfg(test)]
mod builder_tests {
    use test_case::test_case;

    use super::QRBuilder;
    use crate::common::{
        codec::{Segment, StructuredAppend},
        error::QRError,
        mask::MaskPattern,
        metadata::{parse_format_info, ECLevel, Version, FORMAT_INFO_COORDS_MAIN},
    };

    #[test]
    fn test_metadata() {
        let segs = [Segment::auto("Hello, world!")];
        let mut builder = QRBuilder::new(&segs);
        assert_eq!(builder.metadata(), "{ Version: auto, Ec level: M, Mask: auto }");
        builder.version(Version::new(3).unwrap()).ec_level(ECLevel::H);
        builder.mask(MaskPattern::new(5).unwrap());
        assert_eq!(builder.metadata(), "{ Version: 3, Ec level: H, Mask: 5 }");
        builder.unset_version().unset_mask();
        assert_eq!(builder.metadata(), "{ Version: auto, Ec level: H, Mask: auto }");
    }

    #[test]
    fn test_payload_simple() {
        let msg = b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11";
        let payload = QRBuilder::compute_payload(msg, Version::new(1).unwrap(), ECLevel::M);
        assert_eq!(&payload[..16], msg);
        assert_eq!(&payload[16..], b"\xc4\x23\x27\x77\xeb\xd7\xe7\xe2\x5d\x17");
    }

    #[test]
    fn test_payload_complex() {
        let msg = b"CUF\x86W&U\xc2w2\x06\x12\x06g&\xf6\xf6B\x07v\x86\xf2\x07&V\x16\xc6\xc7\x92\x06\
                    \xb6\xe6\xf7w2\x07v\x86W&R\x06\x86\x972\x07F\xf7vV\xc2\x06\x972\x10\xec\x11\xec\
                    \x11\xec\x11\xec";
        let expected_ec = [
            b"\xd5\xc7\x0b\x2d\x73\xf7\xf1\xdf\xe5\xf8\x9a\x75\x9a\x6f\x56\xa1\x6f\x27",
            b"\x57\xcc\x60\x3c\xca\xb6\x7c\x9d\xc8\x86\x1b\x81\xd1\x11\xa3\xa3\x78\x85",
            b"\x94\x74\xb1\xd4\x4c\x85\x4b\xf2\xee\x4c\xc3\xe6\xbd\x0a\x6c\xf0\xc0\x8d",
            b"\xeb\x9f\x05\xad\x18\x93\x3b\x21\x6a\x28\xff\xac\x52\x02\x83\x20\xb2\xec",
        ];
        let payload = QRBuilder::compute_payload(msg, Version::new(5).unwrap(), ECLevel::Q);
        assert_eq!(payload.len(), 134);
        assert_eq!(payload[..4], [msg[0], msg[15], msg[30], msg[46]]);
        // Only the long blocks hold a 16th data codeword
        assert_eq!(payload[60..62], [msg[45], msg[61]]);
        let exp_ecc = QRBuilder::interleave(&expected_ec.map(|e| e.to_vec()));
        assert_eq!(&payload[62..], exp_ecc);
    }

    #[test]
    fn test_blockify() {
        let ver = Version::new(5).unwrap();
        let data: Vec<u8> = (0..62).collect();
        let blocks = QRBuilder::blockify(&data, ver.ec_blocks(ECLevel::Q));
        let sizes: Vec<_> = blocks.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, [15, 15, 16, 16]);
        assert_eq!(blocks[2][0], 30);
    }

    #[test]
    fn test_interleave() {
        let blocks = vec![vec![1, 2, 3], vec![4, 5, 6], vec![7, 8, 9, 0]];
        let interleaved = QRBuilder::interleave(&blocks);
        assert_eq!(interleaved, vec![1, 4, 7, 2, 5, 8, 3, 6, 9, 0]);
        assert!(QRBuilder::interleave::<u8, Vec<u8>>(&[]).is_empty());
    }

    #[test_case(1, ECLevel::L)]
    #[test_case(5, ECLevel::M)]
    #[test_case(7, ECLevel::Q)]
    #[test_case(40, ECLevel::H)]
    fn test_build_fixed(v: usize, ecl: ECLevel) {
        let segs = [Segment::numeric("0123456789")];
        let ver = Version::new(v).unwrap();
        let mask = MaskPattern::new(3).unwrap();
        let qr = QRBuilder::new(&segs).version(ver).ec_level(ecl).mask(mask).build().unwrap();
        assert_eq!(qr.version(), ver);
        assert_eq!(qr.size(), ver.width());
        assert_eq!(qr.level(), ecl);
        assert_eq!(qr.mask(), mask);

        let info = FORMAT_INFO_COORDS_MAIN.iter().fold(0, |acc, &(x, y)| {
            (acc << 1) | qr.get(x as usize, y as usize) as u32
        });
        assert_eq!(parse_format_info(&[info]), Ok((ecl, mask)));
    }

    #[test]
    fn test_build_errors() {
        let segs = [Segment::numeric(&"1234567890".repeat(306))];
        let err = QRBuilder::new(&segs).version(Version::MAX).ec_level(ECLevel::H).build();
        assert_eq!(err, Err(QRError::DataTooLong));
        assert_eq!(QRBuilder::new(&[]).build(), Err(QRError::EmptyData));
        let segs = [Segment::alphanumeric("hello")];
        assert_eq!(QRBuilder::new(&segs).build(), Err(QRError::InvalidChar));
    }

    #[test]
    fn test_build_metadata_headers() {
        let segs = [Segment::auto("PART ONE")];
        let sa = StructuredAppend::new(0, 2, 0x21).unwrap();
        let qr = QRBuilder::new(&segs).structured_append(sa).build().unwrap();
        assert_eq!(*qr.version(), 1);
    }

    #[test]
    fn test_to_bit_matrix() {
        let segs = [Segment::auto("A")];
        let qr = QRBuilder::new(&segs).build().unwrap();
        let m = qr.to_bit_matrix(3, 4);
        assert_eq!(m.width(), (21 + 8) * 3);
        assert_eq!(m.count_ones(), qr.matrix().count_ones() * 9);
        // Top left corner of the finder
        assert!(!m.get(11, 11));
        assert!(m.get(12, 12));
        assert!(m.get(14, 14));
    }
}
