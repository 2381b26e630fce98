use tracing::trace;

use super::{Charset, Fnc1, Mode, Segment, StructuredAppend};
use crate::common::{
    bit_utils::BitStream,
    error::{QRError, QRResult},
    metadata::{ECLevel, Version},
};

pub(crate) static PADDING_CODEWORDS: [u8; 2] = [0b1110_1100, 0b0001_0001];

// Charset assumed by a reader before any ECI designator
pub(crate) const DEFAULT_CHARSET: Charset = Charset::Iso8859_1;

// Segment body along with everything that precedes it in the stream
struct PackedSegment {
    mode: Mode,
    eci: Option<u32>,
    body: BitStream,
    char_cnt: usize,
}

// Encoder
//------------------------------------------------------------------------------

// Encodes segments into the data codewords of the smallest fitting version, or of
// the requested one. Returns the padded stream and the version used.
pub(crate) fn encode_data(
    segments: &[Segment],
    ecl: ECLevel,
    version: Option<Version>,
    fnc1: Option<Fnc1>,
    structured: Option<StructuredAppend>,
) -> QRResult<(BitStream, Version)> {
    if segments.is_empty() {
        return Err(QRError::EmptyData);
    }

    let packed = pack_segments(segments, fnc1)?;
    let fixed_bits = fixed_bit_len(&packed, fnc1, structured);

    let fits = |ver: Version| {
        let cnt_fits = packed.iter().all(|s| s.char_cnt < 1 << ver.char_cnt_bits(s.mode));
        let bits: usize =
            fixed_bits + packed.iter().map(|s| ver.char_cnt_bits(s.mode)).sum::<usize>();
        cnt_fits && bits <= ver.data_bit_capacity(ecl)
    };

    let ver = match version {
        Some(v) if fits(v) => v,
        Some(_) => return Err(QRError::DataTooLong),
        None => Version::all().find(|&v| fits(v)).ok_or(QRError::CapacityOverflow)?,
    };
    trace!("Data fits version {}: Fixed bits {fixed_bits}", *ver);

    let bcap = ver.data_bit_capacity(ecl);
    let mut bs = BitStream::with_capacity(bcap);
    if let Some(sa) = structured {
        push_structured_append(&mut bs, sa);
    }
    for (i, seg) in packed.iter().enumerate() {
        if let Some(eci) = seg.eci {
            bs.push_bits(Mode::Eci.bits(), Mode::BITS);
            push_eci_designator(&mut bs, eci);
        }
        if i == 0 {
            push_fnc1(&mut bs, fnc1);
        }
        bs.push_bits(seg.mode.bits(), Mode::BITS);
        if seg.mode == Mode::Hanzi {
            // GB2312 subset
            bs.push_bits(0b0001u8, 4);
        }
        bs.push_bits(seg.char_cnt, ver.char_cnt_bits(seg.mode));
        bs.append(&seg.body);
    }

    push_terminator(&mut bs, bcap);
    pad_remaining_capacity(&mut bs, bcap);
    Ok((bs, ver))
}

fn pack_segments(segments: &[Segment], fnc1: Option<Fnc1>) -> QRResult<Vec<PackedSegment>> {
    let gs1 = fnc1 == Some(Fnc1::Gs1);
    // Charset of the last designator written. Until one is, readers guess the charset
    // of non-ASCII bytes, so those always get an explicit designator.
    let mut declared: Option<Charset> = None;
    segments
        .iter()
        .map(|seg| {
            let (body, char_cnt) = seg.pack(gs1)?;
            let eci = match (seg.charset(), declared) {
                (Some(cs), Some(cur)) if cs == cur => None,
                (Some(cs), None) if cs == DEFAULT_CHARSET && seg.text().is_ascii() => None,
                (Some(cs), _) => {
                    declared = Some(cs);
                    Some(cs.eci())
                }
                (None, _) => None,
            };
            Ok(PackedSegment { mode: seg.mode(), eci, body, char_cnt })
        })
        .collect()
}

// Bits of everything except the character count fields
fn fixed_bit_len(
    packed: &[PackedSegment],
    fnc1: Option<Fnc1>,
    structured: Option<StructuredAppend>,
) -> usize {
    let sa_bits = if structured.is_some() { Mode::BITS + 16 } else { 0 };
    let fnc1_bits = match fnc1 {
        Some(Fnc1::Gs1) => Mode::BITS,
        Some(Fnc1::Aim(_)) => Mode::BITS + 8,
        None => 0,
    };
    let seg_bits: usize = packed
        .iter()
        .map(|s| {
            let eci_bits = s.eci.map_or(0, |v| Mode::BITS + eci_designator_len(v));
            let subset_bits = if s.mode == Mode::Hanzi { 4 } else { 0 };
            eci_bits + Mode::BITS + subset_bits + s.body.len()
        })
        .sum();
    sa_bits + fnc1_bits + seg_bits
}

fn push_structured_append(bs: &mut BitStream, sa: StructuredAppend) {
    bs.push_bits(Mode::StructuredAppend.bits(), Mode::BITS);
    bs.push_bits(sa.index, 4);
    bs.push_bits(sa.count - 1, 4);
    bs.push_bits(sa.parity, 8);
}

fn push_fnc1(bs: &mut BitStream, fnc1: Option<Fnc1>) {
    match fnc1 {
        Some(Fnc1::Gs1) => bs.push_bits(Mode::Fnc1First.bits(), Mode::BITS),
        Some(Fnc1::Aim(app)) => {
            bs.push_bits(Mode::Fnc1Second.bits(), Mode::BITS);
            bs.push_bits(app, 8);
        }
        None => {}
    }
}

fn eci_designator_len(value: u32) -> usize {
    match value {
        0..=127 => 8,
        128..=16383 => 16,
        _ => 24,
    }
}

fn push_eci_designator(bs: &mut BitStream, value: u32) {
    match eci_designator_len(value) {
        8 => bs.push_bits(value, 8),
        16 => {
            bs.push_bits(0b10u8, 2);
            bs.push_bits(value, 14);
        }
        _ => {
            bs.push_bits(0b110u8, 3);
            bs.push_bits(value, 21);
        }
    }
}

// Up to 4 zero bits, fewer when the capacity runs out
fn push_terminator(bs: &mut BitStream, bcap: usize) {
    let term_len = (bcap - bs.len()).min(4);
    bs.push_bits(Mode::Terminator.bits(), term_len);
}

fn pad_remaining_capacity(bs: &mut BitStream, bcap: usize) {
    let offset = bs.len() & 7;
    if offset > 0 {
        bs.push_bits(0u8, 8 - offset);
    }

    let pad_cnt = (bcap - bs.len()) >> 3;
    PADDING_CODEWORDS.iter().copied().cycle().take(pad_cnt).for_each(|pc| bs.push_bits(pc, 8));
}

#[cfg(test)]
mod encoder_tests {
    use test_case::test_case;

    use super::encode_data;
    use crate::common::{
        codec::{Charset, Fnc1, Segment, StructuredAppend},
        error::QRError,
        metadata::{ECLevel, Version},
    };

    fn encode(segs: &[Segment], ecl: ECLevel, ver: Option<usize>) -> (Vec<u8>, usize) {
        let ver = ver.map(|v| Version::new(v).unwrap());
        let (bs, ver) = encode_data(segs, ecl, ver, None, None).unwrap();
        (bs.data().to_vec(), *ver)
    }

    #[test]
    fn test_numeric() {
        let (data, ver) = encode(&[Segment::numeric("01234567")], ECLevel::M, Some(1));
        assert_eq!(ver, 1);
        assert_eq!(
            data,
            [
                0x10, 0x20, 0x0c, 0x56, 0x61, 0x80, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11, 0xec, 0x11,
                0xec, 0x11
            ]
        );
    }

    #[test_case(ECLevel::M, b" [\x0bx\xd1r\xdcMC@\xec\x11\xec\x11\xec\x11")]
    #[test_case(ECLevel::Q, b" [\x0bx\xd1r\xdcMC@\xec\x11\xec")]
    fn test_alphanumeric(ecl: ECLevel, exp: &[u8]) {
        let (data, ver) = encode(&[Segment::auto("HELLO WORLD")], ecl, None);
        assert_eq!(ver, 1);
        assert_eq!(data, exp);
    }

    #[test_case(34, 1)]
    #[test_case(35, 2)]
    #[test_case(63, 2)]
    #[test_case(64, 3)]
    fn test_auto_version(digits: usize, exp_ver: usize) {
        let text = "7".repeat(digits);
        let (data, ver) = encode(&[Segment::numeric(&text)], ECLevel::M, None);
        assert_eq!(ver, exp_ver);
        assert_eq!(data.len(), Version::new(ver).unwrap().data_codewords(ECLevel::M));
    }

    #[test]
    fn test_data_too_long() {
        let segs = [Segment::numeric(&"7".repeat(35))];
        let ver = Version::new(1).ok();
        assert_eq!(encode_data(&segs, ECLevel::M, ver, None, None), Err(QRError::DataTooLong));
    }

    #[test]
    fn test_capacity_overflow() {
        let (_, ver) = encode(&[Segment::numeric(&"1".repeat(7089))], ECLevel::L, None);
        assert_eq!(ver, 40);
        let segs = [Segment::numeric(&"1".repeat(7090))];
        let res = encode_data(&segs, ECLevel::L, None, None, None);
        assert_eq!(res, Err(QRError::CapacityOverflow));
        let segs = [Segment::byte(&"a".repeat(2954), Charset::Iso8859_1)];
        let res = encode_data(&segs, ECLevel::L, None, None, None);
        assert_eq!(res, Err(QRError::CapacityOverflow));
    }

    #[test]
    fn test_empty() {
        assert_eq!(encode_data(&[], ECLevel::L, None, None, None), Err(QRError::EmptyData));
        let segs = [Segment::numeric("1"), Segment::alphanumeric("")];
        assert_eq!(encode_data(&segs, ECLevel::L, None, None, None), Err(QRError::EmptyData));
    }

    #[test]
    fn test_eci_header() {
        let (data, _) = encode(&[Segment::byte("é", Charset::Utf8)], ECLevel::L, Some(1));
        assert_eq!(data[..7], [0x71, 0xa4, 0x02, 0xc3, 0xa9, 0x00, 0xec]);

        // Running charset only changes once
        let segs = [Segment::byte("é", Charset::Utf8), Segment::byte("è", Charset::Utf8)];
        let (data, _) = encode(&segs, ECLevel::L, Some(1));
        assert_eq!(data[..8], [0x71, 0xa4, 0x02, 0xc3, 0xa9, 0x40, 0x2c, 0x3a]);

        // ASCII in the default charset needs no designator
        let (data, _) = encode(&[Segment::byte("a", Charset::Iso8859_1)], ECLevel::L, Some(1));
        assert_eq!(data[..3], [0x40, 0x16, 0x10]);

        // Non-ASCII in the default charset is declared once
        let segs =
            [Segment::byte("é", Charset::Iso8859_1), Segment::byte("è", Charset::Iso8859_1)];
        let (data, _) = encode(&segs, ECLevel::L, Some(1));
        // 0111 00000011 0100 00000001 11101001 0100 00000001 11101000 0000
        assert_eq!(data[..8], [0x70, 0x34, 0x01, 0xe9, 0x40, 0x1e, 0x80, 0xec]);
    }

    #[test]
    fn test_fnc1() {
        let segs = [Segment::numeric("1")];
        let (bs, _) = encode_data(&segs, ECLevel::L, None, Some(Fnc1::Aim(37)), None).unwrap();
        // 1001 00100101 0001 0000000001 0001
        assert_eq!(bs.data()[..4], [0x92, 0x51, 0x00, 0x44]);

        let segs = [Segment::alphanumeric("%")];
        let (bs, _) = encode_data(&segs, ECLevel::L, None, Some(Fnc1::Gs1), None).unwrap();
        // 0101 0010 000000010 11011010100 0000
        assert_eq!(bs.data()[..4], [0x52, 0x01, 0x6d, 0x40]);
    }

    #[test]
    fn test_structured_append() {
        let sa = StructuredAppend::new(2, 4, 0xa5).unwrap();
        let segs = [Segment::numeric("1")];
        let (bs, _) = encode_data(&segs, ECLevel::L, None, None, Some(sa)).unwrap();
        // 0011 0010 0011 10100101 0001 0000000001 0001
        assert_eq!(bs.data()[..5], [0x32, 0x3a, 0x51, 0x00, 0x44]);
    }

    #[test]
    fn test_hanzi_subset() {
        let (data, _) = encode(&[Segment::hanzi("啊")], ECLevel::L, Some(1));
        // 1101 0001 00000001 0001111000000
        assert_eq!(data[..4], [0xd1, 0x01, 0x1e, 0x00]);
    }
}
