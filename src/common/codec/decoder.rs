use tracing::trace;

use super::{Charset, Fnc1, Mode, StructuredAppend};
use crate::common::{
    bit_utils::BitStream,
    error::{QRError, QRResult},
    metadata::Version,
};

// Decoded data
//------------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct DecodedData {
    pub content: String,
    pub symbology: String,
    pub fnc1: Option<Fnc1>,
    pub structured: Option<StructuredAppend>,
}

// Decoder
//------------------------------------------------------------------------------

// Decodes the data codewords of a symbol segment by segment until a terminator or
// until the stream can no longer hold a mode indicator
pub(crate) fn decode_data(data: &[u8], ver: Version) -> QRResult<DecodedData> {
    let mut inp = BitStream::from(data);
    let mut out = String::with_capacity(data.len());
    let mut charset = None;
    let mut has_eci = false;
    let mut fnc1 = None;
    let mut structured = None;

    while inp.remaining() >= Mode::BITS {
        let mode = Mode::from_bits(take(&mut inp, Mode::BITS)? as u8)?;
        trace!("Mode {mode:?} at bit {}", inp.cursor() - Mode::BITS);

        match mode {
            Mode::Terminator => break,
            Mode::StructuredAppend => structured = Some(take_structured_append(&mut inp)?),
            Mode::Fnc1First => fnc1 = Some(Fnc1::Gs1),
            Mode::Fnc1Second => fnc1 = Some(Fnc1::Aim(take(&mut inp, 8)? as u8)),
            Mode::Eci => {
                charset = Some(Charset::from_eci(take_eci_designator(&mut inp)?)?);
                has_eci = true;
            }
            Mode::Numeric => {
                let char_cnt = take_char_cnt(&mut inp, ver, mode)?;
                write_numeric(&mut inp, char_cnt, &mut out)?;
            }
            Mode::Alphanumeric => {
                let char_cnt = take_char_cnt(&mut inp, ver, mode)?;
                write_alphanumeric(&mut inp, char_cnt, fnc1 == Some(Fnc1::Gs1), &mut out)?;
            }
            Mode::Byte => {
                let char_cnt = take_char_cnt(&mut inp, ver, mode)?;
                write_byte(&mut inp, char_cnt, charset, &mut out)?;
            }
            Mode::Kanji => {
                let char_cnt = take_char_cnt(&mut inp, ver, mode)?;
                write_kanji(&mut inp, char_cnt, &mut out)?;
            }
            Mode::Hanzi => {
                // Only the GB2312 subset is defined
                if take(&mut inp, 4)? != 1 {
                    return Err(QRError::CorruptDataSegment);
                }
                let char_cnt = take_char_cnt(&mut inp, ver, mode)?;
                write_hanzi(&mut inp, char_cnt, &mut out)?;
            }
        }
    }

    let symbology = match (fnc1, has_eci) {
        (None, false) => "]Q1",
        (None, true) => "]Q2",
        (Some(Fnc1::Gs1), false) => "]Q3",
        (Some(Fnc1::Gs1), true) => "]Q4",
        (Some(Fnc1::Aim(_)), false) => "]Q5",
        (Some(Fnc1::Aim(_)), true) => "]Q6",
    };

    Ok(DecodedData { content: out, symbology: symbology.to_string(), fnc1, structured })
}

fn take(inp: &mut BitStream, size: usize) -> QRResult<u32> {
    inp.take_bits(size).ok_or(QRError::CorruptDataSegment)
}

fn take_char_cnt(inp: &mut BitStream, ver: Version, mode: Mode) -> QRResult<usize> {
    Ok(take(inp, ver.char_cnt_bits(mode))? as usize)
}

fn take_structured_append(inp: &mut BitStream) -> QRResult<StructuredAppend> {
    let index = take(inp, 4)? as u8;
    let count = take(inp, 4)? as u8 + 1;
    let parity = take(inp, 8)? as u8;
    Ok(StructuredAppend { index, count, parity })
}

fn take_eci_designator(inp: &mut BitStream) -> QRResult<u32> {
    let first = take(inp, 8)?;
    match first {
        _ if first & 0x80 == 0 => Ok(first),
        _ if first & 0xc0 == 0x80 => Ok(((first & 0x3f) << 8) | take(inp, 8)?),
        _ if first & 0xe0 == 0xc0 => Ok(((first & 0x1f) << 16) | take(inp, 16)?),
        _ => Err(QRError::InvalidEci),
    }
}

fn write_numeric(inp: &mut BitStream, mut char_cnt: usize, out: &mut String) -> QRResult<()> {
    while char_cnt > 0 {
        let digits = char_cnt.min(3);
        let chunk = take(inp, digits * 3 + 1)?;
        if chunk >= 10u32.pow(digits as u32) {
            return Err(QRError::CorruptDataSegment);
        }
        out.push_str(&format!("{chunk:0digits$}"));
        char_cnt -= digits;
    }
    Ok(())
}

fn write_alphanumeric(
    inp: &mut BitStream,
    mut char_cnt: usize,
    gs1: bool,
    out: &mut String,
) -> QRResult<()> {
    let mut text = String::with_capacity(char_cnt);
    while char_cnt > 0 {
        if char_cnt > 1 {
            let chunk = take(inp, 11)?;
            if chunk >= 45 * 45 {
                return Err(QRError::CorruptDataSegment);
            }
            text.push(Mode::alphanumeric_char((chunk / 45) as u16));
            text.push(Mode::alphanumeric_char((chunk % 45) as u16));
            char_cnt -= 2;
        } else {
            let chunk = take(inp, 6)?;
            if chunk >= 45 {
                return Err(QRError::CorruptDataSegment);
            }
            text.push(Mode::alphanumeric_char(chunk as u16));
            char_cnt -= 1;
        }
    }

    if gs1 {
        text = unescape_gs1(&text);
    }
    out.push_str(&text);
    Ok(())
}

// "%%" stands for '%' and a lone '%' for GS
fn unescape_gs1(text: &str) -> String {
    let mut res = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '%' if chars.peek() == Some(&'%') => {
                chars.next();
                res.push('%');
            }
            '%' => res.push('\x1d'),
            _ => res.push(c),
        }
    }
    res
}

fn write_byte(
    inp: &mut BitStream,
    char_cnt: usize,
    charset: Option<Charset>,
    out: &mut String,
) -> QRResult<()> {
    let bytes =
        (0..char_cnt).map(|_| take(inp, 8).map(|b| b as u8)).collect::<QRResult<Vec<u8>>>()?;

    let text = match charset {
        Some(cs) => cs.decode(&bytes)?,
        None => [Charset::Utf8, Charset::ShiftJis, Charset::Iso8859_1]
            .into_iter()
            .find_map(|cs| cs.decode(&bytes).ok())
            .ok_or(QRError::InvalidCharacterEncoding)?,
    };
    out.push_str(&text);
    Ok(())
}

fn write_kanji(inp: &mut BitStream, char_cnt: usize, out: &mut String) -> QRResult<()> {
    let mut bytes = Vec::with_capacity(char_cnt * 2);
    for _ in 0..char_cnt {
        let val = take(inp, 13)? as u16;
        let assembled = ((val / 0xc0) << 8) | (val % 0xc0);
        let code = if assembled < 0x1f00 { assembled + 0x8140 } else { assembled + 0xc140 };
        bytes.extend(code.to_be_bytes());
    }
    out.push_str(&Charset::ShiftJis.decode(&bytes)?);
    Ok(())
}

fn write_hanzi(inp: &mut BitStream, char_cnt: usize, out: &mut String) -> QRResult<()> {
    let mut bytes = Vec::with_capacity(char_cnt * 2);
    for _ in 0..char_cnt {
        let val = take(inp, 13)? as u16;
        let assembled = ((val / 0x60) << 8) | (val % 0x60);
        let code = if assembled < 0x0a00 { assembled + 0xa1a1 } else { assembled + 0xa6a1 };
        bytes.extend(code.to_be_bytes());
    }
    out.push_str(&Charset::Gb18030.decode(&bytes)?);
    Ok(())
}
