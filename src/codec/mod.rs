//! Standard base64 codec (RFC 4648 alphabet, `=` padding)
//!
//! Strict decoding: length must be a multiple of four, padding may only be a
//! one or two character suffix and the unused bits of a final partial group
//! must be zero. [`forgiving_decode`] relaxes the first and last rules.

mod forgiving;

pub use forgiving::forgiving_decode;

use crate::error::CodecError;

/// Encoding alphabet
pub const STANDARD_ALPHABET: &[u8; 64] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";

/// Padding character
pub const PAD: u8 = b'=';

const INVALID: u8 = 0xff;

const fn decode_table(alphabet: &[u8; 64]) -> [u8; 256] {
    let mut table = [INVALID; 256];
    let mut i = 0;
    while i < alphabet.len() {
        table[alphabet[i] as usize] = i as u8;
        i += 1;
    }
    table
}

const DECODE_TABLE: &[u8; 256] = &decode_table(STANDARD_ALPHABET);

/// Output length of encoding `n` bytes
#[inline]
pub const fn encoded_length(n: usize) -> usize {
    let full = n / 3 * 4;
    if n % 3 == 0 {
        full
    } else {
        full + 4
    }
}

/// Exact number of bytes `src` decodes to.
///
/// Only the length and the padding suffix are inspected; the characters
/// themselves are validated by [`check`] or [`decode`].
pub fn decoded_length(src: &[u8]) -> Result<usize, CodecError> {
    let body = strip_padding(src)?;
    match body.len() % 4 {
        0 => Ok(body.len() / 4 * 3),
        2 => Ok(body.len() / 4 * 3 + 1),
        3 => Ok(body.len() / 4 * 3 + 2),
        _ => Err(CodecError::InvalidLength { len: src.len() }),
    }
}

fn strip_padding(src: &[u8]) -> Result<&[u8], CodecError> {
    let len = src.len();
    if len == 0 {
        return Ok(src);
    }
    if len % 4 != 0 {
        return Err(CodecError::InvalidLength { len });
    }
    let pad = match (src[len - 2], src[len - 1]) {
        (PAD, PAD) => 2,
        (_, PAD) => 1,
        _ => 0,
    };
    Ok(&src[..len - pad])
}

/// Encode into `dst`, returning the number of bytes written
pub fn encode_into(src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    let needed = encoded_length(src.len());
    if dst.len() < needed {
        return Err(CodecError::OutputTooSmall {
            needed,
            available: dst.len(),
        });
    }
    encode_exact(src, &mut dst[..needed]);
    Ok(needed)
}

/// Encode `src` as base64 text
pub fn encode(src: impl AsRef<[u8]>) -> String {
    let src = src.as_ref();
    let mut buf = vec![0u8; encoded_length(src.len())];
    encode_exact(src, &mut buf);
    String::from_utf8(buf).expect("base64 alphabet is ASCII")
}

/// `dst.len()` must equal `encoded_length(src.len())`.
#[inline(always)]
fn encode_exact(src: &[u8], dst: &mut [u8]) {
    let mut chunks = src.chunks_exact(3);
    let mut out = dst.chunks_exact_mut(4);

    for (group, slot) in chunks.by_ref().zip(out.by_ref()) {
        let bits = u32::from(group[0]) << 16 | u32::from(group[1]) << 8 | u32::from(group[2]);
        slot[0] = sextet(bits >> 18);
        slot[1] = sextet(bits >> 12);
        slot[2] = sextet(bits >> 6);
        slot[3] = sextet(bits);
    }

    if let Some(slot) = out.next() {
        match *chunks.remainder() {
            [a] => {
                let bits = u32::from(a) << 16;
                slot.copy_from_slice(&[sextet(bits >> 18), sextet(bits >> 12), PAD, PAD]);
            }
            [a, b] => {
                let bits = u32::from(a) << 16 | u32::from(b) << 8;
                slot.copy_from_slice(&[sextet(bits >> 18), sextet(bits >> 12), sextet(bits >> 6), PAD]);
            }
            _ => {}
        }
    }
}

#[inline(always)]
fn sextet(bits: u32) -> u8 {
    STANDARD_ALPHABET[(bits & 0x3f) as usize]
}

/// Decode into `dst`, returning the number of bytes written.
///
/// On error the contents of `dst` are unspecified.
pub fn decode_into(src: &[u8], dst: &mut [u8]) -> Result<usize, CodecError> {
    let needed = decoded_length(src)?;
    if dst.len() < needed {
        return Err(CodecError::OutputTooSmall {
            needed,
            available: dst.len(),
        });
    }

    let mut pos = 0;
    walk(strip_padding(src)?, |bytes| {
        dst[pos..pos + bytes.len()].copy_from_slice(bytes);
        pos += bytes.len();
    })?;
    Ok(pos)
}

/// Decode base64 text into bytes
pub fn decode(src: impl AsRef<[u8]>) -> Result<Vec<u8>, CodecError> {
    let src = src.as_ref();
    let mut out = vec![0u8; decoded_length(src)?];
    let written = decode_into(src, &mut out)?;
    out.truncate(written);
    Ok(out)
}

/// Validate base64 text without producing output
pub fn check(src: impl AsRef<[u8]>) -> Result<(), CodecError> {
    let src = src.as_ref();
    decoded_length(src)?;
    walk(strip_padding(src)?, |_| {})
}

/// Drive the decode table over an unpadded body, handing each decoded
/// group (3, 2 or 1 bytes) to `emit`.
#[inline(always)]
fn walk(body: &[u8], mut emit: impl FnMut(&[u8])) -> Result<(), CodecError> {
    let mut chunks = body.chunks_exact(4);
    let mut offset = 0;

    for group in chunks.by_ref() {
        let mut bits = 0u32;
        for (i, &byte) in group.iter().enumerate() {
            bits = bits << 6 | u32::from(lookup(offset + i, byte)?);
        }
        emit(&[(bits >> 16) as u8, (bits >> 8) as u8, bits as u8]);
        offset += 4;
    }

    match *chunks.remainder() {
        [] => Ok(()),
        [a, b] => {
            let (a, b) = (lookup(offset, a)?, lookup(offset + 1, b)?);
            if b & 0x0f != 0 {
                return Err(CodecError::TrailingBits { index: offset + 1 });
            }
            emit(&[a << 2 | b >> 4]);
            Ok(())
        }
        [a, b, c] => {
            let (a, b, c) = (
                lookup(offset, a)?,
                lookup(offset + 1, b)?,
                lookup(offset + 2, c)?,
            );
            if c & 0x03 != 0 {
                return Err(CodecError::TrailingBits { index: offset + 2 });
            }
            emit(&[a << 2 | b >> 4, b << 4 | c >> 2]);
            Ok(())
        }
        _ => Err(CodecError::InvalidLength { len: body.len() }),
    }
}

#[inline(always)]
fn lookup(index: usize, byte: u8) -> Result<u8, CodecError> {
    match DECODE_TABLE[byte as usize] {
        INVALID if byte == PAD => Err(CodecError::InvalidPadding { index }),
        INVALID => Err(CodecError::InvalidCharacter { index, byte }),
        value => Ok(value),
    }
}

/// Map text to one byte per char, rejecting chars above U+00FF
pub fn to_latin1(text: &str) -> Result<Vec<u8>, CodecError> {
    text.chars()
        .enumerate()
        .map(|(index, ch)| u8::try_from(ch).map_err(|_| CodecError::CharOutOfRange { index, ch }))
        .collect()
}

/// Inverse of [`to_latin1`]
pub fn from_latin1(bytes: &[u8]) -> String {
    bytes.iter().copied().map(char::from).collect()
}

/// Encode text whose chars are all in U+0000..=U+00FF
pub fn encode_text(text: &str) -> Result<String, CodecError> {
    Ok(encode(to_latin1(text)?))
}

/// Decode base64 text to a string with one char per decoded byte
pub fn decode_text(text: &str) -> Result<String, CodecError> {
    Ok(from_latin1(&decode(text)?))
}
