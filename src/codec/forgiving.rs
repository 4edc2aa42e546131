//! WHATWG "forgiving-base64" decode
//!
//! ASCII whitespace is dropped, padding becomes optional and stray bits in a
//! final partial group are discarded instead of rejected. Padding is only
//! accepted as the suffix of a multiple-of-four input; any other `=` is an
//! error. Offsets in errors refer to the normalized input.

use super::{walk, DECODE_TABLE, INVALID, PAD, STANDARD_ALPHABET};
use crate::error::CodecError;

/// Decode base64 leniently
pub fn forgiving_decode(src: impl AsRef<[u8]>) -> Result<Vec<u8>, CodecError> {
    let body = normalize(src.as_ref())?;
    if let Some(index) = body.iter().position(|&b| b == PAD) {
        return Err(CodecError::InvalidPadding { index });
    }

    let mut out = Vec::with_capacity(body.len() / 4 * 3 + 2);
    walk(&body, |bytes| out.extend_from_slice(bytes))?;
    Ok(out)
}

/// Strip whitespace and padding, then clear the unused bits of a trailing
/// partial group.
fn normalize(src: &[u8]) -> Result<Vec<u8>, CodecError> {
    let mut buf: Vec<u8> = src
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();

    if buf.len() % 4 == 0 {
        for _ in 0..2 {
            if buf.last() == Some(&PAD) {
                buf.pop();
            }
        }
    }

    let mask = match buf.len() % 4 {
        1 => return Err(CodecError::InvalidLength { len: buf.len() }),
        2 => 0x30,
        3 => 0x3c,
        _ => return Ok(buf),
    };

    if let Some(last) = buf.last_mut() {
        let value = DECODE_TABLE[*last as usize];
        if value != INVALID {
            *last = STANDARD_ALPHABET[(value & mask) as usize];
        }
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::encode;
    use proptest::prelude::*;

    #[test]
    fn test_whitespace_ignored() {
        assert_eq!(forgiving_decode("Zm\n9v\rYm   \tFy").unwrap(), b"foobar");
        assert_eq!(forgiving_decode(" Zg = = ").unwrap(), b"f");
    }

    #[test]
    fn test_missing_padding() {
        assert_eq!(forgiving_decode("Zg").unwrap(), b"f");
        assert_eq!(forgiving_decode("Zm8").unwrap(), b"fo");
        assert_eq!(forgiving_decode("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_trailing_bits_discarded() {
        assert_eq!(forgiving_decode("QR==").unwrap(), b"A");
        assert_eq!(forgiving_decode("QUJ").unwrap(), b"AB");
    }

    #[test]
    fn test_still_rejects_garbage() {
        assert_eq!(
            forgiving_decode("Z"),
            Err(CodecError::InvalidLength { len: 1 })
        );
        assert!(matches!(
            forgiving_decode("Zm9v@"),
            Err(CodecError::InvalidLength { .. })
        ));
        assert!(matches!(
            forgiving_decode("Zm@v"),
            Err(CodecError::InvalidCharacter { byte: b'@', .. })
        ));
        assert!(forgiving_decode("Zg=a").is_err());
    }

    #[test]
    fn test_misplaced_padding_rejected() {
        assert_eq!(
            forgiving_decode("Zg="),
            Err(CodecError::InvalidPadding { index: 2 })
        );
        assert_eq!(
            forgiving_decode("Zm9vZg="),
            Err(CodecError::InvalidPadding { index: 6 })
        );
        assert_eq!(
            forgiving_decode("Zm9v="),
            Err(CodecError::InvalidLength { len: 5 })
        );
        assert_eq!(
            forgiving_decode("Zm=9"),
            Err(CodecError::InvalidPadding { index: 2 })
        );
        assert_eq!(
            forgiving_decode("Zg=\n"),
            Err(CodecError::InvalidPadding { index: 2 })
        );
    }

    proptest! {
        #[test]
        fn prop_whitespace_tolerant(
            bytes in proptest::collection::vec(any::<u8>(), 0..128),
            every in 1usize..8,
        ) {
            let spaced: String = encode(&bytes)
                .chars()
                .enumerate()
                .flat_map(|(i, c)| {
                    let gap = if i % every == 0 { Some('\n') } else { None };
                    gap.into_iter().chain(std::iter::once(c))
                })
                .collect();
            prop_assert_eq!(forgiving_decode(&spaced).unwrap(), bytes);
        }

        #[test]
        fn prop_padding_optional(bytes in proptest::collection::vec(any::<u8>(), 0..128)) {
            let encoded = encode(&bytes);
            let unpadded = encoded.trim_end_matches('=');
            prop_assert_eq!(forgiving_decode(unpadded).unwrap(), bytes.clone());
            prop_assert_eq!(forgiving_decode(&encoded).unwrap(), bytes);
        }
    }
}
