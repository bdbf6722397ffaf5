//! # Encoded Lists
//!
//! A status list travels as `base64url(gzip(bytes))`. Padding is never
//! emitted and is tolerated on input.
//!
//! The legacy revocation list variant stores its list on the ledger as a
//! single unsigned integer. [`number_to_encoded_list`] and
//! [`encoded_list_to_number`] convert between that integer, taken as the
//! big-endian value of the list bytes, and the same encoded form.

use std::io::{Read, Write};

use base64ct::{Base64UrlUnpadded, Encoding};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use num_bigint::BigUint;

use crate::bitstring::Bitstring;
use crate::error::Error;

/// Minimum list length in bytes (131,072 entries).
pub const MIN_LENGTH: usize = 16_384;

/// Largest list [`decode`] will inflate, in bytes (67,108,864 entries).
pub const MAX_LENGTH: usize = 8 * 1024 * 1024;

/// Compress and base64url-encode a bitstring.
///
/// # Errors
///
/// Returns [`Error::Decode`] if the gzip stream cannot be written.
pub fn encode(bitstring: &Bitstring) -> Result<String, Error> {
    let mut gz_encoder = GzEncoder::new(Vec::new(), Compression::default());
    gz_encoder
        .write_all(bitstring.as_bytes())
        .map_err(|e| Error::Decode(format!("issue compressing list: {e}")))?;
    let compressed =
        gz_encoder.finish().map_err(|e| Error::Decode(format!("issue compressing list: {e}")))?;

    Ok(Base64UrlUnpadded::encode_string(&compressed))
}

/// Decode and decompress an encoded list into a new bitstring.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `encoded` is not base64url, the decoded
/// bytes are not a gzip stream, or the list is longer than [`MAX_LENGTH`].
pub fn decode(encoded: &str) -> Result<Bitstring, Error> {
    decode_with_limit(encoded, MAX_LENGTH)
}

/// Decode and decompress an encoded list of at most `limit` bytes.
///
/// Inflation stops as soon as the limit is passed.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `encoded` is not base64url, the decoded
/// bytes are not a gzip stream, or the list is longer than `limit`.
pub fn decode_with_limit(encoded: &str, limit: usize) -> Result<Bitstring, Error> {
    let compressed = Base64UrlUnpadded::decode_vec(encoded.trim_end_matches('='))
        .map_err(|e| Error::Decode(format!("list is not base64url: {e}")))?;

    let mut bytes = Vec::new();
    let max = u64::try_from(limit).unwrap_or(u64::MAX).saturating_add(1);
    GzDecoder::new(compressed.as_slice())
        .take(max)
        .read_to_end(&mut bytes)
        .map_err(|e| Error::Decode(format!("list is not a gzip stream: {e}")))?;
    if bytes.len() > limit {
        return Err(Error::Decode(format!("list is longer than {limit} bytes")));
    }

    Ok(Bitstring::new(bytes))
}

/// Encode a legacy integer list, left-padding its big-endian bytes to at
/// least `length` bytes.
///
/// An integer wider than `length` bytes keeps all of its bytes.
///
/// # Errors
///
/// Returns [`Error::ListLength`] if `length` is below [`MIN_LENGTH`].
pub fn number_to_encoded_list(n: &BigUint, length: usize) -> Result<String, Error> {
    encode(&number_to_bitstring(n, length)?)
}

/// Decode an encoded list into its legacy integer form.
///
/// # Errors
///
/// Returns [`Error::Decode`] if `encoded` cannot be decoded.
pub fn encoded_list_to_number(encoded: &str) -> Result<BigUint, Error> {
    Ok(bitstring_to_number(&decode(encoded)?))
}

/// The big-endian, left-padded bitstring of a legacy integer list.
///
/// # Errors
///
/// Returns [`Error::ListLength`] if `length` is below [`MIN_LENGTH`].
pub fn number_to_bitstring(n: &BigUint, length: usize) -> Result<Bitstring, Error> {
    if length < MIN_LENGTH {
        return Err(Error::ListLength(format!("list must be at least {MIN_LENGTH} bytes long")));
    }

    let digits = n.to_bytes_be();
    let digits = if digits == [0] { Vec::new() } else { digits };
    let mut bytes = vec![0; length.saturating_sub(digits.len())];
    bytes.extend_from_slice(&digits);

    Ok(Bitstring::new(bytes))
}

/// The legacy integer value of a bitstring read as big-endian bytes.
#[must_use]
pub fn bitstring_to_number(bitstring: &Bitstring) -> BigUint {
    BigUint::from_bytes_be(bitstring.as_bytes())
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn round_trip() {
        let samples =
            [vec![0u8], vec![255], vec![1, 2, 3, 4, 5], (0..=255).collect(), vec![0xa5; 4096]];

        for bytes in samples {
            let bits = Bitstring::new(bytes);
            let encoded = encode(&bits).expect("should encode");
            assert_eq!(decode(&encoded).expect("should decode"), bits);
        }
    }

    #[test]
    fn url_safe() {
        let bits = Bitstring::new((0..=255).rev().collect());
        let encoded = encode(&bits).expect("should encode");
        assert!(!encoded.contains(['+', '/', '=']));
    }

    // A minimum-length empty list compresses well and decodes to zeros.
    #[test]
    fn compresses_zeros() {
        let bits = Bitstring::zeroed(MIN_LENGTH);
        let encoded = encode(&bits).expect("should encode");
        let compressed = Base64UrlUnpadded::decode_vec(&encoded).expect("should be base64url");
        assert!(compressed.len() < MIN_LENGTH);

        let decoded = decode(&encoded).expect("should decode");
        assert_eq!(decoded.capacity(), 131_072);
        assert!(decoded.as_bytes().iter().all(|b| *b == 0));
    }

    #[test]
    fn padded_input() {
        let bits = Bitstring::new(vec![7, 7]);
        let mut encoded = encode(&bits).expect("should encode");
        while encoded.len() % 4 != 0 {
            encoded.push('=');
        }
        assert_eq!(decode(&encoded).expect("should decode"), bits);
    }

    #[test]
    fn bad_input() {
        assert!(matches!(decode("not base64!"), Err(Error::Decode(_))));

        // valid base64url, not gzip
        let encoded = Base64UrlUnpadded::encode_string(b"plain bytes");
        assert!(matches!(decode(&encoded), Err(Error::Decode(_))));
    }

    #[test]
    fn inflate_limit() {
        let encoded = encode(&Bitstring::zeroed(1025)).expect("should encode");
        assert!(matches!(decode_with_limit(&encoded, 1024), Err(Error::Decode(_))));

        let bits = decode_with_limit(&encoded, 1025).expect("should decode at the limit");
        assert_eq!(bits.capacity(), 1025 * 8);

        // a highly compressible stream past the default limit
        let bomb = encode(&Bitstring::zeroed(MAX_LENGTH + 1)).expect("should encode");
        assert!(bomb.len() < MAX_LENGTH / 100);
        assert!(matches!(decode(&bomb), Err(Error::Decode(_))));
    }

    #[test]
    fn number_round_trip() {
        let n = BigUint::from(0x0102_0304_u32);
        let encoded = number_to_encoded_list(&n, MIN_LENGTH).expect("should encode");

        let bits = decode(&encoded).expect("should decode");
        assert_eq!(bits.capacity(), MIN_LENGTH * 8);
        assert_eq!(&bits.as_bytes()[MIN_LENGTH - 4..], &[1, 2, 3, 4]);
        assert_eq!(encoded_list_to_number(&encoded).expect("should decode"), n);
    }

    #[test]
    fn number_zero() {
        let encoded =
            number_to_encoded_list(&BigUint::default(), MIN_LENGTH).expect("should encode");
        assert_eq!(encoded, encode(&Bitstring::zeroed(MIN_LENGTH)).expect("should encode"));
        assert_eq!(encoded_list_to_number(&encoded).expect("should decode"), BigUint::default());
    }

    #[test]
    fn number_wider_than_length() {
        let n = BigUint::from(1u8) << (MIN_LENGTH * 8);
        let bits = number_to_bitstring(&n, MIN_LENGTH).expect("should convert");
        assert_eq!(bits.capacity(), (MIN_LENGTH + 1) * 8);
        assert_eq!(bitstring_to_number(&bits), n);
    }

    #[test]
    fn number_too_short() {
        let result = number_to_encoded_list(&BigUint::default(), MIN_LENGTH - 1);
        assert!(matches!(result, Err(Error::ListLength(_))));
    }

    proptest! {
        #[test]
        fn any_buffer_round_trips(bytes in vec(any::<u8>(), 1..4096)) {
            let bits = Bitstring::new(bytes);
            let encoded = encode(&bits).expect("should encode");
            prop_assert!(!encoded.contains(['+', '/', '=']));
            prop_assert_eq!(decode(&encoded).expect("should decode"), bits);
        }
    }
}
