//! # Bitstring
//!
//! A fixed-capacity bit vector over a byte buffer. Bit `i` of the list is bit
//! `i & 7` of byte `i >> 3`, counting from the least-significant bit of each
//! byte. This ordering is shared with every list already published to a
//! Manager and must not change.

use bitvec::order::Lsb0;
use bitvec::vec::BitVec;

use crate::codec;
use crate::error::Error;

/// Status list bits.
///
/// Capacity is fixed at `bytes * 8` when the bitstring is created. Positions
/// outside `0..capacity` are rejected with [`Error::Range`], never clamped.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Bitstring {
    bits: BitVec<u8, Lsb0>,
}

impl Bitstring {
    /// Wrap a byte buffer.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self {
            bits: BitVec::from_vec(bytes),
        }
    }

    /// An all-zero bitstring of `len` bytes.
    #[must_use]
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0; len])
    }

    /// Number of addressable bits.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// The underlying bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bits.as_raw_slice()
    }

    /// Consume the bitstring, returning the underlying bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.bits.into_vec()
    }

    /// Returns `true` if the bit at `position` is set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `position` is outside the bitstring.
    pub fn test(&self, position: usize) -> Result<bool, Error> {
        self.check(position)?;
        Ok(self.bits[position])
    }

    /// Set the bit at `position` to 1.
    ///
    /// Setting a bit that is already set leaves the bitstring unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `position` is outside the bitstring.
    pub fn set(&mut self, position: usize) -> Result<&mut Self, Error> {
        self.check(position)?;
        self.bits.set(position, true);
        Ok(self)
    }

    /// Set the bit at `position` to 0.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `position` is outside the bitstring.
    pub fn clear(&mut self, position: usize) -> Result<&mut Self, Error> {
        self.check(position)?;
        self.bits.set(position, false);
        Ok(self)
    }

    /// Number of set bits.
    #[must_use]
    pub fn count_ones(&self) -> usize {
        self.bits.count_ones()
    }

    /// Compress and encode the bitstring for publication.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if compression fails.
    pub fn encode(&self) -> Result<String, Error> {
        codec::encode(self)
    }

    /// Decode a published list into a new bitstring.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Decode`] if `encoded` is not a base64url-encoded gzip
    /// stream.
    pub fn decode(encoded: &str) -> Result<Self, Error> {
        codec::decode(encoded)
    }

    fn check(&self, position: usize) -> Result<(), Error> {
        if position >= self.capacity() {
            return Err(Error::Range(format!(
                "position {position} is outside the list capacity of {} bits",
                self.capacity()
            )));
        }
        Ok(())
    }
}

impl From<Vec<u8>> for Bitstring {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn capacity() {
        assert_eq!(Bitstring::new(vec![]).capacity(), 0);
        assert_eq!(Bitstring::zeroed(3).capacity(), 24);
        assert_eq!(Bitstring::zeroed(16_384).capacity(), 131_072);
    }

    #[test]
    fn set_then_clear() {
        let mut bits = Bitstring::zeroed(4);

        for position in 0..bits.capacity() {
            bits.set(position).expect("should set");
            assert!(bits.test(position).expect("should test"));
            bits.clear(position).expect("should clear");
            assert!(!bits.test(position).expect("should test"));
        }
        assert_eq!(bits.as_bytes(), &[0; 4]);
    }

    // Bit 0 of each byte is the least-significant bit.
    #[test]
    fn bit_order() {
        let mut bits = Bitstring::zeroed(2);
        bits.set(0).expect("should set").set(9).expect("should set").set(15).expect("should set");
        assert_eq!(bits.as_bytes(), &[0b0000_0001, 0b1000_0010]);

        let bits = Bitstring::new(vec![0b0000_0100, 0]);
        assert!(bits.test(2).expect("should test"));
        assert!(!bits.test(3).expect("should test"));
    }

    #[test]
    fn idempotent() {
        let mut bits = Bitstring::zeroed(1);
        bits.set(5).expect("should set");
        let once = bits.clone();
        bits.set(5).expect("should set");
        assert_eq!(bits, once);

        bits.clear(6).expect("should clear");
        assert_eq!(bits, once);
    }

    #[test]
    fn out_of_range() {
        let mut bits = Bitstring::zeroed(2);

        assert!(matches!(bits.test(16), Err(Error::Range(_))));
        assert!(matches!(bits.set(16), Err(Error::Range(_))));
        assert!(matches!(bits.clear(usize::MAX), Err(Error::Range(_))));

        let mut empty = Bitstring::new(vec![]);
        assert!(matches!(empty.set(0), Err(Error::Range(_))));
    }

    #[test]
    fn equality() {
        assert_eq!(Bitstring::new(vec![1, 2, 3]), Bitstring::new(vec![1, 2, 3]));
        assert_ne!(Bitstring::new(vec![1, 2, 3]), Bitstring::new(vec![1, 2, 4]));

        // same contents up to the shorter length, different capacity
        assert_ne!(Bitstring::new(vec![0, 0]), Bitstring::new(vec![0, 0, 0]));
    }

    #[test]
    fn count() {
        let mut bits = Bitstring::zeroed(8);
        bits.set(1).expect("should set").set(42).expect("should set").set(63).expect("should set");
        assert_eq!(bits.count_ones(), 3);
    }

    proptest! {
        #[test]
        fn set_test_clear(bytes in vec(any::<u8>(), 1..64)) {
            let original = Bitstring::new(bytes.clone());

            for position in 0..original.capacity() {
                let mut bits = original.clone();
                bits.set(position).expect("should set");
                prop_assert!(bits.test(position).expect("should test"));
                bits.clear(position).expect("should clear");
                prop_assert!(!bits.test(position).expect("should test"));

                // only the cleared bit differs
                let mut expected = bytes.clone();
                expected[position >> 3] &= !(1 << (position & 7));
                prop_assert_eq!(bits.as_bytes(), expected.as_slice());
            }

            let mut bits = original;
            let capacity = bits.capacity();
            prop_assert!(matches!(bits.test(capacity), Err(Error::Range(_))));
            prop_assert!(matches!(bits.set(capacity), Err(Error::Range(_))));
            prop_assert!(matches!(bits.clear(capacity), Err(Error::Range(_))));
        }
    }
}
