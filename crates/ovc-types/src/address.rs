use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// A 32-byte ledger address.
///
/// Addresses identify every on-ledger object: accounts, repositories,
/// capabilities, and version records. They render as `0x` followed by
/// 64 lowercase hex characters, and parse with or without the prefix.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address([u8; 32]);

impl Address {
    /// Create from a raw 32-byte value.
    pub const fn from_raw(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// The null address (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; 32])
    }

    /// Returns `true` if this is the null address.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; 32]
    }

    /// The raw 32-byte value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Full `0x`-prefixed hex representation.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Short representation (prefix plus first 8 hex characters).
    pub fn short_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0[..4]))
    }

    /// Parse from a hex string, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let s = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        if bytes.len() != 32 {
            return Err(TypeError::InvalidLength {
                expected: 32,
                actual: bytes.len(),
            });
        }
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.short_hex())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl From<[u8; 32]> for Address {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl From<Address> for [u8; 32] {
    fn from(addr: Address) -> Self {
        addr.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let addr = Address::from_raw([0xab; 32]);
        let parsed = Address::from_hex(&addr.to_hex()).unwrap();
        assert_eq!(addr, parsed);
    }

    #[test]
    fn parses_without_prefix() {
        let addr = Address::from_raw([7; 32]);
        let bare = hex::encode(addr.as_bytes());
        assert_eq!(Address::from_hex(&bare).unwrap(), addr);
    }

    #[test]
    fn display_is_prefixed_full_hex() {
        let addr = Address::from_raw([0; 32]);
        let s = format!("{addr}");
        assert!(s.starts_with("0x"));
        assert_eq!(s.len(), 66);
    }

    #[test]
    fn short_hex_is_prefixed_8_chars() {
        let addr = Address::from_raw([0x12; 32]);
        assert_eq!(addr.short_hex(), "0x12121212");
    }

    #[test]
    fn rejects_wrong_length() {
        let err = Address::from_hex("0xabcd").unwrap_err();
        assert!(matches!(err, TypeError::InvalidLength { actual: 2, .. }));
    }

    #[test]
    fn rejects_bad_hex() {
        let err = Address::from_hex("0xzz").unwrap_err();
        assert!(matches!(err, TypeError::InvalidHex(_)));
    }

    #[test]
    fn null_is_all_zeros() {
        assert!(Address::null().is_null());
        assert!(!Address::from_raw([1; 32]).is_null());
    }

    #[test]
    fn ordering_is_consistent() {
        assert!(Address::from_raw([0; 32]) < Address::from_raw([1; 32]));
    }
}
