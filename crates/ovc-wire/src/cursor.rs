use ovc_types::Address;

use crate::error::{WireError, WireResult};

/// Maximum bytes in a ULEB128-encoded u64.
const MAX_ULEB_BYTES: u32 = 10;

/// A bounds-checked reading position over a byte buffer.
///
/// Every read validates the declared width against the remaining bytes
/// before consuming anything, so a truncated buffer fails cleanly instead
/// of yielding a short value.
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Start reading at the beginning of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// Returns `true` once the whole buffer has been consumed.
    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `n` bytes.
    pub fn take(&mut self, n: usize) -> WireResult<&'a [u8]> {
        if self.remaining() < n {
            return Err(WireError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    /// Consume one byte.
    pub fn read_u8(&mut self) -> WireResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Consume a ULEB128-encoded unsigned integer (length/count prefix).
    pub fn read_uleb128(&mut self) -> WireResult<u64> {
        let mut value: u64 = 0;
        let mut shift: u32 = 0;
        loop {
            let byte = self.read_u8()?;
            if shift == (MAX_ULEB_BYTES - 1) * 7 && byte > 1 {
                return Err(WireError::OverlongUleb);
            }
            value |= u64::from(byte & 0x7f) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
            shift += 7;
            if shift >= MAX_ULEB_BYTES * 7 {
                return Err(WireError::OverlongUleb);
            }
        }
    }

    /// Consume a ULEB128 length prefix followed by that many UTF-8 bytes.
    pub fn read_string(&mut self) -> WireResult<String> {
        let len = self.read_uleb128()? as usize;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|e| WireError::InvalidUtf8(e.to_string()))
    }

    /// Consume exactly 32 bytes as a ledger address.
    pub fn read_address(&mut self) -> WireResult<Address> {
        let bytes = self.take(32)?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(bytes);
        Ok(Address::from_raw(arr))
    }

    /// Consume 8 bytes, little-endian unsigned.
    ///
    /// The value stays a `u64` end to end; converting through a float
    /// would silently lose precision above 2^53.
    pub fn read_u64(&mut self) -> WireResult<u64> {
        let bytes = self.take(8)?;
        Ok(u64::from_le_bytes(bytes.try_into().expect("8-byte slice")))
    }

    /// Consume 1 byte; nonzero means true.
    pub fn read_bool(&mut self) -> WireResult<bool> {
        Ok(self.read_u8()? != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_past_end_fails() {
        let mut c = Cursor::new(&[1, 2, 3]);
        let err = c.take(4).unwrap_err();
        assert_eq!(
            err,
            WireError::UnexpectedEof {
                needed: 4,
                remaining: 3
            }
        );
        // Nothing consumed on failure.
        assert_eq!(c.remaining(), 3);
    }

    #[test]
    fn uleb_single_byte() {
        let mut c = Cursor::new(&[0x00]);
        assert_eq!(c.read_uleb128().unwrap(), 0);
        let mut c = Cursor::new(&[0x7f]);
        assert_eq!(c.read_uleb128().unwrap(), 127);
    }

    #[test]
    fn uleb_multi_byte() {
        // 300 = 0b100101100 -> 0xAC 0x02
        let mut c = Cursor::new(&[0xac, 0x02]);
        assert_eq!(c.read_uleb128().unwrap(), 300);
    }

    #[test]
    fn uleb_u64_max() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        let mut c = Cursor::new(&bytes);
        assert_eq!(c.read_uleb128().unwrap(), u64::MAX);
    }

    #[test]
    fn uleb_overlong_rejected() {
        let bytes = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x01];
        let mut c = Cursor::new(&bytes);
        assert_eq!(c.read_uleb128().unwrap_err(), WireError::OverlongUleb);
    }

    #[test]
    fn uleb_truncated_continuation() {
        let mut c = Cursor::new(&[0x80]);
        assert!(matches!(
            c.read_uleb128().unwrap_err(),
            WireError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn string_roundtrip() {
        let mut buf = vec![5];
        buf.extend_from_slice(b"hello");
        let mut c = Cursor::new(&buf);
        assert_eq!(c.read_string().unwrap(), "hello");
        assert!(c.is_exhausted());
    }

    #[test]
    fn string_length_past_end_fails() {
        let buf = [10, b'h', b'i'];
        let mut c = Cursor::new(&buf);
        assert!(matches!(
            c.read_string().unwrap_err(),
            WireError::UnexpectedEof { .. }
        ));
    }

    #[test]
    fn string_invalid_utf8_fails() {
        let buf = [2, 0xff, 0xfe];
        let mut c = Cursor::new(&buf);
        assert!(matches!(
            c.read_string().unwrap_err(),
            WireError::InvalidUtf8(_)
        ));
    }

    #[test]
    fn u64_little_endian() {
        let mut c = Cursor::new(&[0x01, 0x02, 0, 0, 0, 0, 0, 0]);
        assert_eq!(c.read_u64().unwrap(), 0x0201);
    }

    #[test]
    fn u64_preserves_full_precision() {
        let value = (1u64 << 53) + 1; // not representable as f64
        let bytes = value.to_le_bytes();
        let mut c = Cursor::new(&bytes);
        assert_eq!(c.read_u64().unwrap(), value);
    }

    #[test]
    fn bool_nonzero_is_true() {
        let mut c = Cursor::new(&[0, 1, 0x7f]);
        assert!(!c.read_bool().unwrap());
        assert!(c.read_bool().unwrap());
        assert!(c.read_bool().unwrap());
    }

    #[test]
    fn address_is_exactly_32_bytes() {
        let buf = [0xaa; 32];
        let mut c = Cursor::new(&buf);
        let addr = c.read_address().unwrap();
        assert_eq!(addr, Address::from_raw([0xaa; 32]));
        assert!(c.is_exhausted());

        let mut short = Cursor::new(&buf[..31]);
        assert!(matches!(
            short.read_address().unwrap_err(),
            WireError::UnexpectedEof { .. }
        ));
    }
}
