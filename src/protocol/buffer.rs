//! Big-endian byte cursor used by the DHCP codecs.
//!
//! Every read is bounds-checked and reports a `Parse` error naming the
//! field being decoded, so decoders never index past the end of a buffer.

use crate::{Error, Result};
use std::net::{Ipv4Addr, Ipv6Addr};

#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    what: &'static str,
}

impl<'a> Reader<'a> {
    /// `what` names the structure being decoded, for error messages.
    pub fn new(data: &'a [u8], what: &'static str) -> Self {
        Self { data, pos: 0, what }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        if self.remaining() < n {
            return Err(Error::Parse(format!(
                "{} truncated: need {} bytes, have {}",
                self.what,
                n,
                self.remaining()
            )));
        }
        let out = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(N)?);
        Ok(out)
    }

    pub fn u8(&mut self) -> Result<u8> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    pub fn u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    pub fn ipv4(&mut self) -> Result<Ipv4Addr> {
        Ok(Ipv4Addr::from(self.array::<4>()?))
    }

    pub fn ipv6(&mut self) -> Result<Ipv6Addr> {
        Ok(Ipv6Addr::from(self.array::<16>()?))
    }

    /// Consumes everything left.
    pub fn rest(&mut self) -> &'a [u8] {
        let out = &self.data[self.pos..];
        self.pos = self.data.len();
        out
    }

    /// Errors if unread bytes remain.
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::Parse(format!(
                "{}: {} trailing bytes",
                self.what,
                self.remaining()
            )))
        }
    }
}

/// Returns the bytes before the first NUL, lossily decoded.
pub fn nul_trimmed(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Copies `s` into a fixed-width NUL-padded field, truncating if needed.
pub fn write_fixed(buf: &mut Vec<u8>, s: &[u8], width: usize) {
    let n = s.len().min(width);
    buf.extend_from_slice(&s[..n]);
    buf.resize(buf.len() + width - n, 0);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reader_sequence() {
        let data = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 10, 0, 0, 1];
        let mut r = Reader::new(&data, "test");
        assert_eq!(r.u8().unwrap(), 1);
        assert_eq!(r.u16().unwrap(), 0x0203);
        assert_eq!(r.u32().unwrap(), 0x04050607);
        assert_eq!(r.ipv4().unwrap(), Ipv4Addr::new(10, 0, 0, 1));
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_reader_truncated() {
        let mut r = Reader::new(&[0x01], "field");
        let err = r.u16().unwrap_err();
        assert!(err.is_decode());
        assert!(err.to_string().contains("field truncated"));
    }

    #[test]
    fn test_trailing_bytes() {
        let mut r = Reader::new(&[1, 2, 3], "blob");
        r.u8().unwrap();
        assert!(r.finish().is_err());
        assert_eq!(r.rest(), &[2, 3]);
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_fixed_fields() {
        let mut buf = Vec::new();
        write_fixed(&mut buf, b"boot", 8);
        assert_eq!(buf, b"boot\0\0\0\0");
        assert_eq!(nul_trimmed(&buf), "boot");

        let mut buf = Vec::new();
        write_fixed(&mut buf, b"toolongname", 4);
        assert_eq!(buf, b"tool");
        assert_eq!(nul_trimmed(&buf), "tool");
    }
}
