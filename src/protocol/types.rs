//! Common protocol types

use std::fmt;
use std::str::FromStr;

/// Ethernet hardware address used as DHCP `chaddr` and DUID link-layer address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl MacAddr {
    pub const ZERO: MacAddr = MacAddr([0; 6]);

    /// Builds an address from a `chaddr`-style slice, using its first six bytes.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        let octets: [u8; 6] = bytes.get(..6)?.try_into().ok()?;
        Some(MacAddr(octets))
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::ZERO
    }
}

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d, e, g] = self.0;
        write!(f, "{a:02x}:{b:02x}:{c:02x}:{d:02x}:{e:02x}:{g:02x}")
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error returned when a MAC address string does not parse
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid MAC address {0:?}")]
pub struct ParseMacAddrError(String);

impl FromStr for MacAddr {
    type Err = ParseMacAddrError;

    /// Accepts "00:11:22:33:44:55", "00-11-22-33-44-55" or "001122334455".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMacAddrError(s.to_string());
        let digits: String = if s.contains(':') || s.contains('-') {
            let parts: Vec<&str> = s.split([':', '-']).collect();
            if parts.len() != 6 || parts.iter().any(|p| p.len() != 2) {
                return Err(err());
            }
            parts.concat()
        } else {
            s.to_string()
        };
        if digits.len() != 12 || !digits.is_ascii() {
            return Err(err());
        }

        let mut octets = [0u8; 6];
        hex::decode_to_slice(&digits, &mut octets).map_err(|_| err())?;
        Ok(MacAddr(octets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_formats() {
        let expected = MacAddr([0x00, 0x11, 0x22, 0xaa, 0xbb, 0xcc]);
        assert_eq!("00:11:22:aa:bb:cc".parse::<MacAddr>().unwrap(), expected);
        assert_eq!("00-11-22-AA-BB-CC".parse::<MacAddr>().unwrap(), expected);
        assert_eq!("001122aabbcc".parse::<MacAddr>().unwrap(), expected);
    }

    #[test]
    fn test_parse_invalid() {
        assert!("00:11:22:33:44".parse::<MacAddr>().is_err());
        assert!("00:11:22:33:44:zz".parse::<MacAddr>().is_err());
        assert!("0:11:22:33:44:555".parse::<MacAddr>().is_err());
        assert!("hello".parse::<MacAddr>().is_err());
    }

    #[test]
    fn test_display_and_slice() {
        let mac = MacAddr::from_slice(&[0xde, 0xad, 0xbe, 0xef, 0x00, 0x01, 0xff]).unwrap();
        assert_eq!(mac.to_string(), "de:ad:be:ef:00:01");
        assert!(MacAddr::from_slice(&[1, 2, 3]).is_none());
        assert!(MacAddr::ZERO.is_zero());
    }
}
