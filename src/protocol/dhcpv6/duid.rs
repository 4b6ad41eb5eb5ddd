//! DHCP Unique Identifier (RFC 8415 Section 11, RFC 6355)

use crate::protocol::buffer::Reader;
use crate::protocol::MacAddr;
use crate::{Error, Result};
use std::fmt;

/// Seconds between the Unix epoch and 2000-01-01T00:00:00Z, the DUID-LLT epoch
const DUID_TIME_EPOCH: i64 = 946_684_800;

/// IANA hardware type for Ethernet
pub const HW_TYPE_ETHERNET: u16 = 1;

pub const DUID_TYPE_LLT: u16 = 1;
pub const DUID_TYPE_EN: u16 = 2;
pub const DUID_TYPE_LL: u16 = 3;
pub const DUID_TYPE_UUID: u16 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Duid {
    /// DUID-LLT: link-layer address plus time
    Llt {
        hardware_type: u16,
        /// Seconds since 2000-01-01 UTC
        time: u32,
        link_layer_addr: Vec<u8>,
    },
    /// DUID-EN: enterprise number plus identifier
    En {
        enterprise_number: u32,
        identifier: Vec<u8>,
    },
    /// DUID-LL: link-layer address
    Ll {
        hardware_type: u16,
        link_layer_addr: Vec<u8>,
    },
    /// DUID-UUID
    Uuid([u8; 16]),
    /// Any other type, kept verbatim
    Other { duid_type: u16, data: Vec<u8> },
}

impl Duid {
    pub fn from_mac(mac: &MacAddr) -> Self {
        Duid::Ll {
            hardware_type: HW_TYPE_ETHERNET,
            link_layer_addr: mac.0.to_vec(),
        }
    }

    /// DUID-LLT stamped with the current time.
    pub fn llt_from_mac(mac: &MacAddr) -> Self {
        let secs = chrono::Utc::now().timestamp() - DUID_TIME_EPOCH;
        Duid::Llt {
            hardware_type: HW_TYPE_ETHERNET,
            time: secs.clamp(0, u32::MAX as i64) as u32,
            link_layer_addr: mac.0.to_vec(),
        }
    }

    pub fn duid_type(&self) -> u16 {
        match self {
            Duid::Llt { .. } => DUID_TYPE_LLT,
            Duid::En { .. } => DUID_TYPE_EN,
            Duid::Ll { .. } => DUID_TYPE_LL,
            Duid::Uuid(_) => DUID_TYPE_UUID,
            Duid::Other { duid_type, .. } => *duid_type,
        }
    }

    /// Parses a DUID, enforcing the minimum length of each type.
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data, "DUID");
        let duid_type = r.u16()?;

        let duid = match duid_type {
            DUID_TYPE_LLT => Duid::Llt {
                hardware_type: r.u16()?,
                time: r.u32()?,
                link_layer_addr: r.rest().to_vec(),
            },
            DUID_TYPE_EN => Duid::En {
                enterprise_number: r.u32()?,
                identifier: r.rest().to_vec(),
            },
            DUID_TYPE_LL => Duid::Ll {
                hardware_type: r.u16()?,
                link_layer_addr: r.rest().to_vec(),
            },
            DUID_TYPE_UUID => {
                if r.remaining() != 16 {
                    return Err(Error::Parse(format!(
                        "DUID-UUID must be 18 bytes, got {}",
                        data.len()
                    )));
                }
                Duid::Uuid(r.array()?)
            }
            _ => Duid::Other {
                duid_type,
                data: r.rest().to_vec(),
            },
        };
        Ok(duid)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.duid_type().to_be_bytes().to_vec();
        match self {
            Duid::Llt {
                hardware_type,
                time,
                link_layer_addr,
            } => {
                bytes.extend_from_slice(&hardware_type.to_be_bytes());
                bytes.extend_from_slice(&time.to_be_bytes());
                bytes.extend_from_slice(link_layer_addr);
            }
            Duid::En {
                enterprise_number,
                identifier,
            } => {
                bytes.extend_from_slice(&enterprise_number.to_be_bytes());
                bytes.extend_from_slice(identifier);
            }
            Duid::Ll {
                hardware_type,
                link_layer_addr,
            } => {
                bytes.extend_from_slice(&hardware_type.to_be_bytes());
                bytes.extend_from_slice(link_layer_addr);
            }
            Duid::Uuid(uuid) => bytes.extend_from_slice(uuid),
            Duid::Other { data, .. } => bytes.extend_from_slice(data),
        }
        bytes
    }
}

/// Link-layer addresses render as colon-separated octets.
fn colon_hex(bytes: &[u8]) -> String {
    bytes.chunks(1).map(hex::encode).collect::<Vec<_>>().join(":")
}

impl fmt::Display for Duid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Duid::Llt {
                hardware_type,
                time,
                link_layer_addr,
            } => write!(
                f,
                "DUID-LLT hwtype={} time={} addr={}",
                hardware_type,
                time,
                colon_hex(link_layer_addr)
            ),
            Duid::En {
                enterprise_number,
                identifier,
            } => write!(
                f,
                "DUID-EN enterprise={} id={}",
                enterprise_number,
                hex::encode(identifier)
            ),
            Duid::Ll {
                hardware_type,
                link_layer_addr,
            } => write!(
                f,
                "DUID-LL hwtype={} addr={}",
                hardware_type,
                colon_hex(link_layer_addr)
            ),
            Duid::Uuid(uuid) => write!(f, "DUID-UUID {}", hex::encode(uuid)),
            Duid::Other { duid_type, data } => {
                write!(f, "DUID type={} data={}", duid_type, hex::encode(data))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAC: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    #[test]
    fn test_duid_ll_roundtrip() {
        let duid = Duid::from_mac(&MAC);
        let bytes = duid.to_bytes();
        assert_eq!(bytes, vec![0, 3, 0, 1, 0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);
        assert_eq!(Duid::parse(&bytes).unwrap(), duid);
    }

    #[test]
    fn test_duid_llt_roundtrip() {
        let duid = Duid::Llt {
            hardware_type: 1,
            time: 0x1234_5678,
            link_layer_addr: MAC.0.to_vec(),
        };
        let bytes = duid.to_bytes();
        assert_eq!(&bytes[..8], &[0, 1, 0, 1, 0x12, 0x34, 0x56, 0x78]);
        assert_eq!(Duid::parse(&bytes).unwrap(), duid);
    }

    #[test]
    fn test_duid_llt_time_since_2000() {
        match Duid::llt_from_mac(&MAC) {
            // 2020-01-01 is 631152000s after the DUID epoch
            Duid::Llt { time, .. } => assert!(time > 631_152_000),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_duid_en_and_uuid() {
        let en = Duid::En {
            enterprise_number: 9,
            identifier: vec![0xca, 0xfe],
        };
        assert_eq!(Duid::parse(&en.to_bytes()).unwrap(), en);

        let uuid = Duid::Uuid([7u8; 16]);
        let bytes = uuid.to_bytes();
        assert_eq!(bytes.len(), 18);
        assert_eq!(Duid::parse(&bytes).unwrap(), uuid);
    }

    #[test]
    fn test_minimum_lengths() {
        assert!(Duid::parse(&[0]).is_err());
        // LL needs 4 bytes
        assert!(Duid::parse(&[0, 3, 0]).is_err());
        assert!(Duid::parse(&[0, 3, 0, 1]).is_ok());
        // EN needs 6 bytes
        assert!(Duid::parse(&[0, 2, 0, 0, 0]).is_err());
        assert!(Duid::parse(&[0, 2, 0, 0, 0, 9]).is_ok());
        // LLT needs 8 bytes
        assert!(Duid::parse(&[0, 1, 0, 1, 0, 0, 0]).is_err());
        assert!(Duid::parse(&[0, 1, 0, 1, 0, 0, 0, 0]).is_ok());
        // UUID is exactly 18 bytes
        assert!(Duid::parse(&[0, 4, 1, 2, 3]).is_err());
        let mut long = vec![0, 4];
        long.extend_from_slice(&[0u8; 17]);
        assert!(Duid::parse(&long).is_err());
    }

    #[test]
    fn test_unknown_type_preserved() {
        let bytes = [0, 9, 1, 2, 3];
        let duid = Duid::parse(&bytes).unwrap();
        assert_eq!(duid.duid_type(), 9);
        assert_eq!(duid.to_bytes(), bytes);
    }
}
