//! Identity associations and their address/prefix records
//! (RFC 8415 Sections 21.4, 21.6, 21.13, 21.21, 21.22)

use super::option::DhcpOption;
use super::options::Options;
use super::types::{OptionCode, StatusCode};
use crate::protocol::buffer::Reader;
use crate::Result;
use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

fn secs(d: Duration) -> [u8; 4] {
    (d.as_secs().min(u32::MAX as u64) as u32).to_be_bytes()
}

fn read_secs(r: &mut Reader<'_>) -> Result<Duration> {
    Ok(Duration::from_secs(r.u32()? as u64))
}

/// IA_NA: non-temporary addresses
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IaNa {
    pub iaid: [u8; 4],
    pub t1: Duration,
    pub t2: Duration,
    pub options: Options,
}

impl IaNa {
    pub fn new(iaid: [u8; 4], t1: Duration, t2: Duration) -> Self {
        Self {
            iaid,
            t1,
            t2,
            options: Options::new(),
        }
    }

    pub(crate) fn decode(data: &[u8], nesting: usize) -> Result<Self> {
        let mut r = Reader::new(data, "IA_NA");
        Ok(IaNa {
            iaid: r.array()?,
            t1: read_secs(&mut r)?,
            t2: read_secs(&mut r)?,
            options: Options::decode(r.rest(), nesting)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.iaid.to_vec();
        bytes.extend_from_slice(&secs(self.t1));
        bytes.extend_from_slice(&secs(self.t2));
        self.options.marshal(&mut bytes);
        bytes
    }

    pub fn addresses(&self) -> Vec<&IaAddress> {
        self.options
            .iter()
            .filter_map(|o| match o {
                DhcpOption::IaAddr(addr) => Some(addr),
                _ => None,
            })
            .collect()
    }

    pub fn status(&self) -> Option<&StatusCodeOption> {
        status_of(&self.options)
    }
}

impl fmt::Display for IaNa {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IAID={} T1={:?} T2={:?} {}",
            hex::encode(self.iaid),
            self.t1,
            self.t2,
            self.options.inline()
        )
    }
}

/// IA Address carried inside IA_NA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IaAddress {
    pub address: Ipv6Addr,
    pub preferred_lifetime: Duration,
    pub valid_lifetime: Duration,
    pub options: Options,
}

impl IaAddress {
    pub fn new(address: Ipv6Addr, preferred_lifetime: Duration, valid_lifetime: Duration) -> Self {
        Self {
            address,
            preferred_lifetime,
            valid_lifetime,
            options: Options::new(),
        }
    }

    pub(crate) fn decode(data: &[u8], nesting: usize) -> Result<Self> {
        let mut r = Reader::new(data, "IA Address");
        Ok(IaAddress {
            address: r.ipv6()?,
            preferred_lifetime: read_secs(&mut r)?,
            valid_lifetime: read_secs(&mut r)?,
            options: Options::decode(r.rest(), nesting)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.address.octets().to_vec();
        bytes.extend_from_slice(&secs(self.preferred_lifetime));
        bytes.extend_from_slice(&secs(self.valid_lifetime));
        self.options.marshal(&mut bytes);
        bytes
    }
}

impl fmt::Display for IaAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} preferred={:?} valid={:?}",
            self.address, self.preferred_lifetime, self.valid_lifetime
        )
    }
}

/// IA_PD: delegated prefixes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IaPd {
    pub iaid: [u8; 4],
    pub t1: Duration,
    pub t2: Duration,
    pub options: Options,
}

impl IaPd {
    pub fn new(iaid: [u8; 4]) -> Self {
        Self {
            iaid,
            t1: Duration::ZERO,
            t2: Duration::ZERO,
            options: Options::new(),
        }
    }

    pub(crate) fn decode(data: &[u8], nesting: usize) -> Result<Self> {
        let mut r = Reader::new(data, "IA_PD");
        Ok(IaPd {
            iaid: r.array()?,
            t1: read_secs(&mut r)?,
            t2: read_secs(&mut r)?,
            options: Options::decode(r.rest(), nesting)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.iaid.to_vec();
        bytes.extend_from_slice(&secs(self.t1));
        bytes.extend_from_slice(&secs(self.t2));
        self.options.marshal(&mut bytes);
        bytes
    }

    pub fn prefixes(&self) -> Vec<&IaPrefix> {
        self.options
            .iter()
            .filter_map(|o| match o {
                DhcpOption::IaPrefix(p) => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn status(&self) -> Option<&StatusCodeOption> {
        status_of(&self.options)
    }
}

impl fmt::Display for IaPd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "IAID={} T1={:?} T2={:?} {}",
            hex::encode(self.iaid),
            self.t1,
            self.t2,
            self.options.inline()
        )
    }
}

/// IA Prefix carried inside IA_PD
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IaPrefix {
    pub preferred_lifetime: Duration,
    pub valid_lifetime: Duration,
    pub prefix_len: u8,
    pub prefix: Ipv6Addr,
    pub options: Options,
}

impl IaPrefix {
    pub(crate) fn decode(data: &[u8], nesting: usize) -> Result<Self> {
        let mut r = Reader::new(data, "IA Prefix");
        Ok(IaPrefix {
            preferred_lifetime: read_secs(&mut r)?,
            valid_lifetime: read_secs(&mut r)?,
            prefix_len: r.u8()?,
            prefix: r.ipv6()?,
            options: Options::decode(r.rest(), nesting)?,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = secs(self.preferred_lifetime).to_vec();
        bytes.extend_from_slice(&secs(self.valid_lifetime));
        bytes.push(self.prefix_len);
        bytes.extend_from_slice(&self.prefix.octets());
        self.options.marshal(&mut bytes);
        bytes
    }
}

impl fmt::Display for IaPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} preferred={:?} valid={:?}",
            self.prefix, self.prefix_len, self.preferred_lifetime, self.valid_lifetime
        )
    }
}

/// Status Code option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusCodeOption {
    pub code: StatusCode,
    pub message: String,
}

impl StatusCodeOption {
    pub fn parse(data: &[u8]) -> Result<Self> {
        let mut r = Reader::new(data, "Status Code");
        Ok(StatusCodeOption {
            code: StatusCode::from_u16(r.u16()?),
            message: String::from_utf8_lossy(r.rest()).into_owned(),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = self.code.to_u16().to_be_bytes().to_vec();
        bytes.extend_from_slice(self.message.as_bytes());
        bytes
    }
}

impl fmt::Display for StatusCodeOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:?}", self.code, self.message)
    }
}

fn status_of(options: &Options) -> Option<&StatusCodeOption> {
    match options.get_one(OptionCode::STATUS_CODE) {
        Some(DhcpOption::StatusCode(status)) => Some(status),
        _ => None,
    }
}
