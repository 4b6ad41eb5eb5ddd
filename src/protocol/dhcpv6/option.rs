//! Typed DHCPv6 options
//!
//! [`parse_option`] dispatches on the option code to a per-option decoder.
//! Codes without a decoder become [`DhcpOption::Generic`] so they survive a
//! decode/encode cycle byte for byte.

use super::duid::Duid;
use super::ia::{IaAddress, IaNa, IaPd, IaPrefix, StatusCodeOption};
use super::message::Dhcpv6;
use super::types::{ArchType, OptionCode};
use crate::protocol::buffer::Reader;
use crate::protocol::labels::{self, Compression};
use crate::{Error, Result};
use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DhcpOption {
    ClientId(Duid),
    ServerId(Duid),
    IaNa(IaNa),
    IaAddr(IaAddress),
    /// Option Request Option
    Oro(Vec<OptionCode>),
    Preference(u8),
    /// Carried on the wire in hundredths of a second
    ElapsedTime(Duration),
    RelayMsg(Box<Dhcpv6>),
    Unicast(Ipv6Addr),
    StatusCode(StatusCodeOption),
    RapidCommit,
    UserClass(Vec<Vec<u8>>),
    VendorClass {
        enterprise_number: u32,
        data: Vec<Vec<u8>>,
    },
    /// Vendor-specific information: sub-options are `(code, data)` pairs
    VendorOpts {
        enterprise_number: u32,
        options: Vec<(u16, Vec<u8>)>,
    },
    InterfaceId(Vec<u8>),
    DnsServers(Vec<Ipv6Addr>),
    /// Build with [`DhcpOption::domain_search_list`] to reject labels over
    /// 63 bytes; a list placed here directly has such labels cut to 63.
    DomainSearchList(Vec<String>),
    IaPd(IaPd),
    IaPrefix(IaPrefix),
    RemoteId {
        enterprise_number: u32,
        remote_id: Vec<u8>,
    },
    BootfileUrl(String),
    BootfileParam(Vec<String>),
    ClientArchType(Vec<ArchType>),
    /// Client Network Interface Identifier (RFC 5970)
    Nii {
        if_type: u8,
        major: u8,
        minor: u8,
    },
    Generic {
        code: OptionCode,
        data: Vec<u8>,
    },
}

/// Deepest chain of IA_NA, IA_PD, IA Address and IA Prefix containers
/// accepted while decoding. Valid messages need two.
pub const MAX_OPTION_NESTING: usize = 8;

/// Decodes one option value.
pub fn parse_option(code: OptionCode, data: &[u8]) -> Result<DhcpOption> {
    if code == OptionCode::RELAY_MSG {
        return Ok(DhcpOption::RelayMsg(Box::new(Dhcpv6::from_bytes(data)?)));
    }
    decode_option(code, data, 0)
}

fn enter(nesting: usize) -> Result<usize> {
    if nesting >= MAX_OPTION_NESTING {
        return Err(Error::InvalidPacket(format!(
            "option nesting exceeds {} containers",
            MAX_OPTION_NESTING
        )));
    }
    Ok(nesting + 1)
}

/// Decodes any option except Relay Message, which only relay layers carry.
/// `nesting` counts the IA containers already entered.
pub(crate) fn decode_option(code: OptionCode, data: &[u8], nesting: usize) -> Result<DhcpOption> {
    let opt = match code {
        OptionCode::CLIENT_ID => DhcpOption::ClientId(Duid::parse(data)?),
        OptionCode::SERVER_ID => DhcpOption::ServerId(Duid::parse(data)?),
        OptionCode::IA_NA => DhcpOption::IaNa(IaNa::decode(data, enter(nesting)?)?),
        OptionCode::IA_ADDR => DhcpOption::IaAddr(IaAddress::decode(data, enter(nesting)?)?),
        OptionCode::ORO => DhcpOption::Oro(
            parse_u16_list(data, "ORO")?
                .into_iter()
                .map(OptionCode)
                .collect(),
        ),
        OptionCode::PREFERENCE => {
            let mut r = Reader::new(data, "Preference");
            let pref = r.u8()?;
            r.finish()?;
            DhcpOption::Preference(pref)
        }
        OptionCode::ELAPSED_TIME => {
            let mut r = Reader::new(data, "Elapsed Time");
            let centis = r.u16()?;
            r.finish()?;
            DhcpOption::ElapsedTime(Duration::from_millis(centis as u64 * 10))
        }
        OptionCode::RELAY_MSG => {
            return Err(Error::InvalidPacket(
                "Relay Message option outside a relay message".into(),
            ))
        }
        OptionCode::UNICAST => {
            let mut r = Reader::new(data, "Unicast");
            let addr = r.ipv6()?;
            r.finish()?;
            DhcpOption::Unicast(addr)
        }
        OptionCode::STATUS_CODE => DhcpOption::StatusCode(StatusCodeOption::parse(data)?),
        OptionCode::RAPID_COMMIT => {
            if !data.is_empty() {
                return Err(Error::Parse(format!(
                    "Rapid Commit must be empty, got {} bytes",
                    data.len()
                )));
            }
            DhcpOption::RapidCommit
        }
        OptionCode::USER_CLASS => {
            let classes = parse_blobs(&mut Reader::new(data, "User Class"))?;
            if classes.is_empty() {
                return Err(Error::Parse("User Class needs at least one class".into()));
            }
            DhcpOption::UserClass(classes)
        }
        OptionCode::VENDOR_CLASS => {
            let mut r = Reader::new(data, "Vendor Class");
            DhcpOption::VendorClass {
                enterprise_number: r.u32()?,
                data: parse_blobs(&mut r)?,
            }
        }
        OptionCode::VENDOR_OPTS => {
            let mut r = Reader::new(data, "Vendor Opts");
            let enterprise_number = r.u32()?;
            let mut options = Vec::new();
            while !r.is_empty() {
                let sub_code = r.u16()?;
                let len = r.u16()? as usize;
                options.push((sub_code, r.bytes(len)?.to_vec()));
            }
            DhcpOption::VendorOpts {
                enterprise_number,
                options,
            }
        }
        OptionCode::INTERFACE_ID => DhcpOption::InterfaceId(data.to_vec()),
        OptionCode::DNS_RECURSIVE_NAME_SERVER => {
            if data.len() % 16 != 0 {
                return Err(Error::Parse(format!(
                    "DNS server list length {} is not a multiple of 16",
                    data.len()
                )));
            }
            DhcpOption::DnsServers(
                data.chunks_exact(16)
                    .map(|c| {
                        let mut octets = [0u8; 16];
                        octets.copy_from_slice(c);
                        Ipv6Addr::from(octets)
                    })
                    .collect(),
            )
        }
        OptionCode::DOMAIN_SEARCH_LIST => DhcpOption::DomainSearchList(labels::parse_name_list(
            data,
            Compression::Forbidden,
        )?),
        OptionCode::IA_PD => DhcpOption::IaPd(IaPd::decode(data, enter(nesting)?)?),
        OptionCode::IA_PREFIX => DhcpOption::IaPrefix(IaPrefix::decode(data, enter(nesting)?)?),
        OptionCode::REMOTE_ID => {
            let mut r = Reader::new(data, "Remote ID");
            DhcpOption::RemoteId {
                enterprise_number: r.u32()?,
                remote_id: r.rest().to_vec(),
            }
        }
        OptionCode::BOOTFILE_URL => DhcpOption::BootfileUrl(
            String::from_utf8(data.to_vec())
                .map_err(|_| Error::Parse("Bootfile URL is not valid UTF-8".into()))?,
        ),
        OptionCode::BOOTFILE_PARAM => {
            let params = parse_blobs(&mut Reader::new(data, "Bootfile Param"))?
                .into_iter()
                .map(|p| String::from_utf8_lossy(&p).into_owned())
                .collect();
            DhcpOption::BootfileParam(params)
        }
        OptionCode::CLIENT_ARCH_TYPE => {
            if data.is_empty() {
                return Err(Error::Parse("Client Arch Type needs at least one type".into()));
            }
            DhcpOption::ClientArchType(
                parse_u16_list(data, "Client Arch Type")?
                    .into_iter()
                    .map(ArchType)
                    .collect(),
            )
        }
        OptionCode::NII => {
            let mut r = Reader::new(data, "NII");
            let nii = DhcpOption::Nii {
                if_type: r.u8()?,
                major: r.u8()?,
                minor: r.u8()?,
            };
            r.finish()?;
            nii
        }
        _ => DhcpOption::Generic {
            code,
            data: data.to_vec(),
        },
    };
    Ok(opt)
}

fn parse_u16_list(data: &[u8], what: &'static str) -> Result<Vec<u16>> {
    if data.len() % 2 != 0 {
        return Err(Error::Parse(format!("{} has odd length {}", what, data.len())));
    }
    Ok(data
        .chunks_exact(2)
        .map(|c| u16::from_be_bytes([c[0], c[1]]))
        .collect())
}

/// Reads u16-length-prefixed blobs until the reader is exhausted.
fn parse_blobs(r: &mut Reader<'_>) -> Result<Vec<Vec<u8>>> {
    let mut blobs = Vec::new();
    while !r.is_empty() {
        let len = r.u16()? as usize;
        blobs.push(r.bytes(len)?.to_vec());
    }
    Ok(blobs)
}

fn write_blobs<T: AsRef<[u8]>>(blobs: &[T], out: &mut Vec<u8>) {
    for blob in blobs {
        let blob = blob.as_ref();
        let len = blob.len().min(u16::MAX as usize);
        out.extend_from_slice(&(len as u16).to_be_bytes());
        out.extend_from_slice(&blob[..len]);
    }
}

impl DhcpOption {
    /// Domain search list, checked so that it encodes without loss.
    pub fn domain_search_list<S: AsRef<str>>(domains: &[S]) -> Result<Self> {
        labels::encode_name_list(domains)?;
        Ok(DhcpOption::DomainSearchList(
            domains.iter().map(|d| d.as_ref().to_string()).collect(),
        ))
    }

    pub fn code(&self) -> OptionCode {
        match self {
            DhcpOption::ClientId(_) => OptionCode::CLIENT_ID,
            DhcpOption::ServerId(_) => OptionCode::SERVER_ID,
            DhcpOption::IaNa(_) => OptionCode::IA_NA,
            DhcpOption::IaAddr(_) => OptionCode::IA_ADDR,
            DhcpOption::Oro(_) => OptionCode::ORO,
            DhcpOption::Preference(_) => OptionCode::PREFERENCE,
            DhcpOption::ElapsedTime(_) => OptionCode::ELAPSED_TIME,
            DhcpOption::RelayMsg(_) => OptionCode::RELAY_MSG,
            DhcpOption::Unicast(_) => OptionCode::UNICAST,
            DhcpOption::StatusCode(_) => OptionCode::STATUS_CODE,
            DhcpOption::RapidCommit => OptionCode::RAPID_COMMIT,
            DhcpOption::UserClass(_) => OptionCode::USER_CLASS,
            DhcpOption::VendorClass { .. } => OptionCode::VENDOR_CLASS,
            DhcpOption::VendorOpts { .. } => OptionCode::VENDOR_OPTS,
            DhcpOption::InterfaceId(_) => OptionCode::INTERFACE_ID,
            DhcpOption::DnsServers(_) => OptionCode::DNS_RECURSIVE_NAME_SERVER,
            DhcpOption::DomainSearchList(_) => OptionCode::DOMAIN_SEARCH_LIST,
            DhcpOption::IaPd(_) => OptionCode::IA_PD,
            DhcpOption::IaPrefix(_) => OptionCode::IA_PREFIX,
            DhcpOption::RemoteId { .. } => OptionCode::REMOTE_ID,
            DhcpOption::BootfileUrl(_) => OptionCode::BOOTFILE_URL,
            DhcpOption::BootfileParam(_) => OptionCode::BOOTFILE_PARAM,
            DhcpOption::ClientArchType(_) => OptionCode::CLIENT_ARCH_TYPE,
            DhcpOption::Nii { .. } => OptionCode::NII,
            DhcpOption::Generic { code, .. } => *code,
        }
    }

    /// Encodes the option value, without the code/length header.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => duid.to_bytes(),
            DhcpOption::IaNa(ia) => ia.to_bytes(),
            DhcpOption::IaAddr(addr) => addr.to_bytes(),
            DhcpOption::Oro(codes) => codes.iter().flat_map(|c| c.0.to_be_bytes()).collect(),
            DhcpOption::Preference(pref) => vec![*pref],
            DhcpOption::ElapsedTime(elapsed) => {
                let centis = (elapsed.as_millis() / 10).min(u16::MAX as u128) as u16;
                centis.to_be_bytes().to_vec()
            }
            DhcpOption::RelayMsg(msg) => msg.to_bytes(),
            DhcpOption::Unicast(addr) => addr.octets().to_vec(),
            DhcpOption::StatusCode(status) => status.to_bytes(),
            DhcpOption::RapidCommit => Vec::new(),
            DhcpOption::UserClass(classes) => {
                let mut out = Vec::new();
                write_blobs(classes, &mut out);
                out
            }
            DhcpOption::VendorClass {
                enterprise_number,
                data,
            } => {
                let mut out = enterprise_number.to_be_bytes().to_vec();
                write_blobs(data, &mut out);
                out
            }
            DhcpOption::VendorOpts {
                enterprise_number,
                options,
            } => {
                let mut out = enterprise_number.to_be_bytes().to_vec();
                for (code, data) in options {
                    out.extend_from_slice(&code.to_be_bytes());
                    write_blobs(&[data], &mut out);
                }
                out
            }
            DhcpOption::InterfaceId(id) => id.clone(),
            DhcpOption::DnsServers(servers) => servers.iter().flat_map(|s| s.octets()).collect(),
            DhcpOption::DomainSearchList(domains) => labels::encode_name_list_truncated(domains),
            DhcpOption::IaPd(pd) => pd.to_bytes(),
            DhcpOption::IaPrefix(prefix) => prefix.to_bytes(),
            DhcpOption::RemoteId {
                enterprise_number,
                remote_id,
            } => {
                let mut out = enterprise_number.to_be_bytes().to_vec();
                out.extend_from_slice(remote_id);
                out
            }
            DhcpOption::BootfileUrl(url) => url.as_bytes().to_vec(),
            DhcpOption::BootfileParam(params) => {
                let mut out = Vec::new();
                write_blobs(params, &mut out);
                out
            }
            DhcpOption::ClientArchType(types) => types.iter().flat_map(|t| t.0.to_be_bytes()).collect(),
            DhcpOption::Nii {
                if_type,
                major,
                minor,
            } => vec![*if_type, *major, *minor],
            DhcpOption::Generic { data, .. } => data.clone(),
        }
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.code())?;
        match self {
            DhcpOption::ClientId(duid) | DhcpOption::ServerId(duid) => write!(f, "{duid}"),
            DhcpOption::IaNa(ia) => write!(f, "{ia}"),
            DhcpOption::IaAddr(addr) => write!(f, "{addr}"),
            DhcpOption::Oro(codes) => write!(f, "[{}]", join(codes)),
            DhcpOption::Preference(pref) => write!(f, "{pref}"),
            DhcpOption::ElapsedTime(elapsed) => write!(f, "{:?}", elapsed),
            DhcpOption::RelayMsg(msg) => write!(f, "{}", msg.summary().trim_end()),
            DhcpOption::Unicast(addr) => write!(f, "{addr}"),
            DhcpOption::StatusCode(status) => write!(f, "{status}"),
            DhcpOption::RapidCommit => f.write_str("[]"),
            DhcpOption::UserClass(classes) => {
                let classes: Vec<String> = classes
                    .iter()
                    .map(|c| String::from_utf8_lossy(c).into_owned())
                    .collect();
                write!(f, "[{}]", classes.join(", "))
            }
            DhcpOption::VendorClass {
                enterprise_number,
                data,
            } => {
                let data: Vec<String> = data.iter().map(hex::encode).collect();
                write!(f, "enterprise={} data=[{}]", enterprise_number, data.join(", "))
            }
            DhcpOption::VendorOpts {
                enterprise_number,
                options,
            } => {
                let subs: Vec<String> = options
                    .iter()
                    .map(|(code, data)| format!("{}={}", code, hex::encode(data)))
                    .collect();
                write!(f, "enterprise={} options=[{}]", enterprise_number, subs.join(", "))
            }
            DhcpOption::InterfaceId(id) => f.write_str(&hex::encode(id)),
            DhcpOption::DnsServers(servers) => write!(f, "[{}]", join(servers)),
            DhcpOption::DomainSearchList(domains) => write!(f, "[{}]", domains.join(", ")),
            DhcpOption::IaPd(pd) => write!(f, "{pd}"),
            DhcpOption::IaPrefix(prefix) => write!(f, "{prefix}"),
            DhcpOption::RemoteId {
                enterprise_number,
                remote_id,
            } => write!(f, "enterprise={} id={}", enterprise_number, hex::encode(remote_id)),
            DhcpOption::BootfileUrl(url) => f.write_str(url),
            DhcpOption::BootfileParam(params) => write!(f, "[{}]", params.join(", ")),
            DhcpOption::ClientArchType(types) => write!(f, "[{}]", join(types)),
            DhcpOption::Nii {
                if_type,
                major,
                minor,
            } => write!(f, "type={} revision={}.{}", if_type, major, minor),
            DhcpOption::Generic { data, .. } => f.write_str(&hex::encode(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dhcpv6::{Message, MessageType, TransactionId};
    use crate::protocol::MacAddr;

    fn roundtrip(opt: DhcpOption) {
        let parsed = parse_option(opt.code(), &opt.to_bytes()).unwrap();
        assert_eq!(parsed, opt);
    }

    #[test]
    fn test_roundtrip_each_variant() {
        let mac = MacAddr([0, 1, 2, 3, 4, 5]);
        roundtrip(DhcpOption::ClientId(Duid::from_mac(&mac)));
        roundtrip(DhcpOption::ServerId(Duid::En {
            enterprise_number: 311,
            identifier: vec![1, 2, 3],
        }));
        roundtrip(DhcpOption::Oro(vec![OptionCode::DNS_RECURSIVE_NAME_SERVER, OptionCode(99)]));
        roundtrip(DhcpOption::Preference(255));
        roundtrip(DhcpOption::ElapsedTime(Duration::from_millis(1230)));
        roundtrip(DhcpOption::Unicast("2001:db8::1".parse().unwrap()));
        roundtrip(DhcpOption::RapidCommit);
        roundtrip(DhcpOption::UserClass(vec![b"linuxboot".to_vec(), vec![]]));
        roundtrip(DhcpOption::VendorClass {
            enterprise_number: 343,
            data: vec![b"PXEClient".to_vec()],
        });
        roundtrip(DhcpOption::VendorOpts {
            enterprise_number: 4491,
            options: vec![(1, vec![0xaa]), (32, b"cfg".to_vec())],
        });
        roundtrip(DhcpOption::InterfaceId(b"eth0".to_vec()));
        roundtrip(DhcpOption::DnsServers(vec![
            "2001:4860:4860::8888".parse().unwrap(),
            "2001:4860:4860::8844".parse().unwrap(),
        ]));
        roundtrip(DhcpOption::DomainSearchList(vec![
            "example.com".into(),
            "lab.example.org".into(),
        ]));
        roundtrip(DhcpOption::RemoteId {
            enterprise_number: 9,
            remote_id: vec![0xde, 0xad],
        });
        roundtrip(DhcpOption::BootfileUrl("http://[2001:db8::1]/boot.efi".into()));
        roundtrip(DhcpOption::BootfileParam(vec!["root=/dev/sda".into(), "quiet".into()]));
        roundtrip(DhcpOption::ClientArchType(vec![ArchType::EFI_X86_64, ArchType::EFI_BC]));
        roundtrip(DhcpOption::Nii {
            if_type: 1,
            major: 3,
            minor: 10,
        });
        roundtrip(DhcpOption::Generic {
            code: OptionCode(1000),
            data: vec![1, 2, 3],
        });
    }

    #[test]
    fn test_relay_msg_recurses() {
        let inner = Message {
            message_type: MessageType::Solicit,
            transaction_id: TransactionId([0xab, 0xcd, 0xef]),
            options: Default::default(),
        };
        let opt = DhcpOption::RelayMsg(Box::new(Dhcpv6::Message(inner)));
        assert_eq!(opt.to_bytes(), vec![1, 0xab, 0xcd, 0xef]);
        roundtrip(opt);
        assert!(parse_option(OptionCode::RELAY_MSG, &[1, 2]).is_err());
    }

    /// `depth` IA_NA containers, each holding the next one.
    fn nested_ia_na(depth: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; 12];
        for _ in 1..depth {
            let mut outer = vec![0u8; 12];
            outer.extend_from_slice(&OptionCode::IA_NA.0.to_be_bytes());
            outer.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            outer.extend_from_slice(&bytes);
            bytes = outer;
        }
        bytes
    }

    #[test]
    fn test_ia_nesting_cap() {
        assert!(parse_option(OptionCode::IA_NA, &nested_ia_na(MAX_OPTION_NESTING)).is_ok());
        let err = parse_option(OptionCode::IA_NA, &nested_ia_na(MAX_OPTION_NESTING + 1)).unwrap_err();
        assert!(err.is_decode());
        // Far past the cap: rejected without exhausting the stack
        assert!(parse_option(OptionCode::IA_NA, &nested_ia_na(250)).is_err());
    }

    #[test]
    fn test_ia_prefix_nesting_counts() {
        // IA_PD > IA Prefix > IA Prefix > ... counts every container
        let mut bytes = vec![0u8; 25];
        for _ in 1..=MAX_OPTION_NESTING {
            let mut outer = vec![0u8; 25];
            outer.extend_from_slice(&OptionCode::IA_PREFIX.0.to_be_bytes());
            outer.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            outer.extend_from_slice(&bytes);
            bytes = outer;
        }
        assert!(parse_option(OptionCode::IA_PREFIX, &bytes).is_err());
    }

    #[test]
    fn test_length_violations() {
        assert!(parse_option(OptionCode::PREFERENCE, &[]).is_err());
        assert!(parse_option(OptionCode::PREFERENCE, &[1, 2]).is_err());
        assert!(parse_option(OptionCode::ELAPSED_TIME, &[1]).is_err());
        assert!(parse_option(OptionCode::ORO, &[0, 23, 0]).is_err());
        assert!(parse_option(OptionCode::UNICAST, &[0; 15]).is_err());
        assert!(parse_option(OptionCode::RAPID_COMMIT, &[0]).is_err());
        assert!(parse_option(OptionCode::USER_CLASS, &[]).is_err());
        assert!(parse_option(OptionCode::USER_CLASS, &[0, 5, b'a']).is_err());
        assert!(parse_option(OptionCode::VENDOR_CLASS, &[0, 0, 1]).is_err());
        assert!(parse_option(OptionCode::VENDOR_OPTS, &[0, 0, 0, 1, 0, 1, 0]).is_err());
        assert!(parse_option(OptionCode::DNS_RECURSIVE_NAME_SERVER, &[0; 17]).is_err());
        assert!(parse_option(OptionCode::DOMAIN_SEARCH_LIST, &[3, b'c', b'o']).is_err());
        assert!(parse_option(OptionCode::REMOTE_ID, &[0, 0, 1]).is_err());
        assert!(parse_option(OptionCode::BOOTFILE_URL, &[0xff, 0xfe]).is_err());
        assert!(parse_option(OptionCode::CLIENT_ARCH_TYPE, &[]).is_err());
        assert!(parse_option(OptionCode::CLIENT_ARCH_TYPE, &[0, 7, 0]).is_err());
        assert!(parse_option(OptionCode::NII, &[1, 2]).is_err());
        assert!(parse_option(OptionCode::IA_NA, &[0; 11]).is_err());
        assert!(parse_option(OptionCode::IA_ADDR, &[0; 23]).is_err());
        assert!(parse_option(OptionCode::STATUS_CODE, &[0]).is_err());
        assert!(parse_option(OptionCode::CLIENT_ID, &[0, 3, 0]).is_err());
    }

    #[test]
    fn test_domain_search_label_limit() {
        let long = format!("{}.example.com", "h".repeat(64));
        let err = DhcpOption::domain_search_list(&[long.as_str()]).unwrap_err();
        assert!(err.is_protocol());

        let opt = DhcpOption::domain_search_list(&["example.com"]).unwrap();
        assert_eq!(opt, DhcpOption::DomainSearchList(vec!["example.com".into()]));
    }

    #[test]
    fn test_domain_search_rejects_compression() {
        let data = [7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 0, 0xc0, 0x00];
        assert!(parse_option(OptionCode::DOMAIN_SEARCH_LIST, &data).is_err());
    }

    #[test]
    fn test_elapsed_time_caps() {
        let opt = DhcpOption::ElapsedTime(Duration::from_secs(10_000));
        assert_eq!(opt.to_bytes(), vec![0xff, 0xff]);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DhcpOption::Preference(10).to_string(),
            "OPTION_PREFERENCE: 10"
        );
        assert_eq!(
            DhcpOption::Oro(vec![OptionCode::DNS_RECURSIVE_NAME_SERVER]).to_string(),
            "OPTION_ORO: [DNS Recursive Name Server]"
        );
        assert_eq!(
            DhcpOption::Generic {
                code: OptionCode(999),
                data: vec![0xbe, 0xef]
            }
            .to_string(),
            "unknown (999): beef"
        );
    }
}
