//! Typed DHCPv4 option values
//!
//! Constructors build a [`DhcpOption`] from typed values, and the `parse_*`
//! helpers decode an option value back, rejecting bad lengths.

use super::options::Options;
use super::types::{MessageType, OptionCode};
use crate::protocol::buffer::Reader;
use crate::protocol::labels::{self, Compression};
use crate::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// One option: a code and its raw value
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhcpOption {
    pub code: OptionCode,
    pub value: Vec<u8>,
}

impl DhcpOption {
    pub fn new(code: OptionCode, value: Vec<u8>) -> Self {
        Self { code, value }
    }
}

impl fmt::Display for DhcpOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, format_value(self.code, &self.value))
    }
}

pub fn generic(code: OptionCode, value: impl Into<Vec<u8>>) -> DhcpOption {
    DhcpOption::new(code, value.into())
}

pub fn message_type(t: MessageType) -> DhcpOption {
    DhcpOption::new(OptionCode::DHCP_MESSAGE_TYPE, vec![t.to_u8()])
}

fn ip_option(code: OptionCode, ip: Ipv4Addr) -> DhcpOption {
    DhcpOption::new(code, ip.octets().to_vec())
}

fn ips_option(code: OptionCode, ips: &[Ipv4Addr]) -> DhcpOption {
    DhcpOption::new(code, ips.iter().flat_map(|ip| ip.octets()).collect())
}

fn duration_option(code: OptionCode, d: Duration) -> DhcpOption {
    let secs = d.as_secs().min(u32::MAX as u64) as u32;
    DhcpOption::new(code, secs.to_be_bytes().to_vec())
}

pub fn server_identifier(ip: Ipv4Addr) -> DhcpOption {
    ip_option(OptionCode::SERVER_IDENTIFIER, ip)
}

pub fn requested_ip(ip: Ipv4Addr) -> DhcpOption {
    ip_option(OptionCode::REQUESTED_IP_ADDRESS, ip)
}

pub fn subnet_mask(mask: Ipv4Addr) -> DhcpOption {
    ip_option(OptionCode::SUBNET_MASK, mask)
}

pub fn broadcast_address(ip: Ipv4Addr) -> DhcpOption {
    ip_option(OptionCode::BROADCAST_ADDRESS, ip)
}

pub fn router(routers: &[Ipv4Addr]) -> DhcpOption {
    ips_option(OptionCode::ROUTER, routers)
}

pub fn dns(servers: &[Ipv4Addr]) -> DhcpOption {
    ips_option(OptionCode::DOMAIN_NAME_SERVER, servers)
}

pub fn ntp_servers(servers: &[Ipv4Addr]) -> DhcpOption {
    ips_option(OptionCode::NTP_SERVERS, servers)
}

pub fn lease_time(d: Duration) -> DhcpOption {
    duration_option(OptionCode::IP_ADDRESS_LEASE_TIME, d)
}

pub fn renewal_time(d: Duration) -> DhcpOption {
    duration_option(OptionCode::RENEW_TIME_VALUE, d)
}

pub fn rebinding_time(d: Duration) -> DhcpOption {
    duration_option(OptionCode::REBINDING_TIME_VALUE, d)
}

pub fn max_message_size(size: u16) -> DhcpOption {
    DhcpOption::new(OptionCode::MAXIMUM_DHCP_MESSAGE_SIZE, size.to_be_bytes().to_vec())
}

pub fn parameter_request_list(codes: &[OptionCode]) -> DhcpOption {
    DhcpOption::new(
        OptionCode::PARAMETER_REQUEST_LIST,
        codes.iter().map(|c| c.0).collect(),
    )
}

pub fn host_name(name: &str) -> DhcpOption {
    DhcpOption::new(OptionCode::HOST_NAME, name.as_bytes().to_vec())
}

pub fn domain_name(name: &str) -> DhcpOption {
    DhcpOption::new(OptionCode::DOMAIN_NAME, name.as_bytes().to_vec())
}

pub fn bootfile_name(name: &str) -> DhcpOption {
    DhcpOption::new(OptionCode::BOOTFILE_NAME, name.as_bytes().to_vec())
}

pub fn tftp_server_name(name: &str) -> DhcpOption {
    DhcpOption::new(OptionCode::TFTP_SERVER_NAME, name.as_bytes().to_vec())
}

pub fn class_identifier(id: &str) -> DhcpOption {
    DhcpOption::new(OptionCode::CLASS_IDENTIFIER, id.as_bytes().to_vec())
}

pub fn client_identifier(id: &[u8]) -> DhcpOption {
    DhcpOption::new(OptionCode::CLIENT_IDENTIFIER, id.to_vec())
}

pub fn rapid_commit() -> DhcpOption {
    DhcpOption::new(OptionCode::RAPID_COMMIT, Vec::new())
}

/// User class data (RFC 3004): each class is a length-prefixed blob.
pub fn user_class<T: AsRef<[u8]>>(classes: &[T]) -> DhcpOption {
    let mut value = Vec::new();
    for class in classes {
        let data = class.as_ref();
        let n = data.len().min(u8::MAX as usize);
        value.push(n as u8);
        value.extend_from_slice(&data[..n]);
    }
    DhcpOption::new(OptionCode::USER_CLASS_INFORMATION, value)
}

/// Domain search list (RFC 3397), encoded without compression.
/// Fails if a label is longer than 63 bytes.
pub fn domain_search<S: AsRef<str>>(domains: &[S]) -> Result<DhcpOption> {
    Ok(DhcpOption::new(
        OptionCode::DOMAIN_SEARCH,
        labels::encode_name_list(domains)?,
    ))
}

/// Vendor specific information (option 43) holding encapsulated sub-options.
pub fn vendor_specific(sub_options: &Options) -> DhcpOption {
    DhcpOption::new(OptionCode::VENDOR_SPECIFIC_INFORMATION, sub_options.to_bytes())
}

pub fn parse_ip(data: &[u8]) -> Result<Ipv4Addr> {
    let mut r = Reader::new(data, "IPv4 address option");
    let ip = r.ipv4()?;
    r.finish()?;
    Ok(ip)
}

pub fn parse_ips(data: &[u8]) -> Result<Vec<Ipv4Addr>> {
    if data.is_empty() || data.len() % 4 != 0 {
        return Err(Error::Parse(format!(
            "IP list option length {} is not a positive multiple of 4",
            data.len()
        )));
    }
    Ok(data
        .chunks_exact(4)
        .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]))
        .collect())
}

pub fn parse_u16(data: &[u8]) -> Result<u16> {
    let mut r = Reader::new(data, "uint16 option");
    let v = r.u16()?;
    r.finish()?;
    Ok(v)
}

pub fn parse_duration(data: &[u8]) -> Result<Duration> {
    let mut r = Reader::new(data, "duration option");
    let secs = r.u32()?;
    r.finish()?;
    Ok(Duration::from_secs(secs as u64))
}

pub fn parse_message_type(data: &[u8]) -> Result<MessageType> {
    match data {
        [t] => Ok(MessageType::from_u8(*t)),
        _ => Err(Error::Parse(format!(
            "message type option must be 1 byte, got {}",
            data.len()
        ))),
    }
}

pub fn parse_string(data: &[u8]) -> String {
    String::from_utf8_lossy(data).into_owned()
}

pub fn parse_codes(data: &[u8]) -> Vec<OptionCode> {
    data.iter().copied().map(OptionCode).collect()
}

pub fn parse_user_class(data: &[u8]) -> Result<Vec<Vec<u8>>> {
    let mut r = Reader::new(data, "user class option");
    let mut classes = Vec::new();
    while !r.is_empty() {
        let len = r.u8()? as usize;
        if len == 0 {
            return Err(Error::Parse("user class with zero length".into()));
        }
        classes.push(r.bytes(len)?.to_vec());
    }
    if classes.is_empty() {
        return Err(Error::Parse("user class option is empty".into()));
    }
    Ok(classes)
}

pub fn parse_domain_search(data: &[u8]) -> Result<Vec<String>> {
    labels::parse_name_list(data, Compression::Allowed)
}

/// Human-readable rendering of an option value, falling back to hex.
pub fn format_value(code: OptionCode, value: &[u8]) -> String {
    let rendered = match code {
        OptionCode::DHCP_MESSAGE_TYPE => parse_message_type(value).map(|t| t.to_string()).ok(),
        OptionCode::SUBNET_MASK
        | OptionCode::SERVER_IDENTIFIER
        | OptionCode::REQUESTED_IP_ADDRESS
        | OptionCode::BROADCAST_ADDRESS => parse_ip(value).map(|ip| ip.to_string()).ok(),
        OptionCode::ROUTER
        | OptionCode::DOMAIN_NAME_SERVER
        | OptionCode::NTP_SERVERS
        | OptionCode::TIME_SERVER
        | OptionCode::NAME_SERVER
        | OptionCode::LOG_SERVER => parse_ips(value).map(|ips| join(&ips)).ok(),
        OptionCode::IP_ADDRESS_LEASE_TIME
        | OptionCode::RENEW_TIME_VALUE
        | OptionCode::REBINDING_TIME_VALUE => parse_duration(value).map(|d| format!("{:?}", d)).ok(),
        OptionCode::MAXIMUM_DHCP_MESSAGE_SIZE => parse_u16(value).map(|v| v.to_string()).ok(),
        OptionCode::HOST_NAME
        | OptionCode::DOMAIN_NAME
        | OptionCode::ROOT_PATH
        | OptionCode::BOOTFILE_NAME
        | OptionCode::TFTP_SERVER_NAME
        | OptionCode::CLASS_IDENTIFIER
        | OptionCode::MESSAGE => Some(parse_string(value)),
        OptionCode::PARAMETER_REQUEST_LIST => Some(join(&parse_codes(value))),
        OptionCode::USER_CLASS_INFORMATION => parse_user_class(value)
            .map(|classes| {
                classes
                    .iter()
                    .map(|c| parse_string(c))
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .ok(),
        OptionCode::DOMAIN_SEARCH => parse_domain_search(value).map(|d| d.join(", ")).ok(),
        _ => None,
    };
    rendered.unwrap_or_else(|| hex(value))
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|i| i.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn hex(value: &[u8]) -> String {
    if value.is_empty() {
        return "(empty)".into();
    }
    value.chunks(1).map(hex::encode).collect::<Vec<_>>().join(" ")
}
