//! DHCPv4 protocol - RFC 2131, RFC 2132
//!
//! Owned message representation with a bit-exact wire codec, plus the
//! constructors a client uses to derive one message from another.

mod modifiers;
pub mod option;
mod options;
mod types;

pub use modifiers::*;
pub use option::DhcpOption;
pub use options::{Options, MAX_RECORD_LEN};
pub use types::{MessageType, OpCode, OptionCode, HW_TYPE_ETHERNET};

use crate::protocol::buffer::{nul_trimmed, write_fixed, Reader};
use crate::protocol::MacAddr;
use crate::{Error, Result};
use rand::RngCore;
use std::fmt;
use std::net::Ipv4Addr;
use std::time::Duration;

/// DHCP server port
pub const DHCP_SERVER_PORT: u16 = 67;

/// DHCP client port
pub const DHCP_CLIENT_PORT: u16 = 68;

/// BOOTP fixed header size (without magic cookie)
pub const DHCP_HEADER_SIZE: usize = 236;

/// DHCP magic cookie
pub const MAGIC_COOKIE: [u8; 4] = [99, 130, 83, 99];

/// Smallest legal BOOTP message on the wire (RFC 951)
pub const MIN_MESSAGE_SIZE: usize = 300;

/// Longest client hardware address the `chaddr` field holds
pub const MAX_HW_ADDR_LEN: usize = 16;

const SERVER_NAME_LEN: usize = 64;
const BOOT_FILE_LEN: usize = 128;

/// Broadcast bit of the flags field
pub const FLAG_BROADCAST: u16 = 0x8000;

/// 4-byte transaction ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransactionId(pub [u8; 4]);

impl TransactionId {
    /// Draws a fresh ID from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut xid = [0u8; 4];
        rand::rngs::OsRng
            .try_fill_bytes(&mut xid)
            .map_err(|e| Error::Random(e.to_string()))?;
        Ok(TransactionId(xid))
    }
}

impl From<u32> for TransactionId {
    fn from(v: u32) -> Self {
        TransactionId(v.to_be_bytes())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", u32::from_be_bytes(self.0))
    }
}

/// A DHCPv4 message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub op_code: OpCode,
    pub hw_type: u8,
    pub hop_count: u8,
    pub transaction_id: TransactionId,
    pub num_seconds: u16,
    pub flags: u16,
    pub client_ip: Ipv4Addr,
    pub your_ip: Ipv4Addr,
    pub server_ip: Ipv4Addr,
    pub gateway_ip: Ipv4Addr,
    /// Only the first `hlen` bytes of `chaddr`; an hlen over 16 reads all 16
    pub client_hw_addr: Vec<u8>,
    pub server_host_name: String,
    pub boot_file_name: String,
    pub options: Options,
}

impl Message {
    /// Creates an empty BOOTREQUEST with a random transaction ID.
    pub fn new(modifiers: &[Modifier]) -> Result<Self> {
        let mut msg = Message {
            op_code: OpCode::BootRequest,
            hw_type: HW_TYPE_ETHERNET,
            hop_count: 0,
            transaction_id: TransactionId::generate()?,
            num_seconds: 0,
            flags: 0,
            client_ip: Ipv4Addr::UNSPECIFIED,
            your_ip: Ipv4Addr::UNSPECIFIED,
            server_ip: Ipv4Addr::UNSPECIFIED,
            gateway_ip: Ipv4Addr::UNSPECIFIED,
            client_hw_addr: Vec::new(),
            server_host_name: String::new(),
            boot_file_name: String::new(),
            options: Options::new(),
        };
        msg.apply(modifiers);
        Ok(msg)
    }

    pub fn apply(&mut self, modifiers: &[Modifier]) {
        for modify in modifiers {
            modify(self);
        }
    }

    /// Parses a DHCPv4 message.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < DHCP_HEADER_SIZE + MAGIC_COOKIE.len() {
            return Err(Error::Parse(format!(
                "DHCP message too short: {} bytes",
                data.len()
            )));
        }

        let mut r = Reader::new(data, "DHCPv4 header");
        let op_code = OpCode::from_u8(r.u8()?);
        let hw_type = r.u8()?;
        // Only the first hlen bytes of chaddr count, and chaddr holds 16
        let hw_addr_len = (r.u8()? as usize).min(MAX_HW_ADDR_LEN);
        let hop_count = r.u8()?;
        let transaction_id = TransactionId(r.array()?);
        let num_seconds = r.u16()?;
        let flags = r.u16()?;
        let client_ip = r.ipv4()?;
        let your_ip = r.ipv4()?;
        let server_ip = r.ipv4()?;
        let gateway_ip = r.ipv4()?;
        let chaddr: [u8; MAX_HW_ADDR_LEN] = r.array()?;
        let server_host_name = nul_trimmed(r.bytes(SERVER_NAME_LEN)?);
        let boot_file_name = nul_trimmed(r.bytes(BOOT_FILE_LEN)?);

        let cookie: [u8; 4] = r.array()?;
        if cookie != MAGIC_COOKIE {
            return Err(Error::InvalidPacket(format!(
                "bad magic cookie {:?}",
                cookie
            )));
        }

        let options = Options::from_bytes_check_end(r.rest(), true)?;

        Ok(Message {
            op_code,
            hw_type,
            hop_count,
            transaction_id,
            num_seconds,
            flags,
            client_ip,
            your_ip,
            server_ip,
            gateway_ip,
            client_hw_addr: chaddr[..hw_addr_len].to_vec(),
            server_host_name,
            boot_file_name,
            options,
        })
    }

    /// Serializes the message, padding it to [`MIN_MESSAGE_SIZE`].
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(MIN_MESSAGE_SIZE);
        buf.push(self.op_code.to_u8());
        buf.push(self.hw_type);

        let hw_addr = &self.client_hw_addr[..self.client_hw_addr.len().min(MAX_HW_ADDR_LEN)];
        let hlen = if hw_addr.is_empty() && self.hw_type == HW_TYPE_ETHERNET {
            6
        } else {
            hw_addr.len()
        };
        buf.push(hlen as u8);
        buf.push(self.hop_count);
        buf.extend_from_slice(&self.transaction_id.0);
        buf.extend_from_slice(&self.num_seconds.to_be_bytes());
        buf.extend_from_slice(&self.flags.to_be_bytes());
        for ip in [self.client_ip, self.your_ip, self.server_ip, self.gateway_ip] {
            buf.extend_from_slice(&ip.octets());
        }
        write_fixed(&mut buf, hw_addr, MAX_HW_ADDR_LEN);
        write_fixed(&mut buf, self.server_host_name.as_bytes(), SERVER_NAME_LEN);
        write_fixed(&mut buf, self.boot_file_name.as_bytes(), BOOT_FILE_LEN);
        buf.extend_from_slice(&MAGIC_COOKIE);

        self.options.marshal(&mut buf);
        if buf.len() < MIN_MESSAGE_SIZE - 1 {
            buf.resize(MIN_MESSAGE_SIZE - 1, OptionCode::PAD.0);
        }
        buf.push(OptionCode::END.0);
        buf
    }

    pub fn is_broadcast(&self) -> bool {
        self.flags & FLAG_BROADCAST != 0
    }

    pub fn set_broadcast(&mut self) {
        self.flags |= FLAG_BROADCAST;
    }

    pub fn set_unicast(&mut self) {
        self.flags &= !FLAG_BROADCAST;
    }

    pub fn hw_addr(&self) -> Option<MacAddr> {
        MacAddr::from_slice(&self.client_hw_addr)
    }

    pub fn get_option(&self, code: OptionCode) -> Option<&[u8]> {
        self.options.get(code)
    }

    pub fn update_option(&mut self, opt: DhcpOption) {
        self.options.update(opt);
    }

    /// Message type from option 53, `MessageType::None` when absent or malformed.
    pub fn message_type(&self) -> MessageType {
        self.get_option(OptionCode::DHCP_MESSAGE_TYPE)
            .and_then(|v| option::parse_message_type(v).ok())
            .unwrap_or(MessageType::None)
    }

    pub fn server_identifier(&self) -> Option<Ipv4Addr> {
        self.ip_option(OptionCode::SERVER_IDENTIFIER)
    }

    pub fn requested_ip(&self) -> Option<Ipv4Addr> {
        self.ip_option(OptionCode::REQUESTED_IP_ADDRESS)
    }

    pub fn subnet_mask(&self) -> Option<Ipv4Addr> {
        self.ip_option(OptionCode::SUBNET_MASK)
    }

    pub fn broadcast_address(&self) -> Option<Ipv4Addr> {
        self.ip_option(OptionCode::BROADCAST_ADDRESS)
    }

    pub fn router(&self) -> Vec<Ipv4Addr> {
        self.ips_option(OptionCode::ROUTER)
    }

    pub fn dns(&self) -> Vec<Ipv4Addr> {
        self.ips_option(OptionCode::DOMAIN_NAME_SERVER)
    }

    pub fn ntp_servers(&self) -> Vec<Ipv4Addr> {
        self.ips_option(OptionCode::NTP_SERVERS)
    }

    pub fn lease_time(&self) -> Option<Duration> {
        self.duration_option(OptionCode::IP_ADDRESS_LEASE_TIME)
    }

    pub fn renewal_time(&self) -> Option<Duration> {
        self.duration_option(OptionCode::RENEW_TIME_VALUE)
    }

    pub fn rebinding_time(&self) -> Option<Duration> {
        self.duration_option(OptionCode::REBINDING_TIME_VALUE)
    }

    pub fn max_message_size(&self) -> Option<u16> {
        self.get_option(OptionCode::MAXIMUM_DHCP_MESSAGE_SIZE)
            .and_then(|v| option::parse_u16(v).ok())
    }

    pub fn host_name(&self) -> Option<String> {
        self.string_option(OptionCode::HOST_NAME)
    }

    pub fn domain_name(&self) -> Option<String> {
        self.string_option(OptionCode::DOMAIN_NAME)
    }

    pub fn bootfile_name(&self) -> Option<String> {
        self.string_option(OptionCode::BOOTFILE_NAME)
    }

    pub fn tftp_server_name(&self) -> Option<String> {
        self.string_option(OptionCode::TFTP_SERVER_NAME)
    }

    pub fn domain_search(&self) -> Vec<String> {
        self.get_option(OptionCode::DOMAIN_SEARCH)
            .and_then(|v| option::parse_domain_search(v).ok())
            .unwrap_or_default()
    }

    pub fn user_class(&self) -> Vec<Vec<u8>> {
        self.get_option(OptionCode::USER_CLASS_INFORMATION)
            .and_then(|v| option::parse_user_class(v).ok())
            .unwrap_or_default()
    }

    /// Sub-options of the Vendor Specific Information option.
    pub fn vendor_options(&self) -> Result<Option<Options>> {
        self.get_option(OptionCode::VENDOR_SPECIFIC_INFORMATION)
            .map(Options::from_bytes)
            .transpose()
    }

    pub fn parameter_request_list(&self) -> Vec<OptionCode> {
        self.get_option(OptionCode::PARAMETER_REQUEST_LIST)
            .map(option::parse_codes)
            .unwrap_or_default()
    }

    pub fn is_option_requested(&self, code: OptionCode) -> bool {
        self.parameter_request_list().contains(&code)
    }

    fn ip_option(&self, code: OptionCode) -> Option<Ipv4Addr> {
        self.get_option(code).and_then(|v| option::parse_ip(v).ok())
    }

    fn ips_option(&self, code: OptionCode) -> Vec<Ipv4Addr> {
        self.get_option(code)
            .and_then(|v| option::parse_ips(v).ok())
            .unwrap_or_default()
    }

    fn duration_option(&self, code: OptionCode) -> Option<Duration> {
        self.get_option(code)
            .and_then(|v| option::parse_duration(v).ok())
    }

    fn string_option(&self, code: OptionCode) -> Option<String> {
        self.get_option(code).map(option::parse_string)
    }

    /// Multi-line human-readable dump.
    pub fn summary(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let flags = if self.is_broadcast() { "Broadcast" } else { "Unicast" };
        let hw_addr = self
            .client_hw_addr
            .chunks(1)
            .map(hex::encode)
            .collect::<Vec<_>>()
            .join(":");
        let hw_type = if self.hw_type == HW_TYPE_ETHERNET {
            "Ethernet".to_string()
        } else {
            self.hw_type.to_string()
        };
        writeln!(f, "DHCPv4 Message")?;
        writeln!(f, "  opcode: {}", self.op_code)?;
        writeln!(f, "  hwtype: {}", hw_type)?;
        writeln!(f, "  hopcount: {}", self.hop_count)?;
        writeln!(f, "  transaction ID: {}", self.transaction_id)?;
        writeln!(f, "  num seconds: {}", self.num_seconds)?;
        writeln!(f, "  flags: {} (0x{:04x})", flags, self.flags)?;
        writeln!(f, "  client IP: {}", self.client_ip)?;
        writeln!(f, "  your IP: {}", self.your_ip)?;
        writeln!(f, "  server IP: {}", self.server_ip)?;
        writeln!(f, "  gateway IP: {}", self.gateway_ip)?;
        writeln!(f, "  client MAC: {}", hw_addr)?;
        writeln!(f, "  server hostname: {}", self.server_host_name)?;
        writeln!(f, "  bootfile name: {}", self.boot_file_name)?;
        writeln!(f, "  options:")?;
        write!(f, "{}", self.options)
    }
}

/// Builds a broadcast DISCOVER asking for the usual network parameters.
pub fn new_discovery(hw_addr: MacAddr, modifiers: &[Modifier]) -> Result<Message> {
    let mut msg = Message::new(&[])?;
    msg.client_hw_addr = hw_addr.0.to_vec();
    msg.set_broadcast();
    msg.update_option(option::message_type(MessageType::Discover));
    msg.update_option(option::parameter_request_list(&[
        OptionCode::SUBNET_MASK,
        OptionCode::ROUTER,
        OptionCode::DOMAIN_NAME,
        OptionCode::DOMAIN_NAME_SERVER,
    ]));
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds an INFORM for a client that already has `local_ip`.
pub fn new_inform(hw_addr: MacAddr, local_ip: Ipv4Addr, modifiers: &[Modifier]) -> Result<Message> {
    let mut msg = Message::new(&[])?;
    msg.client_hw_addr = hw_addr.0.to_vec();
    msg.client_ip = local_ip;
    msg.update_option(option::message_type(MessageType::Inform));
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds the REQUEST answering `offer`.
///
/// Fails if the offer carries no Server Identifier.
pub fn new_request_from_offer(offer: &Message, modifiers: &[Modifier]) -> Result<Message> {
    let server_id = offer
        .server_identifier()
        .ok_or(Error::MissingOption("Server Identifier"))?;

    let mut msg = Message::new(&[])?;
    msg.transaction_id = offer.transaction_id;
    msg.hw_type = offer.hw_type;
    msg.client_hw_addr = offer.client_hw_addr.clone();
    msg.flags = offer.flags & FLAG_BROADCAST;
    msg.update_option(option::message_type(MessageType::Request));
    msg.update_option(option::parameter_request_list(&[
        OptionCode::ROUTER,
        OptionCode::SUBNET_MASK,
        OptionCode::DOMAIN_NAME,
        OptionCode::DOMAIN_NAME_SERVER,
    ]));
    msg.update_option(option::requested_ip(offer.your_ip));
    msg.update_option(option::server_identifier(server_id));
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds a server reply to `request`: OFFER for a DISCOVER, ACK otherwise.
pub fn new_reply_from_request(request: &Message, modifiers: &[Modifier]) -> Result<Message> {
    let mut msg = Message::new(&[])?;
    msg.op_code = OpCode::BootReply;
    msg.transaction_id = request.transaction_id;
    msg.hw_type = request.hw_type;
    msg.client_hw_addr = request.client_hw_addr.clone();
    msg.flags = request.flags;
    msg.gateway_ip = request.gateway_ip;

    let reply_type = match request.message_type() {
        MessageType::Discover => MessageType::Offer,
        _ => MessageType::Ack,
    };
    msg.update_option(option::message_type(reply_type));
    for code in [OptionCode::RELAY_AGENT_INFORMATION, OptionCode::CLIENT_IDENTIFIER] {
        if let Some(value) = request.get_option(code) {
            msg.update_option(DhcpOption::new(code, value.to_vec()));
        }
    }
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds the RELEASE for a lease acknowledged by `ack`.
///
/// The transaction ID and Server Identifier are carried over from the ACK.
pub fn new_release_from_ack(ack: &Message, modifiers: &[Modifier]) -> Result<Message> {
    let server_id = ack
        .server_identifier()
        .ok_or(Error::MissingOption("Server Identifier"))?;

    let mut msg = Message::new(&[])?;
    msg.transaction_id = ack.transaction_id;
    msg.hw_type = ack.hw_type;
    msg.client_hw_addr = ack.client_hw_addr.clone();
    msg.client_ip = ack.your_ip;
    msg.set_unicast();
    msg.update_option(option::message_type(MessageType::Release));
    msg.update_option(option::server_identifier(server_id));
    msg.apply(modifiers);
    Ok(msg)
}
