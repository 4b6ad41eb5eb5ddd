//! DHCPv4 enumerations: BOOTP op codes, message types and option codes.

use std::fmt;

/// BOOTP message op code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    BootRequest,
    BootReply,
    Other(u8),
}

impl OpCode {
    pub fn from_u8(value: u8) -> Self {
        match value {
            1 => OpCode::BootRequest,
            2 => OpCode::BootReply,
            other => OpCode::Other(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            OpCode::BootRequest => 1,
            OpCode::BootReply => 2,
            OpCode::Other(v) => v,
        }
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OpCode::BootRequest => write!(f, "BootRequest"),
            OpCode::BootReply => write!(f, "BootReply"),
            OpCode::Other(v) => write!(f, "unknown ({v})"),
        }
    }
}

/// ARP hardware type for Ethernet (RFC 1700)
pub const HW_TYPE_ETHERNET: u8 = 1;

/// DHCP message type, carried in option 53 (RFC 2132, RFC 4388, RFC 6926)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// No message type option present
    None,
    Discover,
    Offer,
    Request,
    Decline,
    Ack,
    Nak,
    Release,
    Inform,
    ForceRenew,
    LeaseQuery,
    LeaseUnassigned,
    LeaseUnknown,
    LeaseActive,
    BulkLeaseQuery,
    LeaseQueryDone,
    ActiveLeaseQuery,
    LeaseQueryStatus,
    Tls,
    Unknown(u8),
}

impl MessageType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => MessageType::None,
            1 => MessageType::Discover,
            2 => MessageType::Offer,
            3 => MessageType::Request,
            4 => MessageType::Decline,
            5 => MessageType::Ack,
            6 => MessageType::Nak,
            7 => MessageType::Release,
            8 => MessageType::Inform,
            9 => MessageType::ForceRenew,
            10 => MessageType::LeaseQuery,
            11 => MessageType::LeaseUnassigned,
            12 => MessageType::LeaseUnknown,
            13 => MessageType::LeaseActive,
            14 => MessageType::BulkLeaseQuery,
            15 => MessageType::LeaseQueryDone,
            16 => MessageType::ActiveLeaseQuery,
            17 => MessageType::LeaseQueryStatus,
            18 => MessageType::Tls,
            other => MessageType::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            MessageType::None => 0,
            MessageType::Discover => 1,
            MessageType::Offer => 2,
            MessageType::Request => 3,
            MessageType::Decline => 4,
            MessageType::Ack => 5,
            MessageType::Nak => 6,
            MessageType::Release => 7,
            MessageType::Inform => 8,
            MessageType::ForceRenew => 9,
            MessageType::LeaseQuery => 10,
            MessageType::LeaseUnassigned => 11,
            MessageType::LeaseUnknown => 12,
            MessageType::LeaseActive => 13,
            MessageType::BulkLeaseQuery => 14,
            MessageType::LeaseQueryDone => 15,
            MessageType::ActiveLeaseQuery => 16,
            MessageType::LeaseQueryStatus => 17,
            MessageType::Tls => 18,
            MessageType::Unknown(v) => v,
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::None => "NONE",
            MessageType::Discover => "DISCOVER",
            MessageType::Offer => "OFFER",
            MessageType::Request => "REQUEST",
            MessageType::Decline => "DECLINE",
            MessageType::Ack => "ACK",
            MessageType::Nak => "NAK",
            MessageType::Release => "RELEASE",
            MessageType::Inform => "INFORM",
            MessageType::ForceRenew => "FORCERENEW",
            MessageType::LeaseQuery => "LEASEQUERY",
            MessageType::LeaseUnassigned => "LEASEUNASSIGNED",
            MessageType::LeaseUnknown => "LEASEUNKNOWN",
            MessageType::LeaseActive => "LEASEACTIVE",
            MessageType::BulkLeaseQuery => "BULKLEASEQUERY",
            MessageType::LeaseQueryDone => "LEASEQUERYDONE",
            MessageType::ActiveLeaseQuery => "ACTIVELEASEQUERY",
            MessageType::LeaseQueryStatus => "LEASEQUERYSTATUS",
            MessageType::Tls => "TLS",
            MessageType::Unknown(v) => return write!(f, "unknown ({v})"),
        };
        f.write_str(name)
    }
}

/// DHCPv4 option code (RFC 2132 and later)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionCode(pub u8);

impl OptionCode {
    pub const PAD: OptionCode = OptionCode(0);
    pub const SUBNET_MASK: OptionCode = OptionCode(1);
    pub const TIME_OFFSET: OptionCode = OptionCode(2);
    pub const ROUTER: OptionCode = OptionCode(3);
    pub const TIME_SERVER: OptionCode = OptionCode(4);
    pub const NAME_SERVER: OptionCode = OptionCode(5);
    pub const DOMAIN_NAME_SERVER: OptionCode = OptionCode(6);
    pub const LOG_SERVER: OptionCode = OptionCode(7);
    pub const HOST_NAME: OptionCode = OptionCode(12);
    pub const BOOT_FILE_SIZE: OptionCode = OptionCode(13);
    pub const DOMAIN_NAME: OptionCode = OptionCode(15);
    pub const ROOT_PATH: OptionCode = OptionCode(17);
    pub const INTERFACE_MTU: OptionCode = OptionCode(26);
    pub const BROADCAST_ADDRESS: OptionCode = OptionCode(28);
    pub const STATIC_ROUTE: OptionCode = OptionCode(33);
    pub const NTP_SERVERS: OptionCode = OptionCode(42);
    pub const VENDOR_SPECIFIC_INFORMATION: OptionCode = OptionCode(43);
    pub const REQUESTED_IP_ADDRESS: OptionCode = OptionCode(50);
    pub const IP_ADDRESS_LEASE_TIME: OptionCode = OptionCode(51);
    pub const OPTION_OVERLOAD: OptionCode = OptionCode(52);
    pub const DHCP_MESSAGE_TYPE: OptionCode = OptionCode(53);
    pub const SERVER_IDENTIFIER: OptionCode = OptionCode(54);
    pub const PARAMETER_REQUEST_LIST: OptionCode = OptionCode(55);
    pub const MESSAGE: OptionCode = OptionCode(56);
    pub const MAXIMUM_DHCP_MESSAGE_SIZE: OptionCode = OptionCode(57);
    pub const RENEW_TIME_VALUE: OptionCode = OptionCode(58);
    pub const REBINDING_TIME_VALUE: OptionCode = OptionCode(59);
    pub const CLASS_IDENTIFIER: OptionCode = OptionCode(60);
    pub const CLIENT_IDENTIFIER: OptionCode = OptionCode(61);
    pub const TFTP_SERVER_NAME: OptionCode = OptionCode(66);
    pub const BOOTFILE_NAME: OptionCode = OptionCode(67);
    pub const USER_CLASS_INFORMATION: OptionCode = OptionCode(77);
    pub const CLIENT_SYSTEM_ARCHITECTURE_TYPE: OptionCode = OptionCode(93);
    pub const CLIENT_NETWORK_INTERFACE_IDENTIFIER: OptionCode = OptionCode(94);
    pub const CLIENT_MACHINE_IDENTIFIER: OptionCode = OptionCode(97);
    pub const DOMAIN_SEARCH: OptionCode = OptionCode(119);
    pub const RAPID_COMMIT: OptionCode = OptionCode(80);
    pub const CLASSLESS_STATIC_ROUTE: OptionCode = OptionCode(121);
    pub const RELAY_AGENT_INFORMATION: OptionCode = OptionCode(82);
    pub const END: OptionCode = OptionCode(255);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::PAD => "Pad",
            Self::SUBNET_MASK => "Subnet Mask",
            Self::TIME_OFFSET => "Time Offset",
            Self::ROUTER => "Router",
            Self::TIME_SERVER => "Time Server",
            Self::NAME_SERVER => "Name Server",
            Self::DOMAIN_NAME_SERVER => "Domain Name Server",
            Self::LOG_SERVER => "Log Server",
            Self::HOST_NAME => "Host Name",
            Self::BOOT_FILE_SIZE => "Boot File Size",
            Self::DOMAIN_NAME => "Domain Name",
            Self::ROOT_PATH => "Root Path",
            Self::INTERFACE_MTU => "Interface MTU",
            Self::BROADCAST_ADDRESS => "Broadcast Address",
            Self::STATIC_ROUTE => "Static Routing Table",
            Self::NTP_SERVERS => "NTP Servers",
            Self::VENDOR_SPECIFIC_INFORMATION => "Vendor Specific Information",
            Self::REQUESTED_IP_ADDRESS => "Requested IP Address",
            Self::IP_ADDRESS_LEASE_TIME => "IP Addresses Lease Time",
            Self::OPTION_OVERLOAD => "Option Overload",
            Self::DHCP_MESSAGE_TYPE => "DHCP Message Type",
            Self::SERVER_IDENTIFIER => "Server Identifier",
            Self::PARAMETER_REQUEST_LIST => "Parameter Request List",
            Self::MESSAGE => "Message",
            Self::MAXIMUM_DHCP_MESSAGE_SIZE => "Maximum DHCP Message Size",
            Self::RENEW_TIME_VALUE => "Renew Time Value",
            Self::REBINDING_TIME_VALUE => "Rebinding Time Value",
            Self::CLASS_IDENTIFIER => "Class Identifier",
            Self::CLIENT_IDENTIFIER => "Client identifier",
            Self::TFTP_SERVER_NAME => "TFTP Server Name",
            Self::BOOTFILE_NAME => "Bootfile Name",
            Self::USER_CLASS_INFORMATION => "User Class Information",
            Self::CLIENT_SYSTEM_ARCHITECTURE_TYPE => "Client System Architecture Type",
            Self::CLIENT_NETWORK_INTERFACE_IDENTIFIER => "Client Network Interface Identifier",
            Self::CLIENT_MACHINE_IDENTIFIER => "Client Machine Identifier",
            Self::DOMAIN_SEARCH => "DNS Domain Search List",
            Self::RAPID_COMMIT => "Rapid Commit",
            Self::CLASSLESS_STATIC_ROUTE => "Classless Static Route",
            Self::RELAY_AGENT_INFORMATION => "Relay Agent Information",
            Self::END => "End",
            _ => return None,
        })
    }
}

impl From<u8> for OptionCode {
    fn from(code: u8) -> Self {
        OptionCode(code)
    }
}

impl fmt::Display for OptionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None => write!(f, "unknown ({})", self.0),
        }
    }
}
