//! DHCPv6 enumerations (RFC 8415 Section 7.3, Section 21)

use std::fmt;

/// DHCPv6 message type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageType {
    /// Not on the wire; marks an unset type
    None,
    Solicit,
    Advertise,
    Request,
    Confirm,
    Renew,
    Rebind,
    Reply,
    Release,
    Decline,
    Reconfigure,
    InformationRequest,
    RelayForward,
    RelayReply,
    LeaseQuery,
    LeaseQueryReply,
    LeaseQueryDone,
    LeaseQueryData,
    Unknown(u8),
}

impl MessageType {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0 => MessageType::None,
            1 => MessageType::Solicit,
            2 => MessageType::Advertise,
            3 => MessageType::Request,
            4 => MessageType::Confirm,
            5 => MessageType::Renew,
            6 => MessageType::Rebind,
            7 => MessageType::Reply,
            8 => MessageType::Release,
            9 => MessageType::Decline,
            10 => MessageType::Reconfigure,
            11 => MessageType::InformationRequest,
            12 => MessageType::RelayForward,
            13 => MessageType::RelayReply,
            14 => MessageType::LeaseQuery,
            15 => MessageType::LeaseQueryReply,
            16 => MessageType::LeaseQueryDone,
            17 => MessageType::LeaseQueryData,
            other => MessageType::Unknown(other),
        }
    }

    pub fn to_u8(self) -> u8 {
        match self {
            MessageType::None => 0,
            MessageType::Solicit => 1,
            MessageType::Advertise => 2,
            MessageType::Request => 3,
            MessageType::Confirm => 4,
            MessageType::Renew => 5,
            MessageType::Rebind => 6,
            MessageType::Reply => 7,
            MessageType::Release => 8,
            MessageType::Decline => 9,
            MessageType::Reconfigure => 10,
            MessageType::InformationRequest => 11,
            MessageType::RelayForward => 12,
            MessageType::RelayReply => 13,
            MessageType::LeaseQuery => 14,
            MessageType::LeaseQueryReply => 15,
            MessageType::LeaseQueryDone => 16,
            MessageType::LeaseQueryData => 17,
            MessageType::Unknown(v) => v,
        }
    }

    pub fn is_relay(self) -> bool {
        matches!(self, MessageType::RelayForward | MessageType::RelayReply)
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageType::None => "NONE",
            MessageType::Solicit => "SOLICIT",
            MessageType::Advertise => "ADVERTISE",
            MessageType::Request => "REQUEST",
            MessageType::Confirm => "CONFIRM",
            MessageType::Renew => "RENEW",
            MessageType::Rebind => "REBIND",
            MessageType::Reply => "REPLY",
            MessageType::Release => "RELEASE",
            MessageType::Decline => "DECLINE",
            MessageType::Reconfigure => "RECONFIGURE",
            MessageType::InformationRequest => "INFORMATION-REQUEST",
            MessageType::RelayForward => "RELAY-FORW",
            MessageType::RelayReply => "RELAY-REPL",
            MessageType::LeaseQuery => "LEASEQUERY",
            MessageType::LeaseQueryReply => "LEASEQUERY-REPLY",
            MessageType::LeaseQueryDone => "LEASEQUERY-DONE",
            MessageType::LeaseQueryData => "LEASEQUERY-DATA",
            MessageType::Unknown(v) => return write!(f, "unknown ({v})"),
        };
        f.write_str(name)
    }
}

/// DHCPv6 option code
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OptionCode(pub u16);

impl OptionCode {
    pub const CLIENT_ID: OptionCode = OptionCode(1);
    pub const SERVER_ID: OptionCode = OptionCode(2);
    pub const IA_NA: OptionCode = OptionCode(3);
    pub const IA_TA: OptionCode = OptionCode(4);
    pub const IA_ADDR: OptionCode = OptionCode(5);
    pub const ORO: OptionCode = OptionCode(6);
    pub const PREFERENCE: OptionCode = OptionCode(7);
    pub const ELAPSED_TIME: OptionCode = OptionCode(8);
    pub const RELAY_MSG: OptionCode = OptionCode(9);
    pub const AUTH: OptionCode = OptionCode(11);
    pub const UNICAST: OptionCode = OptionCode(12);
    pub const STATUS_CODE: OptionCode = OptionCode(13);
    pub const RAPID_COMMIT: OptionCode = OptionCode(14);
    pub const USER_CLASS: OptionCode = OptionCode(15);
    pub const VENDOR_CLASS: OptionCode = OptionCode(16);
    pub const VENDOR_OPTS: OptionCode = OptionCode(17);
    pub const INTERFACE_ID: OptionCode = OptionCode(18);
    pub const RECONF_MSG: OptionCode = OptionCode(19);
    pub const RECONF_ACCEPT: OptionCode = OptionCode(20);
    pub const DNS_RECURSIVE_NAME_SERVER: OptionCode = OptionCode(23);
    pub const DOMAIN_SEARCH_LIST: OptionCode = OptionCode(24);
    pub const IA_PD: OptionCode = OptionCode(25);
    pub const IA_PREFIX: OptionCode = OptionCode(26);
    pub const SNTP_SERVER_LIST: OptionCode = OptionCode(31);
    pub const INFORMATION_REFRESH_TIME: OptionCode = OptionCode(32);
    pub const REMOTE_ID: OptionCode = OptionCode(37);
    pub const FQDN: OptionCode = OptionCode(39);
    pub const NTP_SERVER: OptionCode = OptionCode(56);
    pub const BOOTFILE_URL: OptionCode = OptionCode(59);
    pub const BOOTFILE_PARAM: OptionCode = OptionCode(60);
    pub const CLIENT_ARCH_TYPE: OptionCode = OptionCode(61);
    pub const NII: OptionCode = OptionCode(62);
    pub const SOL_MAX_RT: OptionCode = OptionCode(82);
    pub const INF_MAX_RT: OptionCode = OptionCode(83);

    pub fn name(self) -> Option<&'static str> {
        Some(match self {
            Self::CLIENT_ID => "OPTION_CLIENTID",
            Self::SERVER_ID => "OPTION_SERVERID",
            Self::IA_NA => "OPTION_IA_NA",
            Self::IA_TA => "OPTION_IA_TA",
            Self::IA_ADDR => "OPTION_IAADDR",
            Self::ORO => "OPTION_ORO",
            Self::PREFERENCE => "OPTION_PREFERENCE",
            Self::ELAPSED_TIME => "OPTION_ELAPSED_TIME",
            Self::RELAY_MSG => "OPTION_RELAY_MSG",
            Self::AUTH => "OPTION_AUTH",
            Self::UNICAST => "OPTION_UNICAST",
            Self::STATUS_CODE => "OPTION_STATUS_CODE",
            Self::RAPID_COMMIT => "OPTION_RAPID_COMMIT",
            Self::USER_CLASS => "OPTION_USER_CLASS",
            Self::VENDOR_CLASS => "OPTION_VENDOR_CLASS",
            Self::VENDOR_OPTS => "OPTION_VENDOR_OPTS",
            Self::INTERFACE_ID => "OPTION_INTERFACE_ID",
            Self::RECONF_MSG => "OPTION_RECONF_MSG",
            Self::RECONF_ACCEPT => "OPTION_RECONF_ACCEPT",
            Self::DNS_RECURSIVE_NAME_SERVER => "DNS Recursive Name Server",
            Self::DOMAIN_SEARCH_LIST => "Domain Search List",
            Self::IA_PD => "OPTION_IA_PD",
            Self::IA_PREFIX => "OPTION_IAPREFIX",
            Self::SNTP_SERVER_LIST => "SNTP Server List",
            Self::INFORMATION_REFRESH_TIME => "Information Refresh Time",
            Self::REMOTE_ID => "OPTION_REMOTE_ID",
            Self::FQDN => "FQDN",
            Self::NTP_SERVER => "OPTION_NTP_SERVER",
            Self::BOOTFILE_URL => "OPT_BOOTFILE_URL",
            Self::BOOTFILE_PARAM => "OPT_BOOTFILE_PARAM",
            Self::CLIENT_ARCH_TYPE => "OPTION_CLIENT_ARCH_TYPE",
            Self::NII => "OPTION_NII",
            Self::SOL_MAX_RT => "OPTION_SOL_MAX_RT",
            Self::INF_MAX_RT => "OPTION_INF_MAX_RT",
            _ => return None,
        })
    }
}

impl From<u16> for OptionCode {
    fn from(code: u16) -> Self {
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

/// Status codes (RFC 8415 Section 21.13)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Success,
    UnspecFail,
    NoAddrsAvail,
    NoBinding,
    NotOnLink,
    UseMulticast,
    NoPrefixAvail,
    Other(u16),
}

impl StatusCode {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => StatusCode::Success,
            1 => StatusCode::UnspecFail,
            2 => StatusCode::NoAddrsAvail,
            3 => StatusCode::NoBinding,
            4 => StatusCode::NotOnLink,
            5 => StatusCode::UseMulticast,
            6 => StatusCode::NoPrefixAvail,
            other => StatusCode::Other(other),
        }
    }

    pub fn to_u16(self) -> u16 {
        match self {
            StatusCode::Success => 0,
            StatusCode::UnspecFail => 1,
            StatusCode::NoAddrsAvail => 2,
            StatusCode::NoBinding => 3,
            StatusCode::NotOnLink => 4,
            StatusCode::UseMulticast => 5,
            StatusCode::NoPrefixAvail => 6,
            StatusCode::Other(v) => v,
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusCode::Other(v) => write!(f, "Unknown({v})"),
            known => write!(f, "{:?}", known),
        }
    }
}

/// Client system architecture type (RFC 4578 Section 2.1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ArchType(pub u16);

impl ArchType {
    pub const INTEL_X86PC: ArchType = ArchType(0);
    pub const NEC_PC98: ArchType = ArchType(1);
    pub const EFI_ITANIUM: ArchType = ArchType(2);
    pub const DEC_ALPHA: ArchType = ArchType(3);
    pub const ARC_X86: ArchType = ArchType(4);
    pub const INTEL_LEAN_CLIENT: ArchType = ArchType(5);
    pub const EFI_IA32: ArchType = ArchType(6);
    pub const EFI_BC: ArchType = ArchType(7);
    pub const EFI_XSCALE: ArchType = ArchType(8);
    pub const EFI_X86_64: ArchType = ArchType(9);
}

impl fmt::Display for ArchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match *self {
            Self::INTEL_X86PC => "Intel x86PC",
            Self::NEC_PC98 => "NEC/PC98",
            Self::EFI_ITANIUM => "EFI Itanium",
            Self::DEC_ALPHA => "DEC Alpha",
            Self::ARC_X86 => "Arc x86",
            Self::INTEL_LEAN_CLIENT => "Intel Lean Client",
            Self::EFI_IA32 => "EFI IA32",
            Self::EFI_BC => "EFI BC",
            Self::EFI_XSCALE => "EFI Xscale",
            Self::EFI_X86_64 => "EFI x86-64",
            ArchType(other) => return write!(f, "unknown ({other})"),
        };
        f.write_str(name)
    }
}
