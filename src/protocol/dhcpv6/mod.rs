//! DHCPv6 (RFC 8415)
//!
//! Client/server messages are `{type, transaction-id[3], options}`; relay
//! messages carry hop count, link and peer addresses, and wrap the relayed
//! message in a Relay-Message option.

mod duid;
mod ia;
mod message;
mod modifiers;
pub mod option;
mod options;
mod types;

pub use duid::*;
pub use ia::{IaAddress, IaNa, IaPd, IaPrefix, StatusCodeOption};
pub use message::*;
pub use modifiers::*;
pub use option::{parse_option, DhcpOption, MAX_OPTION_NESTING};
pub use options::Options;
pub use types::{ArchType, MessageType, OptionCode, StatusCode};

use std::net::Ipv6Addr;

/// Client listen port
pub const DHCPV6_CLIENT_PORT: u16 = 546;

/// Server and relay agent listen port
pub const DHCPV6_SERVER_PORT: u16 = 547;

/// ff02::1:2, link-scoped
pub const ALL_DHCP_RELAY_AGENTS_AND_SERVERS: Ipv6Addr = Ipv6Addr::new(0xff02, 0, 0, 0, 0, 0, 1, 2);

/// ff05::1:3, site-scoped
pub const ALL_DHCP_SERVERS: Ipv6Addr = Ipv6Addr::new(0xff05, 0, 0, 0, 0, 0, 1, 3);

/// Most relay layers accepted while decoding or walking a message
pub const MAX_RELAY_DEPTH: usize = 255;
