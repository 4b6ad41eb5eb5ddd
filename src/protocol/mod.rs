//! DHCP wire formats
//!
//! Both codecs are implemented from scratch on top of a small bounds-checked
//! byte cursor.

pub mod buffer;
pub mod dhcpv4;
pub mod dhcpv6;
pub mod labels;
pub mod types;

pub use types::*;
