//! Ruster DHCP - DHCPv4/DHCPv6 codec and client
//!
//! Byte-exact encoders and decoders for DHCPv4 (RFC 2131/2132) and DHCPv6
//! (RFC 8415) messages and options, plus an async client that runs the
//! lease exchanges over UDP with per-transaction dispatch and retransmission.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod telemetry;
pub mod transport;

pub use error::{Error, Result};
