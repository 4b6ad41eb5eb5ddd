//! DHCP client exchanges.
//!
//! [`Client4`] and [`Client6`] each own a socket and one background receive
//! task. Every request registers a channel keyed by its transaction ID; the
//! receive task decodes inbound datagrams and forwards each to the channel
//! waiting for it. Unanswered requests are retransmitted with a doubling
//! timeout until the retry budget runs out, which ends in
//! [`Error::NoResponse`](crate::Error::NoResponse).

mod exchange;
pub mod v4;
pub mod v6;

pub use exchange::Matcher;
pub use v4::{Client4, ExchangeState, Lease};
pub use v6::Client6;
