//! DHCPv6 client/server and relay messages (RFC 8415 Sections 8 and 9)

use super::duid::Duid;
use super::ia::{IaNa, StatusCodeOption};
use super::modifiers::Modifier;
use super::option::DhcpOption;
use super::options::Options;
use super::types::{MessageType, OptionCode};
use super::MAX_RELAY_DEPTH;
use crate::protocol::buffer::Reader;
use crate::protocol::MacAddr;
use crate::{Error, Result};
use rand::RngCore;
use std::fmt;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Type byte plus transaction ID
const MESSAGE_HEADER_SIZE: usize = 4;

/// Type, hop count, link and peer addresses
const RELAY_HEADER_SIZE: usize = 34;

/// IAID used when the caller does not pick one
pub const DEFAULT_IAID: [u8; 4] = [0xfa, 0xce, 0xb0, 0x0c];

/// 3-byte transaction ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TransactionId(pub [u8; 3]);

impl TransactionId {
    pub fn generate() -> Result<Self> {
        let mut xid = [0u8; 3];
        rand::rngs::OsRng
            .try_fill_bytes(&mut xid)
            .map_err(|e| Error::Random(e.to_string()))?;
        Ok(TransactionId(xid))
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

/// A client/server message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub message_type: MessageType,
    pub transaction_id: TransactionId,
    pub options: Options,
}

/// A Relay-Forward or Relay-Reply message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayMessage {
    pub message_type: MessageType,
    pub hop_count: u8,
    pub link_addr: Ipv6Addr,
    pub peer_addr: Ipv6Addr,
    pub options: Options,
}

/// Either kind of DHCPv6 message, as found on the wire
#[derive(Debug, Clone)]
pub enum Dhcpv6 {
    Message(Message),
    Relay(RelayMessage),
}

impl Dhcpv6 {
    /// Parses a message, descending into nested Relay-Message options.
    ///
    /// Relay layers are read in a loop, outermost first, and then folded
    /// around the innermost message; at most [`MAX_RELAY_DEPTH`] are accepted.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let mut layers: Vec<(RelayMessage, usize)> = Vec::new();
        let mut data = data;

        let innermost = loop {
            let mut r = Reader::new(data, "DHCPv6 message");
            let message_type = MessageType::from_u8(r.u8()?);

            if !message_type.is_relay() {
                if data.len() < MESSAGE_HEADER_SIZE {
                    return Err(Error::Parse(format!(
                        "DHCPv6 message too short: {} bytes",
                        data.len()
                    )));
                }
                break Dhcpv6::Message(Message {
                    message_type,
                    transaction_id: TransactionId(r.array()?),
                    options: Options::decode(r.rest(), 0)?,
                });
            }

            if layers.len() >= MAX_RELAY_DEPTH {
                return Err(Error::InvalidPacket(format!(
                    "relay nesting exceeds {} layers",
                    MAX_RELAY_DEPTH
                )));
            }
            if data.len() < RELAY_HEADER_SIZE {
                return Err(Error::Parse(format!(
                    "relay message too short: {} bytes",
                    data.len()
                )));
            }
            let hop_count = r.u8()?;
            let link_addr = r.ipv6()?;
            let peer_addr = r.ipv6()?;
            let (options, relayed) = Options::decode_relay(r.rest())?;
            let relay = RelayMessage {
                message_type,
                hop_count,
                link_addr,
                peer_addr,
                options,
            };
            match relayed {
                Some((slot, inner)) => {
                    layers.push((relay, slot));
                    data = inner;
                }
                None => break Dhcpv6::Relay(relay),
            }
        };

        Ok(layers
            .into_iter()
            .rev()
            .fold(innermost, |inner, (mut relay, slot)| {
                relay.options.insert(slot, DhcpOption::RelayMsg(Box::new(inner)));
                Dhcpv6::Relay(relay)
            }))
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Dhcpv6::Message(m) => m.to_bytes(),
            Dhcpv6::Relay(r) => r.to_bytes(),
        }
    }

    pub fn message_type(&self) -> MessageType {
        match self {
            Dhcpv6::Message(m) => m.message_type,
            Dhcpv6::Relay(r) => r.message_type,
        }
    }

    pub fn is_relay(&self) -> bool {
        matches!(self, Dhcpv6::Relay(_))
    }

    pub fn options(&self) -> &Options {
        match self {
            Dhcpv6::Message(m) => &m.options,
            Dhcpv6::Relay(r) => &r.options,
        }
    }

    /// Walks Relay-Message options down to the client/server message.
    pub fn inner_message(&self) -> Result<&Message> {
        let mut current = self;
        for _ in 0..=MAX_RELAY_DEPTH {
            match current {
                Dhcpv6::Message(m) => return Ok(m),
                Dhcpv6::Relay(r) => current = r.relay_message()?,
            }
        }
        Err(Error::InvalidPacket(format!(
            "relay nesting exceeds {} layers",
            MAX_RELAY_DEPTH
        )))
    }

    /// Transaction ID of the innermost message.
    pub fn transaction_id(&self) -> Result<TransactionId> {
        Ok(self.inner_message()?.transaction_id)
    }

    pub fn summary(&self) -> String {
        match self {
            Dhcpv6::Message(m) => m.summary(),
            Dhcpv6::Relay(r) => r.summary(),
        }
    }
}

// Compares relay chains with a work list instead of recursing per layer.
impl PartialEq for Dhcpv6 {
    fn eq(&self, other: &Self) -> bool {
        let mut pending = vec![(self, other)];
        while let Some(pair) = pending.pop() {
            let (a, b) = match pair {
                (Dhcpv6::Message(a), Dhcpv6::Message(b)) => {
                    if a.message_type != b.message_type || a.transaction_id != b.transaction_id {
                        return false;
                    }
                    (&a.options, &b.options)
                }
                (Dhcpv6::Relay(a), Dhcpv6::Relay(b)) => {
                    if a.message_type != b.message_type
                        || a.hop_count != b.hop_count
                        || a.link_addr != b.link_addr
                        || a.peer_addr != b.peer_addr
                    {
                        return false;
                    }
                    (&a.options, &b.options)
                }
                _ => return false,
            };
            if a.len() != b.len() {
                return false;
            }
            for (x, y) in a.iter().zip(b.iter()) {
                match (x, y) {
                    (DhcpOption::RelayMsg(x), DhcpOption::RelayMsg(y)) => pending.push((&**x, &**y)),
                    _ if x != y => return false,
                    _ => {}
                }
            }
        }
        true
    }
}

impl Eq for Dhcpv6 {}

impl From<Message> for Dhcpv6 {
    fn from(m: Message) -> Self {
        Dhcpv6::Message(m)
    }
}

impl From<RelayMessage> for Dhcpv6 {
    fn from(r: RelayMessage) -> Self {
        Dhcpv6::Relay(r)
    }
}

impl fmt::Display for Dhcpv6 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dhcpv6::Message(m) => write!(f, "{m}"),
            Dhcpv6::Relay(r) => write!(f, "{r}"),
        }
    }
}

impl Message {
    /// Creates a SOLICIT with a random transaction ID and no options.
    pub fn new(modifiers: &[Modifier]) -> Result<Self> {
        let mut msg = Message {
            message_type: MessageType::Solicit,
            transaction_id: TransactionId::generate()?,
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

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![self.message_type.to_u8()];
        buf.extend_from_slice(&self.transaction_id.0);
        self.options.marshal(&mut buf);
        buf
    }

    pub fn add_option(&mut self, opt: DhcpOption) {
        self.options.add(opt);
    }

    pub fn update_option(&mut self, opt: DhcpOption) {
        self.options.update(opt);
    }

    pub fn get_option(&self, code: OptionCode) -> Vec<&DhcpOption> {
        self.options.get(code)
    }

    pub fn get_one_option(&self, code: OptionCode) -> Option<&DhcpOption> {
        self.options.get_one(code)
    }

    pub fn client_id(&self) -> Option<&Duid> {
        match self.get_one_option(OptionCode::CLIENT_ID) {
            Some(DhcpOption::ClientId(duid)) => Some(duid),
            _ => None,
        }
    }

    pub fn server_id(&self) -> Option<&Duid> {
        match self.get_one_option(OptionCode::SERVER_ID) {
            Some(DhcpOption::ServerId(duid)) => Some(duid),
            _ => None,
        }
    }

    pub fn ia_na(&self) -> Option<&IaNa> {
        match self.get_one_option(OptionCode::IA_NA) {
            Some(DhcpOption::IaNa(ia)) => Some(ia),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&StatusCodeOption> {
        match self.get_one_option(OptionCode::STATUS_CODE) {
            Some(DhcpOption::StatusCode(status)) => Some(status),
            _ => None,
        }
    }

    pub fn preference(&self) -> Option<u8> {
        match self.get_one_option(OptionCode::PREFERENCE) {
            Some(DhcpOption::Preference(p)) => Some(*p),
            _ => None,
        }
    }

    pub fn elapsed_time(&self) -> Option<Duration> {
        match self.get_one_option(OptionCode::ELAPSED_TIME) {
            Some(DhcpOption::ElapsedTime(d)) => Some(*d),
            _ => None,
        }
    }

    pub fn dns(&self) -> Vec<Ipv6Addr> {
        match self.get_one_option(OptionCode::DNS_RECURSIVE_NAME_SERVER) {
            Some(DhcpOption::DnsServers(servers)) => servers.clone(),
            _ => Vec::new(),
        }
    }

    pub fn domain_search(&self) -> Vec<String> {
        match self.get_one_option(OptionCode::DOMAIN_SEARCH_LIST) {
            Some(DhcpOption::DomainSearchList(domains)) => domains.clone(),
            _ => Vec::new(),
        }
    }

    pub fn bootfile_url(&self) -> Option<&str> {
        match self.get_one_option(OptionCode::BOOTFILE_URL) {
            Some(DhcpOption::BootfileUrl(url)) => Some(url),
            _ => None,
        }
    }

    /// Codes listed across every ORO in the message.
    pub fn requested_options(&self) -> Vec<OptionCode> {
        self.get_option(OptionCode::ORO)
            .into_iter()
            .flat_map(|o| match o {
                DhcpOption::Oro(codes) => codes.clone(),
                _ => Vec::new(),
            })
            .collect()
    }

    pub fn is_option_requested(&self, code: OptionCode) -> bool {
        self.requested_options().contains(&code)
    }

    pub fn has_rapid_commit(&self) -> bool {
        self.options.has(OptionCode::RAPID_COMMIT)
    }

    /// True if the client asks for, or the server hands out, a boot file URL.
    pub fn is_netboot(&self) -> bool {
        self.is_option_requested(OptionCode::BOOTFILE_URL)
            || self.options.has(OptionCode::BOOTFILE_URL)
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "Message\n  messageType={}\n  transactionid={}\n  options=[",
            self.message_type, self.transaction_id
        );
        if !self.options.is_empty() {
            out.push('\n');
            out.push_str(&self.options.to_string());
        }
        out.push_str("  ]\n");
        out
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Message(messageType={} transactionID={}, {} options)",
            self.message_type,
            self.transaction_id,
            self.options.len()
        )
    }
}

impl RelayMessage {
    /// Encodes the relay chain innermost layer first, so nesting depth
    /// does not grow the stack.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut chain = vec![self];
        let mut current = self;
        let mut payload = loop {
            match current.options.first_relayed() {
                Some(Dhcpv6::Relay(next)) => {
                    chain.push(next);
                    current = next;
                }
                Some(Dhcpv6::Message(m)) => break Some(m.to_bytes()),
                None => break None,
            }
        };

        while let Some(relay) = chain.pop() {
            let mut buf = vec![relay.message_type.to_u8(), relay.hop_count];
            buf.extend_from_slice(&relay.link_addr.octets());
            buf.extend_from_slice(&relay.peer_addr.octets());
            relay.options.marshal_relayed(&mut buf, payload.as_deref());
            payload = Some(buf);
        }
        payload.unwrap_or_default()
    }

    /// The message carried in the Relay-Message option.
    pub fn relay_message(&self) -> Result<&Dhcpv6> {
        match self.options.get_one(OptionCode::RELAY_MSG) {
            Some(DhcpOption::RelayMsg(inner)) => Ok(inner),
            _ => Err(Error::MissingOption("Relay Message")),
        }
    }

    pub fn interface_id(&self) -> Option<&[u8]> {
        match self.options.get_one(OptionCode::INTERFACE_ID) {
            Some(DhcpOption::InterfaceId(id)) => Some(id),
            _ => None,
        }
    }

    pub fn summary(&self) -> String {
        let mut out = format!(
            "RelayMessage\n  messageType={}\n  hopcount={}\n  linkaddr={}\n  peeraddr={}\n  options=[",
            self.message_type, self.hop_count, self.link_addr, self.peer_addr
        );
        if !self.options.is_empty() {
            out.push('\n');
            out.push_str(&self.options.to_string());
        }
        out.push_str("  ]\n");
        out
    }
}

// Unlinks nested layers one at a time; the derived drop would recurse
// once per relay layer.
impl Drop for RelayMessage {
    fn drop(&mut self) {
        let mut pending = self.options.take_relayed();
        while let Some(inner) = pending.pop() {
            if let Dhcpv6::Relay(mut relay) = *inner {
                pending.append(&mut relay.options.take_relayed());
            }
        }
    }
}

impl fmt::Display for RelayMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RelayMessage(messageType={} hopcount={}, linkaddr={}, peeraddr={}, {} options)",
            self.message_type,
            self.hop_count,
            self.link_addr,
            self.peer_addr,
            self.options.len()
        )
    }
}

/// Wraps `inner` in a new relay layer.
///
/// The hop count is one more than the inner relay's, or zero when `inner`
/// is a client/server message.
pub fn encapsulate_relay(
    inner: impl Into<Dhcpv6>,
    message_type: MessageType,
    link_addr: Ipv6Addr,
    peer_addr: Ipv6Addr,
) -> Result<RelayMessage> {
    if !message_type.is_relay() {
        return Err(Error::Protocol(format!(
            "cannot encapsulate in a {} message",
            message_type
        )));
    }
    let inner = inner.into();
    let hop_count = match &inner {
        Dhcpv6::Relay(r) => r.hop_count.checked_add(1).ok_or_else(|| {
            Error::Protocol(format!("relay nesting exceeds {} layers", MAX_RELAY_DEPTH))
        })?,
        Dhcpv6::Message(_) => 0,
    };
    let mut options = Options::new();
    options.add(DhcpOption::RelayMsg(Box::new(inner)));
    Ok(RelayMessage {
        message_type,
        hop_count,
        link_addr,
        peer_addr,
        options,
    })
}

/// Strips one relay layer.
pub fn decapsulate_relay(msg: &Dhcpv6) -> Result<&Dhcpv6> {
    match msg {
        Dhcpv6::Relay(r) => r.relay_message(),
        Dhcpv6::Message(m) => Err(Error::Protocol(format!(
            "{} is not a relay message",
            m.message_type
        ))),
    }
}

/// Strips `index + 1` relay layers. An index of -1 returns the innermost
/// relay layer instead.
pub fn decapsulate_relay_index(msg: &Dhcpv6, index: isize) -> Result<&Dhcpv6> {
    if index < -1 {
        return Err(Error::Protocol(format!("invalid relay index {}", index)));
    }

    let mut current = msg;
    if index == -1 {
        for _ in 0..MAX_RELAY_DEPTH {
            let next = decapsulate_relay(current)?;
            if !next.is_relay() {
                return Ok(current);
            }
            current = next;
        }
        return Err(Error::InvalidPacket(format!(
            "relay nesting exceeds {} layers",
            MAX_RELAY_DEPTH
        )));
    }

    for _ in 0..=index {
        current = decapsulate_relay(current)?;
    }
    Ok(current)
}

/// Builds a SOLICIT with a DUID-LLT derived from `hw_addr`.
pub fn new_solicit(hw_addr: MacAddr, modifiers: &[Modifier]) -> Result<Message> {
    new_solicit_with_cid(Duid::llt_from_mac(&hw_addr), modifiers)
}

/// Builds a SOLICIT asking for DNS and domain search, with one IA_NA.
pub fn new_solicit_with_cid(duid: Duid, modifiers: &[Modifier]) -> Result<Message> {
    let mut msg = Message::new(&[])?;
    msg.add_option(DhcpOption::ClientId(duid));
    msg.add_option(DhcpOption::Oro(vec![
        OptionCode::DNS_RECURSIVE_NAME_SERVER,
        OptionCode::DOMAIN_SEARCH_LIST,
    ]));
    msg.add_option(DhcpOption::ElapsedTime(Duration::ZERO));
    msg.add_option(DhcpOption::IaNa(IaNa::new(
        DEFAULT_IAID,
        Duration::from_secs(3600),
        Duration::from_secs(5400),
    )));
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds the ADVERTISE answering `solicit`.
pub fn new_advertise_from_solicit(solicit: &Message, modifiers: &[Modifier]) -> Result<Message> {
    if solicit.message_type != MessageType::Solicit {
        return Err(Error::Protocol(format!(
            "cannot build ADVERTISE from {}",
            solicit.message_type
        )));
    }
    let cid = solicit
        .get_one_option(OptionCode::CLIENT_ID)
        .ok_or(Error::MissingOption("Client ID"))?;

    let mut msg = Message {
        message_type: MessageType::Advertise,
        transaction_id: solicit.transaction_id,
        options: Options::new(),
    };
    msg.add_option(cid.clone());
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds the REQUEST answering `advertise`.
///
/// Client ID, Server ID and IA_NA are copied and must be present. A Vendor
/// Class in the advertise is copied too.
pub fn new_request_from_advertise(advertise: &Message, modifiers: &[Modifier]) -> Result<Message> {
    if advertise.message_type != MessageType::Advertise {
        return Err(Error::Protocol(format!(
            "cannot build REQUEST from {}",
            advertise.message_type
        )));
    }
    let cid = advertise
        .get_one_option(OptionCode::CLIENT_ID)
        .ok_or(Error::MissingOption("Client ID"))?;
    let sid = advertise
        .get_one_option(OptionCode::SERVER_ID)
        .ok_or(Error::MissingOption("Server ID"))?;
    let ia_na = advertise
        .get_one_option(OptionCode::IA_NA)
        .ok_or(Error::MissingOption("IA_NA"))?;

    let mut msg = Message {
        message_type: MessageType::Request,
        transaction_id: advertise.transaction_id,
        options: Options::new(),
    };
    msg.add_option(cid.clone());
    msg.add_option(sid.clone());
    msg.add_option(DhcpOption::ElapsedTime(Duration::ZERO));
    msg.add_option(ia_na.clone());
    msg.add_option(DhcpOption::Oro(vec![
        OptionCode::DNS_RECURSIVE_NAME_SERVER,
        OptionCode::DOMAIN_SEARCH_LIST,
    ]));
    if let Some(vendor_class) = advertise.get_one_option(OptionCode::VENDOR_CLASS) {
        msg.add_option(vendor_class.clone());
    }
    msg.apply(modifiers);
    Ok(msg)
}

/// Builds the REPLY to a REQUEST, CONFIRM, RENEW, REBIND, RELEASE or
/// INFORMATION-REQUEST, or to a SOLICIT carrying Rapid Commit.
pub fn new_reply_from_message(msg: &Message, modifiers: &[Modifier]) -> Result<Message> {
    match msg.message_type {
        MessageType::Request
        | MessageType::Confirm
        | MessageType::Renew
        | MessageType::Rebind
        | MessageType::Release
        | MessageType::InformationRequest => {}
        MessageType::Solicit if msg.has_rapid_commit() => {}
        other => {
            return Err(Error::Protocol(format!("cannot build REPLY from {}", other)));
        }
    }
    let cid = msg
        .get_one_option(OptionCode::CLIENT_ID)
        .ok_or(Error::MissingOption("Client ID"))?;

    let mut reply = Message {
        message_type: MessageType::Reply,
        transaction_id: msg.transaction_id,
        options: Options::new(),
    };
    reply.add_option(cid.clone());
    reply.apply(modifiers);
    Ok(reply)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dhcpv6::{with_rapid_commit, with_server_id, IaAddress};

    const MAC: MacAddr = MacAddr([0x00, 0x11, 0x22, 0x33, 0x44, 0x55]);

    fn solicit() -> Message {
        Message {
            message_type: MessageType::Solicit,
            transaction_id: TransactionId([0xab, 0xcd, 0xef]),
            options: Options::new(),
        }
    }

    #[test]
    fn test_from_bytes_invalid() {
        assert!(Dhcpv6::from_bytes(&[]).is_err());
        assert!(Dhcpv6::from_bytes(&[30]).is_err());
        assert!(Dhcpv6::from_bytes(&[12]).is_err());
        assert!(Dhcpv6::from_bytes(&[1, 0, 0]).is_err());
        // Relay header one byte short
        assert!(Dhcpv6::from_bytes(&[12; 33]).is_err());
    }

    #[test]
    fn test_from_bytes_roundtrip() {
        let data = [0x01, 0xab, 0xcd, 0xef, 0x00, 0x00, 0x00, 0x00];
        let msg = Dhcpv6::from_bytes(&data).unwrap();
        let inner = msg.inner_message().unwrap();
        assert_eq!(inner.message_type, MessageType::Solicit);
        assert_eq!(inner.transaction_id, TransactionId([0xab, 0xcd, 0xef]));
        assert_eq!(inner.options.len(), 1);
        assert_eq!(msg.to_bytes(), data);
    }

    #[test]
    fn test_transaction_id_display() {
        assert_eq!(TransactionId([0x0a, 0xcd, 0xef]).to_string(), "0x0acdef");
        let a = TransactionId::generate().unwrap();
        let b = TransactionId::generate().unwrap();
        let c = TransactionId::generate().unwrap();
        // Three identical draws would be a broken entropy source
        assert!(!(a == b && b == c));
    }

    #[test]
    fn test_new_solicit_defaults() {
        let msg = new_solicit(MAC, &[]).unwrap();
        assert_eq!(msg.message_type, MessageType::Solicit);
        assert!(matches!(msg.client_id(), Some(Duid::Llt { .. })));
        assert!(msg.is_option_requested(OptionCode::DNS_RECURSIVE_NAME_SERVER));
        assert!(msg.is_option_requested(OptionCode::DOMAIN_SEARCH_LIST));
        assert_eq!(msg.elapsed_time(), Some(Duration::ZERO));
        let ia = msg.ia_na().unwrap();
        assert_eq!(ia.iaid, DEFAULT_IAID);
        assert_eq!(ia.t1, Duration::from_secs(3600));
        assert_eq!(ia.t2, Duration::from_secs(5400));
        assert!(!msg.is_netboot());

        let parsed = Dhcpv6::from_bytes(&msg.to_bytes()).unwrap();
        assert_eq!(parsed, Dhcpv6::Message(msg));
    }

    #[test]
    fn test_advertise_requires_solicit_and_cid() {
        assert!(new_advertise_from_solicit(&solicit(), &[]).is_err());

        let mut sol = solicit();
        sol.add_option(DhcpOption::ClientId(Duid::from_mac(&MAC)));
        let adv = new_advertise_from_solicit(&sol, &[]).unwrap();
        assert_eq!(adv.message_type, MessageType::Advertise);
        assert_eq!(adv.transaction_id, sol.transaction_id);
        assert_eq!(adv.client_id(), sol.client_id());

        sol.message_type = MessageType::Request;
        assert!(new_advertise_from_solicit(&sol, &[]).is_err());
    }

    #[test]
    fn test_request_from_advertise() {
        let sol = new_solicit(MAC, &[]).unwrap();
        let server = Duid::from_mac(&MacAddr([0xaa; 6]));
        let mut adv = new_advertise_from_solicit(&sol, &[with_server_id(server.clone())]).unwrap();

        let err = new_request_from_advertise(&adv, &[]).unwrap_err();
        assert!(matches!(err, Error::MissingOption("IA_NA")));

        let mut ia = IaNa::new(DEFAULT_IAID, Duration::from_secs(10), Duration::from_secs(20));
        ia.options.add(DhcpOption::IaAddr(IaAddress::new(
            "2001:db8::5".parse().unwrap(),
            Duration::from_secs(30),
            Duration::from_secs(60),
        )));
        adv.add_option(DhcpOption::IaNa(ia.clone()));
        adv.add_option(DhcpOption::VendorClass {
            enterprise_number: 1,
            data: vec![b"v".to_vec()],
        });

        let req = new_request_from_advertise(&adv, &[]).unwrap();
        assert_eq!(req.message_type, MessageType::Request);
        assert_eq!(req.transaction_id, sol.transaction_id);
        assert_eq!(req.server_id(), Some(&server));
        assert_eq!(req.ia_na(), Some(&ia));
        assert!(req.options.has(OptionCode::VENDOR_CLASS));
        assert!(req.is_option_requested(OptionCode::DOMAIN_SEARCH_LIST));

        let mut no_sid = adv.clone();
        no_sid.options.del(OptionCode::SERVER_ID);
        assert!(matches!(
            new_request_from_advertise(&no_sid, &[]),
            Err(Error::MissingOption("Server ID"))
        ));
    }

    #[test]
    fn test_reply_from_message() {
        let mut msg = solicit();
        msg.add_option(DhcpOption::ClientId(Duid::from_mac(&MAC)));
        assert!(new_reply_from_message(&msg, &[]).is_err());

        msg.apply(&[with_rapid_commit()]);
        let reply = new_reply_from_message(&msg, &[]).unwrap();
        assert_eq!(reply.message_type, MessageType::Reply);
        assert_eq!(reply.transaction_id, msg.transaction_id);

        for t in [MessageType::Request, MessageType::Renew, MessageType::InformationRequest] {
            msg.message_type = t;
            assert!(new_reply_from_message(&msg, &[]).is_ok());
        }
        msg.message_type = MessageType::Advertise;
        assert!(new_reply_from_message(&msg, &[]).is_err());

        msg.message_type = MessageType::Request;
        msg.options.del(OptionCode::CLIENT_ID);
        assert!(new_reply_from_message(&msg, &[]).is_err());
    }

    fn three_layers() -> Dhcpv6 {
        let r1 = encapsulate_relay(
            solicit(),
            MessageType::RelayForward,
            "ff02::1".parse().unwrap(),
            "ff01::1".parse().unwrap(),
        )
        .unwrap();
        let r2 = encapsulate_relay(
            r1,
            MessageType::RelayForward,
            Ipv6Addr::LOCALHOST,
            "ff02::1".parse().unwrap(),
        )
        .unwrap();
        let r3 = encapsulate_relay(
            r2,
            MessageType::RelayForward,
            Ipv6Addr::UNSPECIFIED,
            "ff02::2".parse().unwrap(),
        )
        .unwrap();
        Dhcpv6::Relay(r3)
    }

    fn relay(d: &Dhcpv6) -> &RelayMessage {
        match d {
            Dhcpv6::Relay(r) => r,
            Dhcpv6::Message(m) => panic!("expected relay, got {m}"),
        }
    }

    #[test]
    fn test_encapsulate_hop_counts() {
        let r3 = three_layers();
        assert_eq!(relay(&r3).hop_count, 2);
        assert_eq!(relay(&r3).link_addr, Ipv6Addr::UNSPECIFIED);
        assert!(encapsulate_relay(solicit(), MessageType::Reply, Ipv6Addr::UNSPECIFIED, Ipv6Addr::UNSPECIFIED).is_err());
    }

    #[test]
    fn test_decapsulate_relay_index() {
        let r3 = three_layers();

        let first = decapsulate_relay_index(&r3, 0).unwrap();
        assert_eq!(relay(first).hop_count, 1);
        assert_eq!(relay(first).link_addr, Ipv6Addr::LOCALHOST);

        let second = decapsulate_relay_index(&r3, 1).unwrap();
        assert_eq!(relay(second).hop_count, 0);
        assert_eq!(relay(second).link_addr, "ff02::1".parse::<Ipv6Addr>().unwrap());

        let third = decapsulate_relay_index(&r3, 2).unwrap();
        assert_eq!(third, &Dhcpv6::Message(solicit()));

        let innermost_relay = decapsulate_relay_index(&r3, -1).unwrap();
        assert_eq!(relay(innermost_relay).hop_count, 0);

        assert!(decapsulate_relay_index(&r3, -2).is_err());
        assert!(decapsulate_relay_index(&r3, 3).is_err());
    }

    #[test]
    fn test_relay_wire_roundtrip() {
        let r3 = three_layers();
        let bytes = r3.to_bytes();
        assert_eq!(bytes[0], 12);
        assert_eq!(bytes[1], 2);
        let parsed = Dhcpv6::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, r3);
        assert_eq!(parsed.transaction_id().unwrap(), TransactionId([0xab, 0xcd, 0xef]));
        assert!(parsed.summary().starts_with("RelayMessage\n"));
    }

    /// `layers` Relay-Forward headers around a bare SOLICIT, built by hand.
    fn nested_relay_bytes(layers: usize) -> Vec<u8> {
        let mut bytes = vec![1, 0xab, 0xcd, 0xef];
        for _ in 0..layers {
            let mut outer = vec![12, 0];
            outer.extend_from_slice(&[0; 32]);
            outer.extend_from_slice(&OptionCode::RELAY_MSG.0.to_be_bytes());
            outer.extend_from_slice(&(bytes.len() as u16).to_be_bytes());
            outer.extend_from_slice(&bytes);
            bytes = outer;
        }
        bytes
    }

    /// Runs `f` on a thread with a 2 MiB stack.
    fn on_small_stack<F: FnOnce() + Send + 'static>(f: F) {
        std::thread::Builder::new()
            .stack_size(2 * 1024 * 1024)
            .spawn(f)
            .unwrap()
            .join()
            .unwrap();
    }

    #[test]
    fn test_relay_depth_cap() {
        on_small_stack(|| {
            let bytes = nested_relay_bytes(MAX_RELAY_DEPTH);
            let msg = Dhcpv6::from_bytes(&bytes).unwrap();
            assert_eq!(msg.transaction_id().unwrap(), TransactionId([0xab, 0xcd, 0xef]));
            let last = decapsulate_relay_index(&msg, -1).unwrap();
            assert_eq!(last.message_type(), MessageType::RelayForward);
            assert_eq!(msg.to_bytes(), bytes);

            let err = Dhcpv6::from_bytes(&nested_relay_bytes(MAX_RELAY_DEPTH + 1)).unwrap_err();
            assert!(err.is_decode());
        });
    }

    #[test]
    fn test_deep_chain_compare_and_drop() {
        on_small_stack(|| {
            let bytes = nested_relay_bytes(MAX_RELAY_DEPTH);
            let a = Dhcpv6::from_bytes(&bytes).unwrap();
            let b = Dhcpv6::from_bytes(&bytes).unwrap();
            assert!(a == b);

            // The final byte belongs to the innermost transaction ID
            let mut changed = bytes.clone();
            if let Some(last) = changed.last_mut() {
                *last = 0;
            }
            let c = Dhcpv6::from_bytes(&changed).unwrap();
            assert!(a != c);
            drop(a);
            drop(b);
            drop(c);

            let mut built: Dhcpv6 = solicit().into();
            for _ in 0..MAX_RELAY_DEPTH {
                built = encapsulate_relay(
                    built,
                    MessageType::RelayForward,
                    Ipv6Addr::UNSPECIFIED,
                    Ipv6Addr::UNSPECIFIED,
                )
                .unwrap()
                .into();
            }
            let parsed = Dhcpv6::from_bytes(&built.to_bytes()).unwrap();
            assert!(parsed == built);
        });
    }

    #[test]
    fn test_relay_msg_outside_relay_rejected() {
        let mut data = vec![1, 0xab, 0xcd, 0xef];
        data.extend_from_slice(&[0, 9, 0, 4, 1, 0xab, 0xcd, 0xef]);
        assert!(Dhcpv6::from_bytes(&data).unwrap_err().is_decode());
    }

    #[test]
    fn test_relay_option_order_preserved() {
        let mut options = Options::new();
        options.add(DhcpOption::InterfaceId(b"eth1".to_vec()));
        options.add(DhcpOption::RelayMsg(Box::new(Dhcpv6::Message(solicit()))));
        options.add(DhcpOption::RemoteId {
            enterprise_number: 9,
            remote_id: vec![1, 2],
        });
        let relay = Dhcpv6::Relay(RelayMessage {
            message_type: MessageType::RelayReply,
            hop_count: 3,
            link_addr: Ipv6Addr::LOCALHOST,
            peer_addr: Ipv6Addr::UNSPECIFIED,
            options,
        });

        let bytes = relay.to_bytes();
        let parsed = Dhcpv6::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, relay);
        let codes: Vec<u16> = parsed.options().iter().map(|o| o.code().0).collect();
        assert_eq!(codes, vec![18, 9, 37]);
        assert_eq!(parsed.to_bytes(), bytes);
    }

    #[test]
    fn test_relay_without_relay_msg() {
        let relay = Dhcpv6::Relay(RelayMessage {
            message_type: MessageType::RelayReply,
            hop_count: 0,
            link_addr: Ipv6Addr::UNSPECIFIED,
            peer_addr: Ipv6Addr::UNSPECIFIED,
            options: Options::new(),
        });
        assert!(relay.inner_message().is_err());
        assert!(decapsulate_relay(&relay).is_err());
        assert!(decapsulate_relay_index(&relay, -1).is_err());
    }

    #[test]
    fn test_summary_format() {
        let mut msg = solicit();
        assert_eq!(
            msg.summary(),
            "Message\n  messageType=SOLICIT\n  transactionid=0xabcdef\n  options=[  ]\n"
        );
        msg.add_option(DhcpOption::Preference(3));
        assert!(msg.summary().contains("\n    OPTION_PREFERENCE: 3\n  ]\n"));
        assert_eq!(
            msg.to_string(),
            "Message(messageType=SOLICIT transactionID=0xabcdef, 1 options)"
        );
    }
}
