//! DHCPv4 client
//!
//! Runs the DISCOVER → OFFER → REQUEST → ACK exchange (RFC 2131 §3.1) and
//! releases leases. Retransmission and response dispatch live in
//! [`super::exchange`].

use super::exchange::{Exchange, Filter, Matcher, WireMessage};
use crate::config::{ClientConfig, Config, Dhcpv4Config};
use crate::protocol::dhcpv4::{
    self, new_discovery, new_release_from_ack, new_request_from_offer, option, Message,
    MessageType, Modifier, OpCode, TransactionId, DHCP_SERVER_PORT,
};
use crate::protocol::MacAddr;
use crate::telemetry::ClientMetrics;
use crate::transport::{self, PacketConn};
use crate::{Error, Result};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

impl WireMessage for Message {
    type Xid = TransactionId;

    fn decode(data: &[u8]) -> Result<Self> {
        Message::from_bytes(data)
    }

    fn encode(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn xid(&self) -> Option<TransactionId> {
        Some(self.transaction_id)
    }

    fn type_name(&self) -> String {
        self.message_type().to_string()
    }
}

/// Where the last exchange got to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExchangeState {
    Idle,
    /// DISCOVER sent, waiting for OFFER
    DiscoverSent,
    OfferReceived,
    /// REQUEST sent, waiting for ACK
    RequestSent,
    /// ACK received
    Bound,
    Failed,
}

/// An acknowledged lease
#[derive(Debug, Clone)]
pub struct Lease {
    pub offer: Message,
    pub ack: Message,
    /// When the ACK arrived
    pub created_at: Instant,
}

impl Lease {
    pub fn address(&self) -> Ipv4Addr {
        self.ack.your_ip
    }

    pub fn server_identifier(&self) -> Option<Ipv4Addr> {
        self.ack.server_identifier()
    }

    pub fn lease_time(&self) -> Option<Duration> {
        self.ack.lease_time()
    }

    /// T1, defaulting to half the lease time
    pub fn renewal_time(&self) -> Option<Duration> {
        self.ack
            .renewal_time()
            .or_else(|| self.lease_time().map(|t| t / 2))
    }

    /// T2, defaulting to 7/8 of the lease time
    pub fn rebinding_time(&self) -> Option<Duration> {
        self.ack
            .rebinding_time()
            .or_else(|| self.lease_time().map(|t| t * 7 / 8))
    }

    /// Check if T1 (renewal time) has passed
    pub fn is_renewal_due(&self) -> bool {
        self.renewal_time()
            .is_some_and(|t1| self.created_at.elapsed() >= t1)
    }

    /// Check if T2 (rebinding time) has passed
    pub fn is_rebinding_due(&self) -> bool {
        self.rebinding_time()
            .is_some_and(|t2| self.created_at.elapsed() >= t2)
    }

    /// Check if lease has expired
    pub fn is_expired(&self) -> bool {
        self.lease_time()
            .is_some_and(|t| self.created_at.elapsed() >= t)
    }
}

/// Matches messages of the given DHCP message type.
pub fn is_message_type(t: MessageType) -> impl Fn(&Message) -> bool + Send + Sync {
    move |msg| msg.message_type() == t
}

/// DHCPv4 client bound to one socket and hardware address.
pub struct Client4<C: PacketConn = UdpSocket> {
    exchange: Exchange<Message, C>,
    hw_addr: MacAddr,
    server: SocketAddr,
    broadcast: bool,
    hostname: Option<String>,
    max_message_size: u16,
    state: Mutex<ExchangeState>,
}

impl Client4<UdpSocket> {
    /// Binds `dhcpv4.listen` and starts the client.
    pub async fn bind(config: &Config) -> Result<Self> {
        let socket = transport::bind_v4(config.dhcpv4.listen).await?;
        Self::new(socket, &config.client, &config.dhcpv4)
    }
}

impl<C: PacketConn> Client4<C> {
    /// Starts a client on `conn`. Must be called inside a tokio runtime.
    pub fn new(conn: C, client: &ClientConfig, config: &Dhcpv4Config) -> Result<Self> {
        let hw_addr = config.hw_addr()?;
        let filter: Filter<Message> = Box::new(move |msg: &Message| {
            msg.op_code == OpCode::BootReply && msg.hw_addr() == Some(hw_addr)
        });
        debug!(
            "DHCPv4: client for {} talking to {}",
            hw_addr, config.server
        );

        Ok(Self {
            exchange: Exchange::new("DHCPv4", conn, client, filter),
            hw_addr,
            server: config.server,
            broadcast: config.broadcast,
            hostname: config.hostname.clone(),
            max_message_size: client.max_message_size,
            state: Mutex::new(ExchangeState::Idle),
        })
    }

    pub fn hw_addr(&self) -> MacAddr {
        self.hw_addr
    }

    pub fn state(&self) -> ExchangeState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: ExchangeState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    pub fn metrics(&self) -> Arc<ClientMetrics> {
        self.exchange.metrics()
    }

    /// Broadcasts a DISCOVER and returns the first OFFER.
    pub async fn discover_offer(&self, modifiers: &[Modifier]) -> Result<Message> {
        let mut discover = new_discovery(self.hw_addr, &[dhcpv4::with_broadcast(self.broadcast)])?;
        discover.update_option(option::max_message_size(self.max_message_size));
        if let Some(hostname) = &self.hostname {
            discover.update_option(option::host_name(hostname));
        }
        discover.apply(modifiers);

        self.set_state(ExchangeState::DiscoverSent);
        info!(
            "DHCP: Sending DISCOVER from {} (xid {})",
            self.hw_addr, discover.transaction_id
        );

        let offer = match self
            .send_and_read(self.server, &discover, Some(&is_message_type(MessageType::Offer)))
            .await
        {
            Ok(offer) => offer,
            Err(e) => {
                self.set_state(ExchangeState::Failed);
                return Err(e);
            }
        };

        self.set_state(ExchangeState::OfferReceived);
        info!(
            "DHCP: Received OFFER {} from {}",
            offer.your_ip,
            offer
                .server_identifier()
                .map_or_else(|| "unknown server".to_string(), |ip| ip.to_string())
        );
        Ok(offer)
    }

    /// Full DISCOVER/OFFER/REQUEST/ACK exchange.
    ///
    /// `modifiers` are applied to both the DISCOVER and the REQUEST.
    pub async fn request(&self, modifiers: &[Modifier]) -> Result<Lease> {
        let offer = self.discover_offer(modifiers).await?;
        self.request_from_offer(offer, modifiers).await
    }

    /// Requests the address in `offer`. A NAK fails with a protocol error.
    pub async fn request_from_offer(&self, offer: Message, modifiers: &[Modifier]) -> Result<Lease> {
        let mut request = match new_request_from_offer(&offer, modifiers) {
            Ok(request) => request,
            Err(e) => {
                self.set_state(ExchangeState::Failed);
                return Err(e);
            }
        };
        if let Some(hostname) = &self.hostname {
            if request.host_name().is_none() {
                request.update_option(option::host_name(hostname));
            }
        }

        self.set_state(ExchangeState::RequestSent);
        info!(
            "DHCP: Sending REQUEST for {} (xid {})",
            offer.your_ip, request.transaction_id
        );

        let ack_or_nak = |msg: &Message| {
            matches!(msg.message_type(), MessageType::Ack | MessageType::Nak)
        };
        let response = match self.send_and_read(self.server, &request, Some(&ack_or_nak)).await {
            Ok(response) => response,
            Err(e) => {
                self.set_state(ExchangeState::Failed);
                return Err(e);
            }
        };

        if response.message_type() == MessageType::Nak {
            self.set_state(ExchangeState::Failed);
            warn!("DHCP: Received NAK for {}", offer.your_ip);
            return Err(Error::Protocol(format!(
                "server {} declined the request with NAK",
                response
                    .server_identifier()
                    .map_or_else(|| "unknown".to_string(), |ip| ip.to_string())
            )));
        }

        self.set_state(ExchangeState::Bound);
        let lease = Lease {
            offer,
            ack: response,
            created_at: Instant::now(),
        };
        info!(
            "DHCP: Bound to {} (lease {:?})",
            lease.address(),
            lease.lease_time()
        );
        Ok(lease)
    }

    /// Sends a RELEASE for `lease` to its server. No response is expected.
    pub async fn release(&self, lease: &Lease) -> Result<()> {
        let release = new_release_from_ack(&lease.ack, &[])?;
        let server_id = release
            .server_identifier()
            .ok_or(Error::MissingOption("Server Identifier"))?;
        let dest = SocketAddr::V4(SocketAddrV4::new(server_id, DHCP_SERVER_PORT));

        self.exchange.send_only(&release, dest).await?;
        self.set_state(ExchangeState::Idle);
        info!("DHCP: Released {} to {}", lease.address(), server_id);
        Ok(())
    }

    /// Sends `msg` to `dest` and waits for a response accepted by `matcher`
    /// (any response when `None`), retransmitting on timeout.
    pub async fn send_and_read(
        &self,
        dest: SocketAddr,
        msg: &Message,
        matcher: Option<&Matcher<Message>>,
    ) -> Result<Message> {
        self.exchange.send_and_read(msg, dest, matcher).await
    }

    /// Stops the receive task. Waiting exchanges fail with [`Error::Closed`].
    pub async fn close(&self) {
        self.exchange.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dhcpv4::{new_reply_from_request, with_option};
    use crate::transport::MemoryConn;

    const HW: MacAddr = MacAddr([0x02, 0x00, 0x00, 0x00, 0x00, 0x01]);
    const SERVER_ID: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 1);
    const OFFERED: Ipv4Addr = Ipv4Addr::new(192, 168, 1, 100);

    fn make_client(timeout_ms: u64) -> (Client4<MemoryConn>, MemoryConn) {
        let (client, server) = MemoryConn::pair(
            "0.0.0.0:68".parse().unwrap(),
            SocketAddr::V4(SocketAddrV4::new(SERVER_ID, DHCP_SERVER_PORT)),
        );
        let client_config = ClientConfig {
            timeout_ms,
            ..ClientConfig::default()
        };
        let v4 = Dhcpv4Config {
            hw_addr: Some(HW.to_string()),
            hostname: Some("lab-01".into()),
            ..Dhcpv4Config::default()
        };
        (Client4::new(client, &client_config, &v4).unwrap(), server)
    }

    fn reply_to(request: &Message, nak: bool) -> Message {
        let mut reply = new_reply_from_request(
            request,
            &[
                with_option(option::server_identifier(SERVER_ID)),
                with_option(option::lease_time(Duration::from_secs(3600))),
            ],
        )
        .unwrap();
        if nak {
            reply.update_option(option::message_type(MessageType::Nak));
        } else {
            reply.your_ip = OFFERED;
        }
        reply
    }

    /// Answers every DISCOVER and REQUEST; NAKs requests when `nak` is set.
    fn spawn_server(server: MemoryConn, nak: bool) -> tokio::task::JoinHandle<Vec<Message>> {
        tokio::spawn(async move {
            let mut seen = Vec::new();
            while let Ok(datagram) = server.recv().await {
                let request = Message::from_bytes(&datagram.data).unwrap();
                match request.message_type() {
                    MessageType::Discover => {
                        let offer = reply_to(&request, false);
                        server.send(&offer.to_bytes(), datagram.from).unwrap();
                    }
                    MessageType::Request => {
                        let ack = reply_to(&request, nak);
                        server.send(&ack.to_bytes(), datagram.from).unwrap();
                    }
                    _ => {}
                }
                let done = request.message_type() == MessageType::Release;
                seen.push(request);
                if done {
                    break;
                }
            }
            seen
        })
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_exchange_and_release() {
        let (client, server) = make_client(1000);
        let server = spawn_server(server, false);
        assert_eq!(client.state(), ExchangeState::Idle);

        let lease = client.request(&[]).await.unwrap();
        assert_eq!(client.state(), ExchangeState::Bound);
        assert_eq!(lease.address(), OFFERED);
        assert_eq!(lease.server_identifier(), Some(SERVER_ID));
        assert_eq!(lease.offer.message_type(), MessageType::Offer);
        assert_eq!(lease.renewal_time(), Some(Duration::from_secs(1800)));
        assert!(!lease.is_expired());

        client.release(&lease).await.unwrap();
        assert_eq!(client.state(), ExchangeState::Idle);

        let seen = server.await.unwrap();
        let types: Vec<_> = seen.iter().map(|m| m.message_type()).collect();
        assert_eq!(
            types,
            vec![MessageType::Discover, MessageType::Request, MessageType::Release]
        );

        let discover = &seen[0];
        assert!(discover.is_broadcast());
        assert_eq!(discover.hw_addr(), Some(HW));
        assert_eq!(discover.max_message_size(), Some(1500));
        assert_eq!(discover.host_name().as_deref(), Some("lab-01"));

        let request = &seen[1];
        assert_eq!(request.requested_ip(), Some(OFFERED));
        assert_eq!(request.server_identifier(), Some(SERVER_ID));

        let release = &seen[2];
        assert_eq!(release.transaction_id, lease.ack.transaction_id);
        assert_eq!(release.client_ip, OFFERED);

        let metrics = client.metrics();
        assert_eq!(metrics.sent.get(), 3);
        assert_eq!(metrics.message_type_count("OFFER"), 1);
        assert_eq!(metrics.message_type_count("ACK"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_nak_fails_request() {
        let (client, server) = make_client(1000);
        let _server = spawn_server(server, true);

        let err = client.request(&[]).await.unwrap_err();
        assert!(err.is_protocol(), "{:?}", err);
        assert_eq!(client.state(), ExchangeState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_hw_addr_is_filtered() {
        let (client, server) = make_client(50);

        let responder = tokio::spawn(async move {
            let datagram = server.recv().await.unwrap();
            let discover = Message::from_bytes(&datagram.data).unwrap();
            let mut offer = reply_to(&discover, false);
            offer.client_hw_addr = vec![0x02, 0, 0, 0, 0, 0x99];
            server.send(&offer.to_bytes(), datagram.from).unwrap();
            server
        });

        let err = client.discover_offer(&[]).await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(client.state(), ExchangeState::Failed);
        let _server = responder.await.unwrap();
        assert_eq!(client.metrics().discarded_filtered.get(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_rejects_new_exchanges() {
        let (client, _server) = make_client(1000);
        client.close().await;
        assert!(matches!(client.discover_offer(&[]).await, Err(Error::Closed)));
    }

    #[test]
    fn test_is_message_type() {
        let matcher = is_message_type(MessageType::Offer);
        let mut msg = Message::new(&[]).unwrap();
        assert!(!matcher(&msg));
        msg.update_option(option::message_type(MessageType::Offer));
        assert!(matcher(&msg));
    }

    #[test]
    fn test_lease_timers() {
        let mut ack = Message::new(&[]).unwrap();
        ack.update_option(option::lease_time(Duration::ZERO));
        let lease = Lease {
            offer: ack.clone(),
            ack,
            created_at: Instant::now(),
        };
        assert!(lease.is_expired());
        assert!(lease.is_renewal_due());

        let mut ack = Message::new(&[]).unwrap();
        ack.update_option(option::lease_time(Duration::from_secs(80)));
        ack.update_option(option::renewal_time(Duration::from_secs(10)));
        let lease = Lease {
            offer: ack.clone(),
            ack,
            created_at: Instant::now(),
        };
        assert_eq!(lease.renewal_time(), Some(Duration::from_secs(10)));
        assert_eq!(lease.rebinding_time(), Some(Duration::from_secs(70)));
        assert!(!lease.is_expired());
    }
}
