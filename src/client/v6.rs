//! DHCPv6 client
//!
//! SOLICIT → ADVERTISE → REQUEST → REPLY, or SOLICIT → REPLY when the server
//! honours Rapid Commit (RFC 8415 §18.2.1).

use super::exchange::{Exchange, Filter, Matcher, WireMessage};
use crate::config::{ClientConfig, Config, Dhcpv6Config};
use crate::protocol::dhcpv6::{
    new_request_from_advertise, new_solicit_with_cid, with_rapid_commit, Dhcpv6, Duid, Message,
    MessageType, Modifier, StatusCode, TransactionId,
};
use crate::telemetry::ClientMetrics;
use crate::transport::{self, PacketConn};
use crate::{Error, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::UdpSocket;
use tracing::{debug, info, warn};

impl WireMessage for Message {
    type Xid = TransactionId;

    /// Clients never receive relay messages; a relay is treated as malformed.
    fn decode(data: &[u8]) -> Result<Self> {
        match Dhcpv6::from_bytes(data)? {
            Dhcpv6::Message(msg) => Ok(msg),
            Dhcpv6::Relay(relay) => Err(Error::InvalidPacket(format!(
                "unexpected {} at client",
                relay.message_type
            ))),
        }
    }

    fn encode(&self) -> Vec<u8> {
        self.to_bytes()
    }

    fn xid(&self) -> Option<TransactionId> {
        Some(self.transaction_id)
    }

    fn type_name(&self) -> String {
        self.message_type.to_string()
    }
}

/// Matches messages of the given DHCPv6 message type.
pub fn is_message_type(t: MessageType) -> impl Fn(&Message) -> bool + Send + Sync {
    move |msg| msg.message_type == t
}

/// DHCPv6 client identified by a DUID-LLT derived from its hardware address.
pub struct Client6<C: PacketConn = UdpSocket> {
    exchange: Exchange<Message, C>,
    duid: Duid,
    server: SocketAddr,
    rapid_commit: bool,
}

impl Client6<UdpSocket> {
    /// Binds `dhcpv6.listen` and starts the client.
    pub async fn bind(config: &Config) -> Result<Self> {
        let socket = transport::bind_v6(config.dhcpv6.listen).await?;
        Self::new(socket, &config.client, &config.dhcpv6)
    }
}

impl<C: PacketConn> Client6<C> {
    /// Starts a client on `conn`. Must be called inside a tokio runtime.
    pub fn new(conn: C, client: &ClientConfig, config: &Dhcpv6Config) -> Result<Self> {
        let duid = Duid::llt_from_mac(&config.hw_addr()?);
        Ok(Self::with_duid(conn, client, config, duid))
    }

    /// Starts a client with an explicit client DUID.
    pub fn with_duid(conn: C, client: &ClientConfig, config: &Dhcpv6Config, duid: Duid) -> Self {
        let own = duid.clone();
        // Only server-to-client messages for our DUID
        let filter: Filter<Message> = Box::new(move |msg: &Message| {
            matches!(
                msg.message_type,
                MessageType::Advertise | MessageType::Reply | MessageType::Reconfigure
            ) && msg.client_id().map_or(true, |cid| *cid == own)
        });
        debug!("DHCPv6: client {} talking to {}", duid, config.server);

        Self {
            exchange: Exchange::new("DHCPv6", conn, client, filter),
            duid,
            server: config.server,
            rapid_commit: config.rapid_commit,
        }
    }

    pub fn duid(&self) -> &Duid {
        &self.duid
    }

    pub fn metrics(&self) -> Arc<ClientMetrics> {
        self.exchange.metrics()
    }

    /// Sends a SOLICIT and returns the first ADVERTISE.
    pub async fn solicit(&self, modifiers: &[Modifier]) -> Result<Message> {
        let solicit = new_solicit_with_cid(self.duid.clone(), modifiers)?;
        info!("DHCPv6: Sending SOLICIT (xid {})", solicit.transaction_id);

        let advertise = self
            .send_and_read(
                self.server,
                &solicit,
                Some(&is_message_type(MessageType::Advertise)),
            )
            .await?;
        info!(
            "DHCPv6: Received ADVERTISE from {}",
            advertise
                .server_id()
                .map_or_else(|| "unknown server".to_string(), |sid| sid.to_string())
        );
        Ok(advertise)
    }

    /// Sends a SOLICIT with Rapid Commit. The server may answer with either
    /// an ADVERTISE or a committed REPLY.
    pub async fn rapid_solicit(&self, modifiers: &[Modifier]) -> Result<Message> {
        let mut solicit = new_solicit_with_cid(self.duid.clone(), modifiers)?;
        solicit.apply(&[with_rapid_commit()]);
        info!(
            "DHCPv6: Sending SOLICIT with rapid commit (xid {})",
            solicit.transaction_id
        );

        let advertise_or_reply = |msg: &Message| {
            matches!(msg.message_type, MessageType::Advertise | MessageType::Reply)
        };
        let response = self
            .send_and_read(self.server, &solicit, Some(&advertise_or_reply))
            .await?;
        if response.message_type == MessageType::Reply {
            check_status(&response)?;
        }
        Ok(response)
    }

    /// Requests the addresses in `advertise` and returns the REPLY.
    ///
    /// A REPLY carrying a non-success status fails with a protocol error.
    pub async fn request(&self, advertise: &Message, modifiers: &[Modifier]) -> Result<Message> {
        let request = new_request_from_advertise(advertise, modifiers)?;
        info!("DHCPv6: Sending REQUEST (xid {})", request.transaction_id);

        let reply = self
            .send_and_read(self.server, &request, Some(&is_message_type(MessageType::Reply)))
            .await?;
        check_status(&reply)?;
        Ok(reply)
    }

    /// Obtains addresses, using Rapid Commit when configured.
    pub async fn lease(&self, modifiers: &[Modifier]) -> Result<Message> {
        let advertise = if self.rapid_commit {
            let response = self.rapid_solicit(modifiers).await?;
            if response.message_type == MessageType::Reply {
                log_reply(&response);
                return Ok(response);
            }
            debug!("DHCPv6: Server ignored rapid commit, continuing with REQUEST");
            response
        } else {
            self.solicit(modifiers).await?
        };
        let reply = self.request(&advertise, modifiers).await?;
        log_reply(&reply);
        Ok(reply)
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

fn check_status(reply: &Message) -> Result<()> {
    if let Some(status) = reply.status() {
        if status.code != StatusCode::Success {
            warn!("DHCPv6: Server returned {}: {}", status.code, status.message);
            return Err(Error::Protocol(format!(
                "server returned {}: {}",
                status.code, status.message
            )));
        }
    }
    Ok(())
}

fn log_reply(reply: &Message) {
    let addresses: Vec<String> = reply
        .ia_na()
        .map(|ia| ia.addresses().iter().map(|a| a.address.to_string()).collect())
        .unwrap_or_default();
    info!("DHCPv6: Bound to [{}]", addresses.join(", "));
}
