//! Client exchanges over real UDP sockets on 127.0.0.1
//!
//! A small scripted server answers on an ephemeral port; the clients run
//! against it through the public API only.

use ruster_dhcp::client::{Client4, Client6, ExchangeState};
use ruster_dhcp::config::{ClientConfig, Dhcpv4Config, Dhcpv6Config};
use ruster_dhcp::protocol::dhcpv4::{self, option, MessageType};
use ruster_dhcp::protocol::dhcpv6;
use ruster_dhcp::protocol::MacAddr;
use ruster_dhcp::Error;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

const HW: MacAddr = MacAddr([0x02, 0x42, 0xac, 0x11, 0x00, 0x02]);
const SERVER_ID: Ipv4Addr = Ipv4Addr::new(127, 0, 0, 1);
const LEASED: Ipv4Addr = Ipv4Addr::new(10, 0, 0, 42);

fn client_config() -> ClientConfig {
    ClientConfig {
        timeout_ms: 200,
        retries: 3,
        ..ClientConfig::default()
    }
}

async fn bind_local() -> (UdpSocket, SocketAddr) {
    let socket = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let addr = socket.local_addr().unwrap();
    (socket, addr)
}

/// Answers DISCOVER with OFFER and REQUEST with ACK, then stops.
async fn run_v4_server(socket: UdpSocket) -> Vec<dhcpv4::Message> {
    let mut seen = Vec::new();
    let mut buf = [0u8; 1500];
    loop {
        let (n, from) = socket.recv_from(&mut buf).await.unwrap();
        let request = dhcpv4::Message::from_bytes(&buf[..n]).unwrap();
        let message_type = request.message_type();
        if matches!(message_type, MessageType::Discover | MessageType::Request) {
            let mut reply = dhcpv4::new_reply_from_request(
                &request,
                &[
                    dhcpv4::with_option(option::server_identifier(SERVER_ID)),
                    dhcpv4::with_option(option::lease_time(Duration::from_secs(600))),
                    dhcpv4::with_option(option::dns(&[Ipv4Addr::new(10, 0, 0, 53)])),
                ],
            )
            .unwrap();
            reply.your_ip = LEASED;
            socket.send_to(&reply.to_bytes(), from).await.unwrap();
        }
        seen.push(request);
        if message_type == MessageType::Request {
            return seen;
        }
    }
}

#[tokio::test]
async fn test_dhcpv4_lease() {
    let (server, server_addr) = bind_local().await;
    let server = tokio::spawn(run_v4_server(server));

    let (socket, _) = bind_local().await;
    let v4 = Dhcpv4Config {
        server: server_addr,
        hw_addr: Some(HW.to_string()),
        broadcast: false,
        ..Dhcpv4Config::default()
    };
    let client = Client4::new(socket, &client_config(), &v4).unwrap();

    let lease = client.request(&[]).await.unwrap();
    assert_eq!(client.state(), ExchangeState::Bound);
    assert_eq!(lease.address(), LEASED);
    assert_eq!(lease.ack.dns(), vec![Ipv4Addr::new(10, 0, 0, 53)]);
    assert_eq!(lease.lease_time(), Some(Duration::from_secs(600)));

    let seen = server.await.unwrap();
    assert_eq!(seen[0].message_type(), MessageType::Discover);
    assert!(!seen[0].is_broadcast());
    assert_eq!(seen[1].message_type(), MessageType::Request);
    assert_eq!(seen[1].requested_ip(), Some(LEASED));

    client.close().await;
}

#[tokio::test]
async fn test_dhcpv4_silent_server_times_out() {
    let (_server, server_addr) = bind_local().await;
    let (socket, _) = bind_local().await;
    let config = ClientConfig {
        timeout_ms: 20,
        ..client_config()
    };
    let v4 = Dhcpv4Config {
        server: server_addr,
        hw_addr: Some(HW.to_string()),
        ..Dhcpv4Config::default()
    };
    let client = Client4::new(socket, &config, &v4).unwrap();

    let started = std::time::Instant::now();
    let err = client.discover_offer(&[]).await.unwrap_err();
    assert!(matches!(err, Error::NoResponse));
    assert!(started.elapsed() >= Duration::from_millis(140));
    assert_eq!(client.metrics().sent.get(), 3);
}

#[tokio::test]
async fn test_dhcpv6_exchange() {
    let (server, server_addr) = bind_local().await;
    let server_duid = dhcpv6::Duid::from_mac(&MacAddr([0x02, 0, 0, 0, 0, 0x01]));

    let responder = tokio::spawn(async move {
        let mut buf = [0u8; 1500];
        for _ in 0..2 {
            let (n, from) = server.recv_from(&mut buf).await.unwrap();
            let msg = match dhcpv6::Dhcpv6::from_bytes(&buf[..n]).unwrap() {
                dhcpv6::Dhcpv6::Message(msg) => msg,
                dhcpv6::Dhcpv6::Relay(_) => panic!("client sent a relay message"),
            };
            let modifiers = [
                dhcpv6::with_server_id(server_duid.clone()),
                dhcpv6::with_ia_address(dhcpv6::IaAddress::new(
                    "2001:db8::42".parse().unwrap(),
                    Duration::from_secs(300),
                    Duration::from_secs(600),
                )),
            ];
            let reply = match msg.message_type {
                dhcpv6::MessageType::Solicit => {
                    dhcpv6::new_advertise_from_solicit(&msg, &modifiers).unwrap()
                }
                _ => dhcpv6::new_reply_from_message(&msg, &modifiers).unwrap(),
            };
            server.send_to(&reply.to_bytes(), from).await.unwrap();
        }
    });

    let (socket, _) = bind_local().await;
    let v6 = Dhcpv6Config {
        server: server_addr,
        hw_addr: Some(HW.to_string()),
        ..Dhcpv6Config::default()
    };
    let client = Client6::new(socket, &client_config(), &v6).unwrap();

    let reply = client.lease(&[]).await.unwrap();
    responder.await.unwrap();

    let ia = reply.ia_na().unwrap();
    assert_eq!(ia.iaid, dhcpv6::DEFAULT_IAID);
    assert_eq!(
        ia.addresses()[0].address,
        "2001:db8::42".parse::<std::net::Ipv6Addr>().unwrap()
    );
    assert_eq!(reply.client_id(), Some(client.duid()));
    client.close().await;
}
