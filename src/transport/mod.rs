//! Datagram sockets the clients run over.
//!
//! [`PacketConn`] is the only thing the exchange needs from a socket: send a
//! datagram to an address and read the next one. Tokio's `UdpSocket` is the
//! production implementation; [`MemoryConn`] is an in-process pair.

mod mem;

pub use mem::{Datagram, MemoryConn};

use crate::Result;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::net::UdpSocket;
use tracing::debug;

/// Largest datagram the receive loop reads
pub const MAX_DATAGRAM_SIZE: usize = 1500;

/// A datagram socket shared between one reader task and many senders.
pub trait PacketConn: Send + Sync + 'static {
    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a;

    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        dest: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send + 'a;
}

impl PacketConn for UdpSocket {
    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
        UdpSocket::recv_from(self, buf)
    }

    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        dest: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send + 'a {
        UdpSocket::send_to(self, buf, dest)
    }
}

/// Binds the DHCPv4 client socket with broadcast enabled.
pub async fn bind_v4(listen: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(listen).await?;
    socket.set_broadcast(true)?;
    debug!("DHCPv4: bound {}", socket.local_addr()?);
    Ok(socket)
}

/// Binds the DHCPv6 client socket.
pub async fn bind_v6(listen: SocketAddr) -> Result<UdpSocket> {
    let socket = UdpSocket::bind(listen).await?;
    debug!("DHCPv6: bound {}", socket.local_addr()?);
    Ok(socket)
}
