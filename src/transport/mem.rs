//! In-process datagram pipe.

use super::PacketConn;
use std::future::Future;
use std::io;
use std::net::SocketAddr;
use tokio::sync::{mpsc, Mutex};

/// One datagram in flight between the two ends of a [`MemoryConn`] pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datagram {
    pub data: Vec<u8>,
    pub from: SocketAddr,
    /// Address the sender wrote to. Delivery ignores it.
    pub to: SocketAddr,
}

/// One end of a connected pair. Whatever one end sends, the other reads,
/// regardless of destination address.
#[derive(Debug)]
pub struct MemoryConn {
    local: SocketAddr,
    tx: mpsc::UnboundedSender<Datagram>,
    rx: Mutex<mpsc::UnboundedReceiver<Datagram>>,
}

impl MemoryConn {
    pub fn pair(a: SocketAddr, b: SocketAddr) -> (MemoryConn, MemoryConn) {
        let (a_tx, b_rx) = mpsc::unbounded_channel();
        let (b_tx, a_rx) = mpsc::unbounded_channel();
        (
            MemoryConn {
                local: a,
                tx: a_tx,
                rx: Mutex::new(a_rx),
            },
            MemoryConn {
                local: b,
                tx: b_tx,
                rx: Mutex::new(b_rx),
            },
        )
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local
    }

    /// Reads the next datagram with both addresses.
    pub async fn recv(&self) -> io::Result<Datagram> {
        self.rx
            .lock()
            .await
            .recv()
            .await
            .ok_or_else(|| io::Error::new(io::ErrorKind::ConnectionAborted, "peer closed"))
    }

    pub fn send(&self, data: &[u8], to: SocketAddr) -> io::Result<usize> {
        self.tx
            .send(Datagram {
                data: data.to_vec(),
                from: self.local,
                to,
            })
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "peer closed"))?;
        Ok(data.len())
    }
}

impl PacketConn for MemoryConn {
    fn recv_from<'a>(
        &'a self,
        buf: &'a mut [u8],
    ) -> impl Future<Output = io::Result<(usize, SocketAddr)>> + Send + 'a {
        async move {
            let datagram = self.recv().await?;
            // Truncate like a UDP socket would
            let n = datagram.data.len().min(buf.len());
            buf[..n].copy_from_slice(&datagram.data[..n]);
            Ok((n, datagram.from))
        }
    }

    fn send_to<'a>(
        &'a self,
        buf: &'a [u8],
        dest: SocketAddr,
    ) -> impl Future<Output = io::Result<usize>> + Send + 'a {
        async move { self.send(buf, dest) }
    }
}
