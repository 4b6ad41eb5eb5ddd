//! Transaction-keyed request/response exchange over a datagram socket.
//!
//! One receive task per client reads every inbound datagram, decodes it,
//! and forwards it to the channel registered for its transaction ID.
//! Senders register a channel, write the request and wait on the channel
//! with a per-attempt deadline that doubles after each timeout.

use crate::config::ClientConfig;
use crate::telemetry::ClientMetrics;
use crate::transport::{PacketConn, MAX_DATAGRAM_SIZE};
use crate::{Error, Result};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Predicate a response must satisfy to end a `send_and_read` wait.
pub type Matcher<M> = dyn Fn(&M) -> bool + Send + Sync;

/// Drops inbound messages not addressed to this client.
pub(crate) type Filter<M> = Box<dyn Fn(&M) -> bool + Send + Sync>;

/// What the exchange needs to know about a protocol's messages.
pub(crate) trait WireMessage: Sized + Send + Sync + 'static {
    type Xid: Copy + Eq + Hash + fmt::Display + Send + Sync + 'static;

    fn decode(data: &[u8]) -> Result<Self>;
    fn encode(&self) -> Vec<u8>;
    fn xid(&self) -> Option<Self::Xid>;
    fn type_name(&self) -> String;
}

struct Pending<M> {
    tx: mpsc::Sender<M>,
    done: CancellationToken,
    generation: u64,
}

type PendingTable<M, X> = Arc<Mutex<HashMap<X, Pending<M>>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

/// Registration of one in-flight transaction.
///
/// Dropping the guard removes the transaction from the table and releases
/// the receive task if it is blocked delivering to it.
pub(crate) struct PendingGuard<M: WireMessage> {
    table: PendingTable<M, M::Xid>,
    xid: M::Xid,
    generation: u64,
    done: CancellationToken,
}

impl<M: WireMessage> Drop for PendingGuard<M> {
    fn drop(&mut self) {
        self.done.cancel();
        let mut table = lock(&self.table);
        if table
            .get(&self.xid)
            .is_some_and(|p| p.generation == self.generation)
        {
            table.remove(&self.xid);
        }
    }
}

enum AttemptError {
    TimedOut,
    Fatal(Error),
}

pub(crate) struct Exchange<M: WireMessage, C: PacketConn> {
    label: &'static str,
    conn: Arc<C>,
    pending: PendingTable<M, M::Xid>,
    generation: AtomicU64,
    shutdown: CancellationToken,
    receiver: Mutex<Option<JoinHandle<()>>>,
    metrics: Arc<ClientMetrics>,
    timeout: Duration,
    retries: u32,
    buffer_cap: usize,
}

impl<M: WireMessage, C: PacketConn> Exchange<M, C> {
    /// Starts the receive task. Must be called inside a tokio runtime.
    pub(crate) fn new(label: &'static str, conn: C, config: &ClientConfig, filter: Filter<M>) -> Self {
        let conn = Arc::new(conn);
        let pending: PendingTable<M, M::Xid> = Arc::new(Mutex::new(HashMap::new()));
        let shutdown = CancellationToken::new();
        let metrics = Arc::new(ClientMetrics::new());

        let receiver = tokio::spawn(receive_loop(
            label,
            conn.clone(),
            pending.clone(),
            filter,
            metrics.clone(),
            shutdown.clone(),
        ));

        Self {
            label,
            conn,
            pending,
            generation: AtomicU64::new(0),
            shutdown,
            receiver: Mutex::new(Some(receiver)),
            metrics,
            timeout: config.timeout(),
            retries: config.retries,
            buffer_cap: config.buffer_cap.max(1),
        }
    }

    pub(crate) fn metrics(&self) -> Arc<ClientMetrics> {
        self.metrics.clone()
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// Registers `msg`'s transaction and writes it to `dest`.
    pub(crate) async fn send(
        &self,
        msg: &M,
        dest: SocketAddr,
    ) -> Result<(mpsc::Receiver<M>, PendingGuard<M>)> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        let xid = msg
            .xid()
            .ok_or_else(|| Error::Protocol("message has no transaction ID".into()))?;

        let (tx, rx) = mpsc::channel(self.buffer_cap);
        let done = CancellationToken::new();
        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        {
            let mut table = lock(&self.pending);
            if table.contains_key(&xid) {
                return Err(Error::TransactionInUse(xid.to_string()));
            }
            table.insert(
                xid,
                Pending {
                    tx,
                    done: done.clone(),
                    generation,
                },
            );
        }
        let guard = PendingGuard {
            table: self.pending.clone(),
            xid,
            generation,
            done,
        };

        self.write(msg, dest).await?;
        Ok((rx, guard))
    }

    /// Writes `msg` without waiting for anything back.
    pub(crate) async fn send_only(&self, msg: &M, dest: SocketAddr) -> Result<()> {
        if self.is_closed() {
            return Err(Error::Closed);
        }
        self.write(msg, dest).await
    }

    async fn write(&self, msg: &M, dest: SocketAddr) -> Result<()> {
        let bytes = msg.encode();
        self.conn.send_to(&bytes, dest).await?;
        self.metrics.sent.inc();
        trace!("{}: sent {} bytes to {}", self.label, bytes.len(), dest);
        Ok(())
    }

    /// Sends `msg` and waits for a response the matcher accepts,
    /// retransmitting on timeout.
    pub(crate) async fn send_and_read(
        &self,
        msg: &M,
        dest: SocketAddr,
        matcher: Option<&Matcher<M>>,
    ) -> Result<M> {
        let mut timeout = self.timeout;
        for attempt in 1..=self.retries {
            if attempt > 1 {
                self.metrics.retransmissions.inc();
                debug!(
                    "{}: retransmitting {} (attempt {}/{}, timeout {:?})",
                    self.label,
                    msg.type_name(),
                    attempt,
                    self.retries,
                    timeout
                );
            }
            match self.attempt(msg, dest, matcher, timeout).await {
                Ok(response) => return Ok(response),
                Err(AttemptError::TimedOut) => {
                    self.metrics.timeouts.inc();
                    timeout = timeout.saturating_mul(2);
                }
                Err(AttemptError::Fatal(e)) => return Err(e),
            }
        }
        debug!(
            "{}: no response to {} after {} attempts",
            self.label,
            msg.type_name(),
            self.retries
        );
        Err(Error::NoResponse)
    }

    async fn attempt(
        &self,
        msg: &M,
        dest: SocketAddr,
        matcher: Option<&Matcher<M>>,
        timeout: Duration,
    ) -> std::result::Result<M, AttemptError> {
        let (mut rx, _guard) = self.send(msg, dest).await.map_err(AttemptError::Fatal)?;
        let deadline = tokio::time::sleep(timeout);
        tokio::pin!(deadline);

        // A response already queued wins over a shutdown or deadline that
        // became ready in the same poll.
        loop {
            tokio::select! {
                biased;
                response = rx.recv() => match response {
                    Some(response) if matcher.map_or(true, |m| m(&response)) => return Ok(response),
                    Some(response) => {
                        debug!(
                            "{}: ignoring {} for transaction {}",
                            self.label,
                            response.type_name(),
                            msg.xid().map_or_else(|| "?".into(), |x| x.to_string())
                        );
                    }
                    None => return Err(AttemptError::Fatal(Error::Closed)),
                },
                _ = self.shutdown.cancelled() => return Err(AttemptError::Fatal(Error::Closed)),
                _ = &mut deadline => return Err(AttemptError::TimedOut),
            }
        }
    }

    /// Stops the receive task and fails every waiting transaction.
    pub(crate) async fn close(&self) {
        self.shutdown.cancel();
        lock(&self.pending).clear();
        let receiver = lock(&self.receiver).take();
        if let Some(receiver) = receiver {
            if let Err(e) = receiver.await {
                warn!("{}: receive task ended abnormally: {}", self.label, e);
            }
        }
    }
}

impl<M: WireMessage, C: PacketConn> Drop for Exchange<M, C> {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn receive_loop<M: WireMessage, C: PacketConn>(
    label: &'static str,
    conn: Arc<C>,
    pending: PendingTable<M, M::Xid>,
    filter: Filter<M>,
    metrics: Arc<ClientMetrics>,
    shutdown: CancellationToken,
) {
    let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
    loop {
        let (n, from) = tokio::select! {
            _ = shutdown.cancelled() => break,
            received = conn.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    warn!("{}: receive failed, stopping: {}", label, e);
                    shutdown.cancel();
                    break;
                }
            },
        };
        metrics.received.inc();

        let msg = match M::decode(&buf[..n]) {
            Ok(msg) => msg,
            Err(e) => {
                metrics.discarded_malformed.inc();
                debug!("{}: discarding malformed datagram from {}: {}", label, from, e);
                continue;
            }
        };
        if !filter(&msg) {
            metrics.discarded_filtered.inc();
            trace!("{}: ignoring {} from {}", label, msg.type_name(), from);
            continue;
        }
        let Some(xid) = msg.xid() else {
            metrics.discarded_filtered.inc();
            continue;
        };

        let target = {
            let table = lock(&pending);
            table.get(&xid).map(|p| (p.tx.clone(), p.done.clone()))
        };
        let Some((tx, done)) = target else {
            metrics.discarded_unmatched.inc();
            debug!("{}: no transaction waiting for {} ({})", label, xid, msg.type_name());
            continue;
        };

        let name = msg.type_name();
        tokio::select! {
            biased;
            sent = tx.send(msg) => match sent {
                Ok(()) => {
                    metrics.delivered.inc();
                    metrics.record_message_type(&name);
                    trace!("{}: delivered {} to transaction {}", label, name, xid);
                }
                Err(_) => metrics.discarded_unmatched.inc(),
            },
            _ = done.cancelled() => metrics.discarded_unmatched.inc(),
            _ = shutdown.cancelled() => {
                metrics.discarded_unmatched.inc();
                break;
            }
        }
    }
    debug!("{}: receive task stopped", label);
}
