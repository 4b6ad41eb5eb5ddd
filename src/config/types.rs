//! Configuration types

use crate::protocol::dhcpv4::{DHCP_CLIENT_PORT, DHCP_SERVER_PORT};
use crate::protocol::dhcpv6::{ALL_DHCP_RELAY_AGENTS_AND_SERVERS, DHCPV6_CLIENT_PORT, DHCPV6_SERVER_PORT};
use crate::protocol::MacAddr;
use crate::telemetry::LogConfig;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, SocketAddrV4, SocketAddrV6};
use std::time::Duration;

/// User-defined configuration (config.toml)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub client: ClientConfig,
    pub dhcpv4: Dhcpv4Config,
    pub dhcpv6: Dhcpv6Config,
    pub logging: LogConfig,
}

/// Exchange tuning shared by both clients
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// First per-attempt timeout; doubles after each timeout
    pub timeout_ms: u64,
    /// Attempts per exchange, the first send included
    pub retries: u32,
    /// Responses buffered per transaction
    pub buffer_cap: usize,
    pub max_message_size: u16,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5000,
            retries: 3,
            buffer_cap: 5,
            max_message_size: 1500,
        }
    }
}

impl ClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dhcpv4Config {
    pub listen: SocketAddr,
    pub server: SocketAddr,
    pub hw_addr: Option<String>,
    /// Ask the server to broadcast its replies
    pub broadcast: bool,
    pub hostname: Option<String>,
}

impl Default for Dhcpv4Config {
    fn default() -> Self {
        Self {
            listen: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DHCP_CLIENT_PORT).into(),
            server: SocketAddrV4::new(Ipv4Addr::BROADCAST, DHCP_SERVER_PORT).into(),
            hw_addr: None,
            broadcast: true,
            hostname: None,
        }
    }
}

impl Dhcpv4Config {
    pub fn hw_addr(&self) -> Result<MacAddr> {
        parse_hw_addr("dhcpv4", self.hw_addr.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Dhcpv6Config {
    pub listen: SocketAddr,
    pub server: SocketAddr,
    pub hw_addr: Option<String>,
    pub rapid_commit: bool,
}

impl Default for Dhcpv6Config {
    fn default() -> Self {
        Self {
            listen: SocketAddrV6::new(Ipv6Addr::UNSPECIFIED, DHCPV6_CLIENT_PORT, 0, 0).into(),
            server: SocketAddrV6::new(ALL_DHCP_RELAY_AGENTS_AND_SERVERS, DHCPV6_SERVER_PORT, 0, 0)
                .into(),
            hw_addr: None,
            rapid_commit: false,
        }
    }
}

impl Dhcpv6Config {
    pub fn hw_addr(&self) -> Result<MacAddr> {
        parse_hw_addr("dhcpv6", self.hw_addr.as_deref())
    }
}

fn parse_hw_addr(section: &str, value: Option<&str>) -> Result<MacAddr> {
    let value = value.ok_or_else(|| Error::Config(format!("{}.hw_addr is required", section)))?;
    value
        .parse()
        .map_err(|e| Error::Config(format!("{}.hw_addr: {}", section, e)))
}

// ============================================================================
// Lock file types (generated, includes all defaults)
// ============================================================================

/// Effective configuration with every default filled in
#[derive(Debug, Clone, Serialize)]
pub struct ConfigLock {
    pub generated_at: String,
    pub client: ClientLock,
    pub dhcpv4: Dhcpv4Lock,
    pub dhcpv6: Dhcpv6Lock,
    pub logging: LoggingLock,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClientLock {
    pub timeout_ms: u64,
    pub retries: u32,
    pub buffer_cap: usize,
    pub max_message_size: u16,
    /// Worst case before an exchange gives up
    pub total_wait_ms: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dhcpv4Lock {
    pub listen: String,
    pub server: String,
    pub hw_addr: String,
    pub broadcast: bool,
    pub hostname: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Dhcpv6Lock {
    pub listen: String,
    pub server: String,
    pub hw_addr: String,
    pub rapid_commit: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoggingLock {
    pub level: String,
    pub format: String,
}

impl ConfigLock {
    pub fn from_config(config: &Config) -> Self {
        let client = &config.client;
        // timeout * (2^retries - 1)
        let factor = 1u64
            .checked_shl(client.retries)
            .map_or(u64::MAX, |f| f.saturating_sub(1));

        ConfigLock {
            generated_at: chrono::Utc::now().to_rfc3339(),
            client: ClientLock {
                timeout_ms: client.timeout_ms,
                retries: client.retries,
                buffer_cap: client.buffer_cap,
                max_message_size: client.max_message_size,
                total_wait_ms: client.timeout_ms.saturating_mul(factor),
            },
            dhcpv4: Dhcpv4Lock {
                listen: config.dhcpv4.listen.to_string(),
                server: config.dhcpv4.server.to_string(),
                hw_addr: config.dhcpv4.hw_addr.clone().unwrap_or_else(|| "unset".into()),
                broadcast: config.dhcpv4.broadcast,
                hostname: config.dhcpv4.hostname.clone().unwrap_or_default(),
            },
            dhcpv6: Dhcpv6Lock {
                listen: config.dhcpv6.listen.to_string(),
                server: config.dhcpv6.server.to_string(),
                hw_addr: config.dhcpv6.hw_addr.clone().unwrap_or_else(|| "unset".into()),
                rapid_commit: config.dhcpv6.rapid_commit,
            },
            logging: LoggingLock {
                level: config.logging.level.to_lowercase(),
                format: config.logging.format.clone(),
            },
        }
    }
}
