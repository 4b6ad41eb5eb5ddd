//! Configuration validation

use super::Config;
use crate::protocol::MacAddr;
use crate::telemetry::{is_known_format, is_known_level};
use std::net::{IpAddr, SocketAddr};

#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self {
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            println!("[WARN] {}", warning);
        }
        for error in &self.errors {
            println!("[ERROR] {}", error);
        }
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::new()
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &Config) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_client(config, &mut result);
    validate_dhcpv4(config, &mut result);
    validate_dhcpv6(config, &mut result);
    validate_logging(config, &mut result);

    result
}

fn validate_client(config: &Config, result: &mut ValidationResult) {
    let client = &config.client;
    if client.retries == 0 {
        result.error("client.retries must be at least 1");
    } else if client.retries > 10 {
        result.warn(format!(
            "client.retries = {}: the last attempt waits {}x the first",
            client.retries,
            1u64 << (client.retries - 1).min(63)
        ));
    }
    if client.timeout_ms == 0 {
        result.error("client.timeout_ms must be greater than 0");
    }
    if client.buffer_cap == 0 {
        result.error("client.buffer_cap must be at least 1");
    }
    if client.max_message_size < 576 {
        result.error(format!(
            "client.max_message_size {} is below the 576-byte minimum",
            client.max_message_size
        ));
    }
}

fn validate_hw_addr(section: &str, value: Option<&str>, result: &mut ValidationResult) {
    match value {
        None => result.warn(format!(
            "{}.hw_addr not specified, client commands will fail",
            section
        )),
        Some(s) => match s.parse::<MacAddr>() {
            Ok(mac) if mac.is_zero() => {
                result.error(format!("{}.hw_addr must not be all zeros", section))
            }
            Ok(_) => {}
            Err(e) => result.error(format!("{}.hw_addr: {}", section, e)),
        },
    }
}

fn validate_dhcpv4(config: &Config, result: &mut ValidationResult) {
    let v4 = &config.dhcpv4;
    validate_hw_addr("dhcpv4", v4.hw_addr.as_deref(), result);

    if !v4.listen.is_ipv4() {
        result.error(format!("dhcpv4.listen {} is not an IPv4 address", v4.listen));
    }
    match v4.server {
        SocketAddr::V4(server) => {
            if !server.ip().is_broadcast() && v4.broadcast {
                result.warn(format!(
                    "dhcpv4.server {} is unicast but broadcast replies are requested",
                    server
                ));
            }
        }
        SocketAddr::V6(server) => {
            result.error(format!("dhcpv4.server {} is not an IPv4 address", server));
        }
    }
    if let Some(hostname) = &v4.hostname {
        if hostname.is_empty() || hostname.len() > 255 {
            result.error("dhcpv4.hostname must be 1 to 255 bytes");
        }
    }
}

fn validate_dhcpv6(config: &Config, result: &mut ValidationResult) {
    let v6 = &config.dhcpv6;
    validate_hw_addr("dhcpv6", v6.hw_addr.as_deref(), result);

    if !v6.listen.is_ipv6() {
        result.error(format!("dhcpv6.listen {} is not an IPv6 address", v6.listen));
    }
    match v6.server.ip() {
        IpAddr::V6(ip) if !ip.is_multicast() => result.warn(format!(
            "dhcpv6.server {} is not multicast; the server must accept unicast",
            v6.server
        )),
        IpAddr::V6(_) => {}
        IpAddr::V4(_) => result.error(format!(
            "dhcpv6.server {} is not an IPv6 address",
            v6.server
        )),
    }
}

fn validate_logging(config: &Config, result: &mut ValidationResult) {
    if !is_known_level(&config.logging.level) {
        result.warn(format!(
            "logging.level '{}' unknown, using info",
            config.logging.level
        ));
    }
    if !is_known_format(&config.logging.format) {
        result.warn(format!(
            "logging.format '{}' unknown, using pretty",
            config.logging.format
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> Config {
        toml::from_str(
            r#"
            [dhcpv4]
            hw_addr = "00:11:22:33:44:55"

            [dhcpv6]
            hw_addr = "00:11:22:33:44:55"
            "#,
        )
        .unwrap()
    }

    #[test]
    fn test_valid_minimal_config() {
        let result = validate(&make_config());
        assert!(!result.has_errors(), "{:?}", result.errors);
        assert!(result.warnings.is_empty(), "{:?}", result.warnings);
    }

    #[test]
    fn test_zero_retries_and_timeout() {
        let mut config = make_config();
        config.client.retries = 0;
        config.client.timeout_ms = 0;
        config.client.buffer_cap = 0;
        let result = validate(&config);
        assert_eq!(result.errors.len(), 3);
        assert!(result.errors.iter().any(|e| e.contains("client.retries")));
        assert!(result.errors.iter().any(|e| e.contains("client.timeout_ms")));
        assert!(result.errors.iter().any(|e| e.contains("client.buffer_cap")));
    }

    #[test]
    fn test_many_retries_warning() {
        let mut config = make_config();
        config.client.retries = 12;
        let result = validate(&config);
        assert!(!result.has_errors());
        assert!(result.warnings.iter().any(|w| w.contains("2048x")));
    }

    #[test]
    fn test_missing_hw_addr_warning() {
        let config = Config::default();
        let result = validate(&config);
        assert!(!result.has_errors());
        assert!(result.warnings.iter().any(|w| w.contains("dhcpv4.hw_addr")));
        assert!(result.warnings.iter().any(|w| w.contains("dhcpv6.hw_addr")));
    }

    #[test]
    fn test_bad_hw_addr() {
        let mut config = make_config();
        config.dhcpv4.hw_addr = Some("00:11:22".into());
        config.dhcpv6.hw_addr = Some("00:00:00:00:00:00".into());
        let result = validate(&config);
        assert!(result.errors.iter().any(|e| e.starts_with("dhcpv4.hw_addr")));
        assert!(result.errors.iter().any(|e| e.contains("all zeros")));
    }

    #[test]
    fn test_address_families() {
        let mut config = make_config();
        config.dhcpv4.server = "[ff02::1:2]:547".parse().unwrap();
        config.dhcpv6.listen = "0.0.0.0:546".parse().unwrap();
        let result = validate(&config);
        assert!(result.errors.iter().any(|e| e.starts_with("dhcpv4.server")));
        assert!(result.errors.iter().any(|e| e.starts_with("dhcpv6.listen")));
    }

    #[test]
    fn test_unicast_servers_warn() {
        let mut config = make_config();
        config.dhcpv4.server = "192.168.1.1:67".parse().unwrap();
        config.dhcpv6.server = "[2001:db8::1]:547".parse().unwrap();
        let result = validate(&config);
        assert!(!result.has_errors());
        assert_eq!(result.warnings.len(), 2);
    }

    #[test]
    fn test_unknown_logging() {
        let mut config = make_config();
        config.logging.level = "loud".into();
        config.logging.format = "xml".into();
        let result = validate(&config);
        assert_eq!(result.warnings.len(), 2);
    }
}
