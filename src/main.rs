use clap::{Parser, Subcommand};
use ruster_dhcp::client::{Client4, Client6};
use ruster_dhcp::config;
use ruster_dhcp::protocol::{dhcpv4, dhcpv6};
use ruster_dhcp::telemetry::{init_logging, ClientMetrics};
use std::path::PathBuf;
use tokio::runtime::Runtime;
use tracing::info;

#[derive(Parser)]
#[command(name = "ruster-dhcp")]
#[command(about = "DHCPv4/DHCPv6 client and message decoder")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Obtain a DHCPv4 lease (DISCOVER/OFFER/REQUEST/ACK)
    Lease4 {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Release the lease once it is acknowledged
        #[arg(long)]
        release: bool,
    },
    /// Obtain DHCPv6 addresses (SOLICIT/ADVERTISE/REQUEST/REPLY)
    Lease6 {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
    /// Decode a hex-encoded DHCPv4 message
    Decode4 {
        /// Message bytes as hex, separators allowed
        hex: String,
    },
    /// Decode a hex-encoded DHCPv6 message
    Decode6 {
        /// Message bytes as hex, separators allowed
        hex: String,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Generate config.lock from config.toml
    Generate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,

        /// Output path for config.lock
        #[arg(short, long, default_value = "config.lock")]
        output: PathBuf,
    },
    /// Validate config.toml without generating lock file
    Validate {
        /// Path to config.toml
        #[arg(short, long, default_value = "config.toml")]
        config: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Config { action } => {
            init_logging(None);
            match action {
                ConfigAction::Generate { config, output } => cmd_config_generate(&config, &output),
                ConfigAction::Validate { config } => cmd_config_validate(&config),
            }
        }
        Commands::Lease4 { config, release } => cmd_lease4(&config, release),
        Commands::Lease6 { config } => cmd_lease6(&config),
        Commands::Decode4 { hex } => cmd_decode4(&hex),
        Commands::Decode6 { hex } => cmd_decode6(&hex),
    };

    if let Err(e) = result {
        eprintln!("[ERROR] {}", e);
        std::process::exit(1);
    }
}

/// Loads and validates a config, then installs logging from it.
fn load_config(config_path: &PathBuf) -> Result<config::Config, String> {
    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();
    if validation.has_errors() {
        return Err("Validation failed with errors".to_string());
    }

    init_logging(Some(&cfg.logging));
    Ok(cfg)
}

fn cmd_lease4(config_path: &PathBuf, release: bool) -> Result<(), String> {
    let cfg = load_config(config_path)?;
    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;

    rt.block_on(async move {
        let client = Client4::bind(&cfg)
            .await
            .map_err(|e| format!("Failed to start DHCPv4 client: {}", e))?;
        info!("Requesting lease for {}...", client.hw_addr());

        let result = client.request(&[]).await;
        let outcome = match result {
            Ok(lease) => {
                println!("{}", lease.ack.summary());
                println!("[INFO] Leased {}", lease.address());
                if let Some(t) = lease.lease_time() {
                    println!("[INFO] Lease time {}s", t.as_secs());
                }
                if release {
                    client
                        .release(&lease)
                        .await
                        .map_err(|e| format!("Release failed: {}", e))?;
                    println!("[INFO] Released {}", lease.address());
                }
                Ok(())
            }
            Err(e) => Err(format!("DHCPv4 exchange failed: {}", e)),
        };

        print_metrics(&client.metrics());
        client.close().await;
        outcome
    })
}

fn cmd_lease6(config_path: &PathBuf) -> Result<(), String> {
    let cfg = load_config(config_path)?;
    let rt = Runtime::new().map_err(|e| format!("Failed to create runtime: {}", e))?;

    rt.block_on(async move {
        let client = Client6::bind(&cfg)
            .await
            .map_err(|e| format!("Failed to start DHCPv6 client: {}", e))?;
        info!("Soliciting as {}...", client.duid());

        let outcome = match client.lease(&[]).await {
            Ok(reply) => {
                println!("{}", reply.summary());
                Ok(())
            }
            Err(e) => Err(format!("DHCPv6 exchange failed: {}", e)),
        };

        print_metrics(&client.metrics());
        client.close().await;
        outcome
    })
}

fn cmd_decode4(hex: &str) -> Result<(), String> {
    let bytes = parse_hex(hex)?;
    let msg = dhcpv4::Message::from_bytes(&bytes).map_err(|e| e.to_string())?;
    println!("{}", msg.summary());
    Ok(())
}

fn cmd_decode6(hex: &str) -> Result<(), String> {
    let bytes = parse_hex(hex)?;
    let msg = dhcpv6::Dhcpv6::from_bytes(&bytes).map_err(|e| e.to_string())?;
    println!("{}", msg.summary());
    Ok(())
}

/// Accepts `0a1b..`, `0a:1b:..` and whitespace-separated forms.
fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: String = input
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ':' && *c != '-')
        .collect();
    hex::decode(digits).map_err(|e| format!("Invalid hex input: {}", e))
}

fn print_metrics(metrics: &ClientMetrics) {
    for (name, value) in metrics.export() {
        println!("[METRIC] {} = {}", name, value);
    }
}

fn cmd_config_generate(config_path: &PathBuf, output_path: &PathBuf) -> Result<(), String> {
    println!("[INFO] Loading {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        return Err("Validation failed with errors".to_string());
    }

    let lock = config::generate_lock(&cfg);

    let lock_toml =
        toml::to_string_pretty(&lock).map_err(|e| format!("Failed to serialize lock: {}", e))?;

    // Add header comment
    let output = format!(
        "# Generated by ruster-dhcp - DO NOT EDIT\n# Source: {}\n\n{}",
        config_path.display(),
        lock_toml
    );

    std::fs::write(output_path, output).map_err(|e| format!("Failed to write lock file: {}", e))?;

    println!("[INFO] Generated {}", output_path.display());
    Ok(())
}

fn cmd_config_validate(config_path: &PathBuf) -> Result<(), String> {
    println!("[INFO] Validating {}...", config_path.display());

    let cfg = config::load(config_path).map_err(|e| format!("Failed to parse config: {}", e))?;

    let validation = config::validate(&cfg);
    validation.print_diagnostics();

    if validation.has_errors() {
        Err("Validation failed".to_string())
    } else {
        println!("[INFO] Configuration is valid");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_separators() {
        assert_eq!(parse_hex("0a1b").unwrap(), vec![0x0a, 0x1b]);
        assert_eq!(parse_hex("0A:1b-2c 3d\n").unwrap(), vec![0x0a, 0x1b, 0x2c, 0x3d]);
        assert!(parse_hex("").unwrap().is_empty());
    }

    #[test]
    fn test_parse_hex_rejects_bad_input() {
        assert!(parse_hex("abc").is_err());
        assert!(parse_hex("zz").is_err());
        assert!(parse_hex("0\u{e9}").is_err());
    }
}
