//! Message modifiers for DHCPv6 constructors

use super::duid::Duid;
use super::ia::{IaAddress, IaNa};
use super::message::{Message, DEFAULT_IAID};
use super::option::DhcpOption;
use super::types::{ArchType, OptionCode};
use crate::Result;
use std::net::Ipv6Addr;
use std::time::Duration;

/// A change applied to a message under construction
pub type Modifier = Box<dyn Fn(&mut Message) + Send + Sync>;

pub fn with_option(opt: DhcpOption) -> Modifier {
    Box::new(move |m| m.update_option(opt.clone()))
}

pub fn with_client_id(duid: Duid) -> Modifier {
    with_option(DhcpOption::ClientId(duid))
}

pub fn with_server_id(duid: Duid) -> Modifier {
    with_option(DhcpOption::ServerId(duid))
}

pub fn with_ia_na(ia: IaNa) -> Modifier {
    with_option(DhcpOption::IaNa(ia))
}

/// Sets the IAID of the message's IA_NA, creating one if needed.
pub fn with_iaid(iaid: [u8; 4]) -> Modifier {
    Box::new(move |m| {
        let mut ia = m.ia_na().cloned().unwrap_or_else(default_ia_na);
        ia.iaid = iaid;
        m.update_option(DhcpOption::IaNa(ia));
    })
}

/// Adds an address hint to the message's IA_NA.
pub fn with_ia_address(addr: IaAddress) -> Modifier {
    Box::new(move |m| {
        let mut ia = m.ia_na().cloned().unwrap_or_else(default_ia_na);
        ia.options.add(DhcpOption::IaAddr(addr.clone()));
        m.update_option(DhcpOption::IaNa(ia));
    })
}

fn default_ia_na() -> IaNa {
    IaNa::new(DEFAULT_IAID, Duration::ZERO, Duration::ZERO)
}

pub fn with_rapid_commit() -> Modifier {
    with_option(DhcpOption::RapidCommit)
}

pub fn with_preference(pref: u8) -> Modifier {
    with_option(DhcpOption::Preference(pref))
}

/// Adds codes to the ORO, keeping existing entries.
pub fn with_requested_options(codes: &[OptionCode]) -> Modifier {
    let codes = codes.to_vec();
    Box::new(move |m| {
        let mut list = m.requested_options();
        for code in &codes {
            if !list.contains(code) {
                list.push(*code);
            }
        }
        m.update_option(DhcpOption::Oro(list));
    })
}

pub fn with_dns(servers: &[Ipv6Addr]) -> Modifier {
    with_option(DhcpOption::DnsServers(servers.to_vec()))
}

/// Fails if a label is longer than 63 bytes.
pub fn with_domain_search<S: AsRef<str>>(domains: &[S]) -> Result<Modifier> {
    Ok(with_option(DhcpOption::domain_search_list(domains)?))
}

/// Appends a user class, merging into an existing User Class option.
pub fn with_user_class(class: &[u8]) -> Modifier {
    let class = class.to_vec();
    Box::new(move |m| {
        let mut classes = match m.get_one_option(OptionCode::USER_CLASS) {
            Some(DhcpOption::UserClass(existing)) => existing.clone(),
            _ => Vec::new(),
        };
        classes.push(class.clone());
        m.update_option(DhcpOption::UserClass(classes));
    })
}

pub fn with_arch_type(arch: ArchType) -> Modifier {
    with_option(DhcpOption::ClientArchType(vec![arch]))
}

/// Requests the boot file URL and parameters.
pub fn with_netboot() -> Modifier {
    with_requested_options(&[OptionCode::BOOTFILE_URL, OptionCode::BOOTFILE_PARAM])
}
