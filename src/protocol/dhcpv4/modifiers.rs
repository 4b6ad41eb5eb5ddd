//! Message modifiers applied after a constructor has filled in its defaults

use super::option::{self, DhcpOption};
use super::{Message, MessageType, OptionCode, TransactionId};
use crate::protocol::MacAddr;
use std::net::Ipv4Addr;

/// A change applied to a message under construction
pub type Modifier = Box<dyn Fn(&mut Message) + Send + Sync>;

pub fn with_option(opt: DhcpOption) -> Modifier {
    Box::new(move |m| m.update_option(opt.clone()))
}

pub fn with_message_type(t: MessageType) -> Modifier {
    with_option(option::message_type(t))
}

pub fn with_broadcast(broadcast: bool) -> Modifier {
    Box::new(move |m| {
        if broadcast {
            m.set_broadcast()
        } else {
            m.set_unicast()
        }
    })
}

pub fn with_hw_addr(hw_addr: MacAddr) -> Modifier {
    Box::new(move |m| m.client_hw_addr = hw_addr.0.to_vec())
}

pub fn with_client_ip(ip: Ipv4Addr) -> Modifier {
    Box::new(move |m| m.client_ip = ip)
}

pub fn with_transaction_id(xid: TransactionId) -> Modifier {
    Box::new(move |m| m.transaction_id = xid)
}

/// Adds codes to the Parameter Request List, keeping existing entries.
pub fn with_requested_options(codes: &[OptionCode]) -> Modifier {
    let codes = codes.to_vec();
    Box::new(move |m| {
        let mut list = m.parameter_request_list();
        for code in &codes {
            if !list.contains(code) {
                list.push(*code);
            }
        }
        m.update_option(option::parameter_request_list(&list));
    })
}
