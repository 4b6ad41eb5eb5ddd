//! Ordered DHCPv6 option list

use super::message::Dhcpv6;
use super::option::{decode_option, DhcpOption};
use super::types::OptionCode;
use crate::protocol::buffer::Reader;
use crate::{Error, Result};
use std::fmt;

/// Options in wire order. Duplicate codes are allowed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(Vec<DhcpOption>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a sequence of `{code:u16, len:u16, value}` records.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::decode(data, 0)
    }

    /// `nesting` counts the IA containers already entered.
    pub(crate) fn decode(data: &[u8], nesting: usize) -> Result<Self> {
        let mut r = Reader::new(data, "DHCPv6 option");
        let mut options = Vec::new();
        while !r.is_empty() {
            let code = OptionCode(r.u16()?);
            let len = r.u16()? as usize;
            let value = r.bytes(len)?;
            options.push(decode_option(code, value, nesting)?);
        }
        Ok(Options(options))
    }

    /// Decodes the options of one relay layer.
    ///
    /// The Relay-Message value is left undecoded and returned with the
    /// position it held, so the caller can walk the chain without recursing.
    pub(crate) fn decode_relay(data: &[u8]) -> Result<(Self, Option<(usize, &[u8])>)> {
        let mut r = Reader::new(data, "DHCPv6 option");
        let mut options = Vec::new();
        let mut relayed = None;
        while !r.is_empty() {
            let code = OptionCode(r.u16()?);
            let len = r.u16()? as usize;
            let value = r.bytes(len)?;
            if code != OptionCode::RELAY_MSG {
                options.push(decode_option(code, value, 0)?);
                continue;
            }
            if relayed.is_some() {
                return Err(Error::InvalidPacket(
                    "relay message carries more than one Relay Message option".into(),
                ));
            }
            relayed = Some((options.len(), value));
        }
        Ok((Options(options), relayed))
    }

    /// All options with `code`, in order.
    pub fn get(&self, code: OptionCode) -> Vec<&DhcpOption> {
        self.0.iter().filter(|o| o.code() == code).collect()
    }

    pub fn get_one(&self, code: OptionCode) -> Option<&DhcpOption> {
        self.0.iter().find(|o| o.code() == code)
    }

    pub fn has(&self, code: OptionCode) -> bool {
        self.get_one(code).is_some()
    }

    pub fn add(&mut self, opt: DhcpOption) {
        self.0.push(opt);
    }

    /// Replaces the first option with the same code, or appends.
    pub fn update(&mut self, opt: DhcpOption) {
        let code = opt.code();
        match self.0.iter_mut().find(|o| o.code() == code) {
            Some(slot) => *slot = opt,
            None => self.0.push(opt),
        }
    }

    pub fn del(&mut self, code: OptionCode) {
        self.0.retain(|o| o.code() != code);
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DhcpOption> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn insert(&mut self, index: usize, opt: DhcpOption) {
        let index = index.min(self.0.len());
        self.0.insert(index, opt);
    }

    /// Message carried by the first Relay-Message option.
    pub(crate) fn first_relayed(&self) -> Option<&Dhcpv6> {
        self.0.iter().find_map(|o| match o {
            DhcpOption::RelayMsg(inner) => Some(&**inner),
            _ => None,
        })
    }

    /// Removes every Relay-Message option, keeping the rest in order.
    pub(crate) fn take_relayed(&mut self) -> Vec<Box<Dhcpv6>> {
        let mut relayed = Vec::new();
        let mut kept = Vec::with_capacity(self.0.len());
        for opt in self.0.drain(..) {
            match opt {
                DhcpOption::RelayMsg(inner) => relayed.push(inner),
                other => kept.push(other),
            }
        }
        self.0 = kept;
        relayed
    }

    /// Appends the wire encoding. Values longer than 65535 bytes are truncated.
    pub fn marshal(&self, buf: &mut Vec<u8>) {
        for opt in &self.0 {
            put(buf, opt.code(), &opt.to_bytes());
        }
    }

    /// Like [`Options::marshal`], but writes `relayed` as the value of the
    /// first Relay-Message option instead of encoding it again.
    pub(crate) fn marshal_relayed(&self, buf: &mut Vec<u8>, mut relayed: Option<&[u8]>) {
        for opt in &self.0 {
            match (opt, relayed) {
                (DhcpOption::RelayMsg(_), Some(value)) => {
                    put(buf, opt.code(), value);
                    relayed = None;
                }
                _ => put(buf, opt.code(), &opt.to_bytes()),
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.marshal(&mut buf);
        buf
    }

    /// Single-line rendering used inside IA summaries.
    pub(crate) fn inline(&self) -> String {
        let opts: Vec<String> = self.0.iter().map(|o| o.to_string()).collect();
        format!("options=[{}]", opts.join("; "))
    }
}

fn put(buf: &mut Vec<u8>, code: OptionCode, value: &[u8]) {
    let len = value.len().min(u16::MAX as usize);
    buf.extend_from_slice(&code.0.to_be_bytes());
    buf.extend_from_slice(&(len as u16).to_be_bytes());
    buf.extend_from_slice(&value[..len]);
}

impl FromIterator<DhcpOption> for Options {
    fn from_iter<I: IntoIterator<Item = DhcpOption>>(iter: I) -> Self {
        Options(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a Options {
    type Item = &'a DhcpOption;
    type IntoIter = std::slice::Iter<'a, DhcpOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for opt in &self.0 {
            writeln!(f, "    {opt}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::dhcpv6::Duid;
    use crate::protocol::MacAddr;
    use std::time::Duration;

    fn sample() -> Options {
        [
            DhcpOption::ClientId(Duid::from_mac(&MacAddr([1, 2, 3, 4, 5, 6]))),
            DhcpOption::ElapsedTime(Duration::ZERO),
            DhcpOption::Oro(vec![OptionCode::DNS_RECURSIVE_NAME_SERVER]),
            DhcpOption::Generic {
                code: OptionCode(500),
                data: vec![],
            },
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_roundtrip_preserves_order() {
        let opts = sample();
        let bytes = opts.to_bytes();
        // Elapsed Time follows the 14-byte Client ID record
        assert_eq!(&bytes[14..20], &[0, 8, 0, 2, 0, 0]);
        let parsed = Options::from_bytes(&bytes).unwrap();
        assert_eq!(parsed, opts);
        let codes: Vec<u16> = parsed.iter().map(|o| o.code().0).collect();
        assert_eq!(codes, vec![1, 8, 6, 500]);
    }

    #[test]
    fn test_truncated_records() {
        assert!(Options::from_bytes(&[]).unwrap().is_empty());
        assert!(Options::from_bytes(&[0, 1, 0]).is_err());
        assert!(Options::from_bytes(&[0, 99, 0, 4, 1, 2]).is_err());
        // One good record, then a dangling header byte
        assert!(Options::from_bytes(&[0, 99, 0, 1, 7, 0]).is_err());
    }

    #[test]
    fn test_mutators() {
        let mut opts = sample();
        opts.add(DhcpOption::Preference(1));
        opts.add(DhcpOption::Preference(2));
        assert_eq!(opts.get(OptionCode::PREFERENCE).len(), 2);

        opts.update(DhcpOption::Preference(9));
        assert_eq!(
            opts.get(OptionCode::PREFERENCE),
            vec![&DhcpOption::Preference(9), &DhcpOption::Preference(2)]
        );
        assert_eq!(opts.get_one(OptionCode::PREFERENCE), Some(&DhcpOption::Preference(9)));

        opts.update(DhcpOption::RapidCommit);
        assert!(opts.has(OptionCode::RAPID_COMMIT));

        opts.del(OptionCode::PREFERENCE);
        assert!(!opts.has(OptionCode::PREFERENCE));
        let codes: Vec<u16> = opts.iter().map(|o| o.code().0).collect();
        assert_eq!(codes, vec![1, 8, 6, 500, 14]);
    }

    #[test]
    fn test_oversized_value_truncated() {
        let mut opts = Options::new();
        opts.add(DhcpOption::InterfaceId(vec![7; 70_000]));
        let bytes = opts.to_bytes();
        assert_eq!(&bytes[2..4], &[0xff, 0xff]);
        assert_eq!(bytes.len(), 4 + 65_535);
    }

    #[test]
    fn test_relay_msg_only_in_relay_layers() {
        let record = [0, 9, 0, 4, 1, 0xab, 0xcd, 0xef];
        let err = Options::from_bytes(&record).unwrap_err();
        assert!(err.is_decode());

        let mut data = vec![0, 18, 0, 1, b'x'];
        data.extend_from_slice(&record);
        let (opts, relayed) = Options::decode_relay(&data).unwrap();
        assert_eq!(opts.len(), 1);
        assert_eq!(relayed, Some((1, &[1, 0xab, 0xcd, 0xef][..])));

        data.extend_from_slice(&record);
        assert!(Options::decode_relay(&data).is_err());
    }
}
