//! DHCPv4 options collection
//!
//! Options are keyed by code. Repeated records with the same code are
//! concatenated on decode and values longer than 255 bytes are split back
//! into several records on encode (RFC 3396). Encoding is sorted by code.

use super::option::{self, DhcpOption};
use super::types::OptionCode;
use crate::{Error, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Longest value a single TLV record can carry
pub const MAX_RECORD_LEN: usize = 255;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options(BTreeMap<u8, Vec<u8>>);

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses options without requiring an End option (e.g. vendor sub-options).
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_check_end(data, false)
    }

    /// Parses a TLV option block.
    ///
    /// Parsing stops at End; only Pad bytes may follow it. With `check_end`,
    /// a non-empty block that never reaches End is rejected.
    pub fn from_bytes_check_end(data: &[u8], check_end: bool) -> Result<Self> {
        let mut opts = Options::new();
        let mut pos = 0;
        let mut end = false;

        while pos < data.len() {
            let code = data[pos];
            pos += 1;

            match OptionCode(code) {
                OptionCode::PAD => continue,
                OptionCode::END => {
                    end = true;
                    break;
                }
                _ => {}
            }

            let len = *data.get(pos).ok_or_else(|| {
                Error::Parse(format!("option {} missing length byte", code))
            })? as usize;
            pos += 1;

            let value = data.get(pos..pos + len).ok_or_else(|| {
                Error::Parse(format!(
                    "option {} claims {} bytes, {} remain",
                    code,
                    len,
                    data.len() - pos
                ))
            })?;
            pos += len;

            opts.0.entry(code).or_default().extend_from_slice(value);
        }

        if check_end && !end && !data.is_empty() {
            return Err(Error::InvalidPacket("options missing End option".into()));
        }

        // Trailing Pad and End bytes both count as padding
        if data[pos..]
            .iter()
            .any(|&b| b != OptionCode::PAD.0 && b != OptionCode::END.0)
        {
            return Err(Error::InvalidPacket("data after End option".into()));
        }

        Ok(opts)
    }

    pub fn get(&self, code: OptionCode) -> Option<&[u8]> {
        self.0.get(&code.0).map(Vec::as_slice)
    }

    pub fn has(&self, code: OptionCode) -> bool {
        self.0.contains_key(&code.0)
    }

    /// Replaces any existing value for the option's code.
    pub fn update(&mut self, opt: DhcpOption) {
        self.0.insert(opt.code.0, opt.value);
    }

    /// Appends to an existing value, as repeated records on the wire would.
    pub fn add(&mut self, opt: DhcpOption) {
        self.0.entry(opt.code.0).or_default().extend(opt.value);
    }

    pub fn del(&mut self, code: OptionCode) {
        self.0.remove(&code.0);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Options in ascending code order
    pub fn iter(&self) -> impl Iterator<Item = (OptionCode, &[u8])> {
        self.0.iter().map(|(&c, v)| (OptionCode(c), v.as_slice()))
    }

    /// Writes TLV records without a trailing End option.
    pub fn marshal(&self, buf: &mut Vec<u8>) {
        for (&code, value) in &self.0 {
            if code == OptionCode::PAD.0 || code == OptionCode::END.0 {
                continue;
            }
            if value.is_empty() {
                buf.extend_from_slice(&[code, 0]);
                continue;
            }
            for chunk in value.chunks(MAX_RECORD_LEN) {
                buf.push(code);
                buf.push(chunk.len() as u8);
                buf.extend_from_slice(chunk);
            }
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.marshal(&mut buf);
        buf
    }
}

impl FromIterator<DhcpOption> for Options {
    fn from_iter<I: IntoIterator<Item = DhcpOption>>(iter: I) -> Self {
        let mut opts = Options::new();
        for opt in iter {
            opts.update(opt);
        }
        opts
    }
}

impl fmt::Display for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (code, value) in self.iter() {
            writeln!(f, "    {}: {}", code, option::format_value(code, value))?;
        }
        Ok(())
    }
}
