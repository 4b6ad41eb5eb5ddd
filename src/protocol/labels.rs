//! RFC 1035 domain name lists as carried in DHCP options
//!
//! DHCPv6 domain search lists (RFC 3646) and the DHCPv4 domain search
//! option (RFC 3397) are a back-to-back sequence of encoded names. DHCPv6
//! forbids compression; DHCPv4 allows pointers relative to the option value.

use crate::{Error, Result};

/// Longest label RFC 1035 allows
const MAX_LABEL_LEN: usize = 63;

const MAX_JUMPS: usize = 128;

/// Whether compression pointers are accepted while decoding
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    Forbidden,
    Allowed,
}

/// Decodes every name in `data`.
pub fn parse_name_list(data: &[u8], compression: Compression) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let mut offset = 0;
    while offset < data.len() {
        let (name, next) = parse_name(data, offset, compression)?;
        names.push(name);
        offset = next;
    }
    Ok(names)
}

/// Decodes one name starting at `start`, returning it and the offset just past it.
pub fn parse_name(buffer: &[u8], start: usize, compression: Compression) -> Result<(String, usize)> {
    let mut labels: Vec<String> = Vec::new();
    let mut offset = start;
    let mut final_offset = None;
    let mut jumps = 0;

    loop {
        let len = *buffer
            .get(offset)
            .ok_or_else(|| Error::Parse("domain name truncated".into()))? as usize;

        if len == 0 {
            final_offset.get_or_insert(offset + 1);
            break;
        }

        if len & 0xC0 == 0xC0 {
            if compression == Compression::Forbidden {
                return Err(Error::Parse("compressed domain name not allowed".into()));
            }
            let low = *buffer
                .get(offset + 1)
                .ok_or_else(|| Error::Parse("domain name pointer truncated".into()))?;
            final_offset.get_or_insert(offset + 2);
            jumps += 1;
            if jumps > MAX_JUMPS {
                return Err(Error::Parse("domain name compression loop".into()));
            }
            offset = ((len & 0x3F) << 8) | low as usize;
            continue;
        }

        if len > MAX_LABEL_LEN {
            return Err(Error::Parse(format!("invalid label length {}", len)));
        }
        let label = buffer
            .get(offset + 1..offset + 1 + len)
            .ok_or_else(|| Error::Parse("domain label truncated".into()))?;
        let label = std::str::from_utf8(label)
            .map_err(|_| Error::Parse("domain label not valid UTF-8".into()))?;
        labels.push(label.to_string());
        offset += 1 + len;
    }

    let name = if labels.is_empty() {
        ".".to_string()
    } else {
        labels.join(".")
    };
    Ok((name, final_offset.unwrap_or(offset + 1)))
}

/// Encodes names without compression. Fails on a label over 63 bytes.
pub fn encode_name_list<S: AsRef<str>>(names: &[S]) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    for name in names {
        encode_name(name.as_ref(), &mut out)?;
    }
    Ok(out)
}

/// Appends `name` in label format. Nothing is written if a label is too long.
pub fn encode_name(name: &str, out: &mut Vec<u8>) -> Result<()> {
    if let Some(label) = labels_of(name).find(|l| l.len() > MAX_LABEL_LEN) {
        return Err(Error::Protocol(format!(
            "domain label {:?} is {} bytes, the limit is {}",
            label,
            label.len(),
            MAX_LABEL_LEN
        )));
    }
    write_name(name, out);
    Ok(())
}

/// Like [`encode_name_list`], but cuts labels over 63 bytes down to 63.
pub(crate) fn encode_name_list_truncated<S: AsRef<str>>(names: &[S]) -> Vec<u8> {
    let mut out = Vec::new();
    for name in names {
        write_name(name.as_ref(), &mut out);
    }
    out
}

fn labels_of(name: &str) -> impl Iterator<Item = &str> {
    name.trim_end_matches('.').split('.').filter(|l| !l.is_empty())
}

fn write_name(name: &str, out: &mut Vec<u8>) {
    for label in labels_of(name) {
        let bytes = &label.as_bytes()[..label.len().min(MAX_LABEL_LEN)];
        out.push(bytes.len() as u8);
        out.extend_from_slice(bytes);
    }
    out.push(0);
}
