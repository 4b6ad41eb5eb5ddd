use std::io;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config error: {0}")]
    Config(String),

    /// Truncated buffers, bad lengths, bad DUIDs.
    #[error("parse error: {0}")]
    Parse(String),

    /// Decodable but illegal on the wire (bad magic cookie, data after End).
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    #[error("missing required option: {0}")]
    MissingOption(&'static str),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("no matching response packet received")]
    NoResponse,

    #[error("transaction ID {0} already in use")]
    TransactionInUse(String),

    #[error("client closed")]
    Closed,

    #[error("random source failed: {0}")]
    Random(String),
}

impl Error {
    /// Malformed input surfaced by a decoder.
    pub fn is_decode(&self) -> bool {
        matches!(self, Error::Parse(_) | Error::InvalidPacket(_))
    }

    /// Missing option or wrong message type while deriving a message.
    pub fn is_protocol(&self) -> bool {
        matches!(self, Error::MissingOption(_) | Error::Protocol(_))
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::NoResponse)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classes() {
        assert!(Error::Parse("short".into()).is_decode());
        assert!(Error::InvalidPacket("cookie".into()).is_decode());
        assert!(Error::MissingOption("Server ID").is_protocol());
        assert!(Error::NoResponse.is_timeout());
        assert!(!Error::Closed.is_timeout());

        let io: Error = io::Error::new(io::ErrorKind::Other, "boom").into();
        assert!(!io.is_decode() && !io.is_protocol());
    }

    #[test]
    fn test_no_response_message() {
        assert_eq!(
            Error::NoResponse.to_string(),
            "no matching response packet received"
        );
    }
}
