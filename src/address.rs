//! Parsing of D-Bus server addresses.
//!
//! A D-Bus address is a `;`-separated list of transport specifications, each
//! of the form `transport:key1=value1,key2=value2`. A client tries each
//! entry in order until one connects successfully.

use crate::error::{Error, ErrorKind, Result};
use crate::utils::percent_decode;

/// A single parsed transport entry out of a D-Bus address.
#[derive(Debug, Clone)]
pub(crate) enum Transport {
    /// `unix:path=...` or `unix:abstract=...`.
    Unix(UnixAddress),
    /// `tcp:host=...,port=...`.
    Tcp(TcpAddress),
}

/// A parsed `unix:` transport entry.
#[derive(Debug, Clone)]
pub(crate) struct UnixAddress {
    /// The socket path.
    ///
    /// Abstract sockets are represented with a leading NUL byte, matching
    /// the Linux `sockaddr_un` convention.
    pub(crate) path: Vec<u8>,
}

/// A parsed `tcp:` transport entry.
#[derive(Debug, Clone)]
pub(crate) struct TcpAddress {
    pub(crate) host: String,
    pub(crate) port: u16,
}

/// A fully parsed D-Bus server address.
#[derive(Debug, Clone)]
pub(crate) struct Address {
    pub(crate) transport: Transport,
    pub(crate) guid: Option<String>,
}

/// Parse a full D-Bus address string, consisting of `;`-separated entries.
///
/// Returns every entry that was successfully parsed, in order. Entries using
/// an unsupported transport (anything other than `unix:` or `tcp:`) are
/// skipped, matching the specification's guidance that clients should move
/// on to the next address in the list.
pub(crate) fn parse(address: &str) -> Result<Vec<Address>> {
    let mut out = Vec::new();

    for entry in address.split(';') {
        let entry = entry.trim();

        if entry.is_empty() {
            continue;
        }

        if let Some(parsed) = parse_entry(entry)? {
            out.push(parsed);
        }
    }

    if out.is_empty() {
        return Err(Error::new(ErrorKind::InvalidAddress));
    }

    Ok(out)
}

fn parse_entry(entry: &str) -> Result<Option<Address>> {
    let Some((transport, params)) = entry.split_once(':') else {
        return Err(Error::new(ErrorKind::InvalidAddress));
    };

    let mut path = None;
    let mut abstract_path = None;
    let mut host = None;
    let mut port = None;
    let mut guid = None;

    for pair in params.split(',') {
        if pair.is_empty() {
            continue;
        }

        let Some((key, value)) = pair.split_once('=') else {
            return Err(Error::new(ErrorKind::InvalidAddress));
        };

        let decoded = percent_decode(value.as_bytes()).ok_or(ErrorKind::InvalidAddress)?;

        match key {
            "path" => path = Some(decoded),
            "abstract" => abstract_path = Some(decoded),
            "host" => host = Some(String::from_utf8(decoded).map_err(|_| ErrorKind::InvalidAddress)?),
            "port" => {
                let s = String::from_utf8(decoded).map_err(|_| ErrorKind::InvalidAddress)?;
                port = Some(s.parse::<u16>().map_err(|_| ErrorKind::InvalidAddress)?);
            }
            "guid" => guid = Some(String::from_utf8(decoded).map_err(|_| ErrorKind::InvalidAddress)?),
            _ => {
                // Unknown keys are ignored, per the specification.
            }
        }
    }

    let transport = match transport {
        "unix" => {
            let path = if let Some(path) = path {
                path
            } else if let Some(abstract_path) = abstract_path {
                let mut full = Vec::with_capacity(abstract_path.len() + 1);
                full.push(0);
                full.extend_from_slice(&abstract_path);
                full
            } else {
                return Err(Error::new(ErrorKind::InvalidAddress));
            };

            Transport::Unix(UnixAddress { path })
        }
        "tcp" => {
            let (Some(host), Some(port)) = (host, port) else {
                return Err(Error::new(ErrorKind::InvalidAddress));
            };

            Transport::Tcp(TcpAddress { host, port })
        }
        _ => return Ok(None),
    };

    Ok(Some(Address { transport, guid }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_unix_path() {
        let addrs = parse("unix:path=/run/dbus/system_bus_socket").unwrap();
        assert_eq!(addrs.len(), 1);
        assert!(matches!(&addrs[0].transport, Transport::Unix(u) if u.path == b"/run/dbus/system_bus_socket"));
    }

    #[test]
    fn test_parse_unix_abstract() {
        let addrs = parse("unix:abstract=/tmp/dbus-123,guid=deadbeef").unwrap();
        assert_eq!(addrs.len(), 1);
        assert_eq!(addrs[0].guid.as_deref(), Some("deadbeef"));
        assert!(matches!(&addrs[0].transport, Transport::Unix(u) if u.path[0] == 0 && &u.path[1..] == b"/tmp/dbus-123"));
    }

    #[test]
    fn test_parse_tcp() {
        let addrs = parse("tcp:host=127.0.0.1,port=1234").unwrap();
        assert!(matches!(&addrs[0].transport, Transport::Tcp(t) if t.host == "127.0.0.1" && t.port == 1234));
    }

    #[test]
    fn test_parse_multiple_entries() {
        let addrs = parse("unix:path=/a;unix:path=/b").unwrap();
        assert_eq!(addrs.len(), 2);
    }

    #[test]
    fn test_percent_decoding() {
        let addrs = parse("unix:path=/tmp/has%20space").unwrap();
        assert!(matches!(&addrs[0].transport, Transport::Unix(u) if u.path == b"/tmp/has space"));
    }

    #[test]
    fn test_unsupported_transport_is_skipped() {
        let addrs = parse("launchd:env=FOO;unix:path=/a").unwrap();
        assert_eq!(addrs.len(), 1);
    }

    #[test]
    fn test_empty_address_is_error() {
        assert!(parse("").is_err());
    }
}
