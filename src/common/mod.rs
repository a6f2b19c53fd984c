//! Common utilities shared by the CLI and the session bridge

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

pub use error::{Error, Result};

/// Validate a `host:port` endpoint string
///
/// Only the shape is checked; the host is resolved when connecting.
pub fn parse_endpoint(endpoint: &str) -> Result<(&str, u16)> {
    let (host, port) = endpoint
        .rsplit_once(':')
        .ok_or_else(|| Error::InvalidEndpoint(endpoint.to_string()))?;

    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Err(Error::InvalidEndpoint(endpoint.to_string()));
    }

    let port = port
        .parse()
        .map_err(|_| Error::InvalidEndpoint(endpoint.to_string()))?;

    Ok((host, port))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoint() {
        assert_eq!(parse_endpoint("127.0.0.1:8989").unwrap(), ("127.0.0.1", 8989));
        assert_eq!(parse_endpoint("localhost:1").unwrap(), ("localhost", 1));
        assert_eq!(parse_endpoint("[::1]:9000").unwrap(), ("::1", 9000));
    }

    #[test]
    fn test_parse_endpoint_rejects_garbage() {
        assert!(parse_endpoint("localhost").is_err());
        assert!(parse_endpoint(":80").is_err());
        assert!(parse_endpoint("host:port").is_err());
        assert!(parse_endpoint("host:70000").is_err());
    }
}
