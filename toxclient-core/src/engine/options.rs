//! Engine creation options

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClientError;

/// Proxy protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProxyKind {
    Socks5,
    Http,
}

impl ProxyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyKind::Socks5 => "socks5",
            ProxyKind::Http => "http",
        }
    }
}

/// A parsed `[scheme://]host:port` proxy address
///
/// Accepted schemes are `socks`, `socks5` and `http`; a missing scheme
/// means SOCKS5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyAddress {
    pub kind: ProxyKind,
    pub host: String,
    pub port: u16,
}

impl FromStr for ProxyAddress {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |why: &str| ClientError::InvalidArgument(format!("proxy '{}': {}", s, why));

        let (kind, rest) = match s.split_once("://") {
            Some((scheme, rest)) => {
                let kind = match scheme.to_ascii_lowercase().as_str() {
                    "socks" | "socks5" => ProxyKind::Socks5,
                    "http" => ProxyKind::Http,
                    _ => return Err(invalid("unsupported scheme")),
                };
                (kind, rest)
            }
            None => (ProxyKind::Socks5, s),
        };

        let (host, port) = rest.rsplit_once(':').ok_or_else(|| invalid("missing port"))?;
        let host = host.trim_start_matches('[').trim_end_matches(']');
        if host.is_empty() || host.contains('/') || host.chars().any(char::is_whitespace) {
            return Err(invalid("bad host"));
        }
        let port: u16 = port.parse().map_err(|_| invalid("bad port"))?;
        if port == 0 {
            return Err(invalid("port must be non-zero"));
        }

        Ok(ProxyAddress {
            kind,
            host: host.to_string(),
            port,
        })
    }
}

impl fmt::Display for ProxyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.host.contains(':') {
            write!(f, "{}://[{}]:{}", self.kind.as_str(), self.host, self.port)
        } else {
            write!(f, "{}://{}:{}", self.kind.as_str(), self.host, self.port)
        }
    }
}

/// Options handed to [`EngineFactory::create`](super::EngineFactory::create)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineOptions {
    pub enable_ipv6: bool,
    pub enable_udp: bool,
    pub proxy: Option<ProxyAddress>,
    pub enable_av: bool,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            enable_ipv6: true,
            enable_udp: true,
            proxy: None,
            enable_av: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_socks_proxy() {
        let proxy: ProxyAddress = "socks://127.0.0.1:9000".parse().unwrap();
        assert_eq!(proxy.kind, ProxyKind::Socks5);
        assert_eq!(proxy.host, "127.0.0.1");
        assert_eq!(proxy.port, 9000);
        assert_eq!(proxy.to_string(), "socks5://127.0.0.1:9000");
    }

    #[test]
    fn test_parse_without_scheme_and_ipv6() {
        let proxy: ProxyAddress = "localhost:1080".parse().unwrap();
        assert_eq!(proxy.kind, ProxyKind::Socks5);

        let proxy: ProxyAddress = "http://[::1]:8080".parse().unwrap();
        assert_eq!(proxy.kind, ProxyKind::Http);
        assert_eq!(proxy.host, "::1");
        assert_eq!(proxy.to_string(), "http://[::1]:8080");
    }

    #[test]
    fn test_malformed_proxies_are_invalid_arguments() {
        for bad in [
            "ftp://127.0.0.1:21",
            "127.0.0.1",
            "socks://:9000",
            "socks://127.0.0.1:notaport",
            "socks://127.0.0.1:0",
            "socks://127.0.0.1:70000",
        ] {
            let err = bad.parse::<ProxyAddress>().unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidArgument(_)),
                "{} should be rejected",
                bad
            );
        }
    }

    #[test]
    fn test_default_options() {
        let opts = EngineOptions::default();
        assert!(opts.enable_ipv6);
        assert!(opts.enable_udp);
        assert!(opts.enable_av);
        assert!(opts.proxy.is_none());
    }
}
