use crate::util::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Transport a server is reached over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Plain TCP, written `t`
    Tcp,
    /// TLS, written `s`
    Ssl,
}

impl Protocol {
    pub fn letter(self) -> char {
        match self {
            Protocol::Tcp => 't',
            Protocol::Ssl => 's',
        }
    }
}

/// Server identity in `host:port:protocol` form
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ServerAddr {
    pub host: String,
    pub port: u16,
    pub protocol: Protocol,
}

impl ServerAddr {
    pub fn new(host: &str, port: u16, protocol: Protocol) -> ServerAddr {
        ServerAddr {
            host: host.to_string(),
            port,
            protocol,
        }
    }

    /// Parses `host:port:protocol`
    ///
    /// The host may itself contain colons, so the string is split from the right.
    pub fn parse(s: &str) -> Result<ServerAddr> {
        let mut parts = s.rsplitn(3, ':');
        let protocol = match parts.next() {
            Some("t") => Protocol::Tcp,
            Some("s") => Protocol::Ssl,
            _ => return Err(Error::BadArgument(format!("Bad protocol in {:?}", s))),
        };
        let port: u16 = match parts.next() {
            Some(port) => port.parse()?,
            None => return Err(Error::BadArgument(format!("Missing port in {:?}", s))),
        };
        let host = match parts.next() {
            Some(host) if !host.is_empty() => host,
            _ => return Err(Error::BadArgument(format!("Missing host in {:?}", s))),
        };
        Ok(ServerAddr::new(host, port, protocol))
    }
}

impl FromStr for ServerAddr {
    type Err = Error;

    fn from_str(s: &str) -> Result<ServerAddr> {
        ServerAddr::parse(s)
    }
}

impl fmt::Display for ServerAddr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}:{}:{}", self.host, self.port, self.protocol.letter())
    }
}
