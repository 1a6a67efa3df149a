//! Address spec parsing: hostnames and CIDR networks.

use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

use ipnet::IpNet;
use thiserror::Error;

/// Maximum total length of a DNS name (RFC 1035).
const MAX_HOSTNAME_LEN: usize = 253;
/// Maximum length of a single DNS label.
const MAX_LABEL_LEN: usize = 63;

/// One entry from a route list: either a name to resolve or a literal
/// network.
///
/// A token containing `/` must parse as a CIDR, since hostnames never
/// contain slashes. A bare IP address becomes a host network (/32 or /128).
/// Anything else must be a syntactically valid DNS name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressSpec {
    Hostname(String),
    Cidr(IpNet),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecParseError {
    #[error("invalid network: {0}")]
    InvalidNetwork(String),

    #[error("invalid hostname: {0}")]
    InvalidHostname(String),
}

impl FromStr for AddressSpec {
    type Err = SpecParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        if token.is_empty() {
            return Err(SpecParseError::InvalidHostname("empty entry".to_string()));
        }

        if token.contains('/') {
            return match token.parse::<IpNet>() {
                Ok(net) => Ok(AddressSpec::Cidr(net)),
                Err(e) => Err(SpecParseError::InvalidNetwork(format!("'{token}': {e}"))),
            };
        }

        if let Ok(addr) = token.parse::<IpAddr>() {
            return Ok(AddressSpec::Cidr(IpNet::from(addr)));
        }

        validate_hostname(token)?;
        // A trailing dot is the explicit DNS root; drop it before lookup.
        let name = token.strip_suffix('.').unwrap_or(token);
        Ok(AddressSpec::Hostname(name.to_string()))
    }
}

impl fmt::Display for AddressSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressSpec::Hostname(name) => f.write_str(name),
            AddressSpec::Cidr(net) => write!(f, "{net}"),
        }
    }
}

fn validate_hostname(token: &str) -> Result<(), SpecParseError> {
    let name = token.strip_suffix('.').unwrap_or(token);

    if name.is_empty() {
        return Err(SpecParseError::InvalidHostname("empty hostname".to_string()));
    }
    if !name.is_ascii() {
        return Err(SpecParseError::InvalidHostname(format!(
            "'{token}' contains non-ASCII characters"
        )));
    }
    if name.len() > MAX_HOSTNAME_LEN {
        return Err(SpecParseError::InvalidHostname(format!(
            "'{token}' exceeds {MAX_HOSTNAME_LEN} characters"
        )));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(SpecParseError::InvalidHostname(format!(
                "'{token}' contains an empty label"
            )));
        }
        if label.len() > MAX_LABEL_LEN {
            return Err(SpecParseError::InvalidHostname(format!(
                "label '{label}' exceeds {MAX_LABEL_LEN} characters"
            )));
        }
        if !label
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err(SpecParseError::InvalidHostname(format!(
                "label '{label}' contains characters outside [a-zA-Z0-9-]"
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(SpecParseError::InvalidHostname(format!(
                "label '{label}' starts or ends with a hyphen"
            )));
        }
    }

    Ok(())
}

/// Where an address spec came from, for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecOrigin {
    Inline,
    File { path: PathBuf, line: usize },
}

impl fmt::Display for SpecOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpecOrigin::Inline => f.write_str("command line"),
            SpecOrigin::File { path, line } => write!(f, "{}:{}", path.display(), line),
        }
    }
}
