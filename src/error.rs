//! Error types for vpnroutes.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::address::SpecOrigin;

#[derive(Error, Debug)]
pub enum VpnRoutesError {
    #[error("{origin}: malformed entry '{entry}': {reason}")]
    MalformedInput {
        origin: SpecOrigin,
        entry: String,
        reason: String,
    },

    #[error("cannot resolve host '{host}': {reason}")]
    UnresolvedHost { host: String, reason: String },

    #[error("config format error: {0}")]
    ConfigFormat(String),

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to fetch endpoint ranges for '{instance}': {reason}")]
    EndpointFetch { instance: String, reason: String },

    #[error("refusing to write empty output to {}", .path.display())]
    EmptyOutput { path: PathBuf },

    #[error("both address families are disabled")]
    NoFamiliesEnabled,
}

/// Non-fatal findings accumulated during a run.
///
/// Unlike [`VpnRoutesError`], warnings never abort: they are returned to the
/// caller alongside the result so the process can report them after the
/// output has been produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    UnresolvedHost {
        host: String,
        origin: SpecOrigin,
        reason: String,
    },
    EmptyRouteSet,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::UnresolvedHost {
                host,
                origin,
                reason,
            } => {
                write!(f, "skipping unresolved host '{host}' ({origin}): {reason}")
            }
            Warning::EmptyRouteSet => {
                write!(f, "route set is empty; the managed block will contain no directives")
            }
        }
    }
}
