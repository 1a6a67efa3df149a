//! # vpnroutes - Route Directive Updater for OpenVPN Client Configs
//!
//! A tool for maintaining split-tunnel route directives in OpenVPN client
//! configs. Hostnames and CIDR blocks go in, a deterministic managed block
//! of `route`/`route-ipv6` directives comes out, and everything else in the
//! config file stays byte-for-byte untouched.
//!
//! ## Features
//!
//! - **Deterministic Output** - Routes are normalized, deduplicated and
//!   canonically ordered, so reruns never reshuffle the managed block
//! - **Non-Intrusive** - Only the text between the two sentinel comments is
//!   ever rewritten; damaged sentinels abort before any write
//! - **Hostname Support** - DNS resolution with timeout, both families,
//!   unresolvable hosts skipped with a warning (fatal under `--strict`)
//! - **Atomic Writes** - In-place updates go through a temp file and rename,
//!   a crash never leaves a truncated config
//! - **Endpoint Ranges** - Published service endpoint ranges can be pulled
//!   over HTTPS and merged alongside local routes
//! - **Aggregation** - Optional CIDR optimization collapses adjacent and
//!   contained networks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       vpnroutes                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CLI (clap)                                                 │
//! │    └── file argument, -r/-e sources, output flags           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Sources (address + sources)                                │
//! │    ├── Inline entries from the command line                 │
//! │    └── Extra-route files, one entry per line                │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Resolver (dns-lookup, HostResolver trait)                  │
//! │    └── Hostnames to addresses, 5s timeout                   │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Endpoints (reqwest + rustls)                               │
//! │    └── Published service ranges, retry with backoff         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  RouteSet (ipnet)                                           │
//! │    └── Normalized, deduplicated, canonically ordered        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Document (sentinel scan + splice)                          │
//! │    └── Managed block replaced, foreign bytes preserved      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Writer (tempfile)                                          │
//! │    └── Stdout, or atomic in-place rewrite                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example Usage
//!
//! ```no_run
//! use vpnroutes::fs_abstraction::real_fs;
//! use vpnroutes::resolver::SystemResolver;
//! use vpnroutes::run::{run, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let options = RunOptions {
//!         file: "/etc/openvpn/client.ovpn".to_string(),
//!         inline_routes: vec![
//!             "intranet.example.com".to_string(),
//!             "10.20.0.0/16".to_string(),
//!         ],
//!         in_place: true,
//!         ..RunOptions::default()
//!     };
//!
//!     let report = run(&options, real_fs(), &SystemResolver::new()).await?;
//!     println!("{} routes written", report.route_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Modules
//!
//! - [`address`] - Address spec parsing (hostname vs CIDR classification)
//! - [`cli`] - Command-line interface definitions
//! - [`document`] - Config document model, sentinel scan and block splice
//! - [`endpoints`] - HTTPS client for published endpoint ranges
//! - [`error`] - Error and warning types
//! - [`fs_abstraction`] - Filesystem trait for dependency injection
//! - [`resolver`] - DNS resolution behind a pluggable trait
//! - [`routeset`] - Canonical route set construction and aggregation
//! - [`run`] - One-shot pipeline orchestration
//! - [`sources`] - Collecting specs from inline arguments and files
//! - [`writer`] - Stdout and atomic in-place output

pub mod address;
pub mod cli;
pub mod document;
pub mod endpoints;
pub mod error;
pub mod fs_abstraction;
pub mod resolver;
pub mod routeset;
pub mod run;
pub mod sources;
pub mod writer;

pub use address::AddressSpec;
pub use cli::Cli;
pub use document::ConfigDocument;
pub use error::VpnRoutesError;
pub use routeset::RouteSet;
