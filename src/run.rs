//! One-shot pipeline: collect specs, resolve, merge, emit.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use ipnet::IpNet;
use tracing::{info, warn};

use crate::document::ConfigDocument;
use crate::endpoints::EndpointsClient;
use crate::error::VpnRoutesError;
use crate::fs_abstraction::FileSystem;
use crate::resolver::HostResolver;
use crate::routeset::{self, BuildOptions};
use crate::sources;
use crate::writer::{self, OutputMode};

/// Pseudo-path selecting stdin as the target document.
pub const STDIN_FILE: &str = "-";

/// Everything one run needs beyond its injected collaborators.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Target config path, or `-` for stdin.
    pub file: String,
    pub extra_route_files: Vec<PathBuf>,
    pub inline_routes: Vec<String>,
    /// Service instance to pull published endpoint ranges for.
    pub endpoints_instance: Option<String>,
    pub in_place: bool,
    pub include_ipv4: bool,
    pub include_ipv6: bool,
    pub strict: bool,
    pub aggregate: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            file: STDIN_FILE.to_string(),
            extra_route_files: Vec::new(),
            inline_routes: Vec::new(),
            endpoints_instance: None,
            in_place: false,
            include_ipv4: true,
            include_ipv6: true,
            strict: false,
            aggregate: false,
        }
    }
}

/// What a run produced, for the caller's summary.
#[derive(Debug)]
pub struct RunReport {
    /// The merged document in stdout mode, `None` after an in-place write.
    pub rendered: Option<String>,
    pub route_count: usize,
    pub warning_count: usize,
}

/// Execute one update run.
///
/// Stages, in order: parse every address source (fatal on malformed
/// entries), read and scan the target document (fatal on damaged markers),
/// resolve hostnames one at a time, optionally pull endpoint ranges, build
/// the canonical route set, splice it into the document, and emit. Nothing
/// is written until every fallible stage has passed.
pub async fn run(
    options: &RunOptions,
    fs: &dyn FileSystem,
    resolver: &dyn HostResolver,
) -> Result<RunReport> {
    let specs = sources::collect_specs(fs, &options.inline_routes, &options.extra_route_files)?;

    let (text, mode) = if options.file == STDIN_FILE {
        if options.in_place {
            anyhow::bail!("cannot rewrite stdin in place; omit --in-place or give a file path");
        }
        (read_stdin()?, OutputMode::Stdout)
    } else {
        let path = PathBuf::from(&options.file);
        let text = fs
            .read_to_string(&path)
            .map_err(|source| VpnRoutesError::Io {
                path: path.clone(),
                source,
            })?;
        let mode = if options.in_place {
            OutputMode::InPlace(path)
        } else {
            OutputMode::Stdout
        };
        (text, mode)
    };

    let mut document = ConfigDocument::parse(&text);
    // Marker damage must surface before any resolution work happens.
    document.managed_span()?;

    let mut extra: Vec<IpNet> = Vec::new();
    if let Some(instance) = &options.endpoints_instance {
        let client = EndpointsClient::new()?;
        extra = client
            .fetch(instance)
            .await
            .map_err(|e| VpnRoutesError::EndpointFetch {
                instance: instance.clone(),
                reason: format!("{e:#}"),
            })?;
    }

    let build_options = BuildOptions {
        include_ipv4: options.include_ipv4,
        include_ipv6: options.include_ipv6,
        strict: options.strict,
    };
    let outcome = routeset::build(&specs, &extra, resolver, build_options).await?;

    for warning in &outcome.warnings {
        warn!("{}", warning);
    }
    info!(
        "{} routes ({} IPv4, {} IPv6), {} duplicates dropped, {} filtered by family",
        outcome.routes.len(),
        outcome.stats.ipv4,
        outcome.stats.ipv6,
        outcome.stats.duplicates,
        outcome.stats.filtered
    );

    let routes = if options.aggregate {
        let merged = routeset::aggregate(&outcome.routes);
        info!(
            "Aggregated {} routes into {}",
            outcome.routes.len(),
            merged.len()
        );
        merged
    } else {
        outcome.routes
    };

    let route_count = routes.len();
    document.merge_routes(&routes)?;

    let rendered = writer::emit(fs, &mode, document.render())?;
    if rendered.is_none() {
        info!("{} routes written to {}", route_count, options.file);
    }

    Ok(RunReport {
        rendered,
        route_count,
        warning_count: outcome.warnings.len(),
    })
}

fn read_stdin() -> Result<String> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("Failed to read configuration from stdin")?;
    Ok(text)
}
