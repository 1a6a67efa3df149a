//! Collecting address specs from inline arguments and extra-route files.

use std::path::{Path, PathBuf};

use crate::address::{AddressSpec, SpecOrigin};
use crate::error::VpnRoutesError;
use crate::fs_abstraction::FileSystem;

/// An address spec together with where it was written.
#[derive(Debug, Clone)]
pub struct SourcedSpec {
    pub spec: AddressSpec,
    pub origin: SpecOrigin,
}

/// Parse inline (command line) entries.
pub fn parse_inline(entries: &[String]) -> Result<Vec<SourcedSpec>, VpnRoutesError> {
    entries
        .iter()
        .map(|raw| {
            let spec = raw
                .parse::<AddressSpec>()
                .map_err(|e| VpnRoutesError::MalformedInput {
                    origin: SpecOrigin::Inline,
                    entry: raw.trim().to_string(),
                    reason: e.to_string(),
                })?;
            Ok(SourcedSpec {
                spec,
                origin: SpecOrigin::Inline,
            })
        })
        .collect()
}

/// Parse the contents of one extra-route file.
///
/// One entry per line; blank lines and lines starting with `#` are skipped.
/// Any entry that fails to parse aborts with the file and line number.
pub fn parse_route_list(path: &Path, content: &str) -> Result<Vec<SourcedSpec>, VpnRoutesError> {
    let mut specs = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        let token = line.trim();
        if token.is_empty() || token.starts_with('#') {
            continue;
        }

        let origin = SpecOrigin::File {
            path: path.to_path_buf(),
            line: idx + 1,
        };
        let spec = token
            .parse::<AddressSpec>()
            .map_err(|e| VpnRoutesError::MalformedInput {
                origin: origin.clone(),
                entry: token.to_string(),
                reason: e.to_string(),
            })?;
        specs.push(SourcedSpec { spec, origin });
    }

    Ok(specs)
}

/// Gather every spec: inline entries first, then each extra-route file in
/// the order given. A missing file is a hard failure.
pub fn collect_specs(
    fs: &dyn FileSystem,
    inline: &[String],
    files: &[PathBuf],
) -> Result<Vec<SourcedSpec>, VpnRoutesError> {
    let mut specs = parse_inline(inline)?;

    for path in files {
        let content = fs
            .read_to_string(path)
            .map_err(|source| VpnRoutesError::Io {
                path: path.clone(),
                source,
            })?;
        specs.extend(parse_route_list(path, &content)?);
    }

    Ok(specs)
}
