//! Filesystem abstraction layer for testability
//!
//! This module provides a trait-based abstraction over the two file
//! operations the tool performs, enabling dependency injection for testing
//! without real filesystem access. Uses mockall for automatic mock
//! generation in test builds.

use std::io;
use std::path::Path;

#[cfg(test)]
use mockall::automock;

/// Trait abstracting filesystem operations for dependency injection.
///
/// # Example (production)
/// ```ignore
/// use vpnroutes::fs_abstraction::{FileSystem, real_fs};
///
/// let content = real_fs().read_to_string(Path::new("/etc/openvpn/client.ovpn"))?;
/// ```
///
/// # Example (testing)
/// ```ignore
/// use vpnroutes::fs_abstraction::MockFileSystem;
///
/// let mut mock_fs = MockFileSystem::new();
/// mock_fs.expect_read_to_string()
///     .returning(|_| Ok("remote vpn.example.com 1194\n".to_string()));
/// ```
#[cfg_attr(test, automock)]
pub trait FileSystem: Send + Sync {
    /// Read file contents as a string.
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file at `path` with `contents` atomically.
    ///
    /// A concurrent reader sees either the old content or the new content,
    /// never a truncated file.
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()>;
}

/// Real filesystem implementation using std::fs and tempfile.
#[derive(Default, Clone, Copy)]
pub struct RealFileSystem;

impl FileSystem for RealFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write_atomic(&self, path: &Path, contents: &[u8]) -> io::Result<()> {
        use std::io::Write;
        use tempfile::NamedTempFile;

        // The temp file must live in the target's directory so the final
        // rename stays on one filesystem.
        let parent = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));

        let mut temp_file = NamedTempFile::new_in(parent)?;
        temp_file.write_all(contents)?;
        temp_file.as_file().sync_all()?;
        temp_file.persist(path).map_err(|e| e.error)?;

        Ok(())
    }
}

/// Global filesystem instance for production use.
static REAL_FS: RealFileSystem = RealFileSystem;

/// Get a reference to the global real filesystem instance.
///
/// Use this function to obtain a filesystem instance for production code.
/// For testing, create a `MockFileSystem` instead.
pub fn real_fs() -> &'static RealFileSystem {
    &REAL_FS
}
