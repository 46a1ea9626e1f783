//! Build error types

use std::path::PathBuf;
use std::process::ExitStatus;

/// Main error type for nvext_core.
///
/// Nothing in this crate retries: every variant is propagated to the caller unchanged.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum BuildError {
    // ===== Configuration Errors =====
    /// The auxiliary host compiler was required but could not be found.
    #[error("{name} not found on PATH (searched {searched} directories)")]
    HostCompilerNotFound { name: String, searched: usize },
    /// An environment variable whose value is not valid UTF-8.
    #[error("{name} is not valid UTF-8: {value:?}")]
    NonUnicodeEnv { name: String, value: std::ffi::OsString },

    // ===== Driver Errors =====
    /// A source file the selected compiler does not know how to compile.
    #[error("unknown file type '{}' (from '{}')", extension, source_path.display())]
    UnknownSourceType { source_path: PathBuf, extension: String },
    /// An extension definition that cannot be built.
    #[error("invalid extension '{name}': {reason}")]
    InvalidExtension { name: String, reason: String },

    // ===== External Tool Errors =====
    /// The external tool could not be started at all.
    #[error("failed to run {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
    /// The external tool ran and exited unsuccessfully.
    #[error("command '{command}' failed with {status}")]
    ToolFailed { command: String, status: ExitStatus },

    // ===== I/O Errors =====
    /// Filesystem failure, e.g. creating the link output directory.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Malformed extension manifest.
    #[error("manifest error: {0}")]
    Manifest(#[from] serde_json::Error),
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;
