//! Host platform description
//!
//! The adapter never branches on `cfg!` directly so that Windows argument vectors can be
//! assembled (and tested) on any host.

use std::fmt;

/// Host platform families that change how nvcc is driven
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    Linux,
    MacOs,
    Windows,
    /// Any other unix-like host
    Other,
}

impl Platform {
    /// Get the platform this process is running on
    pub fn host() -> Self {
        #[cfg(target_os = "linux")]
        {
            Platform::Linux
        }
        #[cfg(target_os = "macos")]
        {
            Platform::MacOs
        }
        #[cfg(target_os = "windows")]
        {
            Platform::Windows
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            Platform::Other
        }
    }

    pub fn is_windows(&self) -> bool {
        matches!(self, Platform::Windows)
    }

    /// Object file extension, including the leading dot
    pub fn object_extension(&self) -> &'static str {
        match self {
            Platform::Windows => ".obj",
            _ => ".o",
        }
    }

    /// Shared library extension, including the leading dot
    pub fn shared_lib_extension(&self) -> &'static str {
        match self {
            Platform::Linux | Platform::Other => ".so",
            Platform::MacOs => ".dylib",
            Platform::Windows => ".dll",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Linux => "linux",
            Platform::MacOs => "macos",
            Platform::Windows => "windows",
            Platform::Other => std::env::consts::OS,
        };
        f.write_str(name)
    }
}
