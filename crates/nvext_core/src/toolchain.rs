//! Toolchain discovery for nvcc
//!
//! nvcc forwards host-side compilation to a platform C++ compiler. On Windows that compiler
//! is MSVC, which is frequently not on `PATH` for the shell running the build, so the
//! locator looks for `cl.exe` up front and points nvcc at it with `--compiler-bindir`.
//! Every other platform only gets the user's `NVCCFLAGS`.

use crate::error::{BuildError, BuildResult};
use crate::platform::Platform;
use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable holding extra nvcc flags, space separated
pub const FLAGS_ENV: &str = "NVCCFLAGS";

/// Binary name of the auxiliary host compiler on Windows
pub const HOST_COMPILER: &str = "cl.exe";

/// nvcc flag naming the host compiler directory
pub const COMPILER_BINDIR_FLAG: &str = "--compiler-bindir";

/// Short form of [`COMPILER_BINDIR_FLAG`]
const COMPILER_BINDIR_SHORT: &str = "-ccbin";

const MISSING_HOST_COMPILER_HELP: &str = "MSVC (cl.exe) not found on PATH. Compilation may fail. \
     Either set PATH to include the path to MSVC, or set NVCCFLAGS=--compiler-bindir=... to \
     define it. Possibly also set NVCCFLAGS=--cl-version=2010 to override nvcc's MSVC version \
     detection.";

/// Extra flags passed to every nvcc invocation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainFlags(Vec<String>);

impl ToolchainFlags {
    pub fn new(flags: Vec<String>) -> Self {
        Self(flags)
    }

    /// Split an override value on whitespace
    pub fn parse(value: &str) -> Self {
        Self(value.split_whitespace().map(str::to_string).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Whether the user already told nvcc where the host compiler lives
    pub fn names_host_compiler_dir(&self) -> bool {
        self.0
            .iter()
            .any(|f| f.contains(COMPILER_BINDIR_FLAG) || f.starts_with(COMPILER_BINDIR_SHORT))
    }

    fn push_host_compiler_dir(&mut self, dir: &Path) {
        self.0.push(COMPILER_BINDIR_FLAG.to_string());
        self.0.push(dir.display().to_string());
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl<'a> IntoIterator for &'a ToolchainFlags {
    type Item = &'a String;
    type IntoIter = std::slice::Iter<'a, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Outcome of looking up an executable
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Discovery {
    /// Full path to the executable
    Found(PathBuf),
    /// Not present in any searched directory
    NotFound { name: String, searched: Vec<PathBuf> },
}

impl Discovery {
    pub fn path(&self) -> Option<&Path> {
        match self {
            Discovery::Found(path) => Some(path),
            Discovery::NotFound { .. } => None,
        }
    }

    /// Directory containing the executable
    pub fn directory(&self) -> Option<&Path> {
        self.path().and_then(Path::parent)
    }
}

/// Looks up executables by name
pub trait ExecutableFinder {
    fn find(&self, name: &str) -> Discovery;
}

/// Searches a `PATH`-style directory list
#[derive(Debug, Clone)]
pub struct PathFinder {
    path: Option<OsString>,
    cwd: PathBuf,
}

impl PathFinder {
    /// Search the current process `PATH`
    pub fn from_env() -> Self {
        Self::with_path(env::var_os("PATH"))
    }

    pub fn with_path(path: Option<OsString>) -> Self {
        Self {
            path,
            cwd: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
        }
    }

    fn search_dirs(&self) -> Vec<PathBuf> {
        self.path
            .as_ref()
            .map(|p| env::split_paths(p).collect())
            .unwrap_or_default()
    }
}

impl ExecutableFinder for PathFinder {
    fn find(&self, name: &str) -> Discovery {
        match which::which_in(name, self.path.as_ref(), &self.cwd) {
            Ok(path) => Discovery::Found(path),
            Err(_) => Discovery::NotFound {
                name: name.to_string(),
                searched: self.search_dirs(),
            },
        }
    }
}

/// What to do when the host compiler is required but missing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MissingHostCompiler {
    /// Log a warning and let nvcc try on its own
    #[default]
    Warn,
    /// Stop with [`BuildError::HostCompilerNotFound`]
    Fail,
}

/// Computes the [`ToolchainFlags`] for a build
pub struct ToolchainLocator<F = PathFinder> {
    platform: Platform,
    finder: F,
    policy: MissingHostCompiler,
}

impl ToolchainLocator<PathFinder> {
    /// Locator for the host platform searching the process `PATH`
    pub fn from_env() -> Self {
        Self::new(Platform::host(), PathFinder::from_env())
    }
}

impl<F: ExecutableFinder> ToolchainLocator<F> {
    pub fn new(platform: Platform, finder: F) -> Self {
        Self {
            platform,
            finder,
            policy: MissingHostCompiler::default(),
        }
    }

    pub fn with_policy(mut self, policy: MissingHostCompiler) -> Self {
        self.policy = policy;
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Read the override from [`FLAGS_ENV`] and locate
    pub fn locate_from_env(&self) -> BuildResult<ToolchainFlags> {
        let value = flags_override(env::var_os(FLAGS_ENV))?;
        self.locate(value.as_deref())
    }

    /// Build the flags from an override value.
    ///
    /// Only Windows hosts search for the host compiler, and only when the override does not
    /// already name its directory.
    pub fn locate(&self, override_flags: Option<&str>) -> BuildResult<ToolchainFlags> {
        let mut flags = override_flags.map(ToolchainFlags::parse).unwrap_or_default();

        if !self.platform.is_windows() || flags.names_host_compiler_dir() {
            return Ok(flags);
        }

        let discovery = self.finder.find(HOST_COMPILER);
        match discovery.directory() {
            Some(dir) => {
                debug!("found {} in {}", HOST_COMPILER, dir.display());
                flags.push_host_compiler_dir(dir);
            },
            None => {
                let searched = match &discovery {
                    Discovery::NotFound { searched, .. } => searched.len(),
                    Discovery::Found(_) => 0,
                };
                match self.policy {
                    MissingHostCompiler::Warn => warn!("{}", MISSING_HOST_COMPILER_HELP),
                    MissingHostCompiler::Fail => {
                        return Err(BuildError::HostCompilerNotFound {
                            name: HOST_COMPILER.to_string(),
                            searched,
                        })
                    },
                }
            },
        }

        Ok(flags)
    }
}

/// Decode a raw [`FLAGS_ENV`] value. Only an unset variable means "no override".
pub fn flags_override(raw: Option<OsString>) -> BuildResult<Option<String>> {
    match raw {
        None => Ok(None),
        Some(value) => value.into_string().map(Some).map_err(|value| BuildError::NonUnicodeEnv {
            name: FLAGS_ENV.to_string(),
            value,
        }),
    }
}

/// Flags for the current process: host platform, `PATH` and `NVCCFLAGS`
pub fn toolchain_flags() -> BuildResult<ToolchainFlags> {
    ToolchainLocator::from_env().locate_from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakeFinder {
        result: Option<PathBuf>,
        calls: Cell<usize>,
    }

    impl FakeFinder {
        fn found(path: &str) -> Self {
            Self {
                result: Some(PathBuf::from(path)),
                calls: Cell::new(0),
            }
        }

        fn missing() -> Self {
            Self {
                result: None,
                calls: Cell::new(0),
            }
        }
    }

    impl ExecutableFinder for &FakeFinder {
        fn find(&self, name: &str) -> Discovery {
            self.calls.set(self.calls.get() + 1);
            match &self.result {
                Some(path) => Discovery::Found(path.clone()),
                None => Discovery::NotFound {
                    name: name.to_string(),
                    searched: vec![PathBuf::from("/nowhere")],
                },
            }
        }
    }

    #[test]
    fn test_parse_splits_on_whitespace() {
        let flags = ToolchainFlags::parse("  -arch=sm_70   --use_fast_math ");
        assert_eq!(flags.as_slice(), ["-arch=sm_70", "--use_fast_math"]);
        assert!(ToolchainFlags::parse("").is_empty());
    }

    #[test]
    fn test_flags_override_unset_and_utf8() {
        assert_eq!(flags_override(None).unwrap(), None);
        assert_eq!(
            flags_override(Some(OsString::from("-arch=sm_70"))).unwrap().as_deref(),
            Some("-arch=sm_70")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_flags_override_rejects_non_utf8() {
        use std::os::unix::ffi::OsStringExt;

        let raw = OsString::from_vec(b"-arch=sm_70 -I/opt/caf\xe9".to_vec());
        match flags_override(Some(raw.clone())) {
            Err(BuildError::NonUnicodeEnv { name, value }) => {
                assert_eq!(name, FLAGS_ENV);
                assert_eq!(value, raw);
            },
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_bindir_detection() {
        assert!(ToolchainFlags::parse("--compiler-bindir C:/vc").names_host_compiler_dir());
        assert!(ToolchainFlags::parse("--compiler-bindir=C:/vc").names_host_compiler_dir());
        assert!(ToolchainFlags::parse("-ccbin C:/vc").names_host_compiler_dir());
        assert!(!ToolchainFlags::parse("-O3").names_host_compiler_dir());
    }

    #[test]
    fn test_non_windows_never_searches() {
        let finder = FakeFinder::found("/opt/cl.exe");
        let flags = ToolchainLocator::new(Platform::Linux, &finder)
            .locate(Some("-arch=sm_80"))
            .unwrap();
        assert_eq!(flags.as_slice(), ["-arch=sm_80"]);
        assert_eq!(finder.calls.get(), 0);
    }

    #[test]
    fn test_windows_appends_bindir() {
        let finder = FakeFinder::found("C:/VC/bin/cl.exe");
        let flags = ToolchainLocator::new(Platform::Windows, &finder).locate(None).unwrap();
        assert_eq!(flags.as_slice(), ["--compiler-bindir", "C:/VC/bin"]);
        assert_eq!(finder.calls.get(), 1);
    }

    #[test]
    fn test_windows_override_skips_search() {
        let finder = FakeFinder::found("C:/VC/bin/cl.exe");
        let flags = ToolchainLocator::new(Platform::Windows, &finder)
            .locate(Some("--compiler-bindir=D:/msvc"))
            .unwrap();
        assert_eq!(flags.as_slice(), ["--compiler-bindir=D:/msvc"]);
        assert_eq!(finder.calls.get(), 0);
    }

    #[test]
    fn test_windows_missing_compiler_is_lenient() {
        let finder = FakeFinder::missing();
        let flags = ToolchainLocator::new(Platform::Windows, &finder)
            .locate(Some("-G"))
            .unwrap();
        assert_eq!(flags.as_slice(), ["-G"]);
        assert!(!flags.names_host_compiler_dir());
    }

    #[test]
    fn test_windows_missing_compiler_strict() {
        let finder = FakeFinder::missing();
        let err = ToolchainLocator::new(Platform::Windows, &finder)
            .with_policy(MissingHostCompiler::Fail)
            .locate(None)
            .unwrap_err();
        assert!(matches!(err, BuildError::HostCompilerNotFound { searched: 1, .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_path_finder_finds_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join(HOST_COMPILER);
        std::fs::write(&exe, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&exe, std::fs::Permissions::from_mode(0o755)).unwrap();

        let finder = PathFinder::with_path(Some(dir.path().as_os_str().to_owned()));
        let discovery = finder.find(HOST_COMPILER);
        assert_eq!(discovery.directory(), Some(dir.path()));
    }

    #[test]
    fn test_path_finder_reports_searched_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let finder = PathFinder::with_path(Some(dir.path().as_os_str().to_owned()));
        match finder.find("nvext-no-such-compiler") {
            Discovery::NotFound { name, searched } => {
                assert_eq!(name, "nvext-no-such-compiler");
                assert_eq!(searched, vec![dir.path().to_path_buf()]);
            },
            found => panic!("unexpected {:?}", found),
        }
    }
}
