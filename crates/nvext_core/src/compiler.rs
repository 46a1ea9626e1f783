//! Compiler interface used by the build driver
//!
//! A compiler turns one source unit into one object file and links a set of objects into
//! one shared artifact. The driver never constructs compilers itself; it asks the
//! [`CompilerFactory`] it was configured with.

use crate::error::BuildResult;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One source unit to compile
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileRequest {
    pub source: PathBuf,
    pub object: PathBuf,
    /// Compiler flags placed before the source path
    pub cc_args: Vec<String>,
    /// Include and macro flags (`-I`, `-D`, `-U`)
    pub pp_opts: Vec<String>,
    /// Flags appended after everything the compiler adds itself
    pub extra_postargs: Vec<String>,
}

impl CompileRequest {
    pub fn new(source: impl Into<PathBuf>, object: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            object: object.into(),
            cc_args: Vec::new(),
            pp_opts: Vec::new(),
            extra_postargs: Vec::new(),
        }
    }

    pub fn with_cc_args(mut self, args: Vec<String>) -> Self {
        self.cc_args = args;
        self
    }

    pub fn with_pp_opts(mut self, opts: Vec<String>) -> Self {
        self.pp_opts = opts;
        self
    }

    pub fn with_extra_postargs(mut self, args: Vec<String>) -> Self {
        self.extra_postargs = args;
        self
    }
}

/// Objects and libraries to link into one shared artifact
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkRequest {
    pub objects: Vec<PathBuf>,
    pub output_filename: PathBuf,
    /// Joined in front of `output_filename` when present
    pub output_dir: Option<PathBuf>,
    pub libraries: Vec<String>,
    pub library_dirs: Vec<PathBuf>,
    pub debug: bool,
    pub extra_preargs: Vec<String>,
    pub extra_postargs: Vec<String>,
}

impl LinkRequest {
    pub fn new(objects: Vec<PathBuf>, output_filename: impl Into<PathBuf>) -> Self {
        Self {
            objects,
            output_filename: output_filename.into(),
            ..Default::default()
        }
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn with_libraries(mut self, libraries: Vec<String>) -> Self {
        self.libraries = libraries;
        self
    }

    pub fn with_library_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.library_dirs = dirs;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_extra_preargs(mut self, args: Vec<String>) -> Self {
        self.extra_preargs = args;
        self
    }

    pub fn with_extra_postargs(mut self, args: Vec<String>) -> Self {
        self.extra_postargs = args;
        self
    }

    /// Final artifact path
    pub fn output_path(&self) -> PathBuf {
        match &self.output_dir {
            Some(dir) => dir.join(&self.output_filename),
            None => self.output_filename.clone(),
        }
    }
}

/// Compile and link operations the build driver relies on
pub trait ExtensionCompiler: Send + Sync {
    /// Short identifier (e.g. "nvcc")
    fn compiler_type(&self) -> &str;

    /// Recognised source extensions, with leading dot
    fn source_extensions(&self) -> &[&'static str];

    /// Object file extension, with leading dot
    fn object_extension(&self) -> &str;

    /// Shared artifact extension, with leading dot
    fn shared_lib_extension(&self) -> &str;

    /// Check if this compiler handles the given source file
    fn recognizes(&self, source: &Path) -> bool {
        let ext = source_extension(source);
        self.source_extensions().iter().any(|e| *e == ext)
    }

    /// Compile one source unit to the requested object path
    fn compile_unit(&self, request: &CompileRequest) -> BuildResult<()>;

    /// Link objects into a shared artifact, returning its path
    fn link_shared(&self, request: &LinkRequest) -> BuildResult<PathBuf>;
}

/// Selection hints the driver passes when asking for a compiler
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilerHints {
    pub platform: Option<String>,
    pub compiler: Option<String>,
    pub verbose: bool,
    pub dry_run: bool,
    pub force: bool,
}

/// Constructs the compiler for each extension the driver builds
pub type CompilerFactory = Arc<dyn Fn(&CompilerHints) -> Box<dyn ExtensionCompiler> + Send + Sync>;

/// Extension of `path` including the leading dot, or an empty string
pub fn source_extension(path: &Path) -> String {
    path.extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_joins_dir() {
        let req = LinkRequest::new(vec![], "libk.so").with_output_dir("build/lib");
        assert_eq!(req.output_path(), Path::new("build/lib").join("libk.so"));
        assert_eq!(LinkRequest::new(vec![], "libk.so").output_path(), PathBuf::from("libk.so"));
    }

    #[test]
    fn test_source_extension_keeps_dot() {
        assert_eq!(source_extension(Path::new("a/k.cu")), ".cu");
        assert_eq!(source_extension(Path::new("Makefile")), "");
    }
}
