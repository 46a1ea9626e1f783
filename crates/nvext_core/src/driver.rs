//! Extension build driver
//!
//! Turns [`Extension`] definitions into compile and link requests and dispatches them to
//! the compiler produced by the configured [`CompilerFactory`].
//!
//! ```text
//! Extension
//!     │
//!     ▼
//! ┌─────────────────────┐
//! │ Compiler factory    │  hints → Box<dyn ExtensionCompiler>
//! └─────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────┐
//! │ compile_unit        │  one call per source → build_temp/<source>.o
//! └─────────────────────┘
//!     │
//!     ▼
//! ┌─────────────────────┐
//! │ link_shared         │  one call per extension → build_lib/<pkg>/<lib>.so
//! └─────────────────────┘
//! ```
//!
//! No dependency tracking is done: every source is recompiled on every build.

use crate::compiler::{
    source_extension, CompileRequest, CompilerFactory, CompilerHints, ExtensionCompiler, LinkRequest,
};
use crate::error::{BuildError, BuildResult};
use crate::extension::Extension;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Build session settings
#[derive(Clone)]
pub struct DriverConfig {
    /// Directory for object files
    pub build_temp: PathBuf,
    /// Directory for finished artifacts
    pub build_lib: PathBuf,
    /// Directory extension sources are relative to; `None` uses them as given
    pub source_root: Option<PathBuf>,
    /// Platform hint handed to the factory
    pub plat_name: Option<String>,
    /// Compiler hint handed to the factory
    pub compiler_name: Option<String>,
    pub debug: bool,
    pub verbose: bool,
    pub dry_run: bool,
    pub force: bool,
    pub compiler_factory: CompilerFactory,
}

impl fmt::Debug for DriverConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverConfig")
            .field("build_temp", &self.build_temp)
            .field("build_lib", &self.build_lib)
            .field("source_root", &self.source_root)
            .field("plat_name", &self.plat_name)
            .field("compiler_name", &self.compiler_name)
            .field("debug", &self.debug)
            .field("verbose", &self.verbose)
            .field("dry_run", &self.dry_run)
            .field("force", &self.force)
            .finish_non_exhaustive()
    }
}

impl DriverConfig {
    pub fn new(compiler_factory: CompilerFactory) -> Self {
        Self {
            build_temp: PathBuf::from("build").join("temp"),
            build_lib: PathBuf::from("build").join("lib"),
            source_root: None,
            plat_name: None,
            compiler_name: None,
            debug: false,
            verbose: false,
            dry_run: false,
            force: false,
            compiler_factory,
        }
    }

    pub fn with_build_temp(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_temp = dir.into();
        self
    }

    pub fn with_build_lib(mut self, dir: impl Into<PathBuf>) -> Self {
        self.build_lib = dir.into();
        self
    }

    pub fn with_source_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.source_root = Some(dir.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn hints(&self) -> CompilerHints {
        CompilerHints {
            platform: self.plat_name.clone(),
            compiler: self.compiler_name.clone(),
            verbose: self.verbose,
            dry_run: self.dry_run,
            force: self.force,
        }
    }
}

/// Output of one extension build
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltExtension {
    pub name: String,
    pub objects: Vec<PathBuf>,
    pub artifact: PathBuf,
}

/// Builds extensions one at a time, stopping at the first failure
#[derive(Debug, Clone)]
pub struct BuildDriver {
    config: DriverConfig,
}

impl BuildDriver {
    pub fn new(config: DriverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn build_extensions(&self, extensions: &[Extension]) -> BuildResult<Vec<BuiltExtension>> {
        extensions.iter().map(|ext| self.build_extension(ext)).collect()
    }

    pub fn build_extension(&self, ext: &Extension) -> BuildResult<BuiltExtension> {
        ext.validate()?;
        info!("building '{}' extension", ext.name);

        let compiler = (self.config.compiler_factory)(&self.config.hints());

        for source in &ext.sources {
            if !compiler.recognizes(source) {
                return Err(BuildError::UnknownSourceType {
                    source_path: source.clone(),
                    extension: source_extension(source),
                });
            }
        }

        let objects = self.compile(compiler.as_ref(), ext)?;

        let artifact_name = ext.artifact_path(compiler.shared_lib_extension());
        let link = LinkRequest::new(objects.clone(), artifact_name)
            .with_output_dir(&self.config.build_lib)
            .with_libraries(ext.libraries.clone())
            .with_library_dirs(ext.library_dirs.clone())
            .with_extra_postargs(ext.extra_link_args.clone())
            .with_debug(self.config.debug);
        let artifact = compiler.link_shared(&link)?;

        Ok(BuiltExtension {
            name: ext.name.clone(),
            objects,
            artifact,
        })
    }

    fn compile(&self, compiler: &dyn ExtensionCompiler, ext: &Extension) -> BuildResult<Vec<PathBuf>> {
        let pp_opts = preprocess_options(&ext.define_macros, &ext.undef_macros, &ext.include_dirs);
        let compile_args = cc_args(&pp_opts, self.config.debug, &[]);

        let mut objects = Vec::with_capacity(ext.sources.len());
        for source in &ext.sources {
            let object = object_path(&self.config.build_temp, source, compiler.object_extension());
            if let Some(parent) = object.parent() {
                self.mkpath(parent)?;
            }

            let request = CompileRequest::new(self.resolve_source(source), object.clone())
                .with_cc_args(compile_args.clone())
                .with_pp_opts(pp_opts.clone())
                .with_extra_postargs(ext.extra_compile_args.clone());
            compiler.compile_unit(&request)?;
            objects.push(object);
        }

        Ok(objects)
    }

    fn resolve_source(&self, source: &Path) -> PathBuf {
        match &self.config.source_root {
            Some(root) => root.join(source),
            None => source.to_path_buf(),
        }
    }

    fn mkpath(&self, dir: &Path) -> BuildResult<()> {
        if self.config.dry_run || dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(dir)?;
        Ok(())
    }
}

/// Translate macro definitions and include directories into `-D`, `-U` and `-I` flags
pub fn preprocess_options(
    define_macros: &[(String, Option<String>)],
    undef_macros: &[String],
    include_dirs: &[PathBuf],
) -> Vec<String> {
    let mut opts = Vec::new();

    for (name, value) in define_macros {
        match value {
            Some(value) => opts.push(format!("-D{}={}", name, value)),
            None => opts.push(format!("-D{}", name)),
        }
    }

    for name in undef_macros {
        opts.push(format!("-U{}", name));
    }

    for dir in include_dirs {
        opts.push(format!("-I{}", dir.display()));
    }

    opts
}

/// Flags placed in front of the source: `[before..] [-g] [pp_opts..] -c`
pub fn cc_args(pp_opts: &[String], debug: bool, before: &[String]) -> Vec<String> {
    let mut args = before.to_vec();
    if debug {
        args.push("-g".to_string());
    }
    args.extend(pp_opts.iter().cloned());
    args.push("-c".to_string());
    args
}

/// Object path for `source` under `build_temp`, keeping its relative directory layout
pub fn object_path(build_temp: &Path, source: &Path, object_ext: &str) -> PathBuf {
    let relative: PathBuf = source
        .components()
        .filter(|c| !matches!(c, Component::Prefix(_) | Component::RootDir))
        .collect();

    let mut file = relative.with_extension("").into_os_string();
    file.push(object_ext);
    build_temp.join(file)
}
