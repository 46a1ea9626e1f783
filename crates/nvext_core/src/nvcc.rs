//! nvcc compiler adapter
//!
//! Implements [`ExtensionCompiler`] by running nvcc for both compiling and linking.
//!
//! ## Compile
//!
//! ```text
//! nvcc -O <cc_args> <source> -o <object> [--compiler-options=-fPIC] <extra_postargs> <pp_opts>
//! ```
//!
//! The PIC flag is emitted on every non-Windows host because the object always ends up in
//! a shared library. It precedes the caller's extra flags so they can override it.
//!
//! ## Link
//!
//! ```text
//! nvcc <extra_preargs> --shared -o <output> <objects> -l<lib>.. -L<dir>.. <extra_postargs> [-G]
//! ```

use crate::compiler::{
    source_extension, CompileRequest, CompilerFactory, CompilerHints, ExtensionCompiler, LinkRequest,
};
use crate::error::BuildResult;
use crate::invocation::{ExternalToolInvocation, ProcessRunner, ToolRunner};
use crate::libraries::LibraryFilter;
use crate::platform::Platform;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Executable name, resolved through `PATH`
pub const NVCC: &str = "nvcc";
/// The only source extension nvcc is handed
pub const CU_EXTENSION: &str = ".cu";

const OPT_FLAG: &str = "-O";
const PIC_FLAG: &str = "--compiler-options=-fPIC";
const SHARED_FLAG: &str = "--shared";
const DEVICE_DEBUG_FLAG: &str = "-G";

/// Compiler that defers every compile and link step to nvcc
#[derive(Clone)]
pub struct NvccCompiler {
    platform: Platform,
    library_filter: LibraryFilter,
    runner: Arc<dyn ToolRunner>,
    verbose: bool,
    dry_run: bool,
}

impl Default for NvccCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl NvccCompiler {
    pub fn new() -> Self {
        Self {
            platform: Platform::host(),
            library_filter: LibraryFilter::default(),
            runner: Arc::new(ProcessRunner),
            verbose: false,
            dry_run: false,
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_library_filter(mut self, filter: LibraryFilter) -> Self {
        self.library_filter = filter;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn ToolRunner>) -> Self {
        self.runner = runner;
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

    pub fn platform(&self) -> Platform {
        self.platform
    }

    /// Factory returning a copy of this compiler for every request.
    ///
    /// The driver's platform and compiler hints are ignored; only `verbose` and `dry_run`
    /// are taken from them.
    pub fn into_factory(self) -> CompilerFactory {
        Arc::new(move |hints: &CompilerHints| {
            Box::new(
                self.clone()
                    .with_verbose(hints.verbose)
                    .with_dry_run(hints.dry_run),
            ) as Box<dyn ExtensionCompiler>
        })
    }

    /// Assemble the compile command.
    ///
    /// # Panics
    ///
    /// If the source does not end in `.cu`. The driver filters sources by extension before
    /// dispatch, so reaching this is an integration bug.
    pub fn compile_invocation(&self, request: &CompileRequest) -> ExternalToolInvocation {
        let ext = source_extension(&request.source);
        assert_eq!(
            ext,
            CU_EXTENSION,
            "nvcc adapter received non-{} source {}",
            CU_EXTENSION,
            request.source.display()
        );

        let mut inv = ExternalToolInvocation::new(NVCC);
        inv.arg(OPT_FLAG)
            .args(&request.cc_args)
            .path_arg(&request.source)
            .arg("-o")
            .path_arg(&request.object);

        if !self.platform.is_windows() {
            inv.arg(PIC_FLAG);
        }

        inv.args(&request.extra_postargs).args(&request.pp_opts);
        inv
    }

    /// Assemble the link command for `request`, writing to `output`
    pub fn link_invocation(&self, request: &LinkRequest, output: &Path) -> ExternalToolInvocation {
        let mut inv = ExternalToolInvocation::new(NVCC);
        inv.args(&request.extra_preargs)
            .arg(SHARED_FLAG)
            .arg("-o")
            .path_arg(output);

        for object in &request.objects {
            inv.path_arg(object);
        }

        for lib in self.library_filter.select(&request.libraries) {
            inv.arg(format!("-l{}", lib));
        }

        for dir in &request.library_dirs {
            let mut flag = OsString::from("-L");
            flag.push(dir);
            inv.arg(flag);
        }

        inv.args(&request.extra_postargs);

        if request.debug {
            inv.arg(DEVICE_DEBUG_FLAG);
        }

        inv
    }

    fn spawn(&self, invocation: &ExternalToolInvocation) -> BuildResult<()> {
        if self.verbose {
            info!("{}", invocation);
        } else {
            debug!("{}", invocation);
        }

        if self.dry_run {
            return Ok(());
        }

        self.runner.run(invocation)
    }

    fn mkpath(&self, dir: &Path) -> BuildResult<()> {
        if dir.as_os_str().is_empty() || dir.is_dir() {
            return Ok(());
        }

        if self.verbose {
            info!("creating {}", dir.display());
        }

        if !self.dry_run {
            std::fs::create_dir_all(dir)?;
        }

        Ok(())
    }
}

impl ExtensionCompiler for NvccCompiler {
    fn compiler_type(&self) -> &str {
        NVCC
    }

    fn source_extensions(&self) -> &[&'static str] {
        &[CU_EXTENSION]
    }

    fn object_extension(&self) -> &str {
        self.platform.object_extension()
    }

    fn shared_lib_extension(&self) -> &str {
        self.platform.shared_lib_extension()
    }

    fn compile_unit(&self, request: &CompileRequest) -> BuildResult<()> {
        let invocation = self.compile_invocation(request);
        self.spawn(&invocation)
    }

    fn link_shared(&self, request: &LinkRequest) -> BuildResult<PathBuf> {
        let output = request.output_path();
        if let Some(parent) = output.parent() {
            self.mkpath(parent)?;
        }

        let invocation = self.link_invocation(request, &output);
        self.spawn(&invocation)?;
        Ok(output)
    }
}

/// Factory that always yields an nvcc compiler for the host platform
pub fn nvcc_factory() -> CompilerFactory {
    NvccCompiler::new().into_factory()
}
