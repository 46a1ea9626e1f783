//! nvext: build GPU-kernel extensions with nvcc
//!
//! Replaces the host C toolchain of an extension build with nvcc:
//! - [`toolchain`]: computes the extra nvcc flags once per build (`NVCCFLAGS`, plus the MSVC
//!   directory on Windows)
//! - [`nvcc`]: compiles `.cu` sources and links shared artifacts through nvcc
//! - [`driver`]: builds [`Extension`]s with whatever compiler its factory returns
//!
//! ```no_run
//! use nvext_core::{nvcc_factory, toolchain_flags, BuildDriver, DriverConfig, Extension};
//!
//! let flags = toolchain_flags()?;
//! let ext = Extension::new("cudamat.libcudamat", ["cudamat/cudamat.cu"])
//!     .with_libraries(&["cublas"])
//!     .with_toolchain_flags(&flags);
//!
//! let driver = BuildDriver::new(DriverConfig::new(nvcc_factory()));
//! let built = driver.build_extension(&ext)?;
//! println!("{}", built.artifact.display());
//! # Ok::<(), nvext_core::BuildError>(())
//! ```

pub mod compiler;
pub mod driver;
pub mod error;
pub mod extension;
pub mod invocation;
pub mod libraries;
pub mod nvcc;
pub mod platform;
pub mod toolchain;

pub use compiler::{CompileRequest, CompilerFactory, CompilerHints, ExtensionCompiler, LinkRequest};
pub use driver::{BuildDriver, BuiltExtension, DriverConfig};
pub use error::{BuildError, BuildResult};
pub use extension::{Extension, PackageManifest};
pub use invocation::{ExternalToolInvocation, ProcessRunner, ToolRunner};
pub use libraries::{LibraryFilter, LibraryRule};
pub use nvcc::{nvcc_factory, NvccCompiler};
pub use platform::Platform;
pub use toolchain::{
    flags_override, toolchain_flags, Discovery, ExecutableFinder, MissingHostCompiler, PathFinder,
    ToolchainFlags, ToolchainLocator,
};
