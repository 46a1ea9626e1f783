//! Build command - compile and link every extension of a manifest with nvcc

use crate::output;
use clap::Args;
use nvext_core::{
    nvcc_factory, BuildDriver, DriverConfig, MissingHostCompiler, PackageManifest, ToolchainLocator,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::debug;

#[derive(Args)]
pub struct BuildArgs {
    /// Extension manifest (JSON)
    pub manifest: PathBuf,

    /// Directory for object files (default: <manifest dir>/build/temp)
    #[arg(long)]
    pub build_temp: Option<PathBuf>,

    /// Directory for built artifacts (default: <manifest dir>/build/lib)
    #[arg(long)]
    pub build_lib: Option<PathBuf>,

    /// Only build the named extensions
    #[arg(short, long = "extension")]
    pub extensions: Vec<String>,

    /// Compile with -g and link with device debug info (-G)
    #[arg(short = 'g', long)]
    pub debug: bool,

    /// Print commands without running them
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Fail instead of warning when MSVC cannot be found on Windows
    #[arg(long)]
    pub strict_host_compiler: bool,
}

pub fn execute(args: BuildArgs, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !args.manifest.exists() {
        return Err(format!("Manifest not found: {}", args.manifest.display()).into());
    }

    let start = Instant::now();
    output::loading(&args.manifest.display().to_string());
    let manifest = PackageManifest::load(&args.manifest)?;

    let policy = if args.strict_host_compiler {
        MissingHostCompiler::Fail
    } else {
        MissingHostCompiler::Warn
    };
    let flags = ToolchainLocator::from_env().with_policy(policy).locate_from_env()?;
    debug!("toolchain flags: {:?}", flags.as_slice());

    let unknown = unknown_extensions(&manifest, &args.extensions);
    if !unknown.is_empty() {
        return Err(format!("No extension named {} in {}", unknown.join(", "), args.manifest.display()).into());
    }

    let root = manifest_dir(&args.manifest);
    let config = DriverConfig::new(nvcc_factory())
        .with_source_root(&root)
        .with_build_temp(args.build_temp.unwrap_or_else(|| root.join("build").join("temp")))
        .with_build_lib(args.build_lib.unwrap_or_else(|| root.join("build").join("lib")))
        .with_debug(args.debug)
        .with_verbose(verbose)
        .with_dry_run(args.dry_run);
    let driver = BuildDriver::new(config);

    let mut built = 0usize;
    for ext in manifest.extensions_with_flags(&flags) {
        if !args.extensions.is_empty() && !args.extensions.contains(&ext.name) {
            output::skipping(&ext.name);
            continue;
        }

        output::compiling(&format!("{} ({} sources)", ext.name, ext.sources.len()));
        let result = driver.build_extension(&ext)?;
        output::linked(&result.artifact.display().to_string());
        built += 1;
    }

    output::finished(&format!(
        "{} v{}: {} extension(s) in {}",
        manifest.name,
        manifest.version,
        built,
        output::format_duration(start.elapsed().as_secs_f64())
    ));

    Ok(())
}

/// Requested names the manifest does not define
fn unknown_extensions<'a>(manifest: &PackageManifest, requested: &'a [String]) -> Vec<&'a str> {
    requested
        .iter()
        .filter(|name| !manifest.extensions.iter().any(|ext| &ext.name == *name))
        .map(String::as_str)
        .collect()
}

fn manifest_dir(manifest: &Path) -> PathBuf {
    match manifest.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
