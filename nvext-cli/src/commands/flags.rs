//! Flags command - show what every nvcc invocation will receive from the environment

use clap::Args;
use nvext_core::toolchain::FLAGS_ENV;
use nvext_core::{MissingHostCompiler, ToolchainLocator};

#[derive(Args)]
pub struct FlagsArgs {
    /// Fail instead of warning when MSVC cannot be found on Windows
    #[arg(long)]
    pub strict_host_compiler: bool,
}

pub fn execute(args: FlagsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let policy = if args.strict_host_compiler {
        MissingHostCompiler::Fail
    } else {
        MissingHostCompiler::Warn
    };
    let locator = ToolchainLocator::from_env().with_policy(policy);
    let flags = locator.locate_from_env()?;

    println!("Platform: {}", locator.platform());
    if flags.is_empty() {
        println!("{}: (none)", FLAGS_ENV);
    } else {
        println!("{}: {}", FLAGS_ENV, flags.as_slice().join(" "));
    }

    Ok(())
}
