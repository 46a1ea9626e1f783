mod commands;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nvext")]
#[command(author, version, about = "Build CUDA extensions with nvcc", long_about = None)]
pub struct Cli {
    /// Log every nvcc command before running it
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compile and link every extension in a manifest
    Build(commands::build::BuildArgs),

    /// Print the extra nvcc flags resolved from the environment
    Flags(commands::flags::FlagsArgs),

    /// Show version information
    Version,
}

fn main() {
    let cli = Cli::parse();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();

    let result = match cli.command {
        Commands::Build(args) => commands::build::execute(args, cli.verbose),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Version => commands::version::execute(),
    };

    if let Err(e) = result {
        output::error(&e.to_string());
        std::process::exit(1);
    }
}
