use nvext_core::nvcc::NVCC;
use nvext_core::{Discovery, ExecutableFinder, PathFinder, Platform};

pub fn execute() -> Result<(), Box<dyn std::error::Error>> {
    println!("nvext {}", env!("CARGO_PKG_VERSION"));
    println!("Platform: {} ({})", Platform::host(), std::env::consts::ARCH);

    match PathFinder::from_env().find(NVCC) {
        Discovery::Found(path) => println!("nvcc: {}", path.display()),
        Discovery::NotFound { .. } => println!("nvcc: (not found on PATH)"),
    }

    Ok(())
}
