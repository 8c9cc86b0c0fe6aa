//! messylib - lists the helper modules and how to pull each one in.

use anyhow::{Context, Result};
use clap::Parser;
use messylib::logging::init_logger;
use messylib::Registry;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Parser)]
#[command(name = "messylib")]
#[command(about = "List the available messylib submodules")]
struct Args {
    /// Scan this modules directory instead of the builtin table
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.verbose);

    let registry = match &args.dir {
        Some(dir) => {
            debug!("Scanning {}", dir.display());
            Registry::discover(dir)
                .with_context(|| format!("failed to scan '{}'", dir.display()))?
        }
        None => Registry::builtin(),
    };
    info!("Found {} modules", registry.len());

    println!("Available submodules");
    for (name, manifest) in registry.iter() {
        println!("  {}", name);
        println!("    manifest: {}", manifest.display());
        if let Some(cmd) = registry.install_command(name) {
            println!("    install:  {}", cmd);
        }
    }
    Ok(())
}
