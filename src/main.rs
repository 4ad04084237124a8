use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::{error, info, warn};

use artcart::convert;

/// Converts ascii texture files between the .art text form and the binary
/// .cart cartridge form. Each input produces a sibling file with the
/// extension swapped; inputs that fail to parse are reported and skipped.
#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    /// Files to convert; .art inputs become .cart and vice versa
    #[arg(required = true)]
    paths: Vec<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut converted = 0usize;
    for path in &cli.paths {
        if !path.exists() {
            warn!("the file {} does not exist, skipping", path.display());
            continue;
        }
        match convert::convert_file(path) {
            Ok(output) => {
                info!("converted {} to {}", path.display(), output.display());
                converted += 1;
            }
            Err(err) => error!("skipping {}: {}", path.display(), err),
        }
    }

    if converted == 0 {
        anyhow::bail!("no files were converted");
    }
    Ok(())
}
