//! Build script for the ytauth command-line tool.
//!
//! Copies the `.env.example` configuration template into the user's local data
//! directory, next to the `.env` file that `config::load_env` reads at startup.

use std::{env, fs, path::PathBuf};

/// Copies `.env.example` from the crate root to the local data directory.
///
/// # Destination
///
/// - Linux: `~/.local/share/ytauth/.env.example`
/// - macOS: `~/Library/Application Support/ytauth/.env.example`
/// - Windows: `%LOCALAPPDATA%/ytauth/.env.example`
///
/// A missing template only produces a cargo warning. Failing to create the
/// destination directory or to write the file fails the build.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("cargo:rerun-if-changed=.env.example");

    let manifest_dir = PathBuf::from(env::var("CARGO_MANIFEST_DIR")?);
    let template = manifest_dir.join(".env.example");

    let mut out_dir = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    out_dir.push("ytauth");
    fs::create_dir_all(&out_dir)?;

    if template.is_file() {
        let contents = fs::read_to_string(&template)?;
        fs::write(out_dir.join(".env.example"), contents)?;
    } else {
        println!(
            "cargo:warning=.env.example not found at {}",
            template.display()
        );
    }

    Ok(())
}
