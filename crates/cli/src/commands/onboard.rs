//! `docchat onboard` — First-time setup.

use std::path::Path;

use docchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_path();

    println!("DocChat: First-Time Setup");
    println!("=========================\n");

    if write_default_config(&config_path)? {
        println!("Created config at: {}", config_path.display());
        println!("\nNext steps:");
        println!("   1. Add your API key to {} (or export GROQ_API_KEY)", config_path.display());
        println!("   2. Run: docchat chat --document notes.pdf");
        println!("   3. Or serve the HTTP API: docchat serve\n");
    } else {
        println!("Config already exists at: {}", config_path.display());
        println!("   Edit it manually or delete and re-run onboard.\n");
    }

    Ok(())
}

/// Write the default config to `path` unless a file is already there.
///
/// Returns whether a file was written.
fn write_default_config(path: &Path) -> Result<bool, Box<dyn std::error::Error>> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    std::fs::write(path, AppConfig::default_toml())?;
    Ok(true)
}
