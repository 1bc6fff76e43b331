//! `docchat config` — Configuration management commands.

use docchat_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   [ok] Config parsed and validated");

            let warnings = warnings_for(&config);
            if warnings.is_empty() {
                println!("   [ok] All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   [warn] {w}");
                }
            }

            println!();
            println!("   Provider:  {}", config.default_provider);
            println!("   Model:     {}", config.default_model);
            println!("   Server:    {}:{}", config.server.host, config.server.port);
            println!("   Document:  {} chars", config.session.max_document_length);
            println!("   Sessions:  up to {}", config.session.max_sessions);
        }
        Err(e) => {
            println!("   [fail] Config error: {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Settings that load fine but are probably not what the user wants.
fn warnings_for(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();

    if !config.has_api_key() && config.default_provider != "ollama" {
        warnings.push("No API key set (set GROQ_API_KEY or DOCCHAT_API_KEY)");
    }

    if config.server.host == "0.0.0.0" {
        warnings.push("Server bound to 0.0.0.0; sessions are reachable from the network");
    }

    if config.session.max_upload_bytes == 0 {
        warnings.push("session.max_upload_bytes is 0; every upload will be rejected");
    }

    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    println!("{}", redacted_toml(&config)?);
    Ok(())
}

fn redacted_toml(config: &AppConfig) -> Result<String, toml::ser::Error> {
    let mut config = config.clone();
    if config.api_key.is_some() {
        config.api_key = Some("[REDACTED]".into());
    }
    for provider in config.providers.values_mut() {
        if provider.api_key.is_some() {
            provider.api_key = Some("[REDACTED]".into());
        }
    }
    toml::to_string_pretty(&config)
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}
