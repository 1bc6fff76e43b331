//! `docchat doctor` — Diagnose configuration and provider health.

use docchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    println!("DocChat Doctor: System Diagnostics");
    println!("==================================\n");

    let mut issues = 0;

    let config_path = AppConfig::config_path();
    if config_path.exists() {
        println!("  [ok]   Config file found: {}", config_path.display());
    } else {
        println!("  [warn] No config file, using defaults (run `docchat onboard`)");
    }

    let config = match AppConfig::load() {
        Ok(config) => {
            println!("  [ok]   Configuration valid");
            config
        }
        Err(e) => {
            println!("  [fail] Config invalid: {e}");
            println!("\n  1 issue(s) found. Fix the configuration and re-run.");
            return Ok(());
        }
    };

    if config.has_api_key() {
        println!("  [ok]   API key configured");
    } else if config.default_provider == "ollama" {
        println!("  [ok]   Local provider, no API key needed");
    } else {
        println!("  [fail] No API key (set GROQ_API_KEY or add api_key to the config)");
        issues += 1;
    }

    println!(
        "  [ok]   Document budget: {} chars, upload limit: {} bytes",
        config.session.max_document_length, config.session.max_upload_bytes
    );

    let router = docchat_providers::build_from_config(&config);
    match router.default() {
        Some(gateway) => match gateway.health_check().await {
            Ok(true) => println!("  [ok]   Provider '{}' reachable", gateway.name()),
            Ok(false) => {
                println!("  [fail] Provider '{}' responded with an error", gateway.name());
                issues += 1;
            }
            Err(e) => {
                println!("  [fail] Provider '{}' unreachable: {e}", gateway.name());
                issues += 1;
            }
        },
        None => {
            println!("  [fail] Default provider '{}' not configured", config.default_provider);
            issues += 1;
        }
    }

    // Summary
    println!();
    if issues == 0 {
        println!("  All checks passed!");
    } else {
        println!("  {issues} issue(s) found. See above for details.");
    }

    Ok(())
}
