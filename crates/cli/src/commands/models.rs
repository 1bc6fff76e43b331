//! `docchat models` — List models offered by the configured provider.

use docchat_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let router = docchat_providers::build_from_config(&config);
    let gateway = router.default().ok_or("No default provider configured")?;

    println!("Models from {}", gateway.name());
    println!();

    let mut models = gateway.list_models().await?;
    if models.is_empty() {
        println!("  (the provider returned no models)");
        return Ok(());
    }
    models.sort();

    for model in &models {
        let marker = if *model == config.default_model { "*" } else { " " };
        println!("  {marker} {model}");
    }
    println!();
    println!("  * = configured default_model");

    Ok(())
}
