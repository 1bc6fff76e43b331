//! `docchat serve` — Start the HTTP API server.

use docchat_config::AppConfig;

pub async fn run(
    port_override: Option<u16>,
    host_override: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.server.port = port;
    }
    if let Some(host) = host_override {
        config.server.host = host;
    }

    println!("DocChat Server");
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!("   Provider:  {} ({})", config.default_provider, config.default_model);
    if !config.has_api_key() {
        println!("   Warning:   no API key configured; completions will fail");
    }

    docchat_server::start(config).await?;

    Ok(())
}
