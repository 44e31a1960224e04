//! `codeward serve` — Start the HTTP gateway.

use std::path::Path;

pub async fn run(
    config: Option<&Path>,
    port: Option<u16>,
    host: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = super::load_config(config)?;

    if let Some(port) = port {
        config.gateway.port = port;
    }
    if let Some(host) = host {
        config.gateway.host = host;
    }

    println!("🛡️  Codeward Gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Data dir:  {}", config.data_dir.display());

    codeward_gateway::start(config).await?;

    Ok(())
}
