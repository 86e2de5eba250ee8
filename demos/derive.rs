//! Example demonstrating the derive macro

use envschema::EnvSchema;

#[derive(Debug, EnvSchema)]
struct Config {
    // Type expression inferred from the field type: "string"
    pub api_key: String,

    // Explicit type expression and default
    #[env(ty = "string.host", default = "'127.0.0.1'")]
    pub host: String,

    #[env(ty = "number.port", default = "8080")]
    pub port: u16,

    // Custom variable name
    #[env(name = "LOG_LEVEL", ty = "'debug' | 'info' | 'warn' | 'error' = 'info'")]
    pub level: String,

    // Optional key: None when unset
    pub max_connections: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    // Set environment variables for demonstration
    std::env::set_var("API_KEY", "secret-key-123");
    std::env::set_var("PORT", "3000");

    let config = Config::from_env()?;

    println!("Configuration loaded:");
    println!("  API Key: {}", config.api_key);
    println!("  Host: {}", config.host);
    println!("  Port: {}", config.port);
    println!("  Log level: {}", config.level);
    println!("  Max connections: {:?}", config.max_connections);

    Ok(())
}
