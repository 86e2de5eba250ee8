//! Example demonstrating prefixed variables
//!
//! Build tools often expose only variables with a public prefix to client
//! bundles. The schema keeps its own key names; only reading is prefixed.

use envschema::{EnvSnapshot, Loader, Schema};

fn main() -> anyhow::Result<()> {
    let schema = Schema::builder()
        .field("API_URL", "string.url")
        .field("ANALYTICS?", "boolean")
        .build()?;

    let env: EnvSnapshot = [
        ("VITE_API_URL", "https://api.example.com"),
        ("VITE_ANALYTICS", "false"),
        // Not read: missing the prefix
        ("API_URL", "http://internal:9000"),
    ]
    .into_iter()
    .collect();

    let record = Loader::new(&schema).prefix("VITE_").load(&env)?;

    println!("Configuration with prefix 'VITE_':");
    println!("  API URL: {}", record["API_URL"]);
    println!("  Analytics: {}", record["ANALYTICS"]);

    Ok(())
}
