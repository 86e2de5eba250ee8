//! Basic usage example

use envschema::{load_env, EnvSnapshot, Schema};

fn main() -> anyhow::Result<()> {
    let schema = Schema::builder()
        // Required: a URL
        .field("DATABASE_URL", "string.url")
        // With default value
        .field("PORT", "number.port = 3000")
        // Boolean type; only "true" / "false" are accepted
        .field("DEBUG", "boolean = false")
        // One of a fixed set of values
        .field("NODE_ENV", "'development' | 'production' | 'test' = 'development'")
        .build()?;

    // Variables for demonstration
    let env: EnvSnapshot = [
        ("DATABASE_URL", "postgres://localhost/mydb"),
        ("PORT", "8080"),
        ("DEBUG", "true"),
    ]
    .into_iter()
    .collect();

    let record = load_env(&schema, &env)?;

    println!("Environment loaded:");
    println!("  Database URL: {}", record["DATABASE_URL"]);
    println!("  Port: {}", record["PORT"]);
    println!("  Debug: {}", record["DEBUG"]);
    println!("  Node env: {}", record["NODE_ENV"]);

    // Every problem is reported at once
    let broken: EnvSnapshot = [("PORT", "65536"), ("DEBUG", "yes")].into_iter().collect();
    if let Err(e) = load_env(&schema, &broken) {
        println!();
        println!("{e}");
    }

    Ok(())
}
