//! Example demonstrating record-level transforms and refinements

use envschema::{EnvSnapshot, Loader, Schema};
use serde_json::Value;

fn main() -> anyhow::Result<()> {
    let schema = Schema::builder()
        .field("DB_HOST", "string.host")
        .field("DB_PORT", "number.port = 5432")
        .field("POOL_MIN", "0 <= number.integer = 1")
        .field("POOL_MAX", "0 < number.integer <= 100 = 10")
        .build()?;

    // Queued until the schema is first used
    schema
        .refine("POOL_MIN must not exceed POOL_MAX", |record| {
            record.get_i64("POOL_MIN") <= record.get_i64("POOL_MAX")
        })?
        .pipe(|mut record| {
            let addr = format!(
                "{}:{}",
                record.get_str("DB_HOST").unwrap_or_default(),
                record.get_i64("DB_PORT").unwrap_or_default()
            );
            record.insert("DB_ADDR", Value::String(addr));
            Ok(record)
        })?;

    let env: EnvSnapshot = [("DB_HOST", "db.internal"), ("POOL_MIN", "4")]
        .into_iter()
        .collect();
    let record = Loader::new(&schema).load(&env)?;
    println!("Database address: {}", record["DB_ADDR"]);
    println!("Pool: {}..={}", record["POOL_MIN"], record["POOL_MAX"]);

    // The schema is realized now; further transforms are rejected
    if let Err(e) = schema.pipe(Ok) {
        println!("{e}");
    }

    // Fatal variant for process startup: prints the report and exits with status 1
    let env: EnvSnapshot = [("DB_HOST", "db.internal"), ("POOL_MIN", "50"), ("POOL_MAX", "20")]
        .into_iter()
        .collect();
    let _ = Loader::new(&schema).define(&env);

    Ok(())
}
