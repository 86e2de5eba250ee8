//! Example demonstrating native and standard validators

use envschema::validator::{self, StandardIssue, StandardResult};
use envschema::{load_env, EnvSnapshot, FieldSpec, Issue, Schema};
use serde_json::{json, Value};

/// Seconds in a duration such as `30s`, `5m` or `2h`
fn parse_duration(raw: &str) -> Option<u64> {
    let (split, unit) = raw.char_indices().last()?;
    let n = raw[..split].parse::<u64>().ok()?;
    let scale = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        _ => return None,
    };
    n.checked_mul(scale)
}

fn main() -> anyhow::Result<()> {
    // Native validator: receives the raw string, returns the validated value
    let duration = validator::native("a duration such as 30s or 5m", |value: &Value| {
        let raw = value.as_str().unwrap_or_default();
        parse_duration(raw)
            .map(|s| json!(s))
            .ok_or_else(|| vec![Issue::refinement("a duration such as 30s or 5m", format!("{raw:?}"))])
    })
    .with_default(30);

    // Standard validator: a third-party style `parse` returning value or issues
    let origins = validator::standard("csv", |input: &Value| match input.as_str() {
        Some(raw) => {
            let items: Vec<&str> = raw.split(',').map(str::trim).collect();
            match items.iter().position(|item| !item.starts_with("https://")) {
                None => StandardResult::Value(json!(items)),
                Some(index) => StandardResult::Issues(vec![StandardIssue::new(
                    "origins must use https",
                )
                .with_path([index.to_string()])]),
            }
        }
        None => StandardResult::Issues(vec![StandardIssue::new("is required")]),
    });

    let schema = Schema::builder()
        .field("TIMEOUT", FieldSpec::native(duration))
        .field("CORS_ORIGINS", FieldSpec::standard(origins))
        .build()?;

    let env: EnvSnapshot = [("CORS_ORIGINS", "https://a.example, https://b.example")]
        .into_iter()
        .collect();
    let record = load_env(&schema, &env)?;
    println!("Timeout (seconds): {}", record["TIMEOUT"]);
    println!("CORS origins: {}", record["CORS_ORIGINS"]);

    let env: EnvSnapshot = [("TIMEOUT", "soon"), ("CORS_ORIGINS", "https://a.example, http://b")]
        .into_iter()
        .collect();
    if let Err(e) = load_env(&schema, &env) {
        println!();
        println!("{e}");
    }

    Ok(())
}
