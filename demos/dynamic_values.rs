//! Working with Value for runtime flexibility.
//!
//! Run with: cargo run --example dynamic_values

use serde::{Deserialize, Serialize};
use std::error::Error;
use toml_cursor::{parse, stringify_value, to_value, toml, Value, ValueKind};

#[derive(Debug, Serialize, Deserialize)]
struct User {
    id: u32,
    name: String,
    roles: Vec<String>,
}

fn main() -> Result<(), Box<dyn Error>> {
    // Build config dynamically with toml! macro
    let config = toml!({
        "host": "localhost",
        "port": 8080,
        "features": ["auth", "logging", "metrics"],
        "debug": true
    });

    println!("Config as TOML:\n{}", stringify_value(&config)?);

    if let Some(host) = config.get("host").and_then(Value::as_str) {
        println!("Accessing field 'host': {}", host);
    }
    if let Some(port) = config.get("port").and_then(Value::as_integer) {
        println!("Accessing field 'port': {}", port);
    }
    if let Some(features) = config.get("features").and_then(Value::as_array) {
        println!("Accessing field 'features': {} items\n", features.len());
    }

    // Convert existing struct to Value
    let user = User {
        id: 123,
        name: "Alice".to_string(),
        roles: vec!["admin".to_string(), "developer".to_string()],
    };
    let user_value = to_value(&user)?;
    println!("User as TOML:\n{}", stringify_value(&user_value)?);

    // Kinds distinguish how a value was written, not just its type
    let doc = parse("inline = { a = 1 }\n[block]\na = 1\n[[list]]\n")?;
    for (key, value) in &doc {
        let layout = match value.kind() {
            ValueKind::InlineTable => "inline table",
            ValueKind::Table => "table",
            ValueKind::List => "array of tables",
            ValueKind::InlineList => "inline array",
            _ => "scalar",
        };
        println!("  {:<7} {}", key, layout);
    }
    assert_eq!(doc["inline"], doc["block"]);

    Ok(())
}
