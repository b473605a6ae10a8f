//! Customizing TOML output with StringifyOptions.
//!
//! Run with: cargo run --example custom_options

use serde::Serialize;
use std::error::Error;
use toml_cursor::{stringify_with_options, to_value, StringifyOptions, Value};

#[derive(Debug, Serialize)]
struct Config {
    name: String,
    population: u64,
    area_km2: f64,
    districts: Vec<String>,
    limits: Limits,
}

#[derive(Debug, Serialize)]
struct Limits {
    max_connections: u32,
    nested: Nested,
}

#[derive(Debug, Serialize)]
struct Nested {
    timeout_ms: u32,
}

fn main() -> Result<(), Box<dyn Error>> {
    let config = Config {
        name: "New York".to_string(),
        population: 8_336_817,
        area_km2: 1223.59,
        districts: ["Manhattan", "Brooklyn", "Queens", "The Bronx", "Staten Island"]
            .map(String::from)
            .to_vec(),
        limits: Limits {
            max_connections: 10_000,
            nested: Nested { timeout_ms: 2500 },
        },
    };
    let Value::Table(table) = to_value(&config)? else {
        return Err("config did not serialize to a table".into());
    };

    println!("Default:");
    println!("{}", stringify_with_options(&table, StringifyOptions::default())?);

    // Four-space nesting, grouped digits
    println!("Indent 4, grouped digits:");
    let options = StringifyOptions::new().with_indent(4).with_group_digits(true);
    println!("{}", stringify_with_options(&table, options)?);

    // Every array on its own lines
    println!("Array width 0:");
    let options = StringifyOptions::new().with_array_width(0);
    println!("{}", stringify_with_options(&table, options)?);

    Ok(())
}
