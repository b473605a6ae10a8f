//! Parsing a TOML document into structs and writing it back.
//!
//! Run with: cargo run --example simple

use serde::{Deserialize, Serialize};
use std::error::Error;
use toml_cursor::{from_str, to_string};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Manifest {
    name: String,
    version: String,
    authors: Vec<String>,
    dependencies: Vec<Dependency>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Dependency {
    name: String,
    version: String,
    optional: Option<bool>,
}

const SOURCE: &str = r#"
name = "toml_cursor"
version = "0.1.0"
authors = ["Alice Johnson", "Bob Smith"]

[[dependencies]]
name = "serde"
version = "1.0"

[[dependencies]]
name = "tracing"
version = "0.1"
optional = true
"#;

fn main() -> Result<(), Box<dyn Error>> {
    let manifest: Manifest = from_str(SOURCE)?;
    println!("Parsed: {:#?}\n", manifest);

    let text = to_string(&manifest)?;
    println!("Written back:\n{}", text);

    let manifest_back: Manifest = from_str(&text)?;
    assert_eq!(manifest, manifest_back);
    println!("✓ Round-trip successful");

    Ok(())
}
