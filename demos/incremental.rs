//! Feeding a document to the parser in arbitrary chunks.
//!
//! The chunks here split keys, strings, numbers and a datetime in the
//! middle; the result matches a single-shot parse.
//!
//! Run with: cargo run --example incremental

use std::error::Error;
use toml_cursor::{parse, parse_incremental};

const CHUNKS: [&str; 6] = [
    "[serv",
    "er]\nhost = \"exa",
    "mple.org\"\nports = [ 80, 4",
    "43 ]\nstarted = 2024-03-0",
    "1T12:00:00Z\n\n[[backends]]\nweight = 0.",
    "75\n",
];

fn main() -> Result<(), Box<dyn Error>> {
    let mut parser = parse_incremental();
    for (i, chunk) in CHUNKS.iter().enumerate() {
        parser.feed(chunk)?;
        println!("fed chunk {} ({} chars)", i + 1, chunk.chars().count());
    }
    let doc = parser.finish()?;

    println!("\nserver.host    = {}", doc["server"]["host"]);
    println!("server.ports   = {}", doc["server"]["ports"]);
    println!("server.started = {}", doc["server"]["started"]);
    println!("backends[0]    = {}", doc["backends"][0]);

    assert_eq!(doc, parse(&CHUNKS.concat())?);
    println!("\n✓ Same result as parsing the whole text");

    // Errors point at the character that broke the grammar, even when it
    // arrives in a later chunk.
    let source = "name = \"ok\"\ncount = 12x\n";
    let mut parser = parse_incremental();
    parser.feed(&source[..16])?;
    if let Err(err) = parser.feed(&source[16..]) {
        println!("\n{}", err.render(source));
    }

    Ok(())
}
