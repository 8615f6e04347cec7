//! Finds one record in a large CSV feed and stops reading the moment it
//! appears.
//!
//! The input simulates an inventory export arriving from the network: a
//! dated header comment, a column-name line, then one line per part with the
//! fields `sku,name,qty`.  We want the stock level of a *single* SKU.  Rather
//! than materializing the export, the parser is driven row by row and
//! cancelled as soon as the record of interest has been seen, so everything
//! after it is never even decoded.
//!
//! The feed looks roughly as follows (abridged):
//!
//! ```text
//! # inventory export 2026-08-21
//! sku,name,qty
//! A-0000,"bolt, M1",0
//! A-0001,"bolt, M2",3
//! ...
//! ```
//!
//! Run with
//!
//! ```bash
//! cargo run -p csvmodem --example inventory_lookup
//! ```

#![allow(clippy::doc_markdown)]

use csvmodem::{CsvEvent, CsvParser, ParserOptions};

const WANTED_SKU: &str = "A-0913";

fn main() {
    // A toy export with a few thousand rows.  In real life this would come
    // off a socket, and stopping early would save most of the transfer.
    let mut export = String::from("# inventory export 2026-08-21\nsku,name,qty\n");
    for index in 0..5_000 {
        let name = format!("bolt, M{}", index % 9 + 1);
        export.push_str(&format!("A-{index:04},\"{name}\",{}\n", index * 3 % 997));
    }

    // Small chunks mirror how the bytes would trickle in off the wire; the
    // event sequence is the same at any chunk size.
    let mut parser = CsvParser::new(
        export.as_bytes(),
        ParserOptions {
            chunk_size: 64,
            ..ParserOptions::default()
        },
    )
    .expect("default dialect is consistent");
    let handle = parser.cancel_handle();

    let mut row: Vec<String> = Vec::new();
    let mut lines = 0_usize;

    for event in parser.by_ref() {
        match event.expect("the export is well-formed") {
            CsvEvent::LineStart { .. } => row.clear(),
            CsvEvent::Field { value } => row.push(value),
            CsvEvent::Comment { text } => println!("feed header:{text}"),
            CsvEvent::LineEnd { .. } => {
                lines += 1;
                if row.first().is_some_and(|sku| sku == WANTED_SKU) {
                    println!("{WANTED_SKU}: {} of {:?} on hand", row[2], row[1]);
                    // Everything past this row is dead weight; stop the
                    // parse instead of draining the rest of the feed.
                    handle.cancel();
                }
            }
            _ => {}
        }
    }

    if parser.is_cancelled() {
        println!("stopped after {lines} lines, the rest never left the buffer");
    }
}
