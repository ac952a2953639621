//! tabex - descriptor-driven tabular export
//!
//! Reads JSON records and writes them as CSV or spreadsheet XML, one column
//! per field chain.
//!
//! ## Quick Start
//!
//! ```bash
//! # Export two columns as CSV
//! tabex export --data people.json --field name --field address.city
//!
//! # Use a descriptor file and write a spreadsheet
//! tabex export --data people.json --fields fields.json --format xls -o people
//!
//! # Inspect what a descriptor resolves to
//! tabex chains --fields fields.json
//! ```

mod commands;

fn main() {
    if let Err(err) = commands::run() {
        eprintln!("Error: {:#}", err);
        std::process::exit(1);
    }
}
