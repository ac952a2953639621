//! Tabular export
//!
//! This module turns records into tables through pluggable formatters.
//!
//! # Overview
//!
//! - [`FormatRegistry`] maps format tags to formatter factories
//! - [`Exporter`] resolves descriptor chains and dispatches to a formatter
//! - [`CsvFormatter`] writes delimited text
//! - [`XlsFormatter`] writes SpreadsheetML (Excel 2003 XML)
//!
//! # Example
//!
//! ```ignore
//! use tabex_core::export::{Exporter, FormatRegistry};
//!
//! let exporter = Exporter::new(Arc::new(FormatRegistry::with_defaults()), policy);
//! let csv = exporter.to("csv", &data, &descriptor)?;
//! ```

mod csv;
mod exporter;
mod formatter;
mod registry;
mod xls;

pub use self::csv::CsvFormatter;
pub use exporter::Exporter;
pub use formatter::{ExportContext, Formatter, Table};
pub use registry::{FormatRegistry, FormatterFactory, RegistrationPolicy};
pub use xls::XlsFormatter;
