//! tabex-core - Core library for tabex
//!
//! This crate turns records into tables: it flattens field descriptors into
//! accessor chains, reads them off each record, rewrites values through
//! presenters, and hands the rows to a registered formatter.

pub mod accessor;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod export;
pub mod presenter;
pub mod types;
pub mod value;

pub use accessor::AccessorTable;
pub use descriptor::{Chain, Descriptor, FieldSpec, PathResolver};
pub use error::{Result, TabexError};
pub use export::{Exporter, FormatRegistry, Formatter};
pub use presenter::{MatchMode, OutputPolicy, Presenter};
pub use types::{TypeHierarchy, TypeTag};
pub use value::{ExportData, Record, Value};
