//! Formatter trait and shared row production

use crate::accessor::AccessorTable;
use crate::descriptor::Chain;
use crate::error::Result;
use crate::presenter::OutputPolicy;
use crate::value::{ExportData, Value};
use tracing::debug;

/// Collaborators a formatter needs to turn records into cells
#[derive(Debug, Clone, Copy)]
pub struct ExportContext<'a> {
    pub policy: &'a OutputPolicy,
    pub accessors: &'a AccessorTable,
}

impl<'a> ExportContext<'a> {
    pub fn new(policy: &'a OutputPolicy, accessors: &'a AccessorTable) -> Self {
        Self { policy, accessors }
    }
}

/// Trait for tabular encoders
pub trait Formatter: Send + Sync {
    /// Format tag this formatter is registered under
    fn data_format(&self) -> &str;

    /// File extension for written output
    fn file_extension(&self) -> &str;

    /// Encode `data` as a table with one column per chain
    fn process(&self, chains: &[Chain], data: &ExportData, ctx: ExportContext<'_>)
        -> Result<Vec<u8>>;
}

/// Header labels plus converted cell values, row per record
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl Table {
    /// Read every chain off every record, in record order
    ///
    /// The table is complete before any encoder sees it, so a failing record
    /// leaves no partial output behind.
    pub fn build(chains: &[Chain], data: &ExportData, ctx: ExportContext<'_>) -> Result<Self> {
        let headers = chains.iter().map(Chain::label).collect();

        let rows = data
            .records()
            .iter()
            .enumerate()
            .map(|(index, record)| {
                chains
                    .iter()
                    .map(|chain| {
                        let raw = ctx.accessors.read(record, chain, index)?;
                        Ok(ctx.policy.convert(raw))
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            "Built table with {} columns and {} rows",
            chains.len(),
            data.len()
        );
        Ok(Self { headers, rows })
    }

    /// Rows rendered as cell text
    pub fn text_rows(&self) -> impl Iterator<Item = Vec<String>> + '_ {
        self.rows
            .iter()
            .map(|row| row.iter().map(Value::to_cell_string).collect())
    }
}
