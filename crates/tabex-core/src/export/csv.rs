//! Delimited text formatter

use super::formatter::{ExportContext, Formatter, Table};
use crate::descriptor::Chain;
use crate::error::{Result, TabexError};
use crate::value::ExportData;

/// CSV formatter
pub struct CsvFormatter {
    /// Field delimiter
    delimiter: u8,
    /// Whether to write the header row
    include_header: bool,
}

impl CsvFormatter {
    /// Create a comma-separated formatter with a header row
    pub fn new() -> Self {
        Self {
            delimiter: b',',
            include_header: true,
        }
    }

    /// Set the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set whether to write the header row
    pub fn with_header(mut self, include: bool) -> Self {
        self.include_header = include;
        self
    }
}

impl Default for CsvFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for CsvFormatter {
    fn data_format(&self) -> &str {
        "csv"
    }

    fn file_extension(&self) -> &str {
        "csv"
    }

    fn process(
        &self,
        chains: &[Chain],
        data: &ExportData,
        ctx: ExportContext<'_>,
    ) -> Result<Vec<u8>> {
        let table = Table::build(chains, data, ctx)?;
        // csv writes a zero-field record as `""`, which reads back as one column
        if chains.is_empty() {
            return Ok(Vec::new());
        }

        let mut writer = ::csv::WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(vec![]);

        if self.include_header {
            writer.write_record(&table.headers)?;
        }
        for row in table.text_rows() {
            writer.write_record(&row)?;
        }

        writer
            .into_inner()
            .map_err(|e| TabexError::encode("csv", e.error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::AccessorTable;
    use crate::presenter::OutputPolicy;
    use crate::value::{Record, Value};
    use pretty_assertions::assert_eq;

    fn people() -> ExportData {
        ExportData::Collection(vec![
            Record::new().field("name", "Ann").field("age", 30).into(),
            Record::new().field("name", "Bo").field("age", 41).into(),
        ])
    }

    fn chains(paths: &[&str]) -> Vec<Chain> {
        paths.iter().map(|p| p.parse().unwrap()).collect()
    }

    fn run(formatter: &CsvFormatter, paths: &[&str], data: &ExportData) -> String {
        let policy = OutputPolicy::passthrough();
        let accessors = AccessorTable::new();
        let bytes = formatter
            .process(&chains(paths), data, ExportContext::new(&policy, &accessors))
            .unwrap();
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_csv_rows_in_input_order() {
        let output = run(&CsvFormatter::new(), &["name", "age"], &people());
        assert_eq!(output, "Name,Age\nAnn,30\nBo,41\n");
    }

    #[test]
    fn test_csv_quotes_separators() {
        let data = ExportData::Single(
            Record::new()
                .field("note", "a, b")
                .field("tags", vec![Value::from("x"), Value::from("y")])
                .into(),
        );
        let output = run(&CsvFormatter::new(), &["note", "tags"], &data);
        assert_eq!(output, "Note,Tags\n\"a, b\",\"x, y\"\n");
    }

    #[test]
    fn test_csv_options() {
        let formatter = CsvFormatter::new().with_delimiter(b';').with_header(false);
        let output = run(&formatter, &["name", "age"], &people());
        assert_eq!(output, "Ann;30\nBo;41\n");
    }

    #[test]
    fn test_csv_no_columns_writes_nothing() {
        let output = run(&CsvFormatter::new(), &[], &people());
        assert_eq!(output, "");
    }

    #[test]
    fn test_csv_keeps_large_ids_and_whole_floats() {
        let data = ExportData::from_json(
            serde_json::json!([{"id": 18446744073709551615u64, "price": 30.0}]),
            None,
        );
        let output = run(&CsvFormatter::new(), &["id", "price"], &data);
        assert_eq!(output, "Id,Price\n18446744073709551615,30.0\n");
    }

    #[test]
    fn test_csv_empty_collection_has_header_only() {
        let output = run(&CsvFormatter::new(), &["name"], &ExportData::Collection(vec![]));
        assert_eq!(output, "Name\n");
    }
}
