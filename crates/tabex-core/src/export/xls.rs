//! SpreadsheetML (Excel 2003 XML) formatter

use super::formatter::{ExportContext, Formatter, Table};
use crate::descriptor::Chain;
use crate::error::{Result, TabexError};
use crate::value::{ExportData, Value};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

const OFFICE_URN: &str = "urn:schemas-microsoft-com:office:";

/// Spreadsheet XML formatter
pub struct XlsFormatter {
    /// Indentation width for the generated XML
    indent: usize,
}

impl XlsFormatter {
    /// Create a formatter with two-space indentation
    pub fn new() -> Self {
        Self { indent: 2 }
    }

    /// Set the indentation width (0 disables pretty-printing)
    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }
}

impl Default for XlsFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl Formatter for XlsFormatter {
    fn data_format(&self) -> &str {
        "xls"
    }

    fn file_extension(&self) -> &str {
        "xls"
    }

    fn process(
        &self,
        chains: &[Chain],
        data: &ExportData,
        ctx: ExportContext<'_>,
    ) -> Result<Vec<u8>> {
        let table = Table::build(chains, data, ctx)?;

        let writer = if self.indent > 0 {
            Writer::new_with_indent(Vec::new(), b' ', self.indent)
        } else {
            Writer::new(Vec::new())
        };
        let mut sheet = SheetWriter { writer };

        sheet.event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        let spreadsheet = format!("{}spreadsheet", OFFICE_URN);
        let office = format!("{}office", OFFICE_URN);
        let excel = format!("{}excel", OFFICE_URN);
        sheet.open(
            "Workbook",
            &[
                ("xmlns", spreadsheet.as_str()),
                ("xmlns:o", office.as_str()),
                ("xmlns:x", excel.as_str()),
                ("xmlns:ss", spreadsheet.as_str()),
                ("xmlns:html", "http://www.w3.org/TR/REC-html40"),
            ],
        )?;

        let sheet_name = format!("{} Export", data.kind_name());
        sheet.open("Worksheet", &[("ss:Name", sheet_name.as_str())])?;
        sheet.open("Table", &[])?;

        sheet.open("Row", &[])?;
        for header in &table.headers {
            sheet.cell(header, "String")?;
        }
        sheet.close("Row")?;

        for row in &table.rows {
            sheet.open("Row", &[])?;
            for value in row {
                sheet.cell(&value.to_cell_string(), cell_type(value))?;
            }
            sheet.close("Row")?;
        }

        sheet.close("Table")?;
        sheet.close("Worksheet")?;
        sheet.close("Workbook")?;

        Ok(sheet.writer.into_inner())
    }
}

/// Spreadsheet cell type: Excel only accepts Number and String here
fn cell_type(value: &Value) -> &'static str {
    if value.is_number() {
        "Number"
    } else {
        "String"
    }
}

struct SheetWriter {
    writer: Writer<Vec<u8>>,
}

impl SheetWriter {
    fn event(&mut self, event: Event<'_>) -> Result<()> {
        self.writer
            .write_event(event)
            .map_err(|e| TabexError::encode("xls", e))
    }

    fn open(&mut self, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
        let start = BytesStart::new(name).with_attributes(attributes.iter().copied());
        self.event(Event::Start(start))
    }

    fn close(&mut self, name: &str) -> Result<()> {
        self.event(Event::End(BytesEnd::new(name)))
    }

    fn cell(&mut self, text: &str, cell_type: &str) -> Result<()> {
        self.open("Cell", &[])?;
        self.open("Data", &[("ss:Type", cell_type)])?;
        self.event(Event::Text(BytesText::new(text)))?;
        self.close("Data")?;
        self.close("Cell")
    }
}
