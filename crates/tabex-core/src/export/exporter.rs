//! Export orchestration

use super::formatter::ExportContext;
use super::registry::FormatRegistry;
use crate::accessor::AccessorTable;
use crate::descriptor::Descriptor;
use crate::error::{Result, TabexError};
use crate::presenter::OutputPolicy;
use crate::value::ExportData;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Dispatches export jobs to registered formatters
pub struct Exporter {
    registry: Arc<FormatRegistry>,
    policy: OutputPolicy,
    accessors: AccessorTable,
}

impl Exporter {
    /// Create an exporter over a registry and output policy
    pub fn new(registry: Arc<FormatRegistry>, policy: OutputPolicy) -> Self {
        Self {
            registry,
            policy,
            accessors: AccessorTable::new(),
        }
    }

    /// Replace the accessor table
    pub fn with_accessors(mut self, accessors: AccessorTable) -> Self {
        self.accessors = accessors;
        self
    }

    pub fn registry(&self) -> &FormatRegistry {
        &self.registry
    }

    pub fn policy(&self) -> &OutputPolicy {
        &self.policy
    }

    /// Export `data` in `format`, reading the columns named by `descriptor`
    ///
    /// A descriptor that resolves to no columns is rejected: a table without
    /// columns has no faithful encoding.
    pub fn to(&self, format: &str, data: &ExportData, descriptor: &Descriptor) -> Result<Vec<u8>> {
        let factory = self.registry.lookup(format)?;
        let chains = descriptor.resolve()?;
        if chains.is_empty() {
            return Err(TabexError::MalformedDescriptor(
                "descriptor resolves to no columns".to_string(),
            ));
        }
        let formatter = factory();

        debug!(
            "Exporting {} records as {} ({} columns)",
            data.len(),
            format,
            chains.len()
        );

        formatter.process(
            &chains,
            data,
            ExportContext::new(&self.policy, &self.accessors),
        )
    }

    /// Export to a UTF-8 string
    pub fn to_string(
        &self,
        format: &str,
        data: &ExportData,
        descriptor: &Descriptor,
    ) -> Result<String> {
        let bytes = self.to(format, data, descriptor)?;
        String::from_utf8(bytes).map_err(|e| TabexError::encode(format, e))
    }

    /// Export to a file, returning the path written
    ///
    /// The formatter's extension is appended when `path` has none. Output is
    /// written to a temporary file and renamed into place.
    pub fn to_file(
        &self,
        format: &str,
        data: &ExportData,
        descriptor: &Descriptor,
        path: &Path,
    ) -> Result<PathBuf> {
        let content = self.to(format, data, descriptor)?;

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let final_path = if path.extension().is_some() {
            path.to_path_buf()
        } else {
            path.with_extension(self.registry.file_extension(format)?)
        };

        // Atomic write using temp file
        let temp_path = final_path.with_extension("tmp");
        write_then_rename(&temp_path, &final_path, &content).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            TabexError::Io(e)
        })?;

        info!("Exported {} records to {:?}", data.len(), final_path);
        Ok(final_path)
    }
}

fn write_then_rename(temp_path: &Path, final_path: &Path, content: &[u8]) -> std::io::Result<()> {
    let mut file = fs::File::create(temp_path)?;
    file.write_all(content)?;
    file.flush()?;
    drop(file);
    fs::rename(temp_path, final_path)
}
