//! Format registry: tag -> formatter factory

use super::formatter::Formatter;
use crate::error::{Result, TabexError};
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Builds a fresh formatter for one export
pub type FormatterFactory = Arc<dyn Fn() -> Box<dyn Formatter> + Send + Sync>;

/// What happens when a tag is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegistrationPolicy {
    /// Later registration replaces the earlier one
    #[default]
    Overwrite,
    /// Second registration fails with `DuplicateFormat`
    Reject,
}

/// Registry of available export formats
///
/// Mutation needs `&mut self`; share a finished registry behind an `Arc`.
pub struct FormatRegistry {
    factories: HashMap<String, FormatterFactory>,
    policy: RegistrationPolicy,
}

impl FormatRegistry {
    /// Create an empty registry that overwrites on re-registration
    pub fn new() -> Self {
        Self::with_policy(RegistrationPolicy::Overwrite)
    }

    /// Create an empty registry with the given registration discipline
    pub fn with_policy(policy: RegistrationPolicy) -> Self {
        Self {
            factories: HashMap::new(),
            policy,
        }
    }

    /// Create a registry with the built-in `csv` and `xls` formatters
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.factories.extend(
            builtin_factories()
                .into_iter()
                .map(|(tag, factory)| (tag.to_string(), factory)),
        );
        registry
    }

    /// Register the built-in formatters under this registry's policy
    ///
    /// Under `Overwrite` the built-ins replace earlier registrations for
    /// `csv` and `xls`; register custom formatters afterwards to keep them.
    /// Under `Reject` an earlier registration fails with `DuplicateFormat`.
    pub fn register_defaults(&mut self) -> Result<()> {
        for (tag, factory) in builtin_factories() {
            self.register(tag, factory)?;
        }
        Ok(())
    }

    /// Register a formatter factory under `tag`
    pub fn register(&mut self, tag: impl Into<String>, factory: FormatterFactory) -> Result<()> {
        let tag = tag.into();

        if self.factories.contains_key(&tag) {
            match self.policy {
                RegistrationPolicy::Reject => return Err(TabexError::DuplicateFormat(tag)),
                RegistrationPolicy::Overwrite => debug!("Replacing formatter for {}", tag),
            }
        }

        self.factories.insert(tag, factory);
        Ok(())
    }

    /// Register a formatter type by its constructor, using its own tag
    pub fn register_formatter<F>(&mut self, make: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Formatter> + Send + Sync + 'static,
    {
        let tag = make().data_format().to_string();
        self.register(tag, Arc::new(make))
    }

    /// Look up the factory for `tag`
    pub fn lookup(&self, tag: &str) -> Result<FormatterFactory> {
        self.factories
            .get(tag)
            .cloned()
            .ok_or_else(|| TabexError::UnknownExportFormat(tag.to_string()))
    }

    /// Registered tags
    pub fn known_tags(&self) -> BTreeSet<String> {
        self.factories.keys().cloned().collect()
    }

    /// Check if a format is available
    pub fn has_format(&self, tag: &str) -> bool {
        self.factories.contains_key(tag)
    }

    /// File extension produced by the formatter for `tag`
    pub fn file_extension(&self, tag: &str) -> Result<String> {
        let factory = self.lookup(tag)?;
        let formatter = factory();
        Ok(formatter.file_extension().to_string())
    }

    pub fn policy(&self) -> RegistrationPolicy {
        self.policy
    }
}

fn builtin_factories() -> [(&'static str, FormatterFactory); 2] {
    let csv: FormatterFactory =
        Arc::new(|| -> Box<dyn Formatter> { Box::new(super::csv::CsvFormatter::new()) });
    let xls: FormatterFactory =
        Arc::new(|| -> Box<dyn Formatter> { Box::new(super::xls::XlsFormatter::new()) });
    [("csv", csv), ("xls", xls)]
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for FormatRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatRegistry")
            .field("formats", &self.known_tags())
            .field("policy", &self.policy)
            .finish()
    }
}
