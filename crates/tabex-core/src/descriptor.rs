//! Field descriptors and their flattening into accessor chains
//!
//! A descriptor is an ordered list of leaves and groups:
//!
//! ```text
//! ["split", {"to_s": ["split"]}]   =>   split, to_s.split
//! ```
//!
//! [`PathResolver`] walks it with an explicit stack so nesting depth never
//! grows the call stack.

use crate::error::{Result, TabexError};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Separator between accessor names in a rendered chain
pub const CHAIN_SEPARATOR: char = '.';

/// One element of a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// A single accessor name
    Leaf(String),
    /// Descend into `key`, then resolve the children relative to it
    Group(String, Vec<FieldSpec>),
}

impl FieldSpec {
    pub fn leaf(name: impl Into<String>) -> Self {
        FieldSpec::Leaf(name.into())
    }

    pub fn group(key: impl Into<String>, children: Vec<FieldSpec>) -> Self {
        FieldSpec::Group(key.into(), children)
    }

    /// Parse one descriptor element from JSON
    ///
    /// A string is a leaf; an object with exactly one key mapping to an array
    /// is a group. Everything else is malformed.
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        match json {
            serde_json::Value::String(name) => Ok(FieldSpec::Leaf(name.clone())),
            serde_json::Value::Object(map) => {
                if map.len() != 1 {
                    let keys: Vec<_> = map.keys().map(String::as_str).collect();
                    return Err(TabexError::MalformedDescriptor(format!(
                        "group must have exactly one key, found [{}]",
                        keys.join(", ")
                    )));
                }

                let (key, children) = map.iter().next().ok_or_else(|| {
                    TabexError::MalformedDescriptor("empty group".to_string())
                })?;

                let children = children.as_array().ok_or_else(|| {
                    TabexError::MalformedDescriptor(format!(
                        "group '{}' must map to a list of fields",
                        key
                    ))
                })?;

                let children = children
                    .iter()
                    .map(FieldSpec::from_json)
                    .collect::<Result<Vec<_>>>()?;

                Ok(FieldSpec::Group(key.clone(), children))
            }
            other => Err(TabexError::MalformedDescriptor(format!(
                "expected a field name or a single-key group, found {}",
                other
            ))),
        }
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            FieldSpec::Leaf(name) => serde_json::Value::String(name.clone()),
            FieldSpec::Group(key, children) => {
                let mut map = serde_json::Map::new();
                map.insert(
                    key.clone(),
                    serde_json::Value::Array(children.iter().map(FieldSpec::to_json).collect()),
                );
                serde_json::Value::Object(map)
            }
        }
    }
}

/// An ordered sequence of field specs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Descriptor(Vec<FieldSpec>);

impl Descriptor {
    pub fn new(fields: Vec<FieldSpec>) -> Self {
        Self(fields)
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse a descriptor from a JSON array
    pub fn from_json(json: &serde_json::Value) -> Result<Self> {
        let items = json.as_array().ok_or_else(|| {
            TabexError::MalformedDescriptor("descriptor must be a list of fields".to_string())
        })?;

        items
            .iter()
            .map(FieldSpec::from_json)
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    /// Parse a descriptor from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(content)?;
        Self::from_json(&json)
    }

    /// Build a descriptor from dotted paths, one leaf per path
    ///
    /// `address.city` becomes `{"address": ["city"]}`.
    pub fn from_paths<I, S>(paths: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        paths
            .into_iter()
            .map(|path| {
                let chain: Chain = path.as_ref().parse()?;
                let mut segments = chain.0.into_iter().rev();
                let leaf = segments.next().ok_or_else(|| {
                    TabexError::MalformedDescriptor("empty path".to_string())
                })?;
                Ok(segments.fold(FieldSpec::Leaf(leaf), |inner, key| {
                    FieldSpec::Group(key, vec![inner])
                }))
            })
            .collect::<Result<Vec<_>>>()
            .map(Self)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.0.iter().map(FieldSpec::to_json).collect())
    }

    /// Flatten into accessor chains
    pub fn resolve(&self) -> Result<Vec<Chain>> {
        PathResolver::resolve(&self.0)
    }
}

impl From<Vec<FieldSpec>> for Descriptor {
    fn from(fields: Vec<FieldSpec>) -> Self {
        Self(fields)
    }
}

/// A full accessor path from the record root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Chain(Vec<String>);

impl Chain {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Human-readable column header
    ///
    /// Underscores and dots become spaces, the first character is upper-cased
    /// and the remainder lower-cased: `to_s.split` -> `To s split`.
    pub fn label(&self) -> String {
        let spaced: String = self
            .to_string()
            .chars()
            .map(|c| if c == '_' || c == CHAIN_SEPARATOR { ' ' } else { c })
            .collect();

        let mut chars = spaced.chars();
        match chars.next() {
            Some(first) => first
                .to_uppercase()
                .chain(chars.flat_map(char::to_lowercase))
                .collect(),
            None => String::new(),
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(&CHAIN_SEPARATOR.to_string()))
    }
}

impl FromStr for Chain {
    type Err = TabexError;

    fn from_str(s: &str) -> Result<Self> {
        let segments: Vec<String> = s.split(CHAIN_SEPARATOR).map(str::to_string).collect();
        for segment in &segments {
            validate_name(segment)?;
        }
        Ok(Self(segments))
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TabexError::MalformedDescriptor(
            "field name cannot be empty".to_string(),
        ));
    }
    if name.contains(CHAIN_SEPARATOR) {
        return Err(TabexError::MalformedDescriptor(format!(
            "field name '{}' cannot contain '{}'",
            name, CHAIN_SEPARATOR
        )));
    }
    Ok(())
}

/// Position inside one nesting level
struct Cursor<'a> {
    index: usize,
    values: &'a [FieldSpec],
}

impl<'a> Cursor<'a> {
    fn new(values: &'a [FieldSpec]) -> Self {
        Self { index: 0, values }
    }

    fn current(&self) -> Option<&'a FieldSpec> {
        self.values.get(self.index)
    }
}

/// Flattens descriptors into chains
///
/// `current` walks the level being read. Each entry of `parents` pairs the
/// group key that was entered with the cursor of the enclosing level, so the
/// keys read bottom-to-top are the prefix of the chain under construction.
pub struct PathResolver<'a> {
    current: Cursor<'a>,
    parents: Vec<(&'a str, Cursor<'a>)>,
    chains: Vec<Chain>,
}

impl<'a> PathResolver<'a> {
    fn new(fields: &'a [FieldSpec]) -> Self {
        Self {
            current: Cursor::new(fields),
            parents: Vec::new(),
            chains: Vec::new(),
        }
    }

    /// Resolve a descriptor into chains in declaration order
    pub fn resolve(fields: &'a [FieldSpec]) -> Result<Vec<Chain>> {
        let mut resolver = Self::new(fields);
        resolver.run()?;
        debug!("Resolved {} chains from descriptor", resolver.chains.len());
        Ok(resolver.chains)
    }

    fn run(&mut self) -> Result<()> {
        loop {
            match self.current.current() {
                Some(FieldSpec::Group(key, children)) => {
                    validate_name(key)?;
                    self.descend(key, children);
                }
                Some(FieldSpec::Leaf(name)) => {
                    validate_name(name)?;
                    self.emit(name);
                    self.current.index += 1;
                }
                None => {
                    if !self.ascend() {
                        return Ok(());
                    }
                }
            }
        }
    }

    fn descend(&mut self, key: &'a str, children: &'a [FieldSpec]) {
        let parent = std::mem::replace(&mut self.current, Cursor::new(children));
        self.parents.push((key, parent));
    }

    /// Resume the enclosing level after the group just finished
    fn ascend(&mut self) -> bool {
        match self.parents.pop() {
            Some((_, parent)) => {
                self.current = parent;
                self.current.index += 1;
                true
            }
            None => false,
        }
    }

    fn emit(&mut self, name: &str) {
        let segments = self
            .parents
            .iter()
            .map(|(key, _)| key.to_string())
            .chain(std::iter::once(name.to_string()))
            .collect();
        self.chains.push(Chain(segments));
    }
}
