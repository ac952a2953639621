//! Runtime type identities and the is-a hierarchy used for presenter matching

use crate::error::{Result, TabexError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Runtime type identity of a [`Value`](crate::value::Value)
///
/// `Any` and `Number` are abstract: no value carries them as its own tag,
/// they only appear as presenter targets and as ancestors.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TypeTag {
    Any,
    Null,
    Bool,
    Number,
    Integer,
    Float,
    Text,
    List,
    Record,
    /// A record carrying an explicit kind name
    Named(String),
}

impl TypeTag {
    /// Create a tag for a named record kind
    pub fn named(kind: impl Into<String>) -> Self {
        TypeTag::Named(kind.into())
    }

    /// Whether values can carry this tag as their own type
    pub fn is_concrete(&self) -> bool {
        !matches!(self, TypeTag::Any | TypeTag::Number)
    }

    /// Parent in the built-in hierarchy, ignoring declared kinds
    fn builtin_parent(&self) -> Option<TypeTag> {
        match self {
            TypeTag::Any => None,
            TypeTag::Integer | TypeTag::Float => Some(TypeTag::Number),
            TypeTag::Named(_) => Some(TypeTag::Record),
            _ => Some(TypeTag::Any),
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Any => "Any",
            TypeTag::Null => "Null",
            TypeTag::Bool => "Bool",
            TypeTag::Number => "Number",
            TypeTag::Integer => "Integer",
            TypeTag::Float => "Float",
            TypeTag::Text => "Text",
            TypeTag::List => "List",
            TypeTag::Record => "Record",
            TypeTag::Named(kind) => kind,
        };
        write!(f, "{}", name)
    }
}

impl FromStr for TypeTag {
    type Err = TabexError;

    /// Built-in names match case-insensitively; anything else is a record kind
    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(TabexError::Config("type name cannot be empty".to_string()));
        }

        let tag = match trimmed.to_ascii_lowercase().as_str() {
            "any" => TypeTag::Any,
            "null" | "nil" => TypeTag::Null,
            "bool" | "boolean" => TypeTag::Bool,
            "number" | "numeric" => TypeTag::Number,
            "integer" | "int" => TypeTag::Integer,
            "float" => TypeTag::Float,
            "text" | "string" => TypeTag::Text,
            "list" | "array" => TypeTag::List,
            "record" | "object" => TypeTag::Record,
            _ => TypeTag::Named(trimmed.to_string()),
        };
        Ok(tag)
    }
}

/// Explicit is-a registry
///
/// Built-in edges: `Integer` and `Float` are `Number`; every other built-in
/// is `Any`; a named kind is `Record` unless declared otherwise.
#[derive(Debug, Clone, Default)]
pub struct TypeHierarchy {
    parents: HashMap<String, TypeTag>,
}

impl TypeHierarchy {
    /// Create a hierarchy with only the built-in edges
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `kind` as a subtype of `parent`
    ///
    /// Named kinds are records, so the parent must be `Any`, `Record` or
    /// another named kind. Redeclaring a kind replaces its parent.
    pub fn declare(&mut self, kind: impl Into<String>, parent: TypeTag) -> Result<()> {
        let kind = kind.into();
        if kind.trim().is_empty() {
            return Err(TabexError::InvalidTypeHierarchy(
                "kind name cannot be empty".to_string(),
            ));
        }

        match &parent {
            TypeTag::Any | TypeTag::Record => {}
            TypeTag::Named(name) => {
                let child = TypeTag::Named(kind.clone());
                if name == &kind || self.is_a(&parent, &child) {
                    return Err(TabexError::InvalidTypeHierarchy(format!(
                        "declaring {} as a {} would create a cycle",
                        kind, name
                    )));
                }
            }
            other => {
                return Err(TabexError::InvalidTypeHierarchy(format!(
                    "record kind {} cannot extend built-in type {}",
                    kind, other
                )));
            }
        }

        self.parents.insert(kind, parent);
        Ok(())
    }

    /// Builder form of [`declare`](Self::declare)
    pub fn with(mut self, kind: impl Into<String>, parent: TypeTag) -> Result<Self> {
        self.declare(kind, parent)?;
        Ok(self)
    }

    /// Direct parent of a tag
    pub fn parent(&self, tag: &TypeTag) -> Option<TypeTag> {
        if let TypeTag::Named(kind) = tag {
            if let Some(parent) = self.parents.get(kind) {
                return Some(parent.clone());
            }
        }
        tag.builtin_parent()
    }

    /// The tag followed by its ancestors, nearest first, ending at `Any`
    pub fn ancestors(&self, tag: &TypeTag) -> Ancestors<'_> {
        Ancestors {
            hierarchy: self,
            next: Some(tag.clone()),
        }
    }

    /// Whether `tag` is `target` or one of its subtypes
    pub fn is_a(&self, tag: &TypeTag, target: &TypeTag) -> bool {
        self.ancestors(tag).any(|ancestor| &ancestor == target)
    }

    /// Number of declared kinds
    pub fn declared_count(&self) -> usize {
        self.parents.len()
    }
}

/// Iterator over a tag and its ancestors
pub struct Ancestors<'a> {
    hierarchy: &'a TypeHierarchy,
    next: Option<TypeTag>,
}

impl Iterator for Ancestors<'_> {
    type Item = TypeTag;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        self.next = self.hierarchy.parent(&current);
        Some(current)
    }
}
