//! Runtime values read off records during export

use crate::error::Result;
use crate::types::TypeTag;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A dynamically shaped value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    /// Whole numbers above `i64::MAX`
    Unsigned(u64),
    Float(f64),
    Text(String),
    List(Vec<Value>),
    Record(Record),
}

/// A record: named fields plus an optional kind used for type matching
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    kind: Option<String>,
    fields: BTreeMap<String, Value>,
}

impl Record {
    /// Create an empty record without a kind
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty record of the given kind
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field (builder style)
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Insert or replace a field
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Look up a field by name
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn kind(&self) -> Option<&str> {
        self.kind.as_deref()
    }

    pub fn set_kind(&mut self, kind: impl Into<String>) {
        self.kind = Some(kind.into());
    }

    /// Field names in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Type tag of this record
    pub fn type_tag(&self) -> TypeTag {
        match &self.kind {
            Some(kind) => TypeTag::Named(kind.clone()),
            None => TypeTag::Record,
        }
    }
}

impl Value {
    /// Runtime type identity
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Null => TypeTag::Null,
            Value::Bool(_) => TypeTag::Bool,
            Value::Integer(_) | Value::Unsigned(_) => TypeTag::Integer,
            Value::Float(_) => TypeTag::Float,
            Value::Text(_) => TypeTag::Text,
            Value::List(_) => TypeTag::List,
            Value::Record(record) => record.type_tag(),
        }
    }

    /// Field lookup, only meaningful on records
    pub fn field(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Record(record) => record.get(name),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Unsigned(_) | Value::Float(_))
    }

    /// Build a value from JSON
    ///
    /// When `kind_field` is set, objects carrying a string under that key get
    /// it as their record kind. The key stays readable as a normal field.
    pub fn from_json(json: serde_json::Value, kind_field: Option<&str>) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Integer(i),
                (None, Some(u)) => Value::Unsigned(u),
                (None, None) => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Array(items) => Value::List(
                items
                    .into_iter()
                    .map(|item| Value::from_json(item, kind_field))
                    .collect(),
            ),
            serde_json::Value::Object(map) => {
                let kind = kind_field
                    .and_then(|key| map.get(key))
                    .and_then(|v| v.as_str())
                    .map(str::to_string);

                let fields = map
                    .into_iter()
                    .map(|(k, v)| (k, Value::from_json(v, kind_field)))
                    .collect();

                Value::Record(Record { kind, fields })
            }
        }
    }

    /// Build a value from any serializable type
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self> {
        Ok(Value::from_json(serde_json::to_value(value)?, None))
    }

    /// Build a record value of the given kind from a serializable type
    pub fn from_serialize_as<T: Serialize + ?Sized>(
        kind: impl Into<String>,
        value: &T,
    ) -> Result<Self> {
        let mut converted = Value::from_serialize(value)?;
        if let Value::Record(record) = &mut converted {
            record.set_kind(kind);
        }
        Ok(converted)
    }

    /// Convert back to JSON
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Integer(i) => serde_json::Value::from(*i),
            Value::Unsigned(u) => serde_json::Value::from(*u),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::List(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
            Value::Record(record) => serde_json::Value::Object(
                record
                    .fields
                    .iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
        }
    }

    /// Text written into a table cell
    pub fn to_cell_string(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::List(items) => items
                .iter()
                .map(Value::to_cell_string)
                .collect::<Vec<_>>()
                .join(", "),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Unsigned(u) => write!(f, "{}", u),
            // keep whole floats distinguishable from integers
            Value::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{:.1}", x),
            Value::Float(x) => write!(f, "{}", x),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(_) | Value::Record(_) => write!(f, "{}", self.to_json()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<u64> for Value {
    fn from(u: u64) -> Self {
        i64::try_from(u).map_or(Value::Unsigned(u), Value::Integer)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl From<Record> for Value {
    fn from(record: Record) -> Self {
        Value::Record(record)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Data handed to an export: one record or an ordered collection
///
/// Collection-ness is stated by the variant, never guessed from the value.
#[derive(Debug, Clone, PartialEq)]
pub enum ExportData {
    Single(Value),
    Collection(Vec<Value>),
}

impl ExportData {
    /// Records in export order
    pub fn records(&self) -> &[Value] {
        match self {
            ExportData::Single(value) => std::slice::from_ref(value),
            ExportData::Collection(values) => values,
        }
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, ExportData::Collection(_))
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Name of the exported record type: first record's kind or type name
    pub fn kind_name(&self) -> String {
        self.records()
            .first()
            .map(|record| record.type_tag().to_string())
            .unwrap_or_else(|| TypeTag::Record.to_string())
    }

    /// Top-level JSON arrays become collections, anything else a single record
    pub fn from_json(json: serde_json::Value, kind_field: Option<&str>) -> Self {
        match json {
            serde_json::Value::Array(items) => ExportData::Collection(
                items
                    .into_iter()
                    .map(|item| Value::from_json(item, kind_field))
                    .collect(),
            ),
            other => ExportData::Single(Value::from_json(other, kind_field)),
        }
    }

    /// Parse JSON text into export data
    pub fn from_json_str(content: &str, kind_field: Option<&str>) -> Result<Self> {
        let json: serde_json::Value = serde_json::from_str(content)?;
        Ok(Self::from_json(json, kind_field))
    }
}

impl From<Value> for ExportData {
    fn from(value: Value) -> Self {
        ExportData::Single(value)
    }
}

impl From<Vec<Value>> for ExportData {
    fn from(values: Vec<Value>) -> Self {
        ExportData::Collection(values)
    }
}
