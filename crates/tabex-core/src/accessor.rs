//! Reading accessor chains off records
//!
//! Each chain segment is looked up against the current value in this order:
//!
//! 1. a record field with that name
//! 2. a list index, when the segment is a number
//! 3. an accessor registered for the value's exact type
//! 4. an accessor registered for [`TypeTag::Any`]
//! 5. a built-in accessor (`to_s`, `split`, `length`, ...)
//!
//! Nothing is evaluated; unknown segments fail with `AccessorNotFound`.

use crate::descriptor::Chain;
use crate::error::{Result, TabexError};
use crate::types::TypeTag;
use crate::value::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// A computed accessor
pub type AccessorFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Names of the built-in accessors
pub const BUILTIN_ACCESSORS: &[&str] = &[
    "to_s", "length", "size", "upcase", "downcase", "strip", "split", "first", "last", "keys",
    "class",
];

/// Accessor lookup table, keyed by type then accessor name
#[derive(Clone)]
pub struct AccessorTable {
    entries: HashMap<TypeTag, HashMap<String, AccessorFn>>,
    builtins: bool,
}

impl AccessorTable {
    /// Table with built-in accessors enabled
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            builtins: true,
        }
    }

    /// Table that only resolves fields, indexes and registered accessors
    pub fn without_builtins() -> Self {
        Self {
            entries: HashMap::new(),
            builtins: false,
        }
    }

    /// Register a computed accessor for values of exactly `tag`
    pub fn register<F>(&mut self, tag: TypeTag, name: impl Into<String>, accessor: F)
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.entries
            .entry(tag)
            .or_default()
            .insert(name.into(), Arc::new(accessor));
    }

    /// Builder form of [`register`](Self::register)
    pub fn with<F>(mut self, tag: TypeTag, name: impl Into<String>, accessor: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.register(tag, name, accessor);
        self
    }

    /// Read `chain` off `record`; `index` identifies the record in errors
    pub fn read(&self, record: &Value, chain: &Chain, index: usize) -> Result<Value> {
        let mut current = Cow::Borrowed(record);

        for segment in chain.segments() {
            current = self.step(current, segment).ok_or_else(|| TabexError::AccessorNotFound {
                record: index,
                chain: chain.to_string(),
                segment: segment.clone(),
            })?;
        }

        Ok(current.into_owned())
    }

    fn step<'v>(&self, current: Cow<'v, Value>, name: &str) -> Option<Cow<'v, Value>> {
        match current {
            Cow::Borrowed(value) => match lookup(value, name) {
                Some(found) => Some(Cow::Borrowed(found)),
                None => self.compute(value, name).map(Cow::Owned),
            },
            Cow::Owned(value) => match lookup(&value, name) {
                Some(found) => Some(Cow::Owned(found.clone())),
                None => self.compute(&value, name).map(Cow::Owned),
            },
        }
    }

    fn compute(&self, value: &Value, name: &str) -> Option<Value> {
        let registered = [value.type_tag(), TypeTag::Any]
            .iter()
            .find_map(|tag| self.entries.get(tag).and_then(|table| table.get(name)))
            .cloned();

        if let Some(accessor) = registered {
            return accessor(value);
        }

        if self.builtins {
            builtin(value, name)
        } else {
            None
        }
    }
}

impl Default for AccessorTable {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<String> = self
            .entries
            .iter()
            .flat_map(|(tag, table)| table.keys().map(move |name| format!("{}.{}", tag, name)))
            .collect();
        names.sort();

        f.debug_struct("AccessorTable")
            .field("registered", &names)
            .field("builtins", &self.builtins)
            .finish()
    }
}

/// Field or index lookup that borrows from the value
fn lookup<'v>(value: &'v Value, name: &str) -> Option<&'v Value> {
    match value {
        Value::Record(record) => record.get(name),
        Value::List(items) => name.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    }
}

fn builtin(value: &Value, name: &str) -> Option<Value> {
    match (name, value) {
        ("to_s", v) => Some(Value::Text(v.to_string())),
        ("class", v) => Some(Value::Text(v.type_tag().to_string())),
        ("length" | "size", Value::Text(s)) => Some(count(s.chars().count())),
        ("length" | "size", Value::List(items)) => Some(count(items.len())),
        ("length" | "size", Value::Record(record)) => Some(count(record.len())),
        ("upcase", Value::Text(s)) => Some(Value::Text(s.to_uppercase())),
        ("downcase", Value::Text(s)) => Some(Value::Text(s.to_lowercase())),
        ("strip", Value::Text(s)) => Some(Value::Text(s.trim().to_string())),
        ("split", Value::Text(s)) => Some(Value::List(
            s.split_whitespace().map(Value::from).collect(),
        )),
        ("first", Value::List(items)) => Some(items.first().cloned().unwrap_or(Value::Null)),
        ("last", Value::List(items)) => Some(items.last().cloned().unwrap_or(Value::Null)),
        ("keys", Value::Record(record)) => Some(Value::List(record.keys().map(Value::from).collect())),
        _ => None,
    }
}

fn count(n: usize) -> Value {
    Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;
    use pretty_assertions::assert_eq;

    fn chain(s: &str) -> Chain {
        s.parse().unwrap()
    }

    fn person() -> Value {
        Record::of_kind("Person")
            .field("name", "Ann Lee")
            .field("tags", vec![Value::from("a"), Value::from("b")])
            .field("address", Record::new().field("city", "Oslo"))
            .into()
    }

    #[test]
    fn test_field_chain() {
        let table = AccessorTable::new();
        let value = table.read(&person(), &chain("address.city"), 0).unwrap();
        assert_eq!(value, Value::from("Oslo"));
    }

    #[test]
    fn test_list_index_and_builtins() {
        let table = AccessorTable::new();
        assert_eq!(table.read(&person(), &chain("tags.1"), 0).unwrap(), Value::from("b"));
        assert_eq!(table.read(&person(), &chain("tags.length"), 0).unwrap(), Value::Integer(2));
        assert_eq!(
            table.read(&person(), &chain("name.split.last.upcase"), 0).unwrap(),
            Value::from("LEE")
        );
        assert_eq!(table.read(&person(), &chain("class"), 0).unwrap(), Value::from("Person"));
    }

    #[test]
    fn test_text_split_then_to_s_split() {
        let table = AccessorTable::new();
        let data = Value::from("data");
        assert_eq!(
            table.read(&data, &chain("to_s.split"), 0).unwrap(),
            Value::List(vec![Value::from("data")])
        );
    }

    #[test]
    fn test_missing_segment_reports_record_and_chain() {
        let table = AccessorTable::new();
        let err = table.read(&person(), &chain("address.zip"), 7).unwrap_err();
        match err {
            TabexError::AccessorNotFound { record, chain, segment } => {
                assert_eq!(record, 7);
                assert_eq!(chain, "address.zip");
                assert_eq!(segment, "zip");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_null_is_not_coerced() {
        let table = AccessorTable::new();
        let value: Value = Record::new().field("manager", Value::Null).into();
        assert!(table.read(&value, &chain("manager.name"), 0).is_err());
    }

    #[test]
    fn test_registered_accessor_wins_over_builtin() {
        let table = AccessorTable::new()
            .with(TypeTag::named("Person"), "initials", |v| {
                let name = v.field("name")?.as_text()?;
                Some(Value::Text(
                    name.split_whitespace().filter_map(|w| w.chars().next()).collect(),
                ))
            })
            .with(TypeTag::Text, "length", |_| Some(Value::Integer(-1)));

        assert_eq!(table.read(&person(), &chain("initials"), 0).unwrap(), Value::from("AL"));
        assert_eq!(table.read(&person(), &chain("name.length"), 0).unwrap(), Value::Integer(-1));
    }

    #[test]
    fn test_without_builtins() {
        let table = AccessorTable::without_builtins();
        assert!(table.read(&person(), &chain("name.upcase"), 0).is_err());
        assert!(table.read(&person(), &chain("name"), 0).is_ok());
    }
}
