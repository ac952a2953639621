//! Value presenters and the output policy that picks them
//!
//! An [`OutputPolicy`] holds an ordered list of presenter rules and rewrites
//! each raw cell value with the matching presenter, if any.
//!
//! Two matching modes:
//!
//! - [`MatchMode::Exact`]: only a rule targeting the value's own type applies.
//! - [`MatchMode::Polymorphic`]: rules are scanned in registration order and
//!   the first whose target the value is-a wins. A more specific rule
//!   registered later never overrides an earlier, broader one.

use crate::config::PresenterConfig;
use crate::error::{Result, TabexError};
use crate::types::{TypeHierarchy, TypeTag};
use crate::value::Value;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Rewrites values of one target type
pub trait Presenter: Send + Sync {
    /// Name used in diagnostics
    fn name(&self) -> &str;

    /// Type this presenter applies to; `None` is rejected at registration
    fn target(&self) -> Option<TypeTag>;

    /// Rewrite a value
    fn present(&self, value: Value) -> Value;
}

/// How a value's type is matched against presenter targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// The value's own type must equal the target
    #[default]
    Exact,
    /// The value's type must be the target or a subtype of it
    Polymorphic,
}

impl std::str::FromStr for MatchMode {
    type Err = TabexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(MatchMode::Exact),
            "polymorphic" => Ok(MatchMode::Polymorphic),
            other => Err(TabexError::Config(format!("unknown match mode: {}", other))),
        }
    }
}

struct PresenterRule {
    target: TypeTag,
    presenter: Arc<dyn Presenter>,
}

/// Picks and applies presenters to raw values
pub struct OutputPolicy {
    rules: Vec<PresenterRule>,
    mode: MatchMode,
    hierarchy: Arc<TypeHierarchy>,
}

impl OutputPolicy {
    /// Build a policy from presenters in registration order
    ///
    /// Registering a second presenter for the same target replaces the first
    /// one in place, keeping the original position.
    pub fn new(
        presenters: Vec<Arc<dyn Presenter>>,
        mode: MatchMode,
        hierarchy: Arc<TypeHierarchy>,
    ) -> Result<Self> {
        let mut rules: Vec<PresenterRule> = Vec::with_capacity(presenters.len());

        for presenter in presenters {
            let target = presenter
                .target()
                .ok_or_else(|| TabexError::InvalidPresenter(presenter.name().to_string()))?;

            match rules.iter_mut().find(|rule| rule.target == target) {
                Some(rule) => {
                    debug!(
                        "Presenter {} replaces {} for {}",
                        presenter.name(),
                        rule.presenter.name(),
                        target
                    );
                    rule.presenter = presenter;
                }
                None => rules.push(PresenterRule { target, presenter }),
            }
        }

        debug!("Output policy built with {} presenters ({:?})", rules.len(), mode);
        Ok(Self {
            rules,
            mode,
            hierarchy,
        })
    }

    /// Policy that never rewrites anything
    pub fn passthrough() -> Self {
        Self {
            rules: Vec::new(),
            mode: MatchMode::Exact,
            hierarchy: Arc::new(TypeHierarchy::new()),
        }
    }

    /// Build the configured built-in presenters
    pub fn from_config(config: &PresenterConfig, hierarchy: Arc<TypeHierarchy>) -> Result<Self> {
        let mut presenters: Vec<Arc<dyn Presenter>> = Vec::new();

        if let Some(places) = config.float_places {
            presenters.push(Arc::new(FloatPrecision::new(places)));
        }
        if config.strip_tags {
            presenters.push(Arc::new(StripTags::new()));
        }
        if let Some(text) = &config.null_text {
            presenters.push(Arc::new(NullAs::new(text.clone())));
        }

        Self::new(presenters, config.matching, hierarchy)
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    /// Targets in registration order
    pub fn targets(&self) -> Vec<TypeTag> {
        self.rules.iter().map(|rule| rule.target.clone()).collect()
    }

    /// Return the value rewritten by the matching presenter, or unchanged
    pub fn convert(&self, value: Value) -> Value {
        let tag = value.type_tag();
        let matched = match self.mode {
            MatchMode::Exact => self.rules.iter().find(|rule| rule.target == tag),
            MatchMode::Polymorphic => self
                .rules
                .iter()
                .find(|rule| self.hierarchy.is_a(&tag, &rule.target)),
        };

        match matched {
            Some(rule) => rule.presenter.present(value),
            None => value,
        }
    }
}

impl Default for OutputPolicy {
    fn default() -> Self {
        Self::passthrough()
    }
}

impl std::fmt::Debug for OutputPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let rules: Vec<String> = self
            .rules
            .iter()
            .map(|rule| format!("{} => {}", rule.target, rule.presenter.name()))
            .collect();
        f.debug_struct("OutputPolicy")
            .field("mode", &self.mode)
            .field("rules", &rules)
            .finish()
    }
}

/// Renders floats with a fixed number of decimal places
pub struct FloatPrecision {
    places: usize,
}

impl FloatPrecision {
    pub fn new(places: usize) -> Self {
        Self { places }
    }
}

impl Presenter for FloatPrecision {
    fn name(&self) -> &str {
        "float-precision"
    }

    fn target(&self) -> Option<TypeTag> {
        Some(TypeTag::Float)
    }

    fn present(&self, value: Value) -> Value {
        match value {
            Value::Float(x) => Value::Text(format!("{:.*}", self.places, x)),
            other => other,
        }
    }
}

/// Removes markup tags from text
pub struct StripTags {
    pattern: Regex,
}

impl StripTags {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"<.+?>").expect("static pattern is valid"),
        }
    }
}

impl Default for StripTags {
    fn default() -> Self {
        Self::new()
    }
}

impl Presenter for StripTags {
    fn name(&self) -> &str {
        "strip-tags"
    }

    fn target(&self) -> Option<TypeTag> {
        Some(TypeTag::Text)
    }

    fn present(&self, value: Value) -> Value {
        match value {
            Value::Text(s) => Value::Text(self.pattern.replace_all(&s, "").into_owned()),
            other => other,
        }
    }
}

/// Replaces null with fixed text
pub struct NullAs {
    text: String,
}

impl NullAs {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Presenter for NullAs {
    fn name(&self) -> &str {
        "null-as"
    }

    fn target(&self) -> Option<TypeTag> {
        Some(TypeTag::Null)
    }

    fn present(&self, _value: Value) -> Value {
        Value::Text(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Record;
    use pretty_assertions::assert_eq;

    /// Presenter with a fixed target that tags its output
    struct Tagging {
        name: &'static str,
        target: Option<TypeTag>,
    }

    impl Presenter for Tagging {
        fn name(&self) -> &str {
            self.name
        }

        fn target(&self) -> Option<TypeTag> {
            self.target.clone()
        }

        fn present(&self, value: Value) -> Value {
            Value::Text(format!("{}:{}", self.name, value))
        }
    }

    fn tagging(name: &'static str, target: TypeTag) -> Arc<dyn Presenter> {
        Arc::new(Tagging {
            name,
            target: Some(target),
        })
    }

    fn hierarchy() -> Arc<TypeHierarchy> {
        Arc::new(
            TypeHierarchy::new()
                .with("Employee", TypeTag::Record)
                .unwrap()
                .with("Manager", TypeTag::named("Employee"))
                .unwrap(),
        )
    }

    #[test]
    fn test_exact_matches_only_own_type() {
        let policy = OutputPolicy::new(
            vec![tagging("int", TypeTag::Integer)],
            MatchMode::Exact,
            hierarchy(),
        )
        .unwrap();

        assert_eq!(policy.convert(Value::Integer(5)), Value::from("int:5"));
        assert_eq!(policy.convert(Value::from("5")), Value::from("5"));
    }

    #[test]
    fn test_exact_ignores_supertype_targets() {
        let policy = OutputPolicy::new(
            vec![tagging("num", TypeTag::Number)],
            MatchMode::Exact,
            hierarchy(),
        )
        .unwrap();

        assert_eq!(policy.convert(Value::Integer(5)), Value::Integer(5));
    }

    #[test]
    fn test_polymorphic_first_match_wins() {
        let policy = OutputPolicy::new(
            vec![
                tagging("employee", TypeTag::named("Employee")),
                tagging("manager", TypeTag::named("Manager")),
            ],
            MatchMode::Polymorphic,
            hierarchy(),
        )
        .unwrap();

        let manager: Value = Record::of_kind("Manager").field("id", 1).into();
        let converted = policy.convert(manager);
        assert!(converted.as_text().unwrap().starts_with("employee:"));
    }

    #[test]
    fn test_polymorphic_matches_abstract_number() {
        let policy = OutputPolicy::new(
            vec![tagging("num", TypeTag::Number)],
            MatchMode::Polymorphic,
            hierarchy(),
        )
        .unwrap();

        assert_eq!(policy.convert(Value::Float(1.5)), Value::from("num:1.5"));
        assert_eq!(policy.convert(Value::Bool(true)), Value::Bool(true));
    }

    #[test]
    fn test_missing_target_rejected_at_construction() {
        let broken: Arc<dyn Presenter> = Arc::new(Tagging {
            name: "broken",
            target: None,
        });
        let result = OutputPolicy::new(vec![broken], MatchMode::Exact, hierarchy());
        match result {
            Err(TabexError::InvalidPresenter(name)) => assert_eq!(name, "broken"),
            other => panic!("expected InvalidPresenter, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_duplicate_target_keeps_position_with_later_presenter() {
        let policy = OutputPolicy::new(
            vec![
                tagging("first", TypeTag::Text),
                tagging("any", TypeTag::Any),
                tagging("second", TypeTag::Text),
            ],
            MatchMode::Polymorphic,
            hierarchy(),
        )
        .unwrap();

        assert_eq!(policy.targets(), vec![TypeTag::Text, TypeTag::Any]);
        assert_eq!(policy.convert(Value::from("x")), Value::from("second:x"));
    }

    #[test]
    fn test_builtin_presenters() {
        assert_eq!(
            FloatPrecision::new(2).present(Value::Float(3.14159)),
            Value::from("3.14")
        );
        assert_eq!(
            StripTags::new().present(Value::from("<b>bold</b> text")),
            Value::from("bold text")
        );
        assert_eq!(NullAs::new("n/a").present(Value::Null), Value::from("n/a"));
    }

    #[test]
    fn test_from_config() {
        let config = PresenterConfig {
            matching: MatchMode::Exact,
            float_places: Some(1),
            strip_tags: false,
            null_text: Some("-".to_string()),
        };
        let policy = OutputPolicy::from_config(&config, hierarchy()).unwrap();
        assert_eq!(policy.targets(), vec![TypeTag::Float, TypeTag::Null]);
        assert_eq!(policy.convert(Value::Float(2.375)), Value::from("2.4"));
        assert_eq!(policy.convert(Value::Null), Value::from("-"));
    }

    #[test]
    fn test_passthrough() {
        let policy = OutputPolicy::passthrough();
        assert_eq!(policy.convert(Value::Float(1.0)), Value::Float(1.0));
    }
}
