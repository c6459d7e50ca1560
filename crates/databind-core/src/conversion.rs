//! Value conversion between the kinds a row produces and the types a binding
//! requests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use databind_model::{DataError, Result, Value, ValueKind, ValueType};
use tracing::trace;

/// Converts values to the types bindings ask for.
pub trait Converter {
    fn can_convert(&self, source: ValueKind, target: ValueType) -> bool;

    /// # Errors
    ///
    /// Returns [`DataError::Conversion`] if the value cannot be delivered as
    /// `target`.
    fn convert(&self, value: Value, target: ValueType) -> Result<Value>;
}

/// How good a conversion is. Lower is better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConversionCost {
    Best,
    Typical,
    Poor,
    Invalid,
}

impl ConversionCost {
    pub fn is_valid(self) -> bool {
        self != ConversionCost::Invalid
    }
}

/// One conversion between value kinds.
pub trait ConversionRule {
    fn cost(&self, source: ValueKind, target: ValueType) -> ConversionCost;

    /// Only called for pairs this rule rated below [`ConversionCost::Invalid`].
    fn convert(&self, value: &Value, target: ValueType) -> Option<Value>;
}

/// Chooses the cheapest applicable rule per `(kind, type)` pair and caches
/// the choice.
pub struct RuleBasedConverter {
    rules: Vec<Rc<dyn ConversionRule>>,
    cache: RefCell<HashMap<(ValueKind, ValueType), Option<Rc<dyn ConversionRule>>>>,
}

impl Default for RuleBasedConverter {
    fn default() -> Self {
        Self::new(vec![
            Rc::new(ParseTextRule),
            Rc::new(FormatTextRule),
            Rc::new(NumericRule),
            Rc::new(BoolIntRule),
        ])
    }
}

impl RuleBasedConverter {
    pub fn new(rules: Vec<Rc<dyn ConversionRule>>) -> Self {
        Self {
            rules,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// An empty converter that only passes assignable values through.
    pub fn passthrough() -> Self {
        Self::new(Vec::new())
    }

    fn rule_for(&self, source: ValueKind, target: ValueType) -> Option<Rc<dyn ConversionRule>> {
        if let Some(rule) = self.cache.borrow().get(&(source, target)) {
            return rule.clone();
        }
        let rule = self
            .rules
            .iter()
            .map(|rule| (rule.cost(source, target), rule))
            .filter(|(cost, _)| cost.is_valid())
            .min_by_key(|(cost, _)| *cost)
            .map(|(cost, rule)| {
                trace!(?source, %target, ?cost, "selected conversion rule");
                Rc::clone(rule)
            });
        self.cache
            .borrow_mut()
            .insert((source, target), rule.clone());
        rule
    }
}

impl Converter for RuleBasedConverter {
    fn can_convert(&self, source: ValueKind, target: ValueType) -> bool {
        passes_through(source, target) || self.rule_for(source, target).is_some()
    }

    fn convert(&self, value: Value, target: ValueType) -> Result<Value> {
        if value.is_assignable_to(target) {
            return Ok(value);
        }
        self.rule_for(value.kind(), target)
            .and_then(|rule| rule.convert(&value, target))
            .ok_or_else(|| DataError::conversion(value, target))
    }
}

fn passes_through(source: ValueKind, target: ValueType) -> bool {
    matches!(
        (source, target),
        (_, ValueType::Any)
            | (ValueKind::Null, ValueType::Text)
            | (ValueKind::Bool, ValueType::Bool)
            | (ValueKind::Int, ValueType::Int)
            | (ValueKind::Float, ValueType::Float)
            | (ValueKind::Text, ValueType::Text)
    )
}

/// Text parsed into numbers and booleans, after trimming.
struct ParseTextRule;

impl ConversionRule for ParseTextRule {
    fn cost(&self, source: ValueKind, target: ValueType) -> ConversionCost {
        match (source, target) {
            (ValueKind::Text, ValueType::Int | ValueType::Float | ValueType::Bool) => {
                ConversionCost::Typical
            }
            _ => ConversionCost::Invalid,
        }
    }

    fn convert(&self, value: &Value, target: ValueType) -> Option<Value> {
        let text = value.as_str()?.trim();
        match target {
            ValueType::Int => text.parse().ok().map(Value::Int),
            ValueType::Float => text.parse().ok().map(Value::Float),
            ValueType::Bool => parse_bool(text).map(Value::Bool),
            _ => None,
        }
    }
}

fn parse_bool(text: &str) -> Option<bool> {
    match text.to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" => Some(false),
        _ => None,
    }
}

/// Any scalar rendered as text.
struct FormatTextRule;

impl ConversionRule for FormatTextRule {
    fn cost(&self, source: ValueKind, target: ValueType) -> ConversionCost {
        match (source, target) {
            (ValueKind::Bool | ValueKind::Int | ValueKind::Float, ValueType::Text) => {
                ConversionCost::Typical
            }
            _ => ConversionCost::Invalid,
        }
    }

    fn convert(&self, value: &Value, _target: ValueType) -> Option<Value> {
        Some(Value::Text(value.to_string()))
    }
}

/// Widening int to float; float to int when the value is integral.
struct NumericRule;

impl ConversionRule for NumericRule {
    fn cost(&self, source: ValueKind, target: ValueType) -> ConversionCost {
        match (source, target) {
            (ValueKind::Int, ValueType::Float) => ConversionCost::Best,
            (ValueKind::Float, ValueType::Int) => ConversionCost::Poor,
            _ => ConversionCost::Invalid,
        }
    }

    fn convert(&self, value: &Value, target: ValueType) -> Option<Value> {
        match (value, target) {
            (Value::Int(int), ValueType::Float) => Some(Value::Float(*int as f64)),
            (Value::Float(float), ValueType::Int)
                if float.fract() == 0.0 && float.abs() < i64::MAX as f64 =>
            {
                Some(Value::Int(*float as i64))
            }
            _ => None,
        }
    }
}

/// Booleans as 0/1 integers and back.
struct BoolIntRule;

impl ConversionRule for BoolIntRule {
    fn cost(&self, source: ValueKind, target: ValueType) -> ConversionCost {
        match (source, target) {
            (ValueKind::Bool, ValueType::Int) => ConversionCost::Typical,
            (ValueKind::Int, ValueType::Bool) => ConversionCost::Poor,
            _ => ConversionCost::Invalid,
        }
    }

    fn convert(&self, value: &Value, target: ValueType) -> Option<Value> {
        match (value, target) {
            (Value::Bool(flag), ValueType::Int) => Some(Value::Int(i64::from(*flag))),
            (Value::Int(0), ValueType::Bool) => Some(Value::Bool(false)),
            (Value::Int(1), ValueType::Bool) => Some(Value::Bool(true)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(value: impl Into<Value>, target: ValueType) -> Result<Value> {
        RuleBasedConverter::default().convert(value.into(), target)
    }

    #[test]
    fn assignable_values_pass_through() {
        assert_eq!(convert(3, ValueType::Int).unwrap(), Value::Int(3));
        assert_eq!(convert("x", ValueType::Any).unwrap(), Value::text("x"));
        assert_eq!(convert(Value::Null, ValueType::Text).unwrap(), Value::Null);
    }

    #[test]
    fn text_is_parsed() {
        assert_eq!(convert(" 42 ", ValueType::Int).unwrap(), Value::Int(42));
        assert_eq!(convert("2.5", ValueType::Float).unwrap(), Value::Float(2.5));
        assert_eq!(convert("Yes", ValueType::Bool).unwrap(), Value::Bool(true));
        assert_eq!(convert("0", ValueType::Bool).unwrap(), Value::Bool(false));
        let err = convert("forty", ValueType::Int).unwrap_err();
        assert!(matches!(err, DataError::Conversion { target: ValueType::Int, .. }));
    }

    #[test]
    fn numbers_convert_between_kinds() {
        assert_eq!(convert(2, ValueType::Float).unwrap(), Value::Float(2.0));
        assert_eq!(convert(4.0, ValueType::Int).unwrap(), Value::Int(4));
        assert!(convert(4.5, ValueType::Int).is_err());
        assert_eq!(convert(1, ValueType::Bool).unwrap(), Value::Bool(true));
        assert!(convert(2, ValueType::Bool).is_err());
        assert_eq!(convert(true, ValueType::Int).unwrap(), Value::Int(1));
        assert_eq!(convert(1.5, ValueType::Text).unwrap(), Value::text("1.5"));
    }

    #[test]
    fn null_has_no_numeric_form() {
        for target in [ValueType::Bool, ValueType::Int, ValueType::Float] {
            assert!(convert(Value::Null, target).is_err());
        }
    }

    #[test]
    fn cheapest_rule_wins_and_is_cached() {
        let converter = RuleBasedConverter::default();
        assert!(converter.can_convert(ValueKind::Int, ValueType::Float));
        assert!(converter.can_convert(ValueKind::Int, ValueType::Float));
        assert!(!converter.can_convert(ValueKind::Null, ValueType::Int));
        assert_eq!(converter.cache.borrow().len(), 2);
        assert!(!RuleBasedConverter::passthrough().can_convert(ValueKind::Text, ValueType::Int));
    }
}
