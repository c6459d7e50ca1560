//! Rows and the row implementations shared by the leaf data sets.
//!
//! Rows are handed out as [`Row`], a reference-counted trait object. A join
//! may place the same row in several tuples; the row is released when the
//! last tuple or item holding it is dropped. Composite rows own their
//! sub-rows, so dropping a composite row releases every sub-row it holds.

use std::rc::Rc;

use databind_model::{DataBinding, DataError, Metadata, Result, Value};

/// One tuple of a data set.
pub trait DataRow {
    /// Rows from dynamic sources are marked dynamic.
    fn is_dynamic(&self) -> bool {
        false
    }

    fn metadata(&self) -> Metadata;

    /// Resolve `binding` to a value.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Binding`] if the row cannot satisfy the binding.
    fn get_value(&self, binding: &DataBinding) -> Result<Value>;
}

/// Shared handle to a row.
pub type Row<'a> = Rc<dyn DataRow + 'a>;

/// A row over a list of values addressed by index.
#[derive(Debug, Clone)]
pub struct ListDataRow {
    values: Vec<Value>,
    metadata: Metadata,
    is_dynamic: bool,
}

impl ListDataRow {
    pub fn new<I, V>(values: I, metadata: Metadata, is_dynamic: bool) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            metadata,
            is_dynamic,
        }
    }

    /// Wrap the row in a shared handle.
    pub fn into_row(self) -> Row<'static> {
        Rc::new(self)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl DataRow for ListDataRow {
    fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        let index = binding.index().ok_or_else(|| {
            DataError::binding(format!("binding {binding} has no index; list rows are positional"))
        })?;
        self.values.get(index).cloned().ok_or_else(|| {
            DataError::binding(format!(
                "binding {binding} is out of range for a row with {} values",
                self.values.len()
            ))
        })
    }
}

/// A row holding exactly one value at index 0.
#[derive(Debug, Clone)]
pub struct ScalarDataRow {
    value: Value,
    metadata: Metadata,
    is_dynamic: bool,
}

impl ScalarDataRow {
    pub fn new(value: impl Into<Value>, metadata: Metadata, is_dynamic: bool) -> Self {
        Self {
            value: value.into(),
            metadata,
            is_dynamic,
        }
    }
}

impl DataRow for ScalarDataRow {
    fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    fn metadata(&self) -> Metadata {
        self.metadata.clone()
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        if binding.index() == Some(0) {
            Ok(self.value.clone())
        } else {
            Err(DataError::binding(format!(
                "binding {binding} does not address index 0 of a scalar row"
            )))
        }
    }
}

/// Placeholder row contributed by an exhausted provider.
///
/// Answers every binding with the default of the binding's value type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullDataRow;

impl NullDataRow {
    pub fn row() -> Row<'static> {
        Rc::new(NullDataRow)
    }
}

impl DataRow for NullDataRow {
    fn metadata(&self) -> Metadata {
        Metadata::new()
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        Ok(binding.value_type().default_value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use databind_model::ValueType;

    #[test]
    fn list_row_is_positional() {
        let row = ListDataRow::new([1, 2, 3], Metadata::new(), false);
        assert_eq!(row.get_value(&DataBinding::for_index(1)).unwrap(), Value::Int(2));
        let err = row.get_value(&DataBinding::for_index(3)).unwrap_err();
        assert!(err.is_binding_error());
        let err = row.get_value(&DataBinding::for_path("a")).unwrap_err();
        assert!(err.is_binding_error());
    }

    #[test]
    fn scalar_row_only_answers_index_zero() {
        let row = ScalarDataRow::new("x", Metadata::new().with("k", "v"), true);
        assert!(row.is_dynamic());
        assert_eq!(row.metadata().get("k"), Some("v"));
        assert_eq!(row.get_value(&DataBinding::for_index(0)).unwrap(), Value::text("x"));
        assert!(row.get_value(&DataBinding::for_index(1)).is_err());
        assert!(row.get_value(&DataBinding::for_path("x")).is_err());
    }

    #[test]
    fn null_row_returns_type_defaults() {
        let row = NullDataRow;
        let binding = DataBinding::new(ValueType::Int, Some("anything".into()), Some(42));
        assert_eq!(row.get_value(&binding).unwrap(), Value::Int(0));
        let binding = DataBinding::unbound().with_value_type(ValueType::Bool);
        assert_eq!(row.get_value(&binding).unwrap(), Value::Bool(false));
        assert_eq!(row.get_value(&DataBinding::unbound()).unwrap(), Value::Null);
        assert!(row.metadata().is_empty());
    }
}
