//! Binds a data set and a list of bindings into items of converted values.

use std::cell::RefCell;
use std::rc::Rc;

use databind_model::{DataBinding, DataError, Metadata, Result, Value};

use crate::conversion::{Converter, RuleBasedConverter};
use crate::provider::DataSet;
use crate::row::Row;

/// Produces [`Item`]s: rows paired with the bindings to read from them.
#[derive(Clone)]
pub struct DataBinder {
    converter: Rc<dyn Converter>,
}

impl Default for DataBinder {
    fn default() -> Self {
        Self::new(Rc::new(RuleBasedConverter::default()))
    }
}

impl DataBinder {
    pub fn new(converter: Rc<dyn Converter>) -> Self {
        Self { converter }
    }

    /// One item per row of `data_set`, dynamic rows included.
    ///
    /// # Errors
    ///
    /// Fails if the data set rejects the row request.
    pub fn bind<'a>(
        &self,
        data_set: &'a dyn DataSet,
        bindings: Vec<DataBinding>,
    ) -> Result<Items<'a>> {
        let rows = data_set.get_rows(&bindings, true)?;
        let bindings: Rc<[DataBinding]> = bindings.into();
        let converter = Rc::clone(&self.converter);
        Ok(Box::new(rows.map(move |row| {
            row.map(|row| Item::new(row, Rc::clone(&bindings), Rc::clone(&converter)))
        })))
    }
}

/// Lazy sequence of items.
pub type Items<'a> = Box<dyn Iterator<Item = Result<Item<'a>>> + 'a>;

#[derive(Debug, Clone)]
enum Slot {
    Pending,
    Ready(Value),
}

/// A bound row. Values are converted on first access and remembered.
pub struct Item<'a> {
    row: Row<'a>,
    bindings: Rc<[DataBinding]>,
    converter: Rc<dyn Converter>,
    slots: RefCell<Vec<Slot>>,
}

impl<'a> Item<'a> {
    fn new(row: Row<'a>, bindings: Rc<[DataBinding]>, converter: Rc<dyn Converter>) -> Self {
        let slots = RefCell::new(vec![Slot::Pending; bindings.len()]);
        Self {
            row,
            bindings,
            converter,
            slots,
        }
    }

    pub fn metadata(&self) -> Metadata {
        self.row.metadata()
    }

    pub fn is_dynamic(&self) -> bool {
        self.row.is_dynamic()
    }

    pub fn binding_count(&self) -> usize {
        self.bindings.len()
    }

    /// The value of binding `binding_index`, converted to its value type.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error for an index outside the binding
    /// list, and the row's binding error or a conversion error otherwise.
    /// Failures are not remembered.
    pub fn get_value(&self, binding_index: usize) -> Result<Value> {
        let binding = self.bindings.get(binding_index).ok_or_else(|| {
            DataError::invalid_argument(format!(
                "binding index {binding_index} is out of range for {} bindings",
                self.bindings.len()
            ))
        })?;
        if let Slot::Ready(value) = &self.slots.borrow()[binding_index] {
            return Ok(value.clone());
        }
        let raw = self.row.get_value(binding)?;
        let value = self.converter.convert(raw, binding.value_type())?;
        self.slots.borrow_mut()[binding_index] = Slot::Ready(value.clone());
        Ok(value)
    }

    /// All values in binding order.
    ///
    /// # Errors
    ///
    /// Stops at the first value that fails.
    pub fn values(&self) -> Result<Vec<Value>> {
        (0..self.bindings.len())
            .map(|index| self.get_value(index))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{DataProvider, Rows};
    use crate::row::{DataRow, ListDataRow};
    use crate::sets::RowSequenceDataSet;
    use databind_model::ValueType;
    use std::cell::Cell;

    /// A row that counts reads and fails index 1 until told otherwise.
    struct CountingRow {
        reads: Rc<Cell<usize>>,
        ready: Rc<Cell<bool>>,
    }

    impl DataRow for CountingRow {
        fn metadata(&self) -> Metadata {
            Metadata::new().with("kind", "counting")
        }

        fn get_value(&self, binding: &DataBinding) -> Result<Value> {
            self.reads.set(self.reads.get() + 1);
            match binding.index() {
                Some(0) => Ok(Value::text("7")),
                Some(1) if self.ready.get() => Ok(Value::Null),
                _ => Err(DataError::binding("not yet")),
            }
        }
    }

    struct OneRow {
        row: Row<'static>,
    }

    impl DataProvider for OneRow {
        fn is_dynamic(&self) -> bool {
            false
        }

        fn get_rows<'a>(&'a self, _: &[DataBinding], _: bool) -> Result<Rows<'a>> {
            let row: Row<'a> = Rc::clone(&self.row);
            Ok(Box::new(std::iter::once(Ok(row))))
        }
    }

    impl DataSet for OneRow {
        fn column_count(&self) -> usize {
            2
        }

        fn can_bind(&self, _: &DataBinding) -> bool {
            true
        }
    }

    #[test]
    fn values_are_converted_and_memoized() {
        let reads = Rc::new(Cell::new(0));
        let ready = Rc::new(Cell::new(false));
        let set = OneRow {
            row: Rc::new(CountingRow {
                reads: Rc::clone(&reads),
                ready: Rc::clone(&ready),
            }),
        };
        let bindings = vec![
            DataBinding::for_index(0).with_value_type(ValueType::Int),
            DataBinding::for_index(1).with_value_type(ValueType::Text),
        ];
        let item = DataBinder::default()
            .bind(&set, bindings)
            .unwrap()
            .next()
            .unwrap()
            .unwrap();

        assert_eq!(item.get_value(0).unwrap(), Value::Int(7));
        assert_eq!(item.get_value(0).unwrap(), Value::Int(7));
        assert_eq!(reads.get(), 1);

        assert!(item.get_value(1).unwrap_err().is_binding_error());
        ready.set(true);
        assert_eq!(item.get_value(1).unwrap(), Value::Null);
        assert_eq!(item.get_value(1).unwrap(), Value::Null);
        assert_eq!(reads.get(), 3);

        assert_eq!(item.metadata().get("kind"), Some("counting"));
        assert!(matches!(
            item.get_value(2).unwrap_err(),
            DataError::InvalidArgument { .. }
        ));
    }

    #[test]
    fn conversion_failures_surface_per_value() {
        let set = RowSequenceDataSet::new(
            vec![ListDataRow::new(["12", "abc"], Metadata::new(), false).into_row()],
            2,
        );
        let bindings = vec![
            DataBinding::for_index(0).with_value_type(ValueType::Int),
            DataBinding::for_index(1).with_value_type(ValueType::Int),
        ];
        let items: Vec<_> = DataBinder::default()
            .bind(&set, bindings)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].get_value(0).unwrap(), Value::Int(12));
        assert!(matches!(
            items[0].get_value(1).unwrap_err(),
            DataError::Conversion { .. }
        ));
        assert!(items[0].values().is_err());
    }
}
