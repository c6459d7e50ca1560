use databind_model::{DataBinding, Result};

use crate::provider::{DataProvider, DataSet, Rows};
use crate::row::Row;

/// A data set over a fixed list of pre-built rows.
///
/// Binds any binding whose index is below the declared column count; paths
/// are ignored. Rows are returned as given.
#[derive(Clone)]
pub struct RowSequenceDataSet {
    rows: Vec<Row<'static>>,
    column_count: usize,
    is_dynamic: bool,
}

impl RowSequenceDataSet {
    pub fn new(rows: Vec<Row<'static>>, column_count: usize) -> Self {
        Self {
            rows,
            column_count,
            is_dynamic: false,
        }
    }

    #[must_use]
    pub fn dynamic(mut self, is_dynamic: bool) -> Self {
        self.is_dynamic = is_dynamic;
        self
    }
}

impl DataProvider for RowSequenceDataSet {
    fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    fn get_rows<'a>(
        &'a self,
        _bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        Ok(Box::new(
            self.rows
                .iter()
                .filter(move |row| include_dynamic_rows || !row.is_dynamic())
                .map(|row| -> Result<Row<'a>> { Ok(row.clone()) }),
        ))
    }
}

impl DataSet for RowSequenceDataSet {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        binding
            .index()
            .is_some_and(|index| index < self.column_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::row::ListDataRow;
    use databind_model::{Metadata, Value};
    use std::rc::Rc;

    #[test]
    fn binds_within_column_count() {
        let set = RowSequenceDataSet::new(Vec::new(), 2);
        assert!(set.can_bind(&DataBinding::for_index(0)));
        assert!(set.can_bind(&DataBinding::for_index(1)));
        assert!(!set.can_bind(&DataBinding::for_index(2)));
        assert!(!set.can_bind(&DataBinding::for_path("a")));
    }

    #[test]
    fn returns_the_same_rows_every_pass() {
        let first = ListDataRow::new([1, 2], Metadata::new(), false).into_row();
        let set = RowSequenceDataSet::new(vec![Rc::clone(&first)], 2);
        for _ in 0..2 {
            let rows: Vec<_> = set
                .get_rows(&[], true)
                .unwrap()
                .collect::<Result<_>>()
                .unwrap();
            assert_eq!(rows.len(), 1);
            assert!(std::ptr::addr_eq(Rc::as_ptr(&rows[0]), Rc::as_ptr(&first)));
        }
    }

    #[test]
    fn dynamic_rows_are_filtered_on_request() {
        let set = RowSequenceDataSet::new(
            vec![
                ListDataRow::new([1], Metadata::new(), false).into_row(),
                ListDataRow::new([2], Metadata::new(), true).into_row(),
            ],
            1,
        );
        let binding = DataBinding::for_index(0);
        let values: Vec<Value> = set
            .get_rows(&[], false)
            .unwrap()
            .map(|row| row.unwrap().get_value(&binding).unwrap())
            .collect();
        assert_eq!(values, vec![Value::Int(1)]);
        assert_eq!(set.get_rows(&[], true).unwrap().count(), 2);
    }
}
