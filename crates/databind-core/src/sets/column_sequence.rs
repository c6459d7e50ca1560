use std::rc::Rc;

use databind_model::{DataBinding, Metadata, Result, Value};

use crate::provider::{DataProvider, DataSet, Rows, no_rows};
use crate::row::{Row, ScalarDataRow};

/// A single-column data set over a sequence of values.
///
/// Each value becomes one scalar row answering index 0. Paths are ignored.
#[derive(Debug, Clone, Default)]
pub struct ColumnSequenceDataSet {
    values: Vec<Value>,
    metadata: Metadata,
    is_dynamic: bool,
}

impl ColumnSequenceDataSet {
    pub fn new<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self {
            values: values.into_iter().map(Into::into).collect(),
            metadata: Metadata::new(),
            is_dynamic: false,
        }
    }

    /// Metadata attached to every produced row.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    #[must_use]
    pub fn dynamic(mut self, is_dynamic: bool) -> Self {
        self.is_dynamic = is_dynamic;
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }
}

impl DataProvider for ColumnSequenceDataSet {
    fn is_dynamic(&self) -> bool {
        self.is_dynamic
    }

    fn get_rows<'a>(
        &'a self,
        _bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        if self.is_dynamic && !include_dynamic_rows {
            return Ok(no_rows());
        }
        Ok(Box::new(self.values.iter().map(move |value| -> Result<Row<'a>> {
            let row: Row<'a> = Rc::new(ScalarDataRow::new(
                value.clone(),
                self.metadata.clone(),
                self.is_dynamic,
            ));
            Ok(row)
        })))
    }
}

impl DataSet for ColumnSequenceDataSet {
    fn column_count(&self) -> usize {
        1
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        binding.index() == Some(0)
    }
}
