//! Named data sources with case-insensitive path aliases.

use std::rc::Rc;

use databind_model::{CaseInsensitiveMap, DataBinding, DataError, Metadata, Result, Value};
use tracing::trace;

use crate::merge::MergeStrategy;
use crate::merged::MergedDataSet;
use crate::provider::{DataProvider, DataSet, Rows};
use crate::row::{DataRow, Row};

/// A named overlay of member data sets sharing one alias table.
///
/// An alias maps a path to a column index. Bindings whose path is a
/// registered alias are rewritten to that index before they reach the
/// members; other bindings pass through unchanged. Rows handed out while
/// aliases exist rewrite bindings again when values are read, so aliases
/// also apply to bindings that were not part of the row request.
#[derive(Clone)]
pub struct DataSource {
    name: String,
    merged: MergedDataSet,
    aliases: CaseInsensitiveMap<usize>,
}

impl DataSource {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            merged: MergedDataSet::new(),
            aliases: CaseInsensitiveMap::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Append a member data set.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `data_set` is already a member.
    pub fn add_data_set(&mut self, data_set: Rc<dyn DataSet>) -> Result<()> {
        self.merged.add_data_set(data_set)
    }

    /// Map `path` to `index`, ignoring ASCII case.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `path` already has an alias.
    pub fn add_index_alias(&mut self, path: &str, index: usize) -> Result<()> {
        if self.aliases.try_insert(path, index) {
            Ok(())
        } else {
            Err(DataError::invalid_argument(format!(
                "data source '{}' already has an alias for path '{path}'",
                self.name
            )))
        }
    }

    pub fn aliases(&self) -> &CaseInsensitiveMap<usize> {
        &self.aliases
    }

    pub fn set_merge_strategy(&mut self, strategy: Rc<dyn MergeStrategy>) {
        self.merged.set_strategy(strategy);
    }

    pub fn members(&self) -> &[Rc<dyn DataSet>] {
        self.merged.members()
    }

    /// Rewrite `binding` through the alias table.
    pub fn translate_binding(&self, binding: &DataBinding) -> DataBinding {
        match binding.path().and_then(|path| self.aliases.get(path)) {
            Some(&index) => binding.replace_index(Some(index)),
            None => binding.clone(),
        }
    }
}

impl DataProvider for DataSource {
    fn is_dynamic(&self) -> bool {
        self.merged.is_dynamic()
    }

    fn get_rows<'a>(
        &'a self,
        bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        let translated: Vec<DataBinding> = bindings
            .iter()
            .map(|binding| self.translate_binding(binding))
            .collect();
        let rows = self.merged.get_rows(&translated, include_dynamic_rows)?;
        if self.aliases.is_empty() {
            return Ok(rows);
        }
        Ok(Box::new(rows.map(move |row| {
            row.map(|inner| -> Row<'a> {
                Rc::new(TranslatedDataRow {
                    source: self,
                    inner,
                })
            })
        })))
    }
}

impl DataSet for DataSource {
    fn column_count(&self) -> usize {
        self.merged.column_count()
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        self.merged.can_bind(&self.translate_binding(binding))
    }
}

/// A member row read through its data source's alias table.
struct TranslatedDataRow<'a> {
    source: &'a DataSource,
    inner: Row<'a>,
}

impl DataRow for TranslatedDataRow<'_> {
    fn is_dynamic(&self) -> bool {
        self.inner.is_dynamic()
    }

    fn metadata(&self) -> Metadata {
        self.inner.metadata()
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        let translated = self.source.translate_binding(binding);
        trace!(source = %self.source.name, %binding, %translated, "translated binding");
        self.inner.get_value(&translated)
    }
}
