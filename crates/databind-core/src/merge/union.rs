use std::collections::HashSet;

use databind_model::{DataBinding, Result, Value};

use super::{MergeStrategy, row_key, rows_or_error};
use crate::provider::{DataProvider, Rows};

/// Every provider's rows in provider order, keeping only the first row seen
/// for each distinct tuple of bound values.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionMergeStrategy;

impl MergeStrategy for UnionMergeStrategy {
    fn name(&self) -> &'static str {
        "union"
    }

    fn merge<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings: Vec<DataBinding>,
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        let key_bindings = bindings.clone();
        let mut seen: HashSet<Vec<Value>> = HashSet::new();
        Ok(Box::new(
            providers
                .into_iter()
                .flat_map(move |provider| rows_or_error(provider, &bindings, include_dynamic_rows))
                .filter_map(move |row| {
                    let row = match row {
                        Ok(row) => row,
                        Err(error) => return Some(Err(error)),
                    };
                    match row_key(row.as_ref(), &key_bindings) {
                        Ok(key) => seen.insert(key).then_some(Ok(row)),
                        Err(error) => Some(Err(error)),
                    }
                }),
        ))
    }
}
