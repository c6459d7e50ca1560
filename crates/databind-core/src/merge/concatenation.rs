use databind_model::{DataBinding, Result};

use super::{MergeStrategy, rows_or_error};
use crate::provider::{DataProvider, Rows};

/// Every provider's rows in provider order, duplicates included.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConcatenationMergeStrategy;

impl MergeStrategy for ConcatenationMergeStrategy {
    fn name(&self) -> &'static str {
        "concatenation"
    }

    fn merge<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings: Vec<DataBinding>,
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        Ok(Box::new(providers.into_iter().flat_map(move |provider| {
            rows_or_error(provider, &bindings, include_dynamic_rows)
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sets::ColumnSequenceDataSet;
    use databind_model::Value;

    #[test]
    fn concatenates_in_provider_order() {
        let a = ColumnSequenceDataSet::new([1, 2]);
        let b = ColumnSequenceDataSet::new([2, 3]);
        let binding = DataBinding::for_index(0);
        let values: Vec<Value> = ConcatenationMergeStrategy
            .merge(vec![&a as &dyn DataProvider, &b], vec![binding.clone()], true)
            .unwrap()
            .map(|row| row.unwrap().get_value(&binding).unwrap())
            .collect();
        assert_eq!(
            values,
            vec![Value::Int(1), Value::Int(2), Value::Int(2), Value::Int(3)]
        );
    }
}
