//! Overlay aggregate that combines same-shaped members through a merge strategy.

use std::rc::Rc;

use databind_model::{DataBinding, Result};
use tracing::debug;

use crate::aggregate::AggregateDataSet;
use crate::merge::{ConcatenationMergeStrategy, MergeStrategy};
use crate::provider::{DataProvider, DataSet, Rows};

/// Members laid over one another rather than side by side.
///
/// The column count is the largest member column count. A binding is
/// accepted only if every member accepts it, so an empty set binds nothing.
/// Rows are combined by the merge strategy, concatenation unless replaced.
#[derive(Clone)]
pub struct MergedDataSet {
    aggregate: AggregateDataSet,
    column_count: usize,
    strategy: Rc<dyn MergeStrategy>,
}

impl Default for MergedDataSet {
    fn default() -> Self {
        Self {
            aggregate: AggregateDataSet::new(),
            column_count: 0,
            strategy: Rc::new(ConcatenationMergeStrategy),
        }
    }
}

impl MergedDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a member.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `data_set` is already a member.
    pub fn add_data_set(&mut self, data_set: Rc<dyn DataSet>) -> Result<()> {
        let columns = data_set.column_count();
        self.aggregate.add(data_set)?;
        self.column_count = self.column_count.max(columns);
        Ok(())
    }

    pub fn strategy(&self) -> &dyn MergeStrategy {
        self.strategy.as_ref()
    }

    pub fn set_strategy(&mut self, strategy: Rc<dyn MergeStrategy>) {
        self.strategy = strategy;
    }

    pub fn members(&self) -> &[Rc<dyn DataSet>] {
        self.aggregate.members()
    }
}

impl DataProvider for MergedDataSet {
    fn is_dynamic(&self) -> bool {
        self.aggregate.is_dynamic()
    }

    fn get_rows<'a>(
        &'a self,
        bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        debug!(
            strategy = self.strategy.name(),
            members = self.aggregate.len(),
            "merging member rows"
        );
        self.strategy
            .merge(self.aggregate.providers(), bindings.to_vec(), include_dynamic_rows)
    }
}

impl DataSet for MergedDataSet {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        !self.aggregate.is_empty()
            && self
                .aggregate
                .members()
                .iter()
                .all(|member| member.can_bind(binding))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merge::IntersectionMergeStrategy;
    use crate::sets::{ColumnSequenceDataSet, RowSequenceDataSet};
    use databind_model::Value;

    #[test]
    fn column_count_is_the_widest_member() {
        let mut merged = MergedDataSet::new();
        assert_eq!(merged.column_count(), 0);
        merged
            .add_data_set(Rc::new(RowSequenceDataSet::new(Vec::new(), 3)))
            .unwrap();
        merged
            .add_data_set(Rc::new(ColumnSequenceDataSet::new([1])))
            .unwrap();
        assert_eq!(merged.column_count(), 3);
    }

    #[test]
    fn binds_only_what_every_member_binds() {
        let mut merged = MergedDataSet::new();
        assert!(!merged.can_bind(&DataBinding::for_index(0)));
        merged
            .add_data_set(Rc::new(RowSequenceDataSet::new(Vec::new(), 3)))
            .unwrap();
        assert!(merged.can_bind(&DataBinding::for_index(2)));
        merged
            .add_data_set(Rc::new(ColumnSequenceDataSet::new([1])))
            .unwrap();
        assert!(merged.can_bind(&DataBinding::for_index(0)));
        assert!(!merged.can_bind(&DataBinding::for_index(2)));
    }

    #[test]
    fn strategy_can_be_replaced() {
        let mut merged = MergedDataSet::new();
        merged
            .add_data_set(Rc::new(ColumnSequenceDataSet::new([1, 2, 3])))
            .unwrap();
        merged
            .add_data_set(Rc::new(ColumnSequenceDataSet::new([3, 1])))
            .unwrap();
        assert_eq!(merged.strategy().name(), "concatenation");
        let binding = DataBinding::for_index(0);
        assert_eq!(merged.get_rows(&[binding.clone()], true).unwrap().count(), 5);

        merged.set_strategy(Rc::new(IntersectionMergeStrategy));
        let values: Vec<Value> = merged
            .get_rows(&[binding.clone()], true)
            .unwrap()
            .map(|row| row.unwrap().get_value(&binding).unwrap())
            .collect();
        assert_eq!(values, vec![Value::Int(3), Value::Int(1)]);
    }
}
