//! Column-concatenating aggregate over a join strategy.
//!
//! A [`JoinedDataSet`] lays its members side by side. Member `i` owns the
//! external columns `offset(i) .. offset(i) + column_count(i)`, where the
//! offset is the sum of the column counts of the members added before it.
//!
//! Bindings presented to the joined set are resolved to one member and
//! rewritten into a [`ResolvedBinding`] that remembers the member and the
//! binding to present to it:
//!
//! - A binding already resolved by this set is used as is.
//! - A binding without an index goes to the first member that accepts it.
//! - A binding with external index `E` goes to the first member that accepts
//!   it after rebasing. Members at offset zero see the binding unchanged. A
//!   later member sees index `E - offset` when that falls inside its columns,
//!   and no index otherwise, so path-only members still get a chance.

use std::borrow::Cow;
use std::rc::Rc;

use databind_model::{DataBinding, DataError, Metadata, OwnerId, ResolvedBinding, Result, Value};
use tracing::{debug, trace};

use crate::aggregate::AggregateDataSet;
use crate::join::{CombinatorialJoinStrategy, JoinStrategy};
use crate::provider::{DataProvider, DataSet, Rows};
use crate::row::{DataRow, Row};

/// Placement of one member among the joined columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataSetInfo {
    pub member_index: usize,
    pub column_offset: usize,
}

pub struct JoinedDataSet {
    id: OwnerId,
    aggregate: AggregateDataSet,
    infos: Vec<DataSetInfo>,
    column_count: usize,
    strategy: Rc<dyn JoinStrategy>,
}

impl Default for JoinedDataSet {
    fn default() -> Self {
        Self {
            id: OwnerId::next(),
            aggregate: AggregateDataSet::new(),
            infos: Vec::new(),
            column_count: 0,
            strategy: Rc::new(CombinatorialJoinStrategy),
        }
    }
}

impl JoinedDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Identity stamped on the bindings this set resolves.
    pub fn id(&self) -> OwnerId {
        self.id
    }

    /// Append a member after the existing columns.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `data_set` is already a member.
    pub fn add_data_set(&mut self, data_set: Rc<dyn DataSet>) -> Result<()> {
        let columns = data_set.column_count();
        let member_index = self.aggregate.add(data_set)?;
        self.infos.push(DataSetInfo {
            member_index,
            column_offset: self.column_count,
        });
        self.column_count += columns;
        Ok(())
    }

    pub fn members(&self) -> &[Rc<dyn DataSet>] {
        self.aggregate.members()
    }

    pub fn info(&self, member_index: usize) -> Option<DataSetInfo> {
        self.infos.get(member_index).copied()
    }

    pub fn strategy(&self) -> &dyn JoinStrategy {
        self.strategy.as_ref()
    }

    pub fn set_strategy(&mut self, strategy: Rc<dyn JoinStrategy>) {
        self.strategy = strategy;
    }

    /// Scope `binding`, phrased in `member`'s own columns, to this set.
    ///
    /// The result presents `binding` to `member` and reports the index shifted
    /// by the member's column offset.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if `member` is not a member.
    pub fn translate_binding(
        &self,
        member: &Rc<dyn DataSet>,
        binding: &DataBinding,
    ) -> Result<DataBinding> {
        let member_index = self.aggregate.position(member).ok_or_else(|| {
            DataError::invalid_argument("the data set is not a member of this joined data set")
        })?;
        let offset = self.infos[member_index].column_offset;
        let external_index = binding.index().map(|index| index + offset);
        Ok(ResolvedBinding::new(self.id, member_index, binding.clone(), external_index).into())
    }

    /// Find the member that answers `binding`, or `None` if no member does.
    pub fn resolve_binding(&self, binding: &DataBinding) -> Option<ResolvedBinding> {
        if let Some(resolved) = binding.as_resolved()
            && resolved.is_owned_by(self.id)
        {
            return Some(resolved.clone());
        }

        let members = self.aggregate.members();
        let Some(external) = binding.index() else {
            let member_index = members.iter().position(|member| member.can_bind(binding))?;
            return Some(ResolvedBinding::new(
                self.id,
                member_index,
                binding.clone(),
                None,
            ));
        };

        let mut unindexed: Option<DataBinding> = None;
        for (member, info) in members.iter().zip(&self.infos) {
            let candidate: Cow<'_, DataBinding> = if info.column_offset == 0 {
                Cow::Borrowed(binding)
            } else {
                match external
                    .checked_sub(info.column_offset)
                    .filter(|local| *local < member.column_count())
                {
                    Some(local) => Cow::Owned(binding.replace_index(Some(local))),
                    None => Cow::Borrowed(
                        unindexed.get_or_insert_with(|| binding.replace_index(None)),
                    ),
                }
            };
            if member.can_bind(&candidate) {
                trace!(%binding, member = info.member_index, "resolved binding");
                return Some(ResolvedBinding::new(
                    self.id,
                    info.member_index,
                    candidate.into_owned(),
                    Some(external),
                ));
            }
        }
        None
    }
}

impl DataProvider for JoinedDataSet {
    fn is_dynamic(&self) -> bool {
        self.aggregate.is_dynamic()
    }

    fn get_rows<'a>(
        &'a self,
        bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        let mut buckets = vec![Vec::new(); self.aggregate.len()];
        for binding in bindings {
            match self.resolve_binding(binding) {
                Some(resolved) => buckets[resolved.member_index()].push(resolved.inner().clone()),
                None => debug!(%binding, "dropping unresolvable binding from join request"),
            }
        }
        debug!(
            strategy = self.strategy.name(),
            members = self.aggregate.len(),
            "joining member rows"
        );
        let tuples = self
            .strategy
            .join(self.aggregate.providers(), buckets, include_dynamic_rows)?;
        Ok(Box::new(tuples.map(move |tuple| {
            tuple.map(|rows| -> Row<'a> { Rc::new(JoinedDataRow { owner: self, rows }) })
        })))
    }
}

impl DataSet for JoinedDataSet {
    fn column_count(&self) -> usize {
        self.column_count
    }

    fn can_bind(&self, binding: &DataBinding) -> bool {
        self.resolve_binding(binding).is_some_and(|resolved| {
            self.aggregate.members()[resolved.member_index()].can_bind(resolved.inner())
        })
    }
}

/// One sub-row per member; dropping it releases them all.
struct JoinedDataRow<'a> {
    owner: &'a JoinedDataSet,
    rows: Vec<Row<'a>>,
}

impl DataRow for JoinedDataRow<'_> {
    fn is_dynamic(&self) -> bool {
        self.rows.iter().any(|row| row.is_dynamic())
    }

    fn metadata(&self) -> Metadata {
        let mut metadata = Metadata::new();
        for row in &self.rows {
            metadata.merge(&row.metadata());
        }
        metadata
    }

    fn get_value(&self, binding: &DataBinding) -> Result<Value> {
        let resolved = self.owner.resolve_binding(binding).ok_or_else(|| {
            DataError::binding(format!("binding {binding} is not answered by any member"))
        })?;
        let row = self.rows.get(resolved.member_index()).ok_or_else(|| {
            DataError::binding(format!("binding {binding} addresses a missing member row"))
        })?;
        row.get_value(resolved.inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::join::SequentialJoinStrategy;
    use crate::sets::{ColumnSequenceDataSet, RowSequenceDataSet};

    fn two_and_three() -> (JoinedDataSet, Rc<dyn DataSet>, Rc<dyn DataSet>) {
        let first: Rc<dyn DataSet> = Rc::new(RowSequenceDataSet::new(Vec::new(), 2));
        let second: Rc<dyn DataSet> = Rc::new(RowSequenceDataSet::new(Vec::new(), 3));
        let mut joined = JoinedDataSet::new();
        joined.add_data_set(Rc::clone(&first)).unwrap();
        joined.add_data_set(Rc::clone(&second)).unwrap();
        (joined, first, second)
    }

    #[test]
    fn column_count_is_the_sum() {
        let (joined, ..) = two_and_three();
        assert_eq!(joined.column_count(), 5);
        assert_eq!(
            joined.info(1),
            Some(DataSetInfo {
                member_index: 1,
                column_offset: 2
            })
        );
    }

    #[test]
    fn external_index_rebases_onto_the_member() {
        let (joined, ..) = two_and_three();
        let resolved = joined.resolve_binding(&DataBinding::for_index(3)).unwrap();
        assert_eq!(resolved.member_index(), 1);
        assert_eq!(resolved.inner().index(), Some(1));
        assert_eq!(resolved.external_index(), Some(3));

        let resolved = joined.resolve_binding(&DataBinding::for_index(1)).unwrap();
        assert_eq!(resolved.member_index(), 0);
        assert_eq!(resolved.inner().index(), Some(1));

        assert!(joined.resolve_binding(&DataBinding::for_index(5)).is_none());
        assert!(!joined.can_bind(&DataBinding::for_index(5)));
    }

    #[test]
    fn own_resolved_bindings_are_returned_unchanged() {
        let (joined, _, second) = two_and_three();
        let translated = joined
            .translate_binding(&second, &DataBinding::for_index(2))
            .unwrap();
        assert_eq!(translated.index(), Some(4));
        let resolved = joined.resolve_binding(&translated).unwrap();
        assert_eq!(resolved.member_index(), 1);
        assert_eq!(resolved.inner(), &DataBinding::for_index(2));

        let (other, ..) = two_and_three();
        assert!(other.resolve_binding(&translated).is_some_and(|r| r.owner() == other.id()));
    }

    #[test]
    fn translating_for_a_stranger_fails() {
        let (joined, ..) = two_and_three();
        let stranger: Rc<dyn DataSet> = Rc::new(ColumnSequenceDataSet::new([1]));
        let err = joined
            .translate_binding(&stranger, &DataBinding::for_index(0))
            .unwrap_err();
        assert!(matches!(err, DataError::InvalidArgument { .. }));
    }

    #[test]
    fn duplicate_members_are_rejected() {
        let (mut joined, first, _) = two_and_three();
        assert!(joined.add_data_set(first).is_err());
        assert_eq!(joined.column_count(), 5);
    }

    #[test]
    fn rows_answer_bindings_across_members() {
        let mut joined = JoinedDataSet::new();
        joined
            .add_data_set(Rc::new(ColumnSequenceDataSet::new(["a", "b"])))
            .unwrap();
        joined
            .add_data_set(Rc::new(
                ColumnSequenceDataSet::new([1, 2, 3])
                    .with_metadata(Metadata::new().with("source", "numbers")),
            ))
            .unwrap();
        joined.set_strategy(Rc::new(SequentialJoinStrategy));

        let left = DataBinding::for_index(0);
        let right = DataBinding::for_index(1);
        let rows: Vec<_> = joined
            .get_rows(&[left.clone(), right.clone()], true)
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].get_value(&left).unwrap(), Value::text("b"));
        assert_eq!(rows[1].get_value(&right).unwrap(), Value::Int(2));
        assert_eq!(rows[2].get_value(&left).unwrap(), Value::Null);
        assert_eq!(rows[0].metadata().get("source"), Some("numbers"));
        assert!(rows[0].get_value(&DataBinding::for_index(2)).unwrap_err().is_binding_error());
    }
}
