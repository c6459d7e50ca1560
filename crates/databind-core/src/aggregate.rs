//! Membership bookkeeping shared by the aggregate data sets.

use std::rc::Rc;

use databind_model::{DataError, Result};

use crate::provider::{DataProvider, DataSet};

/// Ordered list of member data sets.
///
/// A data set may appear at most once; membership is by identity.
#[derive(Clone, Default)]
pub struct AggregateDataSet {
    members: Vec<Rc<dyn DataSet>>,
}

impl AggregateDataSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data_set` and return its member index.
    ///
    /// # Errors
    ///
    /// Returns an invalid-argument error if the set is already a member.
    pub fn add(&mut self, data_set: Rc<dyn DataSet>) -> Result<usize> {
        if self.position(&data_set).is_some() {
            return Err(DataError::invalid_argument(
                "the data set is already a member of this aggregate",
            ));
        }
        self.members.push(data_set);
        Ok(self.members.len() - 1)
    }

    /// Member index of `data_set`, compared by identity.
    pub fn position(&self, data_set: &Rc<dyn DataSet>) -> Option<usize> {
        self.members
            .iter()
            .position(|member| std::ptr::addr_eq(Rc::as_ptr(member), Rc::as_ptr(data_set)))
    }

    pub fn members(&self) -> &[Rc<dyn DataSet>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if any member is dynamic.
    pub fn is_dynamic(&self) -> bool {
        self.members.iter().any(|member| member.is_dynamic())
    }

    /// Members viewed as providers, in member order.
    pub fn providers(&self) -> Vec<&dyn DataProvider> {
        self.members
            .iter()
            .map(|member| member.as_ref() as &dyn DataProvider)
            .collect()
    }
}
