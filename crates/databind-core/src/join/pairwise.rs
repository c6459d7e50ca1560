use databind_model::{DataBinding, DataError, Result};

use super::{JoinStrategy, RowTuples, check_arity};
use crate::provider::DataProvider;

/// Pairwise (2-wise coverage) join.
///
/// Would produce a reduced set of tuples in which every pair of rows drawn
/// from two distinct providers appears together at least once. No covering
/// algorithm is provided; [`JoinStrategy::join`] reports the strategy as
/// unsupported instead of falling back to another strategy.
#[derive(Debug, Clone, Copy, Default)]
pub struct PairwiseJoinStrategy;

impl JoinStrategy for PairwiseJoinStrategy {
    fn name(&self) -> &'static str {
        "pairwise"
    }

    fn join<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings_per_provider: Vec<Vec<DataBinding>>,
        _include_dynamic_rows: bool,
    ) -> Result<RowTuples<'a>> {
        check_arity(&providers, &bindings_per_provider)?;
        Err(DataError::UnsupportedStrategy { name: self.name() })
    }
}
