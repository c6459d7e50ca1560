//! Join strategies: combine member providers into row tuples.
//!
//! A join yields one tuple per output row, holding one sub-row per provider
//! in provider order. The joined data set wraps each tuple into a composite
//! row.

mod combinatorial;
mod pairwise;
mod sequential;

pub use combinatorial::CombinatorialJoinStrategy;
pub use pairwise::PairwiseJoinStrategy;
pub use sequential::SequentialJoinStrategy;

use databind_model::{DataBinding, DataError, Result};

use crate::provider::DataProvider;
use crate::row::Row;

/// One sub-row per provider.
pub type RowTuple<'a> = Vec<Row<'a>>;

/// Lazy sequence of row tuples.
pub type RowTuples<'a> = Box<dyn Iterator<Item = Result<RowTuple<'a>>> + 'a>;

pub trait JoinStrategy {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Join `providers`, requesting `bindings_per_provider[i]` from provider `i`.
    ///
    /// # Errors
    ///
    /// Fails immediately if the arguments are inconsistent or the strategy
    /// cannot run.
    fn join<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings_per_provider: Vec<Vec<DataBinding>>,
        include_dynamic_rows: bool,
    ) -> Result<RowTuples<'a>>;
}

pub(crate) fn check_arity(
    providers: &[&dyn DataProvider],
    bindings_per_provider: &[Vec<DataBinding>],
) -> Result<()> {
    if providers.len() == bindings_per_provider.len() {
        Ok(())
    } else {
        Err(DataError::invalid_argument(format!(
            "expected one binding list per provider: {} providers, {} binding lists",
            providers.len(),
            bindings_per_provider.len()
        )))
    }
}
