//! Merge strategies: combine same-shaped providers into a single row stream.

mod concatenation;
mod intersection;
mod union;

pub use concatenation::ConcatenationMergeStrategy;
pub use intersection::IntersectionMergeStrategy;
pub use union::UnionMergeStrategy;

use databind_model::{DataBinding, Result, Value};

use crate::provider::{DataProvider, Rows};
use crate::row::DataRow;

pub trait MergeStrategy {
    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    /// Merge the rows of `providers`, all queried with the same `bindings`.
    ///
    /// # Errors
    ///
    /// Fails immediately if the strategy cannot run.
    fn merge<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings: Vec<DataBinding>,
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>>;
}

/// The tuple of values a row produces for `bindings`; the identity used when
/// comparing rows across providers.
pub(crate) fn row_key(row: &dyn DataRow, bindings: &[DataBinding]) -> Result<Vec<Value>> {
    bindings
        .iter()
        .map(|binding| row.get_value(binding))
        .collect()
}

/// Rows of `provider`, with a failed request surfacing as a single error item.
pub(crate) fn rows_or_error<'a>(
    provider: &'a dyn DataProvider,
    bindings: &[DataBinding],
    include_dynamic_rows: bool,
) -> Rows<'a> {
    match provider.get_rows(bindings, include_dynamic_rows) {
        Ok(rows) => rows,
        Err(error) => Box::new(std::iter::once(Err(error))),
    }
}
