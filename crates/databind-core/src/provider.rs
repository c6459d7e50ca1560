//! Row sources: [`DataProvider`] for strategies and [`DataSet`] for bindable sets.

use databind_model::{DataBinding, Result};

use crate::row::Row;

/// Lazy sequence of rows. Errors raised while producing a row surface as
/// `Err` items and end the sequence for well-behaved consumers.
pub type Rows<'a> = Box<dyn Iterator<Item = Result<Row<'a>>> + 'a>;

/// A source of rows consumed by join and merge strategies.
pub trait DataProvider {
    /// Dynamic providers must never be cached or enumerated ahead of use.
    fn is_dynamic(&self) -> bool;

    /// Request a fresh sequence of rows.
    ///
    /// `bindings` lists the bindings the caller intends to query; providers
    /// may use them to prepare values. When `include_dynamic_rows` is false,
    /// rows marked dynamic are left out.
    ///
    /// # Errors
    ///
    /// Fails immediately if the request itself is invalid.
    fn get_rows<'a>(
        &'a self,
        bindings: &[DataBinding],
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>>;
}

/// A data set: a provider that declares its shape and which bindings it answers.
pub trait DataSet: DataProvider {
    fn column_count(&self) -> usize;

    fn can_bind(&self, binding: &DataBinding) -> bool;
}

/// An empty row sequence.
pub fn no_rows<'a>() -> Rows<'a> {
    Box::new(std::iter::empty())
}
