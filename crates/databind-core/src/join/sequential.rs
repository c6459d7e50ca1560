use databind_model::{DataBinding, Result};
use tracing::debug;

use super::{JoinStrategy, RowTuple, RowTuples, check_arity};
use crate::provider::{DataProvider, Rows};
use crate::row::NullDataRow;

/// Positional zip across providers.
///
/// Continues while at least one provider still has rows. A provider that has
/// run out contributes a [`NullDataRow`] for the remaining positions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SequentialJoinStrategy;

impl JoinStrategy for SequentialJoinStrategy {
    fn name(&self) -> &'static str {
        "sequential"
    }

    fn join<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings_per_provider: Vec<Vec<DataBinding>>,
        include_dynamic_rows: bool,
    ) -> Result<RowTuples<'a>> {
        check_arity(&providers, &bindings_per_provider)?;
        debug!(providers = providers.len(), "starting sequential join");
        let sources = providers
            .into_iter()
            .zip(&bindings_per_provider)
            .map(|(provider, bindings)| {
                provider
                    .get_rows(bindings, include_dynamic_rows)
                    .map(Some)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Box::new(SequentialJoin {
            sources,
            done: false,
        }))
    }
}

struct SequentialJoin<'a> {
    /// `None` once a provider is exhausted.
    sources: Vec<Option<Rows<'a>>>,
    done: bool,
}

impl<'a> Iterator for SequentialJoin<'a> {
    type Item = Result<RowTuple<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut tuple = Vec::with_capacity(self.sources.len());
        let mut any_remaining = false;
        for source in &mut self.sources {
            let next = source.as_mut().and_then(Iterator::next);
            match next {
                Some(Ok(row)) => {
                    any_remaining = true;
                    tuple.push(row);
                }
                Some(Err(error)) => {
                    self.done = true;
                    return Some(Err(error));
                }
                None => {
                    *source = None;
                    tuple.push(NullDataRow::row());
                }
            }
        }
        if any_remaining {
            Some(Ok(tuple))
        } else {
            self.done = true;
            None
        }
    }
}
