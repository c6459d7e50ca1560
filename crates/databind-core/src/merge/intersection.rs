use std::collections::HashMap;

use databind_model::{DataBinding, Result, Value};
use tracing::debug;

use super::{MergeStrategy, row_key};
use crate::provider::{DataProvider, Rows};
use crate::row::{DataRow, Row};

type Tally = HashMap<Vec<Value>, usize>;

/// Multiset intersection of the providers' rows.
///
/// Rows are compared by the tuple of values they produce for the bindings.
/// A value tuple is emitted as many times as the smallest number of
/// occurrences across all providers. Emitted rows come from the last
/// provider, in its order.
///
/// A row whose bound values cannot be read (binding error) is treated as not
/// matching and skipped; any other error propagates.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectionMergeStrategy;

impl MergeStrategy for IntersectionMergeStrategy {
    fn name(&self) -> &'static str {
        "intersection"
    }

    fn merge<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings: Vec<DataBinding>,
        include_dynamic_rows: bool,
    ) -> Result<Rows<'a>> {
        Ok(Box::new(IntersectionMerge {
            providers,
            bindings,
            include_dynamic_rows,
            state: State::Pending,
        }))
    }
}

struct IntersectionMerge<'a> {
    providers: Vec<&'a dyn DataProvider>,
    bindings: Vec<DataBinding>,
    include_dynamic_rows: bool,
    state: State<'a>,
}

enum State<'a> {
    Pending,
    /// Streams the last provider. `tally` holds the remaining quota per key
    /// across the earlier providers, `None` when there are none.
    Emitting {
        rows: Rows<'a>,
        tally: Option<Tally>,
    },
    Done,
}

impl<'a> IntersectionMerge<'a> {
    /// Key of `row`, or `None` if the row does not bind.
    fn key_of(&self, row: &dyn DataRow) -> Result<Option<Vec<Value>>> {
        match row_key(row, &self.bindings) {
            Ok(key) => Ok(Some(key)),
            Err(error) if error.is_binding_error() => {
                debug!(%error, "skipping row that does not bind");
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    /// Fold `providers` into a tally, each count bounded by the one before.
    fn build_tally(&self, providers: &[&'a dyn DataProvider]) -> Result<Option<Tally>> {
        let mut tally: Option<Tally> = None;
        for provider in providers {
            let mut current = Tally::new();
            for row in provider.get_rows(&self.bindings, self.include_dynamic_rows)? {
                let row = row?;
                let Some(key) = self.key_of(row.as_ref())? else {
                    continue;
                };
                match &tally {
                    None => *current.entry(key).or_insert(0) += 1,
                    Some(previous) => {
                        let limit = previous.get(&key).copied().unwrap_or(0);
                        let count = current.entry(key).or_insert(0);
                        if *count < limit {
                            *count += 1;
                        }
                    }
                }
            }
            current.retain(|_, count| *count > 0);
            tally = Some(current);
        }
        Ok(tally)
    }

    fn start(&mut self) -> Result<()> {
        let Some((last, earlier)) = self.providers.split_last() else {
            self.state = State::Done;
            return Ok(());
        };
        let last = *last;
        let tally = self.build_tally(earlier)?;
        if let Some(tally) = &tally {
            debug!(distinct = tally.len(), "intersection tally complete");
            if tally.is_empty() {
                self.state = State::Done;
                return Ok(());
            }
        }
        let rows = last.get_rows(&self.bindings, self.include_dynamic_rows)?;
        self.state = State::Emitting { rows, tally };
        Ok(())
    }
}

impl<'a> Iterator for IntersectionMerge<'a> {
    type Item = Result<Row<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if matches!(self.state, State::Pending)
            && let Err(error) = self.start()
        {
            self.state = State::Done;
            return Some(Err(error));
        }
        loop {
            let State::Emitting { rows, .. } = &mut self.state else {
                return None;
            };
            let row = match rows.next() {
                Some(Ok(row)) => row,
                Some(Err(error)) => {
                    self.state = State::Done;
                    return Some(Err(error));
                }
                None => {
                    self.state = State::Done;
                    return None;
                }
            };
            let key = match self.key_of(row.as_ref()) {
                Ok(Some(key)) => key,
                Ok(None) => continue,
                Err(error) => {
                    self.state = State::Done;
                    return Some(Err(error));
                }
            };
            let State::Emitting { tally, .. } = &mut self.state else {
                return None;
            };
            let Some(tally) = tally else {
                return Some(Ok(row));
            };
            if let Some(count) = tally.get_mut(&key).filter(|count| **count > 0) {
                *count -= 1;
                return Some(Ok(row));
            }
        }
    }
}
