use databind_model::{DataBinding, Result};
use tracing::{debug, trace};

use super::{JoinStrategy, RowTuple, RowTuples, check_arity};
use crate::provider::{DataProvider, Rows};
use crate::row::Row;

/// Full cartesian product of the providers' rows.
///
/// Tuples are produced in odometer order: the last provider varies fastest.
/// For providers `A = [a0, a1]` and `B = [b0, b1, b2]` the order is
/// `(a0, b0), (a0, b1), (a0, b2), (a1, b0), (a1, b1), (a1, b2)`.
///
/// Rows are pulled lazily. The first provider is enumerated once. Every other
/// provider is enumerated again each time a provider before it advances:
/// dynamic providers are asked for a fresh sequence every time, the rows of
/// static providers are remembered during their first pass and replayed.
///
/// Zero providers, or any provider without rows, yield no tuples.
#[derive(Debug, Clone, Copy, Default)]
pub struct CombinatorialJoinStrategy;

impl JoinStrategy for CombinatorialJoinStrategy {
    fn name(&self) -> &'static str {
        "combinatorial"
    }

    fn join<'a>(
        &self,
        providers: Vec<&'a dyn DataProvider>,
        bindings_per_provider: Vec<Vec<DataBinding>>,
        include_dynamic_rows: bool,
    ) -> Result<RowTuples<'a>> {
        check_arity(&providers, &bindings_per_provider)?;
        debug!(providers = providers.len(), "starting combinatorial join");
        let levels = providers
            .into_iter()
            .zip(bindings_per_provider)
            .map(|(provider, bindings)| Level {
                provider,
                bindings,
                cursor: Cursor::Unstarted,
            })
            .collect();
        Ok(Box::new(CombinatorialJoin {
            levels,
            current: Vec::new(),
            include_dynamic_rows,
            started: false,
            done: false,
        }))
    }
}

struct Level<'a> {
    provider: &'a dyn DataProvider,
    bindings: Vec<DataBinding>,
    cursor: Cursor<'a>,
}

enum Cursor<'a> {
    Unstarted,
    /// Streams straight from the provider; used for the first level and for
    /// dynamic providers.
    Live(Rows<'a>),
    /// First pass over a static provider, remembering rows as they go by.
    Recording { source: Rows<'a>, seen: Vec<Row<'a>> },
    /// Replay of a fully recorded static provider.
    Replaying { rows: Vec<Row<'a>>, next: usize },
}

impl<'a> Level<'a> {
    fn restart(&mut self, depth: usize, include_dynamic_rows: bool) -> Result<()> {
        let cursor = std::mem::replace(&mut self.cursor, Cursor::Unstarted);
        self.cursor = match cursor {
            Cursor::Replaying { rows, .. } => Cursor::Replaying { rows, next: 0 },
            Cursor::Recording { source, mut seen } => {
                for row in source {
                    seen.push(row?);
                }
                Cursor::Replaying {
                    rows: seen,
                    next: 0,
                }
            }
            Cursor::Unstarted | Cursor::Live(_) => {
                trace!(depth, "fetching provider rows");
                let source = self
                    .provider
                    .get_rows(&self.bindings, include_dynamic_rows)?;
                if depth == 0 || self.provider.is_dynamic() {
                    Cursor::Live(source)
                } else {
                    Cursor::Recording {
                        source,
                        seen: Vec::new(),
                    }
                }
            }
        };
        Ok(())
    }

    fn advance(&mut self) -> Option<Result<Row<'a>>> {
        match &mut self.cursor {
            Cursor::Unstarted => None,
            Cursor::Live(source) => source.next(),
            Cursor::Recording { source, seen } => match source.next() {
                Some(Ok(row)) => {
                    seen.push(row.clone());
                    Some(Ok(row))
                }
                Some(Err(error)) => Some(Err(error)),
                None => {
                    let rows = std::mem::take(seen);
                    let next = rows.len();
                    self.cursor = Cursor::Replaying { rows, next };
                    None
                }
            },
            Cursor::Replaying { rows, next } => {
                let row = rows.get(*next)?.clone();
                *next += 1;
                Some(Ok(row))
            }
        }
    }
}

struct CombinatorialJoin<'a> {
    levels: Vec<Level<'a>>,
    /// Rows currently selected for levels `0..current.len()`.
    current: Vec<Row<'a>>,
    include_dynamic_rows: bool,
    started: bool,
    done: bool,
}

impl<'a> CombinatorialJoin<'a> {
    fn fail(&mut self, error: databind_model::DataError) -> Option<Result<RowTuple<'a>>> {
        self.done = true;
        self.current.clear();
        Some(Err(error))
    }
}

impl<'a> Iterator for CombinatorialJoin<'a> {
    type Item = Result<RowTuple<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let width = self.levels.len();
        if !self.started {
            self.started = true;
            if width == 0 {
                self.done = true;
                return None;
            }
            if let Err(error) = self.levels[0].restart(0, self.include_dynamic_rows) {
                return self.fail(error);
            }
        } else {
            // The last level moves on from the tuple emitted previously.
            self.current.pop();
        }

        loop {
            let depth = self.current.len();
            match self.levels[depth].advance() {
                Some(Ok(row)) => {
                    self.current.push(row);
                    if self.current.len() == width {
                        return Some(Ok(self.current.clone()));
                    }
                    let next_depth = depth + 1;
                    if let Err(error) =
                        self.levels[next_depth].restart(next_depth, self.include_dynamic_rows)
                    {
                        return self.fail(error);
                    }
                }
                Some(Err(error)) => return self.fail(error),
                None => {
                    if depth == 0 {
                        self.done = true;
                        self.current.clear();
                        return None;
                    }
                    self.current.pop();
                }
            }
        }
    }
}
