//! Named lookup of data sources.

use std::collections::BTreeMap;
use std::rc::Rc;

use crate::data_source::DataSource;

/// Looks data sources up by name.
pub trait DataSourceResolver {
    fn resolve_data_source(&self, name: &str) -> Option<Rc<DataSource>>;
}

/// An owned table of data sources keyed by name.
#[derive(Clone, Default)]
pub struct DataSourceTable {
    sources: BTreeMap<String, Rc<DataSource>>,
}

impl DataSourceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The source called `name`, created empty on first use.
    ///
    /// A source already handed out through [`DataSourceResolver`] is copied
    /// before being changed; earlier handles keep the old contents.
    pub fn define_data_source(&mut self, name: &str) -> &mut DataSource {
        let source = self
            .sources
            .entry(name.to_string())
            .or_insert_with(|| Rc::new(DataSource::new(name)));
        Rc::make_mut(source)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

impl DataSourceResolver for DataSourceTable {
    fn resolve_data_source(&self, name: &str) -> Option<Rc<DataSource>> {
        self.sources.get(name).cloned()
    }
}
