//! TOML data configuration read by the `databind` binary.
//!
//! ```toml
//! join = ["people", "sizes"]
//! strategy = "combinatorial"
//!
//! [[source]]
//! name = "people"
//! kind = "csv"
//! path = "people.csv"
//!
//! [[source]]
//! name = "sizes"
//! kind = "values"
//! values = [1, 2, 3]
//!
//! [[binding]]
//! path = "name"
//!
//! [[binding]]
//! index = 2
//! type = "int"
//! ```
//!
//! Several `[[source]]` entries with the same name become members of one
//! data source and are combined by its merge strategy.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use databind_model::{DataBinding, Value, ValueType};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DataConfig {
    /// Sources to join, in order. Defaults to every source in the order
    /// first defined.
    #[serde(default)]
    pub join: Vec<String>,
    #[serde(default)]
    pub strategy: JoinStrategyName,
    #[serde(default)]
    pub source: Vec<SourceConfig>,
    #[serde(default)]
    pub binding: Vec<BindingConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    /// Merge strategy of the named source. Only needed on one entry.
    #[serde(default)]
    pub merge: Option<MergeStrategyName>,
    #[serde(default)]
    pub dynamic: bool,
    /// Extra path-to-index aliases.
    #[serde(default)]
    pub aliases: BTreeMap<String, usize>,
    #[serde(flatten)]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SourceKind {
    /// Inline single-column list.
    Values { values: Vec<Value> },
    /// CSV file with a header row; header names become index aliases.
    Csv { path: PathBuf },
    /// XML file; `rows` selects one row per node.
    Xml { path: PathBuf, rows: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub index: Option<usize>,
    #[serde(default, rename = "type")]
    pub value_type: ValueType,
    /// Column heading; defaults to the path or `#index`.
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JoinStrategyName {
    #[default]
    Combinatorial,
    Sequential,
    Pairwise,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeStrategyName {
    #[default]
    Concatenation,
    Union,
    Intersection,
}

impl DataConfig {
    /// Parse a configuration document.
    ///
    /// # Errors
    ///
    /// Fails on malformed TOML, unknown keys, or a binding with neither a
    /// path nor an index.
    pub fn parse(text: &str) -> Result<Self> {
        let config: DataConfig = toml::from_str(text).context("parse data configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse the configuration at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("load {}", path.display()))
    }

    /// Names of the sources to join.
    pub fn join_order(&self) -> Vec<String> {
        if !self.join.is_empty() {
            return self.join.clone();
        }
        let mut names: Vec<String> = Vec::new();
        for source in &self.source {
            if !names.iter().any(|name| name == &source.name) {
                names.push(source.name.clone());
            }
        }
        names
    }

    fn validate(&self) -> Result<()> {
        for (position, binding) in self.binding.iter().enumerate() {
            if binding.path.is_none() && binding.index.is_none() {
                bail!("binding {} needs a path or an index", position + 1);
            }
        }
        Ok(())
    }
}

impl BindingConfig {
    pub fn to_binding(&self) -> DataBinding {
        DataBinding::new(self.value_type, self.path.clone(), self.index)
    }

    pub fn label(&self) -> String {
        if let Some(label) = &self.label {
            return label.clone();
        }
        match (&self.path, self.index) {
            (Some(path), _) => path.clone(),
            (None, Some(index)) => format!("#{index}"),
            (None, None) => String::from("?"),
        }
    }
}
