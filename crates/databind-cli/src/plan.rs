//! Turns a [`DataConfig`] into data sources, a joined set and a binding list.

use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info};

use databind_core::{
    ColumnSequenceDataSet, CombinatorialJoinStrategy, ConcatenationMergeStrategy, DataSet,
    DataSourceResolver, DataSourceTable, IntersectionMergeStrategy, JoinStrategy, JoinedDataSet,
    ListDataRow, MergeStrategy, PairwiseJoinStrategy, RowSequenceDataSet, SequentialJoinStrategy,
    UnionMergeStrategy,
};
use databind_model::{DataBinding, Metadata, Value};
use databind_xml::{XmlDataSet, XmlDocument};

use crate::config::{
    BindingConfig, DataConfig, JoinStrategyName, MergeStrategyName, SourceConfig, SourceKind,
};

/// Everything needed to enumerate bound rows.
pub struct Plan {
    pub sources: DataSourceTable,
    pub joined: JoinedDataSet,
    /// Source name of each joined member, by member index.
    pub members: Vec<String>,
    pub bindings: Vec<DataBinding>,
    pub labels: Vec<String>,
}

/// Build a plan, resolving relative file paths against `base_dir`.
///
/// `strategy` overrides the join strategy named in the configuration.
///
/// # Errors
///
/// Fails if a source file cannot be read, a source is rejected by its data
/// source (duplicate alias), or `join` names an undefined source.
pub fn build_plan(
    config: &DataConfig,
    base_dir: &Path,
    strategy: Option<JoinStrategyName>,
) -> Result<Plan> {
    let mut sources = DataSourceTable::new();
    for source in &config.source {
        add_source(&mut sources, source, base_dir)
            .with_context(|| format!("load source '{}'", source.name))?;
    }

    let strategy = strategy.unwrap_or(config.strategy);
    let mut joined = JoinedDataSet::new();
    joined.set_strategy(join_strategy(strategy));
    let mut members = Vec::new();
    for name in config.join_order() {
        let source = sources
            .resolve_data_source(&name)
            .ok_or_else(|| anyhow!("join names unknown source '{name}'"))?;
        let member: Rc<dyn DataSet> = source;
        joined
            .add_data_set(member)
            .with_context(|| format!("join source '{name}'"))?;
        members.push(name);
    }
    info!(
        sources = sources.len(),
        joined = members.len(),
        strategy = joined.strategy().name(),
        "data plan ready"
    );

    Ok(Plan {
        sources,
        joined,
        members,
        bindings: config.binding.iter().map(BindingConfig::to_binding).collect(),
        labels: config.binding.iter().map(BindingConfig::label).collect(),
    })
}

fn add_source(table: &mut DataSourceTable, source: &SourceConfig, base_dir: &Path) -> Result<()> {
    let mut header = Vec::new();
    let data_set: Rc<dyn DataSet> = match &source.kind {
        SourceKind::Values { values } => {
            Rc::new(ColumnSequenceDataSet::new(values.iter().cloned()).dynamic(source.dynamic))
        }
        SourceKind::Csv { path } => {
            let (rows, names) = load_csv(&base_dir.join(path), source.dynamic)?;
            header = names;
            Rc::new(rows)
        }
        SourceKind::Xml { path, rows } => {
            let path = base_dir.join(path);
            let document = XmlDocument::from_path(&path)
                .with_context(|| format!("read {}", path.display()))?;
            Rc::new(XmlDataSet::new(document, rows.as_str(), source.dynamic)?)
        }
    };

    let target = table.define_data_source(&source.name);
    target.add_data_set(data_set)?;
    if let Some(merge) = source.merge {
        target.set_merge_strategy(merge_strategy(merge));
    }
    let aliases = header
        .into_iter()
        .enumerate()
        .map(|(index, name)| (name, index))
        .chain(source.aliases.iter().map(|(name, index)| (name.clone(), *index)));
    for (name, index) in aliases {
        if name.is_empty() || target.aliases().get(&name) == Some(&index) {
            continue;
        }
        target.add_index_alias(&name, index)?;
    }
    debug!(source = %source.name, members = target.members().len(), "source defined");
    Ok(())
}

/// Read a CSV file with a header row into text-valued rows.
fn load_csv(path: &Path, dynamic: bool) -> Result<(RowSequenceDataSet, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("open {}", path.display()))?;
    let header: Vec<String> = reader
        .headers()
        .with_context(|| format!("read header of {}", path.display()))?
        .iter()
        .map(str::to_string)
        .collect();

    let file = path.display().to_string();
    let mut rows = Vec::new();
    for (position, record) in reader.records().enumerate() {
        let record =
            record.with_context(|| format!("read record {} of {file}", position + 1))?;
        let metadata = Metadata::new()
            .with("File", file.as_str())
            .with("Record", (position + 1).to_string());
        rows.push(ListDataRow::new(record.iter().map(Value::text), metadata, dynamic).into_row());
    }
    debug!(file = %file, rows = rows.len(), columns = header.len(), "csv loaded");
    let data_set = RowSequenceDataSet::new(rows, header.len()).dynamic(dynamic);
    Ok((data_set, header))
}

pub fn join_strategy(name: JoinStrategyName) -> Rc<dyn JoinStrategy> {
    match name {
        JoinStrategyName::Combinatorial => Rc::new(CombinatorialJoinStrategy),
        JoinStrategyName::Sequential => Rc::new(SequentialJoinStrategy),
        JoinStrategyName::Pairwise => Rc::new(PairwiseJoinStrategy),
    }
}

pub fn merge_strategy(name: MergeStrategyName) -> Rc<dyn MergeStrategy> {
    match name {
        MergeStrategyName::Concatenation => Rc::new(ConcatenationMergeStrategy),
        MergeStrategyName::Union => Rc::new(UnionMergeStrategy),
        MergeStrategyName::Intersection => Rc::new(IntersectionMergeStrategy),
    }
}
