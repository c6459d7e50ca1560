use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info, info_span};

use databind_core::{DataBinder, DataSet};

use crate::config::{DataConfig, JoinStrategyName};
use crate::plan::{Plan, build_plan};

/// Bound values of every item, as display text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowsReport {
    pub labels: Vec<String>,
    pub rows: Vec<Vec<String>>,
    /// Values that could not be produced; their cells hold the error.
    pub failures: usize,
}

/// How one configured binding resolves against the joined sources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingCheck {
    pub label: String,
    pub binding: String,
    /// Joined member that answers the binding and the binding it receives.
    pub target: Option<(String, String)>,
    pub can_bind: bool,
}

pub fn run_rows(config_path: &Path, strategy: Option<JoinStrategyName>) -> Result<RowsReport> {
    let span = info_span!("rows", config = %config_path.display());
    let _guard = span.enter();
    let plan = load_plan(config_path, strategy)?;
    let report = collect_rows(&plan)?;
    info!(rows = report.rows.len(), failures = report.failures, "rows bound");
    Ok(report)
}

pub fn run_check(config_path: &Path) -> Result<Vec<BindingCheck>> {
    let span = info_span!("check", config = %config_path.display());
    let _guard = span.enter();
    let plan = load_plan(config_path, None)?;
    Ok(check_bindings(&plan))
}

fn load_plan(config_path: &Path, strategy: Option<JoinStrategyName>) -> Result<Plan> {
    let config = DataConfig::load(config_path)?;
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    build_plan(&config, base_dir, strategy)
}

/// Bind the plan's bindings and read every value of every item.
pub fn collect_rows(plan: &Plan) -> Result<RowsReport> {
    let binder = DataBinder::default();
    let items = binder
        .bind(&plan.joined, plan.bindings.clone())
        .context("bind joined sources")?;
    let mut report = RowsReport {
        labels: plan.labels.clone(),
        ..RowsReport::default()
    };
    for (position, item) in items.enumerate() {
        let item = item.with_context(|| format!("read row {}", position + 1))?;
        let mut cells = Vec::with_capacity(item.binding_count());
        for index in 0..item.binding_count() {
            match item.get_value(index) {
                Ok(value) => cells.push(value.to_string()),
                Err(error) => {
                    debug!(row = position + 1, binding = index, %error, "value unavailable");
                    report.failures += 1;
                    cells.push(format!("error: {error}"));
                }
            }
        }
        report.rows.push(cells);
    }
    Ok(report)
}

pub fn check_bindings(plan: &Plan) -> Vec<BindingCheck> {
    plan.bindings
        .iter()
        .zip(&plan.labels)
        .map(|(binding, label)| {
            let target = plan.joined.resolve_binding(binding).map(|resolved| {
                let member = plan
                    .members
                    .get(resolved.member_index())
                    .cloned()
                    .unwrap_or_default();
                (member, resolved.inner().to_string())
            });
            BindingCheck {
                label: label.clone(),
                binding: binding.to_string(),
                target,
                can_bind: plan.joined.can_bind(binding),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;

    fn plan(text: &str) -> Plan {
        build_plan(&DataConfig::parse(text).unwrap(), Path::new("."), None).unwrap()
    }

    const LETTERS_AND_NUMBERS: &str = r#"
        [[source]]
        name = "letters"
        kind = "values"
        values = ["a", "b"]
        aliases = { letter = 0 }

        [[source]]
        name = "numbers"
        kind = "values"
        values = ["1", "2"]

        [[binding]]
        path = "letter"

        [[binding]]
        index = 1
        type = "int"

        [[binding]]
        index = 5
    "#;

    #[test]
    fn collects_values_and_reports_failures_per_cell() {
        let report = collect_rows(&plan(LETTERS_AND_NUMBERS)).unwrap();
        assert_eq!(report.labels, vec!["letter", "#1", "#5"]);
        assert_eq!(report.rows.len(), 4);
        assert_eq!(report.rows[1][..2], ["a".to_string(), "2".to_string()]);
        assert!(report.rows[1][2].starts_with("error: "));
        assert_eq!(report.failures, 4);
    }

    #[test]
    fn check_names_the_answering_member() {
        let checks = check_bindings(&plan(LETTERS_AND_NUMBERS));
        assert_eq!(checks.len(), 3);
        assert_eq!(
            checks[0].target.as_ref().map(|(member, _)| member.as_str()),
            Some("letters")
        );
        assert!(checks[0].can_bind);
        let (member, inner) = checks[1].target.clone().unwrap();
        assert_eq!(member, "numbers");
        assert_eq!(inner, "{index: 0, type: int}");
        assert!(checks[1].can_bind);
        assert_eq!(checks[2].target, None);
        assert!(!checks[2].can_bind);
    }

    #[test]
    fn pairwise_is_rejected_when_binding() {
        let mut plan = plan(LETTERS_AND_NUMBERS);
        plan.joined
            .set_strategy(crate::plan::join_strategy(JoinStrategyName::Pairwise));
        let err = collect_rows(&plan).unwrap_err();
        assert!(format!("{err:#}").contains("pairwise"));
    }
}
