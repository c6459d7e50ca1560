//! Text output for the `rows` and `check` commands.

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::commands::{BindingCheck, RowsReport};

/// Output styling; `styled` enables ANSI colors in tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    pub styled: bool,
}

/// One tab-separated line per row, no header.
pub fn rows_plain(report: &RowsReport) -> String {
    report
        .rows
        .iter()
        .map(|row| row.join("\t"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn rows_table(report: &RowsReport, options: RenderOptions) -> String {
    let mut table = Table::new();
    table.set_header(report.labels.iter().map(String::as_str).map(header_cell));
    apply_table_style(&mut table, options);
    for row in &report.rows {
        table.add_row(row.iter().map(String::as_str).map(value_cell));
    }
    table.to_string()
}

pub fn checks_table(checks: &[BindingCheck], options: RenderOptions) -> String {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Binding"),
        header_cell("Request"),
        header_cell("Source"),
        header_cell("Member binding"),
        header_cell("Binds"),
    ]);
    apply_table_style(&mut table, options);
    for check in checks {
        let (source, inner) = match &check.target {
            Some((source, inner)) => (Cell::new(source), Cell::new(inner)),
            None => (dim_cell("-"), dim_cell("-")),
        };
        let binds = if check.can_bind {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        };
        table.add_row(vec![
            Cell::new(&check.label),
            Cell::new(&check.binding),
            source,
            inner,
            binds,
        ]);
    }
    table.to_string()
}

fn apply_table_style(table: &mut Table, options: RenderOptions) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if !options.styled {
        table.force_no_tty();
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn value_cell(text: &str) -> Cell {
    if text.starts_with("error: ") {
        Cell::new(text).fg(Color::Red)
    } else {
        Cell::new(text)
    }
}

fn dim_cell(text: &str) -> Cell {
    Cell::new(text).fg(Color::DarkGrey)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RowsReport {
        RowsReport {
            labels: vec!["name".into(), "age".into()],
            rows: vec![
                vec!["ada".into(), "36".into()],
                vec!["alan".into(), "41".into()],
            ],
            failures: 0,
        }
    }

    #[test]
    fn plain_rows_are_tab_separated() {
        insta::assert_snapshot!(rows_plain(&report()), @r"
        ada	36
        alan	41
        ");
    }

    #[test]
    fn table_rows_have_a_header() {
        insta::assert_snapshot!(rows_table(&report(), RenderOptions::default()), @r"
        ╭──────┬─────╮
        │ name ┆ age │
        ╞══════╪═════╡
        │ ada  ┆ 36  │
        │ alan ┆ 41  │
        ╰──────┴─────╯
        ");
    }

    #[test]
    fn empty_report_renders_nothing_in_plain_mode() {
        assert_eq!(rows_plain(&RowsReport::default()), "");
    }
}
