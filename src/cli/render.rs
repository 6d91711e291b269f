use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Row as ComfyRow, Table};
use serde::Serialize;
use terminal_size::{Width as TermWidth, terminal_size};

use crate::coverage::{CoverageReport, CoverageRow, FileCoverage, Ratio};
use crate::types::UnitId;

use super::{Cli, OutputFormat};

#[derive(Debug, Clone, Serialize)]
pub(super) struct KeyValueRow {
    pub key: String,
    pub value: String,
}

impl KeyValueRow {
    fn new(key: &str, value: impl ToString) -> Self {
        Self {
            key: key.to_string(),
            value: value.to_string(),
        }
    }
}

pub(super) trait TableRow {
    const HEADERS: &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

impl TableRow for KeyValueRow {
    const HEADERS: &'static [&'static str] = &["key", "value"];

    fn cells(&self) -> Vec<Cell> {
        vec![Cell::new(&self.key), Cell::new(&self.value)]
    }
}

#[derive(Debug, Clone, Serialize)]
struct RowOutput {
    id: UnitId,
    declared: usize,
    tested: usize,
    percent: Ratio,
}

impl From<&CoverageRow> for RowOutput {
    fn from(row: &CoverageRow) -> Self {
        Self {
            id: row.id.clone(),
            declared: row.declared_count,
            tested: row.tested_count,
            percent: row.percent(),
        }
    }
}

impl TableRow for RowOutput {
    const HEADERS: &'static [&'static str] = &["schema", "declared", "tested", "coverage"];

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::new(self.id.as_str()),
            Cell::new(self.declared).set_alignment(CellAlignment::Right),
            Cell::new(self.tested).set_alignment(CellAlignment::Right),
            Cell::new(self.percent).set_alignment(CellAlignment::Right),
        ]
    }
}

#[derive(Debug, Clone, Serialize)]
struct FilesOutput {
    metric: &'static str,
    schema_files: usize,
    test_files: usize,
    percent: Ratio,
}

impl From<&FileCoverage> for FilesOutput {
    fn from(files: &FileCoverage) -> Self {
        Self {
            metric: "files",
            schema_files: files.schema_files,
            test_files: files.test_files,
            percent: files.percent(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
struct OperationsOutput {
    metric: &'static str,
    rows: Vec<RowOutput>,
    total_declared: usize,
    total_tested: usize,
    percent: Ratio,
    orphan_tests: Vec<UnitId>,
    files: FilesOutput,
}

pub(super) fn terminal_width() -> Option<u16> {
    if let Ok(cols) = std::env::var("COLUMNS")
        && let Ok(v) = cols.parse::<u16>()
    {
        return Some(v);
    }
    terminal_size().map(|(TermWidth(w), _)| w)
}

pub(super) fn render_operations(
    cli: &Cli,
    report: &CoverageReport,
    files: &FileCoverage,
) -> anyhow::Result<()> {
    let out = OperationsOutput {
        metric: "operations",
        rows: report.rows.iter().map(RowOutput::from).collect(),
        total_declared: report.total_declared,
        total_tested: report.total_tested,
        percent: report.percent(),
        orphan_tests: report.orphan_tests.clone(),
        files: FilesOutput::from(files),
    };

    match cli.output {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            println!("{}", table(cli, &out.rows));

            let orphans = out
                .orphan_tests
                .iter()
                .map(UnitId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            let summary = vec![
                KeyValueRow::new("declared operations", out.total_declared),
                KeyValueRow::new("tested operations", out.total_tested),
                KeyValueRow::new("operation coverage", out.percent),
                KeyValueRow::new("tests without schema", orphans),
                KeyValueRow::new(
                    "file coverage",
                    format!(
                        "{} ({} test / {} schema files)",
                        out.files.percent, out.files.test_files, out.files.schema_files
                    ),
                ),
            ];
            println!("{}", table(cli, &summary));
            Ok(())
        }
    }
}

pub(super) fn render_files(cli: &Cli, files: &FileCoverage) -> anyhow::Result<()> {
    let out = FilesOutput::from(files);
    match cli.output {
        OutputFormat::Json => print_json(&out),
        OutputFormat::Table => {
            let rows = vec![
                KeyValueRow::new("schema files", out.schema_files),
                KeyValueRow::new("test files", out.test_files),
                KeyValueRow::new("file coverage", out.percent),
            ];
            println!("{}", table(cli, &rows));
            Ok(())
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

fn table<T: TableRow>(cli: &Cli, rows: &[T]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    if let Some(w) = terminal_width() {
        table.set_width(w);
    }

    table.set_header(ComfyRow::from(
        T::HEADERS
            .iter()
            .map(|h| header_cell(cli, h))
            .collect::<Vec<_>>(),
    ));
    for row in rows {
        table.add_row(ComfyRow::from(row.cells()));
    }
    table
}

pub(super) fn header_cell(cli: &Cli, text: &str) -> Cell {
    if super::should_color(cli) {
        Cell::new(text)
            .add_attribute(Attribute::Bold)
            .fg(Color::Cyan)
    } else {
        Cell::new(text)
    }
}
