//! End-of-run summary table.

use std::path::Path;

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use spectra_core::{RunReport, SelectedFile, SuffixStatus, render_unmatched};

pub fn print_summary(report: &RunReport) {
    println!("Output: {}", report.output_dir.display());
    if report.dry_run {
        println!("Dry run: nothing was copied");
    }
    println!("{}", summary_table(report));
    println!(
        "{} selected, {} unmatched, {} warnings",
        report.copied_count(),
        report.unmatched().len(),
        report.warnings.len()
    );
    print!("{}", render_unmatched(report));
    for identifier in report.failed() {
        println!("Copy failed for ID {identifier}");
    }
}

/// One row per identifier and suffix that had candidates.
pub fn summary_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("ID"),
        header_cell("Suffix"),
        header_cell("Winner"),
        header_cell("Median"),
        header_cell("Peak"),
        header_cell("Combined"),
        header_cell("Companions"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 3..=5 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    align_column(&mut table, 6, CellAlignment::Center);

    for identifier in &report.identifiers {
        for outcome in &identifier.outcomes {
            let id_cell = Cell::new(&identifier.identifier).add_attribute(Attribute::Bold);
            let suffix_cell = Cell::new(&outcome.suffix);
            let row = match &outcome.status {
                SuffixStatus::Copied(selected) => vec![
                    id_cell,
                    suffix_cell,
                    Cell::new(file_name(&selected.record.source)),
                    score_cell(selected.score.median),
                    score_cell(selected.score.peak),
                    score_cell(selected.score.combined).add_attribute(Attribute::Bold),
                    companion_cell(selected),
                ],
                SuffixStatus::Failed { winner, .. } => vec![
                    id_cell,
                    suffix_cell,
                    Cell::new(file_name(winner)).fg(Color::Red),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("copy failed").fg(Color::Red),
                ],
                SuffixStatus::NoCandidate if outcome.candidates > 0 => vec![
                    id_cell,
                    suffix_cell,
                    Cell::new(format!("{} unscorable", outcome.excluded)).fg(Color::Yellow),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                ],
                SuffixStatus::NoCandidate => continue,
            };
            table.add_row(row);
        }
    }
    table
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

fn score_cell(value: f64) -> Cell {
    Cell::new(format!("{value:.2}"))
}

fn companion_cell(selected: &SelectedFile) -> Cell {
    let copied = selected.companions.len();
    let missing = selected.missing_companions.len();
    let failed = selected.failed_companions.len();
    if failed > 0 {
        return Cell::new(format!("{copied} ({failed} failed)")).fg(Color::Red);
    }
    match (copied, missing) {
        (0, 0) => dim_cell("-"),
        (copied, 0) => Cell::new(copied).fg(Color::Green),
        (copied, missing) => Cell::new(format!("{copied} ({missing} missing)")).fg(Color::Yellow),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |name| name.to_string_lossy().into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use spectra_core::{
        AuditRecord, FailedCopy, Identifier, IdentifierReport, QualityScore, SuffixOutcome,
    };
    use std::path::PathBuf;

    fn report() -> RunReport {
        let mut report = RunReport::new("/out", false);
        let mut matched = IdentifierReport::new(Identifier::canonical("42"));
        matched.outcomes.push(SuffixOutcome {
            suffix: "_x1d.fits".to_string(),
            candidates: 0,
            excluded: 0,
            status: SuffixStatus::NoCandidate,
        });
        matched.outcomes.push(SuffixOutcome {
            suffix: "_1D.fits".to_string(),
            candidates: 2,
            excluded: 0,
            status: SuffixStatus::Copied(SelectedFile {
                record: AuditRecord {
                    source: PathBuf::from("/runs/b/000042_1D.fits"),
                    destination: PathBuf::from("/out/000042_1D.fits"),
                },
                score: QualityScore::new(5.0, 10.0).unwrap(),
                companions: Vec::new(),
                missing_companions: vec![PathBuf::from("/runs/b/000042_2D.fits")],
                failed_companions: Vec::new(),
            }),
        });
        let mut broken = IdentifierReport::new(Identifier::canonical("7"));
        broken.outcomes.push(SuffixOutcome {
            suffix: "_1D.fits".to_string(),
            candidates: 1,
            excluded: 1,
            status: SuffixStatus::NoCandidate,
        });
        report.identifiers = vec![matched, broken];
        report
    }

    #[test]
    fn test_rows_skip_empty_suffixes() {
        let rendered = summary_table(&report()).to_string();
        assert!(rendered.contains("000042_1D.fits"));
        assert!(rendered.contains("7.07"));
        assert!(rendered.contains("0 (1 missing)"));
        assert!(rendered.contains("1 unscorable"));
        assert!(!rendered.contains("_x1d.fits"));
    }

    #[test]
    fn test_failed_companion_is_flagged() {
        let mut report = report();
        if let SuffixStatus::Copied(selected) = &mut report.identifiers[0].outcomes[1].status {
            selected.failed_companions.push(FailedCopy {
                source: PathBuf::from("/runs/b/000042_2D.fits"),
                error: "is a directory".to_string(),
            });
        }
        let rendered = summary_table(&report).to_string();
        assert!(rendered.contains("0 (1 failed)"));
    }

    #[test]
    fn test_file_name() {
        assert_eq!(file_name(Path::new("/a/b/000042_1D.fits")), "000042_1D.fits");
        assert_eq!(file_name(Path::new("/")), "/");
    }
}
