use anyhow::Result;
use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde::Serialize;

use comorb_cli::pipeline::ScoreStats;
use comorb_model::{ScoreType, categories_for, category_label};

use crate::types::{InputSummary, MatrixResult, RiskSeriesResult};

pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_matrix_summary(result: &MatrixResult) {
    print_input(&result.input);
    println!("Index: {} (weights: {})", result.score_type, result.weights);
    println!("Patients: {}", result.patients);
    if let Some(path) = &result.output {
        println!("Output: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Category"),
        header_cell("Description"),
        header_cell("Patients"),
        header_cell("Share"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 2, CellAlignment::Right);
    align_column(&mut table, 3, CellAlignment::Right);
    for count in &result.categories {
        let share = if result.patients == 0 {
            0.0
        } else {
            count.patients as f64 * 100.0 / result.patients as f64
        };
        let patients = if count.patients == 0 {
            dim_cell(count.patients)
        } else {
            Cell::new(count.patients)
        };
        table.add_row(vec![
            Cell::new(&count.category)
                .fg(Color::Blue)
                .add_attribute(Attribute::Bold),
            Cell::new(&count.label),
            patients,
            Cell::new(format!("{share:.1}%")),
        ]);
    }
    println!("{table}");
    print_score_stats("Risk score", &result.scores);
}

pub fn print_risk_summary(result: &RiskSeriesResult) {
    print_input(&result.input);
    println!("Index: {} (weights: {})", result.score_type, result.weights);
    println!("Number of patients: {}", result.patients);
    match (result.months.first(), result.months.last()) {
        (Some(first), Some(last)) => {
            println!("Months: {} ({first} .. {last})", result.months.len());
            print_score_stats("Latest month", &result.latest);
        }
        _ => println!("Months: 0 (fewer than two diagnosis months in the input)"),
    }
    println!("Output: {}", result.output.display());
}

pub fn print_categories(score_type: ScoreType) {
    let mut table = Table::new();
    table.set_header(vec!["Category", "Description"]);
    apply_table_style(&mut table);
    for category in categories_for(score_type) {
        table.add_row(vec![
            Cell::new(category).fg(Color::Cyan),
            Cell::new(category_label(category).unwrap_or_default()),
        ]);
    }
    println!("{table}");
}

fn print_input(input: &InputSummary) {
    println!("Input: {}", input.path.display());
    println!(
        "Records: {} (ICD-9: {}, ICD-10: {}, skipped: {})",
        input.records, input.icd9_records, input.icd10_records, input.skipped_records
    );
}

fn print_score_stats(title: &str, stats: &ScoreStats) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell(title),
        header_cell("Patients"),
        header_cell("Non-zero"),
        header_cell("Mean"),
        header_cell("Min"),
        header_cell("Max"),
    ]);
    apply_table_style(&mut table);
    for index in 1..6 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    table.add_row(vec![
        Cell::new("score").add_attribute(Attribute::Bold),
        Cell::new(stats.count),
        Cell::new(stats.nonzero),
        Cell::new(format!("{:.2}", stats.mean)),
        Cell::new(format!("{:.2}", stats.min)),
        Cell::new(format!("{:.2}", stats.max)),
    ]);
    println!("{table}");
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::DynamicFullWidth)
        .set_width(120);
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
