use comfy_table::{Cell, Table};

use crate::core::StorageReading;
use crate::output::chart::Severity;
use crate::output::format::{
    create_styled_table, format_percent, header_cell, right_cell, severity_color,
};

fn percent_cell(value: Option<u8>, use_color: bool) -> Cell {
    let color = value
        .filter(|_| use_color)
        .map(|v| severity_color(Severity::from_percent(v)));
    right_cell(&format_percent(value), color, false)
}

pub(crate) fn build_summary_table(results: &[StorageReading], use_color: bool) -> Table {
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("Site", use_color),
        header_cell("Group", use_color),
        header_cell("Internal", use_color),
        header_cell("External", use_color),
    ]);

    for reading in results {
        table.add_row(vec![
            Cell::new(&reading.site),
            Cell::new(reading.group.label()),
            percent_cell(reading.internal_free, use_color),
            percent_cell(reading.external_free, use_color),
        ]);
    }
    table
}

/// Print one row per site in run order
pub(crate) fn print_summary_table(results: &[StorageReading], use_color: bool) {
    if results.is_empty() {
        println!("No sites were scraped.");
        return;
    }
    println!("\n  Site Storage Summary\n");
    println!("{}", build_summary_table(results, use_color));

    let missing = results.iter().filter(|r| r.is_empty()).count();
    if missing > 0 {
        println!("\n  {missing} of {} site(s) returned no readings\n", results.len());
    } else {
        println!();
    }
}
