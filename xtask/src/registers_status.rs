// Licensed under the Apache-2.0 license

//! Report how complete the extracted register tables are.

use anyhow::Result;
use mmio_registers_generator::table::read_summary;
use mmio_registers_generator::util::normalize_name;
use mmio_registers_generator::{DetailDir, RegisterSummaryRow};
use std::path::Path;

#[derive(Debug, PartialEq, Eq)]
struct RowStatus {
    offset: String,
    file_stem: String,
    has_detail: bool,
    page: Option<u32>,
}

fn row_status(row: &RegisterSummaryRow, details: &DetailDir) -> RowStatus {
    RowStatus {
        offset: row.offset.clone(),
        file_stem: normalize_name(&row.name),
        has_detail: details.path_for(&row.name).is_file(),
        page: row.page_number(),
    }
}

pub fn status(summary: &Path, info_dir: &Path) -> Result<()> {
    let table = read_summary(summary)?;
    let details = DetailDir::new(info_dir);
    let statuses: Vec<_> = table
        .rows
        .iter()
        .map(|row| row_status(row, &details))
        .collect();

    println!("{:<24} {:<56} {:<6} Page", "Offset", "Detail table", "Found");
    for s in &statuses {
        let page = s.page.map(|p| p.to_string()).unwrap_or_else(|| "none".into());
        println!(
            "{:<24} {:<56} {:<6} {}",
            s.offset,
            format!("{}.csv", s.file_stem),
            if s.has_detail { "yes" } else { "no" },
            page
        );
    }

    let with_detail = statuses.iter().filter(|s| s.has_detail).count();
    let without_page = statuses.iter().filter(|s| s.page.is_none()).count();
    println!(
        "\n{} registers, {} with detail tables, {} not extractable (no page number), {} unreadable rows",
        statuses.len(),
        with_detail,
        without_page,
        table.diagnostics.len()
    );
    Ok(())
}
