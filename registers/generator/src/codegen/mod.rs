// Licensed under the Apache-2.0 license

//! Main code generation logic for converting register tables into an MMIO
//! struct declaration.
//!
//! The pipeline for each summary row is:
//! 1. Parse the offset cell (a bad cell drops the row with a diagnostic)
//! 2. Apply the [`FilterConfig`]
//! 3. Resolve the offset; expressions go to the external resolver
//! 4. For fixed registers, size them from their detail table if one exists
//!
//! The surviving registers go through [`Layout::synthesize`] and
//! [`Layout::generate_code`].

use anyhow::Context;
use std::io::Write as _;
use std::path::Path;

use crate::config::{FilterConfig, GeneratorConfig};
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{RegisterError, RegisterResult};
use crate::layout::{Layout, RegisterEntry};
use crate::offset::{OffsetCell, OffsetExpressionResolver, ResolvedOffset};
use crate::table::{read_summary, DetailDir, DetailTables};
use crate::types::RegisterSummaryRow;
use crate::width::{register_width, WORD_BYTES};

/// Everything produced by one generation run.
#[derive(Clone, Debug)]
pub struct GenerationReport {
    /// The emitted declaration.
    pub code: String,
    pub layout: Layout,
    /// Non-fatal problems, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
}

/// Resolves every row into a [`RegisterEntry`], dropping the rows that cannot
/// be placed.
///
/// Only a malformed detail table is an error; bad offsets and resolver
/// failures become diagnostics.
pub fn resolve_registers(
    rows: &[RegisterSummaryRow],
    details: &dyn DetailTables,
    resolver: &mut dyn OffsetExpressionResolver,
    filter: &FilterConfig,
) -> RegisterResult<(Vec<RegisterEntry>, Vec<Diagnostic>)> {
    let mut entries = Vec::with_capacity(rows.len());
    let mut diagnostics = Diagnostics::default();

    for row in rows {
        let skip = |diagnostics: &mut Diagnostics, err: RegisterError| {
            diagnostics.push(Diagnostic::SkippedRow {
                name: row.name.clone(),
                offset: row.offset.clone(),
                reason: err.to_string(),
            })
        };

        let cell = match OffsetCell::parse(&row.offset) {
            Ok(cell) => cell,
            Err(err) => {
                skip(&mut diagnostics, err);
                continue;
            }
        };
        if !filter.should_include(cell.base(), &row.name) {
            log::debug!("filtered out {:?} at {}", row.name, row.offset);
            continue;
        }
        let offset = match cell.resolve(row.access, resolver) {
            Ok(offset) => offset,
            Err(err) => {
                skip(&mut diagnostics, err);
                continue;
            }
        };

        let mut entry = RegisterEntry::new(&row.name, row.access, offset);
        if let ResolvedOffset::Fixed(_) = entry.offset {
            if let Some((path, fields)) = details.field_table(&row.name)? {
                let width = register_width(&fields)
                    .map_err(|e| RegisterError::MalformedFieldTable {
                        path,
                        message: e.to_string(),
                    })?
                    .unwrap_or(WORD_BYTES);
                log::debug!("{:?} is {width} bytes wide", row.name);
                entry = entry.with_detail_width(width);
            }
        }
        entries.push(entry);
    }

    Ok((entries, diagnostics.into_vec()))
}

/// Generate the struct declaration from already-read summary rows.
pub fn generate_registers(
    rows: &[RegisterSummaryRow],
    details: &dyn DetailTables,
    resolver: &mut dyn OffsetExpressionResolver,
    config: &GeneratorConfig,
    filter: &FilterConfig,
) -> RegisterResult<GenerationReport> {
    let (entries, mut diagnostics) = resolve_registers(rows, details, resolver, filter)?;
    let (layout, layout_diagnostics) = Layout::synthesize(&entries, config);
    diagnostics.extend(layout_diagnostics);
    let code = layout.generate_code(config);
    log::info!(
        "generated {} with {} fields ({} rows, {} diagnostics)",
        config.struct_name,
        layout.len(),
        rows.len(),
        diagnostics.len()
    );
    Ok(GenerationReport {
        code,
        layout,
        diagnostics,
    })
}

/// Generate the struct declaration from a summary CSV and a directory of
/// per-register detail CSVs.
pub fn generate_registers_from_files(
    summary: &Path,
    detail_dir: &Path,
    resolver: &mut dyn OffsetExpressionResolver,
    config: &GeneratorConfig,
    filter: &FilterConfig,
) -> anyhow::Result<GenerationReport> {
    let table = read_summary(summary)?;
    let mut report = generate_registers(
        &table.rows,
        &DetailDir::new(detail_dir),
        resolver,
        config,
        filter,
    )?;
    let mut diagnostics = table.diagnostics;
    diagnostics.append(&mut report.diagnostics);
    report.diagnostics = diagnostics;
    Ok(report)
}

/// Writes `contents` to `path` through a temporary file in the same
/// directory, so `path` is either untouched or fully written.
pub fn write_atomically(path: &Path, contents: &str) -> anyhow::Result<()> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    tmp.write_all(contents.as_bytes())
        .with_context(|| format!("writing {}", tmp.path().display()))?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)
        .with_context(|| format!("renaming output to {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests.rs"]
mod tests;
