// Licensed under the Apache-2.0 license

//! Reading the extracted register tables.
//!
//! The summary table is a single CSV with the header
//! `Offset,Abbreviation,Name,Block,RW,Reset,Page`. Each register may also have
//! a detail table `<normalized name>.csv` with the header
//! `Field,Bit(s),Init Val,Reserved` in a separate directory.
//!
//! Both come out of a best-effort extraction step. A bad summary row is
//! reported and skipped; a bad detail table is an error, because silently
//! dropping it would change the register's width.

use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::error::{RegisterError, RegisterResult};
use crate::types::{BitFieldRow, RegisterSummaryRow};
use crate::util::normalize_name;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::{Path, PathBuf};

const REQUIRED_SUMMARY_COLUMNS: &[&str] = &["Offset", "Name"];

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader)
}

fn missing_required_cell(row: &RegisterSummaryRow) -> Option<&'static str> {
    if row.offset.is_empty() {
        Some("Offset")
    } else if row.name.is_empty() {
        Some("Name")
    } else {
        None
    }
}

/// A parsed summary table plus the rows that could not be read.
#[derive(Clone, Debug, Default)]
pub struct SummaryTable {
    pub rows: Vec<RegisterSummaryRow>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Reads the register summary table from `path`.
pub fn read_summary(path: &Path) -> RegisterResult<SummaryTable> {
    let file = std::fs::File::open(path).map_err(|e| RegisterError::io(path, e))?;
    read_summary_from_reader(file, path)
}

/// Reads a register summary table. `origin` is only used in error messages.
pub fn read_summary_from_reader<R: Read>(reader: R, origin: &Path) -> RegisterResult<SummaryTable> {
    let malformed = |message: String| RegisterError::MalformedSummary {
        path: origin.to_path_buf(),
        message,
    };

    let mut reader = csv_reader(reader);
    let headers = reader.headers().map_err(|e| malformed(e.to_string()))?.clone();
    for column in REQUIRED_SUMMARY_COLUMNS {
        if !headers.iter().any(|h| h == *column) {
            return Err(malformed(format!("missing required column {column:?}")));
        }
    }

    let mut rows = Vec::new();
    let mut diagnostics = Diagnostics::default();
    for record in reader.records() {
        let mut record = match record {
            Ok(record) => record,
            Err(e) => {
                if let csv::ErrorKind::Io(_) = e.kind() {
                    return Err(malformed(e.to_string()));
                }
                diagnostics.push(Diagnostic::MalformedSummaryRow {
                    line: e.position().map(|p| p.line()).unwrap_or(0),
                    message: e.to_string(),
                });
                continue;
            }
        };
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        // Extraction often drops trailing empty cells
        while record.len() < headers.len() {
            record.push_field("");
        }
        let message = match record.deserialize::<RegisterSummaryRow>(Some(&headers)) {
            Ok(row) => match missing_required_cell(&row) {
                None => {
                    rows.push(row);
                    continue;
                }
                Some(column) => format!("missing required {column:?} cell"),
            },
            Err(e) => e.to_string(),
        };
        diagnostics.push(Diagnostic::MalformedSummaryRow { line, message });
    }
    log::debug!("read {} summary rows from {}", rows.len(), origin.display());

    Ok(SummaryTable {
        rows,
        diagnostics: diagnostics.into_vec(),
    })
}

/// Reads one register's detail table.
pub fn read_field_table(path: &Path) -> RegisterResult<Vec<BitFieldRow>> {
    let file = std::fs::File::open(path).map_err(|e| RegisterError::io(path, e))?;
    read_field_table_from_reader(file, path)
}

/// Reads a detail table. Any unreadable row fails the whole table.
pub fn read_field_table_from_reader<R: Read>(
    reader: R,
    origin: &Path,
) -> RegisterResult<Vec<BitFieldRow>> {
    csv_reader(reader)
        .deserialize::<BitFieldRow>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| RegisterError::MalformedFieldTable {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })
}

/// Source of per-register detail tables.
pub trait DetailTables {
    /// Returns the detail table for the register with the given datasheet
    /// name, or `None` if there is none. Also returns where the table came
    /// from, for error messages.
    fn field_table(&self, name: &str) -> RegisterResult<Option<(PathBuf, Vec<BitFieldRow>)>>;
}

/// Detail tables stored as `<dir>/<normalized name>.csv`.
#[derive(Clone, Debug)]
pub struct DetailDir {
    dir: PathBuf,
}

impl DetailDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Where the detail table for `name` lives, whether or not it exists.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", normalize_name(name)))
    }
}

impl DetailTables for DetailDir {
    fn field_table(&self, name: &str) -> RegisterResult<Option<(PathBuf, Vec<BitFieldRow>)>> {
        let path = self.path_for(name);
        if !path.is_file() {
            return Ok(None);
        }
        let fields = read_field_table(&path)?;
        Ok(Some((path, fields)))
    }
}

/// No detail tables at all; every register is a single word.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDetailTables;

impl DetailTables for NoDetailTables {
    fn field_table(&self, _name: &str) -> RegisterResult<Option<(PathBuf, Vec<BitFieldRow>)>> {
        Ok(None)
    }
}

/// In-memory detail tables keyed by normalized register name.
impl DetailTables for BTreeMap<String, Vec<BitFieldRow>> {
    fn field_table(&self, name: &str) -> RegisterResult<Option<(PathBuf, Vec<BitFieldRow>)>> {
        let key = normalize_name(name);
        Ok(self
            .get(&key)
            .map(|fields| (PathBuf::from(format!("{key}.csv")), fields.clone())))
    }
}
