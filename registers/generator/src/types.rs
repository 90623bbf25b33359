// Licensed under the Apache-2.0 license

//! Input data structures read from the extracted register tables.
//!
//! Both tables are produced by a best-effort extraction step, so every column
//! except the ones the layout actually depends on is optional and kept as the
//! raw string it was found as.

use serde::Deserialize;
use std::fmt;

/// Software access classification of a register.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "String")]
pub enum Access {
    ReadWrite,
    ReadOnly,
    WriteOnly,
    /// Inaccessible, or anything the table did not classify.
    #[default]
    Reserved,
}

impl Access {
    /// Parses an `RW` cell. Unrecognized values map to [`Access::Reserved`].
    ///
    /// Datasheet tables only document `RW`, `RO`, `WO` and `Reserved`. The
    /// `R/W`, `R` and `W` spellings are accepted as well because extraction
    /// sometimes produces them; they are not part of the table format.
    pub fn from_cell(cell: &str) -> Self {
        match cell.trim().to_ascii_uppercase().as_str() {
            "RW" | "R/W" => Access::ReadWrite,
            "RO" | "R" => Access::ReadOnly,
            "WO" | "W" => Access::WriteOnly,
            _ => Access::Reserved,
        }
    }

    /// The short form used in the summary table.
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Access::ReadWrite => "RW",
            Access::ReadOnly => "RO",
            Access::WriteOnly => "WO",
            Access::Reserved => "RSV",
        }
    }
}

impl From<String> for Access {
    fn from(cell: String) -> Self {
        Access::from_cell(&cell)
    }
}

impl fmt::Display for Access {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

/// One entry of the top-level register summary table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct RegisterSummaryRow {
    /// Literal hex address or a parametric expression.
    #[serde(rename = "Offset")]
    pub offset: String,
    #[serde(rename = "Abbreviation", default)]
    pub abbreviation: String,
    /// Human-readable register name.
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Block", default)]
    pub block: String,
    #[serde(rename = "RW", default)]
    pub access: Access,
    #[serde(rename = "Reset", default)]
    pub reset: String,
    /// Datasheet page holding the register's detail table.
    #[serde(rename = "Page", default)]
    pub page: String,
}

impl RegisterSummaryRow {
    pub fn new(offset: &str, name: &str, access: Access) -> Self {
        Self {
            offset: offset.to_string(),
            name: name.to_string(),
            access,
            ..Default::default()
        }
    }

    /// The datasheet page number, if the cell holds a plain number.
    pub fn page_number(&self) -> Option<u32> {
        let page = self.page.trim();
        if page.is_empty() || !page.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        page.parse().ok()
    }
}

/// One row of a register's detailed bit-field table.
///
/// Only `bit_range` is interpreted; the other columns are carried through.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct BitFieldRow {
    #[serde(rename = "Field", default)]
    pub field: String,
    #[serde(rename = "Bit(s)")]
    pub bit_range: String,
    #[serde(rename = "Init Val", default)]
    pub init_val: String,
    #[serde(rename = "Reserved", default)]
    pub reserved: String,
}

impl BitFieldRow {
    pub fn new(field: &str, bit_range: &str) -> Self {
        Self {
            field: field.to_string(),
            bit_range: bit_range.to_string(),
            ..Default::default()
        }
    }

    pub fn is_reserved(&self) -> bool {
        self.reserved.trim().eq_ignore_ascii_case("true")
    }
}
