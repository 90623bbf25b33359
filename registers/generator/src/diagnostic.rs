// Licensed under the Apache-2.0 license

//! Non-fatal problems found while generating a layout.
//!
//! Every diagnostic is logged at `warn` level when it is recorded and is also
//! returned to the caller in the generation report.

use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// A summary table row could not be read.
    MalformedSummaryRow { line: u64, message: String },
    /// A register row was dropped because its offset could not be resolved.
    SkippedRow {
        name: String,
        offset: String,
        reason: String,
    },
    /// A register starts before the previous register ends. Usually a
    /// duplicated row in the extracted table.
    Overlap {
        name: String,
        offset: u64,
        previous: String,
        previous_end: u64,
    },
    /// Two registers mapped to the same identifier; the later one was renamed.
    DuplicateIdent {
        name: String,
        ident: String,
        renamed: String,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedSummaryRow { line, message } => {
                write!(f, "skipping summary row on line {line}: {message}")
            }
            Diagnostic::SkippedRow {
                name,
                offset,
                reason,
            } => write!(f, "skipping {name:?} at offset {offset:?}: {reason}"),
            Diagnostic::Overlap {
                name,
                offset,
                previous,
                previous_end,
            } => write!(
                f,
                "{name:?} at 0x{offset:X} overlaps {previous:?} which ends at 0x{previous_end:X}; \
                 possible duplicate row"
            ),
            Diagnostic::DuplicateIdent {
                name,
                ident,
                renamed,
            } => write!(
                f,
                "{name:?} maps to field `{ident}` which is already taken; emitting `{renamed}`"
            ),
        }
    }
}

/// Collects diagnostics, logging each one as it arrives.
#[derive(Clone, Debug, Default)]
pub(crate) struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub(crate) fn push(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
        self.0.push(diagnostic);
    }

    pub(crate) fn into_vec(self) -> Vec<Diagnostic> {
        self.0
    }
}
