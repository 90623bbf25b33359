// Licensed under the Apache-2.0 license

//! Offset cell parsing and resolution.
//!
//! An offset cell is either a plain hex address (`0x1000`) or a parametric
//! expression describing a register array (`0x1000+4*n, n=1..3`). Plain
//! addresses resolve locally. Expressions are never evaluated here; they are
//! handed to an [`OffsetExpressionResolver`] which answers with a declared
//! type that is embedded verbatim in the output.

use crate::error::{RegisterError, RegisterResult, ResolveError};
use crate::types::Access;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A parsed offset cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OffsetCell {
    /// The cell is exactly a hex literal.
    Literal(u64),
    /// The cell starts with a hex literal followed by something else.
    Expression { base: u64, expression: String },
}

impl OffsetCell {
    /// Parses an offset cell.
    ///
    /// Fails with [`RegisterError::MalformedOffset`] if the cell does not
    /// start with `0x` followed by at least one hex digit.
    pub fn parse(cell: &str) -> RegisterResult<Self> {
        let trimmed = cell.trim();
        let (base, rest) = split_hex_prefix(trimmed)
            .ok_or_else(|| RegisterError::MalformedOffset(cell.to_string()))?;
        if rest.is_empty() {
            Ok(OffsetCell::Literal(base))
        } else {
            Ok(OffsetCell::Expression {
                base,
                expression: trimmed.to_string(),
            })
        }
    }

    /// The offset used for ordering.
    pub fn base(&self) -> u64 {
        match self {
            OffsetCell::Literal(base) => *base,
            OffsetCell::Expression { base, .. } => *base,
        }
    }

    /// Resolves the cell. Literals never reach `resolver`; expressions are
    /// passed to it exactly once.
    pub fn resolve(
        self,
        access: Access,
        resolver: &mut dyn OffsetExpressionResolver,
    ) -> RegisterResult<ResolvedOffset> {
        let (base, expression) = match self {
            OffsetCell::Literal(offset) => return Ok(ResolvedOffset::Fixed(offset)),
            OffsetCell::Expression { base, expression } => (base, expression),
        };
        let declared_type = match resolver.resolve(&expression, access) {
            Ok(declared_type) => declared_type.trim().to_string(),
            Err(source) => return Err(RegisterError::ResolutionFailed { expression, source }),
        };
        if declared_type.is_empty() {
            return Err(RegisterError::ResolutionFailed {
                expression,
                source: ResolveError::new("resolver returned an empty type"),
            });
        }
        Ok(ResolvedOffset::Opaque {
            base,
            expression,
            declared_type,
        })
    }
}

/// Splits `0x<hex>` off the front of `s`, returning the value and the rest.
fn split_hex_prefix(s: &str) -> Option<(u64, &str)> {
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X"))?;
    let end = digits
        .find(|c: char| !c.is_ascii_hexdigit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    let value = u64::from_str_radix(&digits[..end], 16).ok()?;
    Some((value, &digits[end..]))
}

/// Extracts the literal hex base of an offset cell.
///
/// # Examples
/// ```
/// use mmio_registers_generator::offset::extract_base_offset;
/// assert_eq!(extract_base_offset("0x1000").unwrap(), 0x1000);
/// assert_eq!(extract_base_offset("0x1000+4*n, n=1..3").unwrap(), 0x1000);
/// assert!(extract_base_offset("garbage").is_err());
/// ```
pub fn extract_base_offset(cell: &str) -> RegisterResult<u64> {
    OffsetCell::parse(cell).map(|c| c.base())
}

/// The result of resolving one offset cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ResolvedOffset {
    /// A concrete byte offset.
    Fixed(u64),
    /// A register array described by an expression. `declared_type` is the
    /// resolver's answer and is emitted verbatim.
    Opaque {
        base: u64,
        expression: String,
        declared_type: String,
    },
}

impl ResolvedOffset {
    pub fn base(&self) -> u64 {
        match self {
            ResolvedOffset::Fixed(offset) => *offset,
            ResolvedOffset::Opaque { base, .. } => *base,
        }
    }
}

/// Translates a parametric offset expression into a declared field type.
///
/// Implementations may be slow or unavailable; they are called at most once
/// per expression row and their failures only drop that row.
pub trait OffsetExpressionResolver {
    fn resolve(&mut self, expression: &str, access: Access) -> Result<String, ResolveError>;
}

impl<F> OffsetExpressionResolver for F
where
    F: FnMut(&str, Access) -> Result<String, ResolveError>,
{
    fn resolve(&mut self, expression: &str, access: Access) -> Result<String, ResolveError> {
        self(expression, access)
    }
}

/// Resolves an offset cell, consulting `resolver` only for expressions.
pub fn resolve_offset(
    cell: &str,
    access: Access,
    resolver: &mut dyn OffsetExpressionResolver,
) -> RegisterResult<ResolvedOffset> {
    OffsetCell::parse(cell)?.resolve(access, resolver)
}

/// A resolver that refuses every expression.
///
/// Used when no resolution table is available; every parametric row is then
/// reported and skipped.
#[derive(Clone, Copy, Debug, Default)]
pub struct Unresolvable;

impl OffsetExpressionResolver for Unresolvable {
    fn resolve(&mut self, expression: &str, _access: Access) -> Result<String, ResolveError> {
        Err(ResolveError::new(format!(
            "no resolver configured for {expression:?}"
        )))
    }
}

/// A fixed expression-to-type table, typically loaded from TOML:
///
/// ```toml
/// [expressions]
/// "0x0600 + 4*n, n=0..0" = "[Volatile<u32>; 1]"
/// "0x0820 + 4*n, n=0..23" = "[Volatile<u32>; 24]"
/// ```
///
/// Keys are matched after trimming surrounding whitespace.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ResolutionTable {
    #[serde(default)]
    expressions: BTreeMap<String, String>,
}

impl ResolutionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping from an expression to its declared type.
    pub fn insert(mut self, expression: &str, declared_type: &str) -> Self {
        self.expressions
            .insert(expression.trim().to_string(), declared_type.to_string());
        self
    }

    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        let table: ResolutionTable = toml::from_str(s)?;
        Ok(Self {
            expressions: table
                .expressions
                .into_iter()
                .map(|(k, v)| (k.trim().to_string(), v))
                .collect(),
        })
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading resolution table {}", path.display()))?;
        Self::from_toml_str(&s)
            .with_context(|| format!("parsing resolution table {}", path.display()))
    }

    pub fn len(&self) -> usize {
        self.expressions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.expressions.is_empty()
    }
}

impl OffsetExpressionResolver for ResolutionTable {
    fn resolve(&mut self, expression: &str, _access: Access) -> Result<String, ResolveError> {
        self.expressions
            .get(expression.trim())
            .cloned()
            .ok_or_else(|| ResolveError::new(format!("no entry for {expression:?}")))
    }
}
