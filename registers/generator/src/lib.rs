// Licensed under the Apache-2.0 license

//! Register table to MMIO struct code generator.
//!
//! This crate turns a register summary table extracted from a vendor
//! datasheet (plus optional per-register bit-field tables) into a
//! `#[repr(C)]` Rust struct with one field per register and explicit padding
//! for every gap, so that each field sits at its documented offset.
//!
//! ## Usage
//!
//! ```no_run
//! use std::path::Path;
//! use mmio_registers_generator::{
//!     generate_registers_from_files, FilterConfig, GeneratorConfig, ResolutionTable,
//! };
//!
//! let mut resolver = ResolutionTable::from_file(Path::new("expressions.toml")).unwrap();
//! let report = generate_registers_from_files(
//!     Path::new("registers_summary.csv"),
//!     Path::new("register_info"),
//!     &mut resolver,
//!     &GeneratorConfig::with_defaults(),
//!     &FilterConfig::new(),
//! )
//! .unwrap();
//! for diagnostic in &report.diagnostics {
//!     eprintln!("warning: {diagnostic}");
//! }
//! println!("{}", report.code);
//! ```
//!
//! ## Module Organization
//!
//! - [`util`]: Name normalization and hex formatting
//! - [`types`]: Rows of the input tables
//! - [`table`]: CSV reading
//! - [`offset`]: Offset cell parsing and the expression resolver seam
//! - [`width`]: Register width from a bit-field table
//! - [`layout`]: Ordering and padding ([`Layout`])
//! - [`output`]: Rust code emission
//! - [`config`]: Emission and filter configuration
//! - [`diagnostic`]: Non-fatal problems reported with the output
//! - [`error`]: Error types

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod layout;
pub mod offset;
pub mod output;
pub mod table;
pub mod types;
pub mod util;
pub mod width;

mod codegen;

// Re-export main public API
pub use codegen::{
    generate_registers, generate_registers_from_files, resolve_registers, write_atomically,
    GenerationReport,
};
pub use config::{ConfigFile, FilterConfig, GeneratorConfig};
pub use diagnostic::Diagnostic;
pub use error::{RegisterError, RegisterResult, ResolveError};
pub use layout::{FieldKind, Layout, LayoutField, RegisterEntry};
pub use offset::{OffsetExpressionResolver, ResolutionTable, ResolvedOffset, Unresolvable};
pub use table::{DetailDir, DetailTables, NoDetailTables};
pub use types::{Access, BitFieldRow, RegisterSummaryRow};
