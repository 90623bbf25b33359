// Licensed under the Apache-2.0 license

//! Rust code generation for a synthesized [`Layout`].
//!
//! ## Generated Code Structure
//!
//! With the default [`GeneratorConfig`] the output looks like:
//!
//! ```text
//! #[derive(FromBytes)]
//! #[repr(C)]
//! pub struct Registers {
//!     /// Device Control Register
//!     device_control_register: Volatile<u32>, // 0x0
//!     _padding0: [u8; 4], // 0x4 - 0x7
//!
//!     /// Device Status Register
//!     device_status_register: ReadOnly<u32>, // 0x8
//!     /// Extended Interrupt Throttle
//!     extended_interrupt_throttle: [Volatile<u32>; 24], // 0x820 + 4*n, n=0..23
//! }
//! ```
//!
//! Data fields carry their datasheet name as a doc comment and their offset
//! (or byte range, for arrays) as a trailing comment. Padding fields carry
//! the byte range they cover and are followed by a blank line.

use crate::config::GeneratorConfig;
use crate::layout::{FieldKind, Layout, LayoutField};
use crate::util::{hex_offset, hex_range};
use std::fmt::Write;

impl Layout {
    /// Generate the struct declaration for this layout.
    pub fn generate_code(&self, config: &GeneratorConfig) -> String {
        let mut output = String::new();

        if !config.derives.is_empty() {
            writeln!(output, "#[derive({})]", config.derives.join(", ")).unwrap();
        }
        if !config.repr.is_empty() {
            writeln!(output, "#[repr({})]", config.repr).unwrap();
        }
        writeln!(output, "pub struct {} {{", config.struct_name).unwrap();

        let vis = if config.public_fields { "pub " } else { "" };
        for field in &self.fields {
            generate_field(&mut output, field, vis, config);
        }

        writeln!(output, "}}").unwrap();
        output
    }
}

fn generate_field(output: &mut String, field: &LayoutField, vis: &str, config: &GeneratorConfig) {
    let ident = &field.ident;
    match &field.kind {
        FieldKind::Padding { bytes } => {
            let range = field
                .byte_range()
                .map(|(start, end)| format!(" // {}", hex_range(start, end)))
                .unwrap_or_default();
            writeln!(output, "    {ident}: [u8; {bytes}],{range}").unwrap();
            writeln!(output).unwrap();
        }
        FieldKind::Data {
            access,
            element_count,
        } => {
            doc_comment(output, field);
            let word = config.access_type(*access);
            let ty = match element_count {
                Some(count) => format!("[{word}; {count}]"),
                None => word,
            };
            let range = match element_count {
                Some(_) => field.byte_range().map(|(start, end)| hex_range(start, end)),
                None => None,
            };
            let location = range
                .or_else(|| field.byte_offset.map(hex_offset))
                .unwrap_or_default();
            writeln!(output, "    {vis}{ident}: {ty}, // {location}").unwrap();
        }
        FieldKind::Opaque {
            declared_type,
            expression,
        } => {
            doc_comment(output, field);
            let expression = single_line(expression);
            writeln!(output, "    {vis}{ident}: {declared_type}, // {expression}").unwrap();
        }
    }
}

fn doc_comment(output: &mut String, field: &LayoutField) {
    if let Some(name) = &field.source_name {
        for line in name.lines().map(str::trim).filter(|l| !l.is_empty()) {
            writeln!(output, "    /// {line}").unwrap();
        }
    }
}

fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
