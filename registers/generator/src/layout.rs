// Licensed under the Apache-2.0 license

//! Layout synthesis: turning resolved registers into an ordered, padded
//! sequence of struct fields.
//!
//! ```text
//! RegisterEntry[] ──sort by base offset──► walk with a Cursor
//!                                          ├── Fixed  → [Padding] + Data
//!                                          └── Opaque → Opaque (cursor becomes a hole)
//! ```
//!
//! Padding is only computed between two registers whose offsets are both
//! known. An opaque register array has no size we can trust, so after one
//! the cursor is a [`Cursor::Hole`] and the next fixed register starts a new
//! run without padding in front of it.

use crate::config::GeneratorConfig;
use crate::diagnostic::{Diagnostic, Diagnostics};
use crate::offset::ResolvedOffset;
use crate::types::Access;
use crate::util::field_ident;
use crate::width::WORD_BYTES;
use std::collections::HashSet;

/// One register ready for layout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisterEntry {
    /// Datasheet name, kept for documentation.
    pub name: String,
    pub access: Access,
    pub offset: ResolvedOffset,
    /// Byte width from the register's detail table. `Some` means a detail
    /// table exists and the register is emitted as an array of words, even
    /// when the width is a single word.
    pub detail_width: Option<u64>,
}

impl RegisterEntry {
    pub fn new(name: &str, access: Access, offset: ResolvedOffset) -> Self {
        Self {
            name: name.to_string(),
            access,
            offset,
            detail_width: None,
        }
    }

    pub fn with_detail_width(mut self, width: u64) -> Self {
        self.detail_width = Some(width);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// A register. `element_count` is `None` for a scalar word and
    /// `Some(n)` for an array of `n` words.
    Data {
        access: Access,
        element_count: Option<u64>,
    },
    /// Unused bytes between two registers.
    Padding { bytes: u64 },
    /// A register array whose type came from the expression resolver.
    Opaque {
        declared_type: String,
        expression: String,
    },
}

/// One member of the emitted struct.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LayoutField {
    pub ident: String,
    pub kind: FieldKind,
    /// Absolute byte offset; `None` for opaque fields.
    pub byte_offset: Option<u64>,
    /// Datasheet name; `None` for padding.
    pub source_name: Option<String>,
}

impl LayoutField {
    /// Size in bytes, if known.
    pub fn byte_len(&self) -> Option<u64> {
        match &self.kind {
            FieldKind::Data { element_count, .. } => {
                element_count.unwrap_or(1).checked_mul(WORD_BYTES)
            }
            FieldKind::Padding { bytes } => Some(*bytes),
            FieldKind::Opaque { .. } => None,
        }
    }

    /// Inclusive byte range, if the field has a known offset and size and
    /// fits in the address space.
    pub fn byte_range(&self) -> Option<(u64, u64)> {
        let start = self.byte_offset?;
        let len = self.byte_len()?;
        Some((start, start.checked_add(len.checked_sub(1)?)?))
    }

    pub fn is_padding(&self) -> bool {
        matches!(self.kind, FieldKind::Padding { .. })
    }
}

/// The ordered field sequence of the emitted struct.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout {
    pub fields: Vec<LayoutField>,
}

/// Where the previous register left off.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Cursor {
    /// Nothing placed yet.
    Start,
    /// The last register had a known offset and size. `end` is exclusive
    /// and may lie one past the address space.
    After { name: String, end: u128 },
    /// The last register was opaque; the next offset cannot be checked
    /// against it.
    Hole,
}

impl Layout {
    /// Builds the layout for `entries`.
    ///
    /// Entries are ordered by base offset; entries with equal bases keep
    /// their input order. Overlapping registers are kept and reported.
    pub fn synthesize(
        entries: &[RegisterEntry],
        config: &GeneratorConfig,
    ) -> (Layout, Vec<Diagnostic>) {
        let mut synth = Synthesizer::new(config);
        synth.run(entries);
        (synth.layout, synth.diagnostics.into_vec())
    }

    pub fn iter(&self) -> impl Iterator<Item = &LayoutField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The fields that carry a register (data and opaque).
    pub fn registers(&self) -> impl Iterator<Item = &LayoutField> {
        self.fields.iter().filter(|f| !f.is_padding())
    }

    /// The fields with a known byte range, in layout order.
    pub fn spans(&self) -> impl Iterator<Item = (&LayoutField, (u64, u64))> {
        self.fields
            .iter()
            .filter_map(|f| f.byte_range().map(|range| (f, range)))
    }
}

struct Synthesizer<'a> {
    config: &'a GeneratorConfig,
    layout: Layout,
    diagnostics: Diagnostics,
    cursor: Cursor,
    used_idents: HashSet<String>,
    padding_count: usize,
}

impl<'a> Synthesizer<'a> {
    fn new(config: &'a GeneratorConfig) -> Self {
        Self {
            config,
            layout: Layout::default(),
            diagnostics: Diagnostics::default(),
            cursor: Cursor::Start,
            used_idents: HashSet::new(),
            padding_count: 0,
        }
    }

    fn run(&mut self, entries: &[RegisterEntry]) {
        // Stable, so equal bases keep their table order
        let mut sorted: Vec<&RegisterEntry> = entries.iter().collect();
        sorted.sort_by_key(|e| e.offset.base());

        for entry in sorted {
            match &entry.offset {
                ResolvedOffset::Fixed(offset) => self.place_fixed(entry, *offset),
                ResolvedOffset::Opaque {
                    expression,
                    declared_type,
                    ..
                } => self.place_opaque(entry, expression, declared_type),
            }
        }
    }

    fn place_fixed(&mut self, entry: &RegisterEntry, offset: u64) {
        if let Cursor::After { name, end } = &self.cursor {
            let (start, end) = (u128::from(offset), *end);
            if start > end {
                // end < offset, so both fit in u64
                self.push_padding(end as u64, (start - end) as u64);
            } else if start < end {
                self.diagnostics.push(Diagnostic::Overlap {
                    name: entry.name.clone(),
                    offset,
                    previous: name.clone(),
                    previous_end: u64::try_from(end).unwrap_or(u64::MAX),
                });
            }
        }

        let element_count = entry
            .detail_width
            .map(|width| width.div_ceil(WORD_BYTES).max(1));
        let len = element_count.unwrap_or(1).saturating_mul(WORD_BYTES);
        let ident = self.claim_ident(&entry.name);
        self.layout.fields.push(LayoutField {
            ident,
            kind: FieldKind::Data {
                access: entry.access,
                element_count,
            },
            byte_offset: Some(offset),
            source_name: Some(entry.name.clone()),
        });
        self.cursor = Cursor::After {
            name: entry.name.clone(),
            end: u128::from(offset) + u128::from(len),
        };
    }

    fn place_opaque(&mut self, entry: &RegisterEntry, expression: &str, declared_type: &str) {
        let ident = self.claim_ident(&entry.name);
        self.layout.fields.push(LayoutField {
            ident,
            kind: FieldKind::Opaque {
                declared_type: declared_type.to_string(),
                expression: expression.to_string(),
            },
            byte_offset: None,
            source_name: Some(entry.name.clone()),
        });
        self.cursor = Cursor::Hole;
    }

    fn push_padding(&mut self, start: u64, bytes: u64) {
        let ident = loop {
            let candidate = format!("{}{}", self.config.padding_prefix, self.padding_count);
            self.padding_count += 1;
            if self.used_idents.insert(candidate.clone()) {
                break candidate;
            }
        };
        self.layout.fields.push(LayoutField {
            ident,
            kind: FieldKind::Padding { bytes },
            byte_offset: Some(start),
            source_name: None,
        });
    }

    /// Returns a unique identifier for `name`, suffixing `_1`, `_2`, ... on
    /// collisions.
    fn claim_ident(&mut self, name: &str) -> String {
        let ident = field_ident(name);
        if self.used_idents.insert(ident.clone()) {
            return ident;
        }
        let renamed = (1..)
            .map(|n| format!("{ident}_{n}"))
            .find(|candidate| !self.used_idents.contains(candidate))
            .unwrap_or_else(|| ident.clone());
        self.used_idents.insert(renamed.clone());
        self.diagnostics.push(Diagnostic::DuplicateIdent {
            name: name.to_string(),
            ident,
            renamed: renamed.clone(),
        });
        renamed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::offset::extract_base_offset;

    fn fixed(name: &str, offset: u64, access: Access) -> RegisterEntry {
        RegisterEntry::new(name, access, ResolvedOffset::Fixed(offset))
    }

    fn opaque(name: &str, base: u64, declared_type: &str) -> RegisterEntry {
        RegisterEntry::new(
            name,
            Access::ReadWrite,
            ResolvedOffset::Opaque {
                base,
                expression: format!("0x{base:X} + 4*n"),
                declared_type: declared_type.to_string(),
            },
        )
    }

    fn synth(entries: &[RegisterEntry]) -> (Layout, Vec<Diagnostic>) {
        Layout::synthesize(entries, &GeneratorConfig::with_defaults())
    }

    fn numeric_offsets(layout: &Layout) -> Vec<u64> {
        layout
            .iter()
            .filter(|f| matches!(f.kind, FieldKind::Data { .. }))
            .filter_map(|f| f.byte_offset)
            .collect()
    }

    #[test]
    fn test_two_registers_with_gap() {
        let (layout, diags) = synth(&[
            fixed("A", 0x0, Access::ReadWrite),
            fixed("B", 0x8, Access::ReadOnly),
        ]);
        assert!(diags.is_empty());
        assert_eq!(
            layout.fields,
            vec![
                LayoutField {
                    ident: "a".into(),
                    kind: FieldKind::Data {
                        access: Access::ReadWrite,
                        element_count: None,
                    },
                    byte_offset: Some(0x0),
                    source_name: Some("A".into()),
                },
                LayoutField {
                    ident: "_padding0".into(),
                    kind: FieldKind::Padding { bytes: 4 },
                    byte_offset: Some(0x4),
                    source_name: None,
                },
                LayoutField {
                    ident: "b".into(),
                    kind: FieldKind::Data {
                        access: Access::ReadOnly,
                        element_count: None,
                    },
                    byte_offset: Some(0x8),
                    source_name: Some("B".into()),
                },
            ]
        );
        assert_eq!(layout.fields[1].byte_range(), Some((0x4, 0x7)));
    }

    #[test]
    fn test_contiguous_registers_have_no_padding() {
        let (layout, _) = synth(&[
            fixed("A", 0x10, Access::ReadWrite),
            fixed("B", 0x14, Access::ReadWrite),
            fixed("C", 0x18, Access::ReadWrite),
        ]);
        assert_eq!(layout.len(), 3);
        assert!(!layout.iter().any(|f| f.is_padding()));
    }

    #[test]
    fn test_sorting_any_permutation() {
        let base = [
            fixed("A", 0x0, Access::ReadWrite),
            fixed("B", 0x40, Access::ReadOnly),
            fixed("C", 0x8, Access::WriteOnly),
            fixed("D", 0x100, Access::Reserved),
        ];
        let expected = synth(&base).0;
        assert_eq!(numeric_offsets(&expected), vec![0x0, 0x8, 0x40, 0x100]);

        // Every rotation and its reverse produces the same layout
        for rot in 0..base.len() {
            let mut entries = base.to_vec();
            entries.rotate_left(rot);
            assert_eq!(synth(&entries).0, expected);
            entries.reverse();
            assert_eq!(synth(&entries).0, expected);
        }
    }

    #[test]
    fn test_padding_sizes() {
        let (layout, _) = synth(&[
            fixed("A", 0x0, Access::ReadWrite),
            fixed("B", 0x8, Access::ReadWrite),
            fixed("C", 0x18, Access::ReadWrite),
            fixed("D", 0x200, Access::ReadWrite),
        ]);
        let padding: Vec<_> = layout
            .iter()
            .filter(|f| f.is_padding())
            .map(|f| (f.ident.as_str(), f.byte_range().unwrap()))
            .collect();
        assert_eq!(
            padding,
            vec![
                ("_padding0", (0x4, 0x7)),
                ("_padding1", (0xC, 0x17)),
                ("_padding2", (0x1C, 0x1FF)),
            ]
        );
    }

    #[test]
    fn test_spans_cover_every_byte() {
        let (layout, _) = synth(&[
            fixed("A", 0x0, Access::ReadWrite),
            fixed("B", 0x8, Access::ReadWrite).with_detail_width(8),
            fixed("C", 0x30, Access::ReadWrite),
        ]);
        let mut next = 0;
        for (_, (start, end)) in layout.spans() {
            assert_eq!(start, next);
            next = end + 1;
        }
        assert_eq!(next, 0x34);
    }

    #[test]
    fn test_detail_width_makes_array() {
        let (layout, _) = synth(&[
            fixed("Single", 0x0, Access::ReadWrite).with_detail_width(4),
            fixed("Wide", 0x4, Access::ReadOnly).with_detail_width(12),
            fixed("Next", 0x10, Access::ReadWrite),
        ]);
        assert_eq!(
            layout.fields[0].kind,
            FieldKind::Data {
                access: Access::ReadWrite,
                element_count: Some(1),
            }
        );
        assert_eq!(
            layout.fields[1].kind,
            FieldKind::Data {
                access: Access::ReadOnly,
                element_count: Some(3),
            }
        );
        // The wide register ends exactly where Next starts
        assert_eq!(layout.len(), 3);
    }

    #[test]
    fn test_padding_after_wide_register() {
        let (layout, _) = synth(&[
            fixed("Wide", 0x0, Access::ReadWrite).with_detail_width(8),
            fixed("Next", 0x10, Access::ReadWrite),
        ]);
        assert_eq!(layout.fields[1].kind, FieldKind::Padding { bytes: 8 });
        assert_eq!(layout.fields[1].byte_range(), Some((0x8, 0xF)));
    }

    #[test]
    fn test_opaque_breaks_padding() {
        let (layout, diags) = synth(&[
            fixed("A", 0x600, Access::Reserved),
            opaque("Clear", 0x600, "[Volatile<u32>; 1]"),
            opaque("Causes", 0x700, "[Volatile<u32>; 4]"),
            fixed("B", 0x800, Access::Reserved),
            fixed("C", 0x808, Access::WriteOnly),
        ]);
        assert!(diags.is_empty());
        let idents: Vec<_> = layout.iter().map(|f| f.ident.as_str()).collect();
        // No padding around the opaque fields; padding resumes between B and C
        assert_eq!(idents, vec!["a", "clear", "causes", "b", "_padding0", "c"]);
        assert_eq!(layout.fields[1].byte_offset, None);
        assert_eq!(
            layout.fields[1].kind,
            FieldKind::Opaque {
                declared_type: "[Volatile<u32>; 1]".into(),
                expression: "0x600 + 4*n".into(),
            }
        );
    }

    #[test]
    fn test_duplicate_offsets_are_kept_and_reported() {
        let (layout, diags) = synth(&[
            fixed("FC CRC Error Count", 0x241C, Access::Reserved),
            fixed("FCoE Rx Packets Dropped Count", 0x241C, Access::Reserved),
            fixed("Next", 0x2424, Access::ReadWrite),
        ]);
        let idents: Vec<_> = layout.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(
            idents,
            vec![
                "fc_crc_error_count",
                "fcoe_rx_packets_dropped_count",
                "_padding0",
                "next"
            ]
        );
        assert_eq!(diags.len(), 1);
        assert!(matches!(
            &diags[0],
            Diagnostic::Overlap { offset: 0x241C, previous_end: 0x2420, .. }
        ));
    }

    #[test]
    fn test_duplicate_names_get_suffix() {
        let (layout, diags) = synth(&[
            fixed("Extended Interrupt Throttle", 0x820, Access::ReadWrite),
            fixed("Extended Interrupt Throttle", 0x1000, Access::ReadWrite),
            fixed("Extended-Interrupt Throttle", 0x1004, Access::ReadWrite),
        ]);
        let idents: Vec<_> = layout.registers().map(|f| f.ident.as_str()).collect();
        assert_eq!(
            idents,
            vec![
                "extended_interrupt_throttle",
                "extended_interrupt_throttle_1",
                "extended_interrupt_throttle_2"
            ]
        );
        assert_eq!(diags.len(), 2);
    }

    #[test]
    fn test_padding_name_does_not_collide() {
        let (layout, diags) = synth(&[
            fixed("_padding0", 0x0, Access::ReadWrite),
            fixed("B", 0x8, Access::ReadWrite),
        ]);
        let idents: Vec<_> = layout.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, vec!["_padding0", "_padding1", "b"]);
        assert!(diags.is_empty());
    }

    /// Rebuilds the entries a layout was made from, in layout order.
    fn entries_from(layout: &Layout) -> Vec<RegisterEntry> {
        layout
            .registers()
            .map(|f| {
                let name = f.source_name.clone().unwrap();
                match &f.kind {
                    FieldKind::Data {
                        access,
                        element_count,
                    } => {
                        let entry = RegisterEntry::new(
                            &name,
                            *access,
                            ResolvedOffset::Fixed(f.byte_offset.unwrap()),
                        );
                        match element_count {
                            Some(n) => entry.with_detail_width(n * WORD_BYTES),
                            None => entry,
                        }
                    }
                    FieldKind::Opaque {
                        declared_type,
                        expression,
                    } => RegisterEntry::new(
                        &name,
                        Access::ReadWrite,
                        ResolvedOffset::Opaque {
                            base: extract_base_offset(expression).unwrap(),
                            expression: expression.clone(),
                            declared_type: declared_type.clone(),
                        },
                    ),
                    FieldKind::Padding { .. } => unreachable!(),
                }
            })
            .collect()
    }

    #[test]
    fn test_resynthesizing_sorted_layout_is_identical() {
        let config = GeneratorConfig::with_defaults();
        let entries = vec![
            fixed("C", 0x40, Access::WriteOnly),
            opaque("Arr", 0x4, "[Volatile<u32>; 2]"),
            fixed("A", 0x0, Access::ReadWrite),
            fixed("B", 0x20, Access::ReadOnly).with_detail_width(8),
            fixed("B Alias", 0x20, Access::ReadOnly),
            fixed("A", 0x100, Access::Reserved),
        ];
        let (first, first_diags) = Layout::synthesize(&entries, &config);

        let sorted = entries_from(&first);
        assert_eq!(sorted.len(), entries.len());
        let (second, second_diags) = Layout::synthesize(&sorted, &config);
        assert_eq!(second, first);
        assert_eq!(second_diags, first_diags);
        assert_eq!(second.generate_code(&config), first.generate_code(&config));

        // And again from the re-synthesized layout
        let (third, _) = Layout::synthesize(&entries_from(&second), &config);
        assert_eq!(third, first);
    }

    #[test]
    fn test_empty() {
        let (layout, diags) = synth(&[]);
        assert!(layout.is_empty());
        assert!(diags.is_empty());
    }
}
