// Licensed under the Apache-2.0 license

//! Tests for the code generator.

mod test {
    use super::super::*;
    use crate::error::ResolveError;
    use crate::layout::FieldKind;
    use crate::offset::{ResolutionTable, Unresolvable};
    use crate::table::NoDetailTables;
    use crate::types::{Access, BitFieldRow};
    use std::collections::BTreeMap;

    fn row(offset: &str, name: &str, access: Access) -> RegisterSummaryRow {
        RegisterSummaryRow::new(offset, name, access)
    }

    fn generate(
        rows: &[RegisterSummaryRow],
        details: &dyn DetailTables,
        resolver: &mut dyn OffsetExpressionResolver,
    ) -> GenerationReport {
        generate_registers(
            rows,
            details,
            resolver,
            &GeneratorConfig::with_defaults(),
            &FilterConfig::new(),
        )
        .unwrap()
    }

    #[test]
    fn test_end_to_end_scalar() {
        let report = generate(
            &[
                row("0x0", "A", Access::ReadWrite),
                row("0x8", "B", Access::ReadOnly),
            ],
            &NoDetailTables,
            &mut Unresolvable,
        );
        assert!(report.diagnostics.is_empty());
        assert_eq!(
            report.code,
            "#[derive(FromBytes)]
#[repr(C)]
pub struct Registers {
    /// A
    a: Volatile<u32>, // 0x0
    _padding0: [u8; 4], // 0x4 - 0x7

    /// B
    b: ReadOnly<u32>, // 0x8
}
"
        );
    }

    /// A datasheet excerpt with unsorted rows, an expression row, a
    /// detail table and a duplicated offset.
    #[test]
    fn test_realistic_table() {
        let rows = [
            row("0x00008", "Device Status Register", Access::ReadOnly),
            row("0x00000", "Device Control Register", Access::ReadWrite),
            row("0x00600", "PF VFLR Events Indication", Access::Reserved),
            row("0x00700 + 4*n, n=0..3", "PF Mailbox Interrupt Causes", Access::ReadWrite),
            row("0x00800", "Extended Interrupt Cause Register", Access::Reserved),
            row("0x00808", "Extended Interrupt Cause Set Register", Access::WriteOnly),
            row("0x00808", "Extended Interrupt Cause Alias", Access::WriteOnly),
        ];
        let mut details = BTreeMap::new();
        details.insert(
            "extended_interrupt_cause_set_register".to_string(),
            vec![
                BitFieldRow::new("RTXQ", "15:0"),
                BitFieldRow::new("OTHER", "39:32"),
            ],
        );
        let mut resolver = ResolutionTable::new()
            .insert("0x00700 + 4*n, n=0..3", "[Volatile<u32>; 4]");

        let report = generate(&rows, &details, &mut resolver);
        assert_eq!(
            report.code,
            "#[derive(FromBytes)]
#[repr(C)]
pub struct Registers {
    /// Device Control Register
    device_control_register: Volatile<u32>, // 0x0
    _padding0: [u8; 4], // 0x4 - 0x7

    /// Device Status Register
    device_status_register: ReadOnly<u32>, // 0x8
    _padding1: [u8; 1524], // 0xC - 0x5FF

    /// PF VFLR Events Indication
    pf_vflr_events_indication: Reserved<u32>, // 0x600
    /// PF Mailbox Interrupt Causes
    pf_mailbox_interrupt_causes: [Volatile<u32>; 4], // 0x00700 + 4*n, n=0..3
    /// Extended Interrupt Cause Register
    extended_interrupt_cause_register: Reserved<u32>, // 0x800
    _padding2: [u8; 4], // 0x804 - 0x807

    /// Extended Interrupt Cause Set Register
    extended_interrupt_cause_set_register: [WriteOnly<u32>; 2], // 0x808 - 0x80F
    /// Extended Interrupt Cause Alias
    extended_interrupt_cause_alias: WriteOnly<u32>, // 0x808
}
"
        );
        assert_eq!(report.diagnostics.len(), 1);
        assert!(matches!(
            &report.diagnostics[0],
            Diagnostic::Overlap { offset: 0x808, previous_end: 0x810, .. }
        ));
    }

    #[test]
    fn test_malformed_offset_skips_row() {
        let report = generate(
            &[
                row("0x0", "A", Access::ReadWrite),
                row("garbage", "Broken", Access::ReadWrite),
                row("0x4", "B", Access::ReadWrite),
            ],
            &NoDetailTables,
            &mut Unresolvable,
        );
        let idents: Vec<_> = report.layout.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, vec!["a", "b"]);
        assert_eq!(report.diagnostics.len(), 1);
        match &report.diagnostics[0] {
            Diagnostic::SkippedRow { name, offset, .. } => {
                assert_eq!(name, "Broken");
                assert_eq!(offset, "garbage");
            }
            other => panic!("unexpected diagnostic {other:?}"),
        }
    }

    #[test]
    fn test_resolution_failure_skips_row() {
        let report = generate(
            &[
                row("0x0", "A", Access::ReadWrite),
                row("0x10+4*n, n=0..1", "Array", Access::ReadWrite),
                row("0x20", "B", Access::ReadWrite),
            ],
            &NoDetailTables,
            &mut Unresolvable,
        );
        let idents: Vec<_> = report.layout.iter().map(|f| f.ident.as_str()).collect();
        // With the array gone, padding spans straight from A to B
        assert_eq!(idents, vec!["a", "_padding0", "b"]);
        assert!(matches!(
            &report.diagnostics[..],
            [Diagnostic::SkippedRow { .. }]
        ));
    }

    #[test]
    fn test_resolver_called_once_per_expression_row() {
        let mut calls = Vec::new();
        let mut resolver = |expr: &str, access: Access| -> Result<String, ResolveError> {
            calls.push(expr.to_string());
            Ok(format!("[{}<u32>; 2]", access))
        };
        let report = generate(
            &[
                row("0x0", "A", Access::ReadWrite),
                row("0x4+4*n", "X", Access::ReadOnly),
                row("0x4+4*n", "Y", Access::WriteOnly),
            ],
            &NoDetailTables,
            &mut resolver,
        );
        assert_eq!(calls, vec!["0x4+4*n", "0x4+4*n"]);
        let kinds: Vec<_> = report.layout.iter().map(|f| &f.kind).collect();
        assert!(matches!(kinds[1], FieldKind::Opaque { declared_type, .. } if declared_type == "[RO<u32>; 2]"));
        assert!(matches!(kinds[2], FieldKind::Opaque { declared_type, .. } if declared_type == "[WO<u32>; 2]"));
    }

    #[test]
    fn test_filter_skips_resolution() {
        let mut calls = 0;
        let mut resolver = |_: &str, _: Access| -> Result<String, ResolveError> {
            calls += 1;
            Ok("[u32; 1]".to_string())
        };
        let report = generate_registers(
            &[
                row("0x0", "A", Access::ReadWrite),
                row("0x2000+4*n", "Far Array", Access::ReadWrite),
                row("0x4", "Debug", Access::ReadWrite),
            ],
            &NoDetailTables,
            &mut resolver,
            &GeneratorConfig::with_defaults(),
            &FilterConfig::new()
                .include_offset_range(0x0, 0xFFF)
                .exclude_name("debug"),
        )
        .unwrap();
        assert_eq!(calls, 0);
        let idents: Vec<_> = report.layout.iter().map(|f| f.ident.as_str()).collect();
        assert_eq!(idents, vec!["a"]);
    }

    #[test]
    fn test_empty_detail_table_is_single_word_array() {
        let mut details = BTreeMap::new();
        details.insert("a".to_string(), Vec::new());
        let report = generate(
            &[row("0x0", "A", Access::ReadWrite)],
            &details,
            &mut Unresolvable,
        );
        assert!(report.code.contains("    a: [Volatile<u32>; 1], // 0x0 - 0x3\n"));
    }

    #[test]
    fn test_malformed_detail_table_is_an_error() {
        let mut details = BTreeMap::new();
        details.insert("a".to_string(), vec![BitFieldRow::new("EN", "n/a")]);
        let err = generate_registers(
            &[row("0x0", "A", Access::ReadWrite)],
            &details,
            &mut Unresolvable,
            &GeneratorConfig::with_defaults(),
            &FilterConfig::new(),
        )
        .unwrap_err();
        match err {
            RegisterError::MalformedFieldTable { path, .. } => {
                assert_eq!(path, std::path::PathBuf::from("a.csv"))
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_regenerate_is_identical() {
        let rows = [
            row("0x40", "C", Access::WriteOnly),
            row("0x0", "A", Access::ReadWrite),
            row("0x10", "B", Access::ReadOnly),
        ];
        let first = generate(&rows, &NoDetailTables, &mut Unresolvable);
        let second = generate(&rows, &NoDetailTables, &mut Unresolvable);
        assert_eq!(first.code, second.code);
        assert_eq!(first.layout, second.layout);
    }

    #[test]
    fn test_write_atomically() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("regs.rs");
        write_atomically(&path, "first").unwrap();
        write_atomically(&path, "second").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        // No temporary files left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
