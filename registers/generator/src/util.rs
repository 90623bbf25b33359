// Licensed under the Apache-2.0 license

//! Utility functions for name conversion and formatting.
//!
//! Register names coming out of a datasheet are free text ("Extended Interrupt
//! Mask Set/Read Register"). [`normalize_name`] turns them into the stem used
//! for per-register detail files, and [`field_ident`] goes further and
//! produces something that is guaranteed to be a legal Rust field name.

/// Converts a human-readable register name into its normalized form.
///
/// Spaces, slashes and hyphens become underscores and the result is
/// lowercased. Nothing else is touched, so the result is not necessarily a
/// valid identifier; use [`field_ident`] for that.
///
/// This is also the file stem under which a register's detail table is
/// stored, so it must stay in sync with whatever produced those files.
///
/// # Examples
/// ```
/// use mmio_registers_generator::util::normalize_name;
/// assert_eq!(normalize_name("Device Control Register"), "device_control_register");
/// assert_eq!(normalize_name("Mask Set/Read"), "mask_set_read");
/// assert_eq!(normalize_name("MSI-X PBA"), "msi_x_pba");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.replace([' ', '/', '-'], "_").to_lowercase()
}

/// Converts a register name into a legal Rust field identifier.
///
/// Starts from [`normalize_name`] and then:
/// - Maps any remaining non-alphanumeric character to `_`
/// - Collapses runs of underscores and trims trailing ones
/// - Prefixes a leading digit with `_`
/// - Appends `_` to Rust keywords
///
/// An empty result becomes `_unnamed`.
///
/// # Examples
/// ```
/// use mmio_registers_generator::util::field_ident;
/// assert_eq!(field_ident("Device Control Register"), "device_control_register");
/// assert_eq!(field_ident("I2C Control (I2CCTL)"), "i2c_control_i2cctl");
/// assert_eq!(field_ident("1588 Timestamp"), "_1588_timestamp");
/// assert_eq!(field_ident("Type"), "type_");
/// ```
pub fn field_ident(name: &str) -> String {
    let normalized = normalize_name(name);
    let mut result = String::with_capacity(normalized.len() + 1);
    let mut prev = None;
    for c in normalized.chars() {
        let c = if c.is_ascii_alphanumeric() { c } else { '_' };
        if c == '_' && prev == Some('_') {
            continue;
        }
        if prev.is_none() && c.is_ascii_digit() {
            result.push('_');
        }
        result.push(c);
        prev = Some(c);
    }
    let trimmed = result.trim_end_matches('_');
    if trimmed.is_empty() || trimmed.chars().all(|c| c == '_') {
        return "_unnamed".to_string();
    }
    tweak_keywords(trimmed).to_string()
}

/// Appends underscore suffix to Rust keywords to avoid conflicts.
fn tweak_keywords(s: &str) -> &str {
    match s {
        "as" => "as_",
        "break" => "break_",
        "const" => "const_",
        "continue" => "continue_",
        "crate" => "crate_",
        "else" => "else_",
        "enum" => "enum_",
        "extern" => "extern_",
        "false" => "false_",
        "fn" => "fn_",
        "for" => "for_",
        "if" => "if_",
        "impl" => "impl_",
        "in" => "in_",
        "let" => "let_",
        "loop" => "loop_",
        "match" => "match_",
        "mod" => "mod_",
        "move" => "move_",
        "mut" => "mut_",
        "pub" => "pub_",
        "ref" => "ref_",
        "return" => "return_",
        "self" => "self_",
        "static" => "static_",
        "struct" => "struct_",
        "super" => "super_",
        "trait" => "trait_",
        "true" => "true_",
        "type" => "type_",
        "unsafe" => "unsafe_",
        "use" => "use_",
        "where" => "where_",
        "while" => "while_",
        "async" => "async_",
        "await" => "await_",
        "dyn" => "dyn_",
        "abstract" => "abstract_",
        "become" => "become_",
        "box" => "box_",
        "do" => "do_",
        "final" => "final_",
        "macro" => "macro_",
        "override" => "override_",
        "priv" => "priv_",
        "typeof" => "typeof_",
        "unsized" => "unsized_",
        "virtual" => "virtual_",
        "yield" => "yield_",
        "try" => "try_",
        s => s,
    }
}

/// Formats a byte offset the way the emitted comments show it: `0x` followed
/// by upper-case hex digits with no separators.
///
/// # Examples
/// ```
/// use mmio_registers_generator::util::hex_offset;
/// assert_eq!(hex_offset(0), "0x0");
/// assert_eq!(hex_offset(0x110b8), "0x110B8");
/// ```
pub fn hex_offset(val: u64) -> String {
    format!("0x{val:X}")
}

/// Formats an inclusive byte range as `0xSTART - 0xEND`.
pub fn hex_range(start: u64, end: u64) -> String {
    format!("{} - {}", hex_offset(start), hex_offset(end))
}
