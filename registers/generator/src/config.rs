// Licensed under the Apache-2.0 license

//! Configuration for code emission and filtering during code generation.
//!
//! This module provides [`GeneratorConfig`] which controls the shape of the
//! emitted struct (its name, attributes and the access wrapper types), and
//! [`FilterConfig`] which controls which registers are included or excluded.
//!
//! Both can be built in code with the builder methods or loaded from a TOML
//! file:
//!
//! ```toml
//! [generator]
//! struct_name = "IgbRegisters"
//! public_fields = true
//!
//! [filter]
//! include_offset_ranges = [[0x0, 0x1000]]
//! exclude_names = ["LinkSec SW/FW Interface MNG"]
//! ```

use crate::types::Access;
use crate::util::normalize_name;
use anyhow::Context;
use serde::Deserialize;
use std::path::Path;

/// Configuration for the emitted declaration.
///
/// # Example
///
/// ```
/// use mmio_registers_generator::config::GeneratorConfig;
/// use mmio_registers_generator::types::Access;
///
/// let config = GeneratorConfig::with_defaults();
/// assert_eq!(config.access_type(Access::ReadWrite), "Volatile<u32>");
///
/// let config = GeneratorConfig::with_defaults()
///     .struct_name("Uart")
///     .read_write_type("ReadWrite");
/// assert_eq!(config.access_type(Access::ReadWrite), "ReadWrite<u32>");
/// ```
#[derive(Clone, Debug, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Name of the emitted struct.
    pub struct_name: String,
    /// Derive list placed on the struct, e.g. `FromBytes`. Empty disables it.
    pub derives: Vec<String>,
    /// Contents of the `#[repr(...)]` attribute.
    pub repr: String,
    /// Wrapper for read-write registers.
    pub read_write_type: String,
    /// Wrapper for read-only registers.
    pub read_only_type: String,
    /// Wrapper for write-only registers.
    pub write_only_type: String,
    /// Wrapper for reserved or unclassified registers.
    pub reserved_type: String,
    /// Element type of one register word.
    pub word_type: String,
    /// Prefix of padding field names; a running index is appended.
    pub padding_prefix: String,
    /// Emit fields as `pub`.
    pub public_fields: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl GeneratorConfig {
    /// Create a config producing a `Registers` struct with
    /// `#[derive(FromBytes)]`, `#[repr(C)]` and the `Volatile`/`ReadOnly`/
    /// `WriteOnly`/`Reserved` wrappers around `u32`.
    pub fn with_defaults() -> Self {
        Self {
            struct_name: "Registers".to_string(),
            derives: vec!["FromBytes".to_string()],
            repr: "C".to_string(),
            read_write_type: "Volatile".to_string(),
            read_only_type: "ReadOnly".to_string(),
            write_only_type: "WriteOnly".to_string(),
            reserved_type: "Reserved".to_string(),
            word_type: "u32".to_string(),
            padding_prefix: "_padding".to_string(),
            public_fields: false,
        }
    }

    pub fn struct_name(mut self, name: &str) -> Self {
        self.struct_name = name.to_string();
        self
    }

    pub fn read_write_type(mut self, ty: &str) -> Self {
        self.read_write_type = ty.to_string();
        self
    }

    pub fn public_fields(mut self, public: bool) -> Self {
        self.public_fields = public;
        self
    }

    /// The full field type of one register word with the given access.
    pub fn access_type(&self, access: Access) -> String {
        let wrapper = match access {
            Access::ReadWrite => &self.read_write_type,
            Access::ReadOnly => &self.read_only_type,
            Access::WriteOnly => &self.write_only_type,
            Access::Reserved => &self.reserved_type,
        };
        format!("{wrapper}<{}>", self.word_type)
    }
}

/// Which summary rows take part in generation.
///
/// Rows are matched on their base offset (the leading hex literal, so a
/// parametric row `0x0820 + 4*n` is matched at `0x820`) and on their
/// datasheet name. A name in `exclude_names` may be written either as it
/// appears in the table or in its normalized file-stem form.
///
/// ```
/// use mmio_registers_generator::config::FilterConfig;
///
/// // Only the general block, minus the flash registers
/// let filter = FilterConfig::new()
///     .include_offset_range(0x0, 0xFFF)
///     .exclude_offset_range(0x10, 0x1F)
///     .exclude_name("extended_interrupt_mask_set_read_register");
/// assert!(filter.should_include(0x8, "Device Status Register"));
/// assert!(!filter.should_include(0x14, "EEPROM/Flash Control"));
/// assert!(!filter.should_include(0x880, "Extended Interrupt Mask Set/Read Register"));
/// assert!(!filter.should_include(0x1000, "Flow Control Address Low"));
/// ```
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FilterConfig {
    /// Inclusive base-offset ranges to keep. Empty keeps every offset.
    pub include_offset_ranges: Vec<(u64, u64)>,

    /// Inclusive base-offset ranges to drop; wins over the include ranges.
    pub exclude_offset_ranges: Vec<(u64, u64)>,

    /// Datasheet names to drop, compared after normalization.
    pub exclude_names: Vec<String>,
}

fn in_any(ranges: &[(u64, u64)], offset: u64) -> bool {
    ranges
        .iter()
        .any(|&(start, end)| (start..=end).contains(&offset))
}

impl FilterConfig {
    /// A filter that keeps everything.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn include_offset_range(mut self, start: u64, end: u64) -> Self {
        self.include_offset_ranges.push((start, end));
        self
    }

    pub fn exclude_offset_range(mut self, start: u64, end: u64) -> Self {
        self.exclude_offset_ranges.push((start, end));
        self
    }

    pub fn exclude_name(mut self, name: &str) -> Self {
        self.exclude_names.push(name.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.include_offset_ranges.is_empty()
            && self.exclude_offset_ranges.is_empty()
            && self.exclude_names.is_empty()
    }

    /// Whether the row with base offset `offset` and datasheet name `name`
    /// is generated.
    pub fn should_include(&self, offset: u64, name: &str) -> bool {
        let key = normalize_name(name.trim());
        if self
            .exclude_names
            .iter()
            .any(|n| normalize_name(n.trim()) == key)
        {
            return false;
        }
        if in_any(&self.exclude_offset_ranges, offset) {
            return false;
        }
        self.include_offset_ranges.is_empty() || in_any(&self.include_offset_ranges, offset)
    }
}

/// Both configurations as they appear in a TOML config file.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub generator: GeneratorConfig,
    pub filter: FilterConfig,
}

impl ConfigFile {
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }

    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::from_toml_str(&s).with_context(|| format!("parsing config {}", path.display()))
    }
}
