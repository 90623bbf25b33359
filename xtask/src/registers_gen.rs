// Licensed under the Apache-2.0 license

//! Generate an MMIO register struct from a datasheet's register tables.

use anyhow::{bail, Context, Result};
use mmio_registers_generator::{
    generate_registers_from_files, write_atomically, ConfigFile, OffsetExpressionResolver,
    ResolutionTable, Unresolvable,
};
use std::path::Path;

pub struct Args<'a> {
    pub summary: &'a Path,
    pub info_dir: &'a Path,
    pub output: Option<&'a Path>,
    pub resolutions: Option<&'a Path>,
    pub config: Option<&'a Path>,
    pub struct_name: Option<&'a str>,
    pub include_ranges: &'a [(u64, u64)],
    pub exclude_ranges: &'a [(u64, u64)],
    pub exclude_names: &'a [String],
    pub deny_warnings: bool,
}

/// Parses a `START:END` offset range; both ends are hex with an optional
/// `0x` prefix.
pub fn parse_offset_range(s: &str) -> Result<(u64, u64), String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got {s:?}"))?;
    let start = parse_hex(start)?;
    let end = parse_hex(end)?;
    if start > end {
        return Err(format!("range start 0x{start:X} is after end 0x{end:X}"));
    }
    Ok((start, end))
}

fn parse_hex(s: &str) -> Result<u64, String> {
    let s = s.trim();
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u64::from_str_radix(digits, 16).map_err(|e| format!("bad hex offset {s:?}: {e}"))
}

/// Builds the effective configuration: the config file (if any) first, then
/// the command line on top of it.
fn load_config(args: &Args) -> Result<ConfigFile> {
    let mut config = match args.config {
        Some(path) => ConfigFile::from_file(path)?,
        None => ConfigFile::default(),
    };
    if let Some(name) = args.struct_name {
        config.generator = config.generator.struct_name(name);
    }
    for &(start, end) in args.include_ranges {
        config.filter = config.filter.include_offset_range(start, end);
    }
    for &(start, end) in args.exclude_ranges {
        config.filter = config.filter.exclude_offset_range(start, end);
    }
    for name in args.exclude_names {
        config.filter = config.filter.exclude_name(name);
    }
    Ok(config)
}

/// Generate registers from the summary table and detail directory.
pub fn generate(args: &Args) -> Result<()> {
    log::info!("Generating registers from: {}", args.summary.display());
    let config = load_config(args)?;

    let mut table;
    let mut unresolvable = Unresolvable;
    let resolver: &mut dyn OffsetExpressionResolver = match args.resolutions {
        Some(path) => {
            table = ResolutionTable::from_file(path)?;
            log::info!("Loaded {} offset resolutions", table.len());
            &mut table
        }
        None => &mut unresolvable,
    };

    let report = generate_registers_from_files(
        args.summary,
        args.info_dir,
        resolver,
        &config.generator,
        &config.filter,
    )
    .with_context(|| format!("generating registers from {}", args.summary.display()))?;

    if !report.diagnostics.is_empty() {
        log::warn!("{} rows need attention", report.diagnostics.len());
        if args.deny_warnings {
            bail!("{} diagnostics with --deny-warnings", report.diagnostics.len());
        }
    }

    if let Some(output_path) = args.output {
        write_atomically(output_path, &report.code)?;
        log::info!("Output written to: {}", output_path.display());
    } else {
        print!("{}", report.code);
    }

    Ok(())
}
