// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;

mod registers_gen;
mod registers_status;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Xtask {
    /// Only print warnings and errors
    #[arg(long, short, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Print debug output
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    xtask: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate an MMIO register struct from extracted datasheet tables
    RegistersGen {
        /// Register summary CSV
        #[arg(long, default_value = "registers_summary.csv")]
        summary: PathBuf,

        /// Directory of per-register bit-field CSVs
        #[arg(long, default_value = "register_info")]
        info_dir: PathBuf,

        /// Write the struct here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// TOML table of answers for parametric offset expressions
        #[arg(long)]
        resolutions: Option<PathBuf>,

        /// TOML file with [generator] and [filter] sections
        #[arg(long)]
        config: Option<PathBuf>,

        /// Name of the generated struct
        #[arg(long)]
        struct_name: Option<String>,

        /// Only generate registers in this offset range (START:END, inclusive)
        #[arg(long, value_parser = registers_gen::parse_offset_range)]
        include_range: Vec<(u64, u64)>,

        /// Skip registers in this offset range (START:END, inclusive)
        #[arg(long, value_parser = registers_gen::parse_offset_range)]
        exclude_range: Vec<(u64, u64)>,

        /// Skip the register with this datasheet name
        #[arg(long)]
        exclude_name: Vec<String>,

        /// Exit with an error if any row was skipped or misplaced
        #[arg(long)]
        deny_warnings: bool,
    },
    /// Report which summary rows have bit-field tables and where they are
    /// documented
    RegistersStatus {
        /// Register summary CSV
        #[arg(long, default_value = "registers_summary.csv")]
        summary: PathBuf,

        /// Directory of per-register bit-field CSVs
        #[arg(long, default_value = "register_info")]
        info_dir: PathBuf,
    },
}

fn main() {
    let cli = Xtask::parse();
    let level = if cli.quiet {
        LevelFilter::Warn
    } else if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    if let Err(err) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Failed to initialize logging: {err}");
    }

    let result = match &cli.xtask {
        Commands::RegistersGen {
            summary,
            info_dir,
            output,
            resolutions,
            config,
            struct_name,
            include_range,
            exclude_range,
            exclude_name,
            deny_warnings,
        } => registers_gen::generate(&registers_gen::Args {
            summary,
            info_dir,
            output: output.as_deref(),
            resolutions: resolutions.as_deref(),
            config: config.as_deref(),
            struct_name: struct_name.as_deref(),
            include_ranges: include_range,
            exclude_ranges: exclude_range,
            exclude_names: exclude_name,
            deny_warnings: *deny_warnings,
        }),
        Commands::RegistersStatus { summary, info_dir } => {
            registers_status::status(summary, info_dir)
        }
    };
    result.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        std::process::exit(-1);
    });
}
