//! Command-line interface for nc-compare
//!
//! # Usage Examples
//!
//! ```bash
//! # Structural comparison of two netCDF files
//! nc-compare observations_a.nc observations_b.nc
//!
//! # Show only the differing rows, including chunk sizes and attributes
//! nc-compare a.nc4 b.nc4 --only-diffs --show-chunks --show-attributes
//!
//! # Sample random values of one variable within a group
//! nc-compare a.nc b.nc -g science_data -v longitude
//!
//! # Save the comparison as text, CSV, and an Excel workbook
//! nc-compare a.h5 b.h5 --file-text report.txt --file-csv report.csv \
//!   --file-xlsx report.xlsx
//! ```
//!
//! The exit status is the number of differences found (clamped to 255);
//! zero means the files compared clean.

use clap::Parser;

use nc_compare::CompareOpts;

#[derive(Parser)]
#[command(
    name = "nc-compare",
    version,
    about = "Structurally compare two netCDF or HDF5 files"
)]
struct Cli {
    #[command(flatten)]
    opts: CompareOpts,
}

fn main() {
    match run() {
        // The difference count doubles as the exit status, clamped to the
        // range an exit code can carry.
        Ok(diff_count) => std::process::exit(diff_count.min(255) as i32),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

fn run() -> anyhow::Result<u64> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    nc_compare::compare(&cli.opts)
}
