//! nc-compare Library
//!
//! Structurally compares two netCDF or HDF5 files: root dimensions, nested
//! groups, variables, variable metadata (dtype, dimensions, shape, chunking,
//! scale factor, attributes), and optionally sampled data values.
//!
//! # Features
//!
//! - Side-by-side comparison of every group and variable in both files
//! - Lossy-but-visible attribute comparison with difference highlighting
//! - Random sampled-value check for one selected variable
//! - Plain-text, CSV, and Excel report exports
//!
//! # Example
//!
//! ```no_run
//! use clap::Parser;
//! use nc_compare::CompareOpts;
//!
//! let opts = CompareOpts::parse_from([
//!     "nc-compare", "observations_a.nc", "observations_b.nc", "--only-diffs",
//! ]);
//! let diff_count = nc_compare::compare(&opts)?;
//! # anyhow::Ok(())
//! ```

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::Parser;

use compare_core::{Comparison, ComparisonOptions};
use nc_compare_container::FileToCompare;
use nc_compare_report::{ColorMode, Reporter, ReporterOptions, RowOptions, TextStyle};

/// Options for one comparison run.
#[derive(Parser, Debug, Clone)]
pub struct CompareOpts {
    /// First file to compare
    pub file_a: PathBuf,

    /// Second file to compare
    pub file_b: PathBuf,

    /// Group containing the comparison variable
    #[arg(short = 'g', long)]
    pub comparison_var_group: Option<String>,

    /// Variable whose values are randomly sampled and compared
    #[arg(short = 'v', long)]
    pub comparison_var_name: Option<String>,

    /// Show only the rows where the two files differ
    #[arg(long)]
    pub only_diffs: bool,

    /// Include chunk sizes in the variable comparison
    #[arg(long)]
    pub show_chunks: bool,

    /// Include variable attributes in the comparison
    #[arg(long)]
    pub show_attributes: bool,

    /// Turn off colored terminal output
    #[arg(long, env = "NO_COLOR")]
    pub no_color: bool,

    /// Save the comparison as a plain-text file
    #[arg(long)]
    pub file_text: Option<PathBuf>,

    /// Save the comparison as comma-separated values
    #[arg(long)]
    pub file_csv: Option<PathBuf>,

    /// Save the comparison as an Excel workbook
    #[arg(long)]
    pub file_xlsx: Option<PathBuf>,

    /// Widths of the label, File A, and File B columns; anything other than
    /// three positive integers falls back to the defaults with a warning
    #[arg(long, num_args = 1.., value_name = "WIDTH")]
    pub column_widths: Option<Vec<usize>>,
}

/// Compare two netCDF or HDF5 files and return the number of differences.
///
/// Validates both inputs up front (existence, recognized extension, matching
/// format family), runs the full structural comparison, writes the requested
/// report files, and returns the total difference count; zero means the
/// files compared clean.
///
/// # Errors
///
/// Fails on invalid inputs, on report destinations that cannot be created,
/// and on structural errors while reading either file. A missing comparison
/// group or variable is not fatal; it is reported in the transcript and the
/// structural comparison continues.
pub fn compare(opts: &CompareOpts) -> anyhow::Result<u64> {
    let file_a = FileToCompare::new(&opts.file_a).context("invalid file A")?;
    let file_b = FileToCompare::new(&opts.file_b).context("invalid file B")?;
    if file_a.kind() != file_b.kind() {
        bail!(
            "cannot compare a {} file ({}) with a {} file ({})",
            file_a.kind().name(),
            opts.file_a.display(),
            file_b.kind().name(),
            opts.file_b.display()
        );
    }

    // Report destinations must be usable before any comparison output is
    // produced, so a typo in a path fails the run instead of wasting it.
    if let Some(path) = &opts.file_csv {
        ensure_writable_destination(path).context("invalid CSV report destination")?;
    }
    if let Some(path) = &opts.file_xlsx {
        ensure_writable_destination(path).context("invalid Excel report destination")?;
    }

    let color = if opts.no_color {
        ColorMode::Plain
    } else {
        ColorMode::Ansi
    };
    let mut out = Reporter::new(ReporterOptions {
        only_diffs: opts.only_diffs,
        color,
        keep_history: true,
        column_widths: opts.column_widths.clone(),
        text_file: opts.file_text.clone(),
    })?;

    out.print(
        &format!("File A: {}", opts.file_a.display()),
        TextStyle::Plain,
        false,
    );
    out.print(
        &format!("File B: {}", opts.file_b.display()),
        TextStyle::Plain,
        false,
    );
    out.side_by_side(
        " ",
        &opts.file_a.display().to_string(),
        &opts.file_b.display().to_string(),
        RowOptions::forced(),
    );

    tracing::info!(kind = file_a.kind().name(), "opening both files");
    let access_a = file_a
        .open()
        .with_context(|| format!("failed to open {}", opts.file_a.display()))?;
    let access_b = file_b
        .open()
        .with_context(|| format!("failed to open {}", opts.file_b.display()))?;

    let options = ComparisonOptions {
        show_chunks: opts.show_chunks,
        show_attributes: opts.show_attributes,
        comparison_var_group: opts.comparison_var_group.clone(),
        comparison_var_name: opts.comparison_var_name.clone(),
    };
    let summary = Comparison::new(access_a.as_ref(), access_b.as_ref(), options).run(&mut out)?;

    if let Some(path) = &opts.file_csv {
        out.write_history_to_csv(path)?;
        tracing::info!(path = %path.display(), "wrote CSV report");
    }
    if let Some(path) = &opts.file_xlsx {
        out.write_history_to_xlsx(path)?;
        tracing::info!(path = %path.display(), "wrote Excel report");
    }

    out.print("\nDone.", TextStyle::Plain, false);
    out.flush()?;

    Ok(summary.total_differences())
}

fn ensure_writable_destination(path: &Path) -> anyhow::Result<()> {
    File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(())
}
