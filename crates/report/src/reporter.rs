//! The row-formatting and sink-fanout engine.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;

use nc_compare_align::{align, count_diffs};

use crate::{export, ColorMode, RowOptions, RowOutcome, TextStyle};

/// Marker stored in the fourth history column for highlighted differences.
pub const DIFFERENCE_MARKER: &str = "***";

/// Label / value A / value B column widths.
pub const DEFAULT_COLUMN_WIDTHS: [usize; 3] = [33, 48, 48];

/// Construction options for [`Reporter`].
#[derive(Debug, Clone, Default)]
pub struct ReporterOptions {
    /// Suppress rows whose two values are identical.
    pub only_diffs: bool,
    pub color: ColorMode,
    /// Retain every row for later CSV/XLSX export.
    pub keep_history: bool,
    /// Column widths as given on the command line; invalid entries warn and
    /// revert to the defaults.
    pub column_widths: Option<Vec<usize>>,
    /// Optional plain-text transcript destination.
    pub text_file: Option<PathBuf>,
}

/// Renders comparison rows and fans them out to the console, the optional
/// text transcript, and the in-memory history.
pub struct Reporter {
    widths: [usize; 3],
    only_diffs: bool,
    color: ColorMode,
    keep_history: bool,
    history: Vec<Vec<String>>,
    console: Box<dyn Write>,
    text_sink: Option<BufWriter<File>>,
    write_failure_logged: bool,
}

impl Reporter {
    /// Build a reporter writing to stdout.
    ///
    /// Fails when the text transcript destination cannot be created; output
    /// destinations are validated before any comparison output is produced.
    pub fn new(options: ReporterOptions) -> anyhow::Result<Self> {
        Self::with_sink(options, Box::new(std::io::stdout()))
    }

    /// Build a reporter writing console output to an arbitrary sink.
    pub fn with_sink(options: ReporterOptions, sink: Box<dyn Write>) -> anyhow::Result<Self> {
        let text_sink = match &options.text_file {
            Some(path) => {
                let file = File::create(path).with_context(|| {
                    format!("failed to create text transcript {}", path.display())
                })?;
                Some(BufWriter::new(file))
            }
            None => None,
        };

        Ok(Reporter {
            widths: validate_column_widths(options.column_widths.as_deref()),
            only_diffs: options.only_diffs,
            color: options.color,
            keep_history: options.keep_history,
            history: Vec::new(),
            console: sink,
            text_sink,
            write_failure_logged: false,
        })
    }

    pub fn only_diffs(&self) -> bool {
        self.only_diffs
    }

    /// Every retained row, in emission order.
    pub fn history(&self) -> &[Vec<String>] {
        &self.history
    }

    /// Print one full-width line.
    pub fn print(&mut self, text: &str, style: TextStyle, add_to_history: bool) {
        let console_line = match (self.color, style) {
            (ColorMode::Plain, _) | (_, TextStyle::Plain) => text.to_string(),
            (ColorMode::Ansi, TextStyle::Heading) => text.bright_blue().to_string(),
            (ColorMode::Ansi, TextStyle::Notice) => text.cyan().to_string(),
            (ColorMode::Ansi, TextStyle::Error) => text.red().bold().to_string(),
            (ColorMode::Ansi, TextStyle::Dim) => text.bright_black().to_string(),
        };
        self.emit(&console_line, text);
        if add_to_history {
            self.push_history(vec![text.trim_matches('\n').to_string()]);
        }
    }

    /// Print three strings as one formatted row and classify the comparison.
    ///
    /// When only-diffs mode is active, rows with two equal values are
    /// suppressed unless `options.force_display` is set; suppressed rows are
    /// still classified (always `Shared`).
    pub fn side_by_side(
        &mut self,
        label: &str,
        value_a: &str,
        value_b: &str,
        options: RowOptions,
    ) -> RowOutcome {
        let outcome = RowOutcome::classify(value_a, value_b);
        let different = value_a != value_b;

        if !options.force_display && !different && self.only_diffs {
            return outcome;
        }

        let fill = if options.dash_line { '-' } else { ' ' };
        let label_cell = pad_left(label, self.widths[0], ' ');
        let a_cell = pad_left(value_a, self.widths[1], fill);
        let b_cell = pad_left(value_b, self.widths[2], fill);
        let plain = format!(" {label_cell} {a_cell} {b_cell}");

        let highlighted = options.highlight_diff && different;
        let console_line = if highlighted && self.color == ColorMode::Ansi {
            format!(" {} {a_cell} {b_cell}", label_cell.red())
        } else {
            plain.clone()
        };
        self.emit(&console_line, &plain);

        let marker = if highlighted { DIFFERENCE_MARKER } else { "" };
        self.push_history(vec![
            label.to_string(),
            value_a.to_string(),
            value_b.to_string(),
            marker.to_string(),
        ]);

        outcome
    }

    /// Compare two item lists and print whether (and how) they differ.
    ///
    /// Returns `(left_only, right_only, shared)` counts.
    pub fn lists_diff(&mut self, list_a: &[String], list_b: &[String]) -> (usize, usize, usize) {
        let (left, right, shared) = count_diffs(list_a.to_vec(), list_b.to_vec());

        if left == 0 && right == 0 {
            let message = if shared > 0 {
                "\tAre all items the same? ---> True.".to_string()
            } else {
                "\tAre all items the same? ---> True.  (No items exist.)".to_string()
            };
            self.print(&message, TextStyle::Notice, true);
            if shared > 0 {
                let mut items: Vec<String> = list_a.to_vec();
                items.sort();
                items.dedup();
                self.print(&format!("\t{items:?}"), TextStyle::Notice, false);
            }
            return (0, 0, shared);
        }

        let total = left + right + shared;
        self.print(
            &format!(
                "\tAre all items the same? ---> False.  ({} shared, out of {total} total.)",
                item_is_or_are(shared)
            ),
            TextStyle::Notice,
            true,
        );
        self.print("\tWhich items are different?", TextStyle::Error, false);

        self.side_by_side(" ", "File A", "File B", RowOptions::forced());
        for pair in align(list_a.to_vec(), list_b.to_vec()) {
            self.side_by_side(
                &format!("#{:02}", pair.index),
                pair.left_str().trim(),
                pair.right_str().trim(),
                RowOptions {
                    dash_line: true,
                    highlight_diff: true,
                    force_display: true,
                },
            );
        }
        self.side_by_side(
            "Number of non-shared items:",
            &left.to_string(),
            &right.to_string(),
            RowOptions::forced(),
        );

        (left, right, shared)
    }

    /// Export the retained history as CSV.
    pub fn write_history_to_csv(&self, path: &Path) -> anyhow::Result<()> {
        export::write_history_to_csv(&self.history, path)
    }

    /// Export the retained history as a styled spreadsheet.
    pub fn write_history_to_xlsx(&self, path: &Path) -> anyhow::Result<()> {
        export::write_history_to_xlsx(&self.history, path)
    }

    /// Flush the transcript sink; call once at the end of a run.
    pub fn flush(&mut self) -> anyhow::Result<()> {
        let _ = self.console.flush();
        if let Some(sink) = &mut self.text_sink {
            sink.flush().context("failed to flush text transcript")?;
        }
        Ok(())
    }

    /// Write one line to every sink. A failing sink is logged once and then
    /// ignored, so a broken pipe does not abort the comparison.
    fn emit(&mut self, console_line: &str, plain_line: &str) {
        if let Err(error) = writeln!(self.console, "{console_line}") {
            self.log_write_failure("console", &error);
        }
        let transcript_error = match &mut self.text_sink {
            Some(sink) => writeln!(sink, "{plain_line}").err(),
            None => None,
        };
        if let Some(error) = transcript_error {
            self.log_write_failure("text transcript", &error);
        }
    }

    fn log_write_failure(&mut self, sink: &str, error: &std::io::Error) {
        if !self.write_failure_logged {
            self.write_failure_logged = true;
            tracing::warn!(sink, %error, "report output write failed");
        }
    }

    fn push_history(&mut self, row: Vec<String>) {
        if self.keep_history {
            self.history.push(row);
        }
    }
}

fn item_is_or_are(count: usize) -> String {
    if count == 1 {
        format!("{count} item is")
    } else {
        format!("{count} items are")
    }
}

/// Right-align `text` within `width`, padding with `fill`. Text longer than
/// the column is left untouched.
fn pad_left(text: &str, width: usize, fill: char) -> String {
    let length = text.chars().count();
    if length >= width {
        return text.to_string();
    }
    let mut padded = String::with_capacity(width);
    for _ in 0..(width - length) {
        padded.push(fill);
    }
    padded.push_str(text);
    padded
}

/// Column widths must be three positive integers; anything else warns and
/// reverts to the defaults entry by entry.
fn validate_column_widths(input: Option<&[usize]>) -> [usize; 3] {
    let mut widths = DEFAULT_COLUMN_WIDTHS;
    let Some(input) = input else {
        return widths;
    };
    if input.len() != 3 {
        tracing::warn!(
            given = input.len(),
            "expected exactly three column widths; using defaults"
        );
        return widths;
    }
    for (index, &width) in input.iter().enumerate() {
        if width > 0 {
            widths[index] = width;
        } else {
            tracing::warn!(
                column = index,
                "column width was not a positive integer; reverting to default"
            );
        }
    }
    widths
}
