//! Side-by-side row reporting for nc-compare.
//!
//! The [`Reporter`] renders (label, value A, value B) triples as formatted
//! console rows, applies the highlight and suppress-if-identical policies,
//! and mirrors every row into an in-memory history plus an optional
//! plain-text transcript. The history is later exported to CSV or XLSX by
//! [`write_history_to_csv`] and [`write_history_to_xlsx`].
//!
//! Styling is controlled by a [`ColorMode`] value passed at construction;
//! there is no global color state. The history and transcript always hold
//! plain text by construction, so nothing ever needs to be stripped.

mod export;
mod reporter;

pub use export::{write_history_to_csv, write_history_to_xlsx};
pub use reporter::{Reporter, ReporterOptions, DEFAULT_COLUMN_WIDTHS, DIFFERENCE_MARKER};

/// Console styling mode, passed down by value and consulted per row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    /// No escape sequences anywhere.
    Plain,
    /// ANSI colors on the console sink only.
    #[default]
    Ansi,
}

/// Text styles the comparison driver can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    Plain,
    /// Section headings ("Root-level Dimensions:", "All variables:", ...).
    Heading,
    /// Positive/neutral notices ("Are all items the same? ---> True.").
    Notice,
    /// Recovered errors inlined into the transcript.
    Error,
    /// De-emphasized skip messages.
    Dim,
}

/// Classification of one displayed comparison row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOutcome {
    /// Both values equal.
    Shared,
    /// Only the left value is non-empty.
    Left,
    /// Only the right value is non-empty.
    Right,
    /// Both values non-empty and different.
    Both,
}

impl RowOutcome {
    /// Compare two already-stringified values.
    ///
    /// An absent side is an empty string by convention, so empty-vs-nonempty
    /// classifies as a one-sided difference.
    pub fn classify(a: &str, b: &str) -> RowOutcome {
        if a == b {
            RowOutcome::Shared
        } else if !a.is_empty() && b.is_empty() {
            RowOutcome::Left
        } else if a.is_empty() && !b.is_empty() {
            RowOutcome::Right
        } else {
            RowOutcome::Both
        }
    }

    pub fn is_difference(self) -> bool {
        !matches!(self, RowOutcome::Shared)
    }
}

/// Per-row display options for [`Reporter::side_by_side`].
#[derive(Debug, Clone, Copy, Default)]
pub struct RowOptions {
    /// Fill the value columns with dashes (separator rows).
    pub dash_line: bool,
    /// Color the label and add the history marker when the values differ.
    pub highlight_diff: bool,
    /// Display the row even when both values are equal and only-diffs mode
    /// is active.
    pub force_display: bool,
}

impl RowOptions {
    pub fn highlight() -> Self {
        RowOptions {
            highlight_diff: true,
            ..Default::default()
        }
    }

    pub fn forced() -> Self {
        RowOptions {
            force_display: true,
            ..Default::default()
        }
    }

    pub fn dash() -> Self {
        RowOptions {
            dash_line: true,
            force_display: true,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::RowOutcome;

    #[test]
    fn test_row_outcome_classification() {
        assert_eq!(RowOutcome::classify("f64", "f64"), RowOutcome::Shared);
        assert_eq!(RowOutcome::classify("f64", ""), RowOutcome::Left);
        assert_eq!(RowOutcome::classify("", "f32"), RowOutcome::Right);
        assert_eq!(RowOutcome::classify("f64", "f32"), RowOutcome::Both);
        // Two empty strings are equal, hence shared.
        assert_eq!(RowOutcome::classify("", ""), RowOutcome::Shared);
    }
}
