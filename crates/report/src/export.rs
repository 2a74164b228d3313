//! History export to row-oriented destinations.

use std::path::Path;

use anyhow::Context;
use rust_xlsxwriter::{Color, Format, FormatUnderline, Workbook};

use crate::reporter::DIFFERENCE_MARKER;

const CSV_HEADERS: [&str; 4] = ["Info", "File A", "File B", "Other marks"];

/// Write the retained row history as CSV, one record per displayed line.
///
/// Section headers occupy a single cell while value rows carry four, so the
/// writer runs in flexible mode to accept the mixed record lengths.
pub fn write_history_to_csv(history: &[Vec<String>], path: &Path) -> anyhow::Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("failed to create CSV report {}", path.display()))?;
    writer.write_record(CSV_HEADERS)?;
    for row in history {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the retained row history as a styled spreadsheet.
///
/// Difference rows (marked in the fourth history column) are written bold
/// and red, with the marker itself dropped since the styling carries the
/// same signal; section-header rows are written bold and underlined.
pub fn write_history_to_xlsx(history: &[Vec<String>], path: &Path) -> anyhow::Result<()> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();

    let difference = Format::new().set_bold().set_font_color(Color::Red);
    let header = Format::new()
        .set_bold()
        .set_underline(FormatUnderline::Single);

    for (column, title) in ["Info", "File A", "File B"].iter().enumerate() {
        worksheet.write_string(0, column as u16, *title)?;
    }

    for (index, row) in history.iter().enumerate() {
        let row_number = (index + 1) as u32;
        let is_difference = row.len() > 3 && row[3] == DIFFERENCE_MARKER;
        let is_section_header =
            row.len() == 1 || (row.len() >= 3 && row[1].is_empty() && row[2].is_empty());

        let cells: &[String] = if is_difference { &row[..3] } else { row };
        for (column, cell) in cells.iter().enumerate() {
            let column = column as u16;
            if is_difference {
                worksheet.write_string_with_format(row_number, column, cell, &difference)?;
            } else if is_section_header {
                worksheet.write_string_with_format(row_number, column, cell, &header)?;
            } else {
                worksheet.write_string(row_number, column, cell)?;
            }
        }
    }

    workbook
        .save(path)
        .with_context(|| format!("failed to save spreadsheet {}", path.display()))?;
    Ok(())
}
