use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::error::{ConvertError, Result};
use crate::model::SheetTable;

/// Reads one sheet of a workbook written by
/// [`excel_write`](crate::io::excel_write) back into a [`SheetTable`]. The
/// first row is taken as the header row; every cell is read as text.
pub fn read_table(path: &Path, sheet_name: &str) -> Result<SheetTable> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range(sheet_name)
        .ok_or_else(|| ConvertError::InvalidWorkbook(format!("missing sheet '{sheet_name}'")))?
        .map_err(ConvertError::from)?;

    let mut rows = range.rows();
    let columns: Vec<String> = match rows.next() {
        Some(header) => header.iter().map(|cell| cell_to_string(Some(cell))).collect(),
        None => Vec::new(),
    };
    let width = columns.len();

    let rows = rows
        .map(|row| {
            let mut cells: Vec<String> = row.iter().map(|cell| cell_to_string(Some(cell))).collect();
            cells.resize(width.max(cells.len()), String::new());
            cells
        })
        .collect();

    Ok(SheetTable {
        sheet_name: sheet_name.to_string(),
        columns,
        rows,
    })
}

/// Names of the sheets in a workbook, in workbook order.
pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook: Xlsx<_> = open_workbook(path)?;
    Ok(workbook.sheet_names().to_vec())
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
