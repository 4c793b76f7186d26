use std::fs;
use std::path::Path;

use rust_xlsxwriter::{Table, TableColumn, Workbook};
use tracing::debug;

use crate::error::Result;
use crate::model::WorkbookData;

/// Longest string Excel accepts in a single cell.
pub const MAX_CELL_CHARS: usize = 32_767;

/// Writes the provided workbook data to the given path, creating the parent
/// directory when needed.
pub fn write_workbook(path: &Path, workbook: &WorkbookData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut workbook_writer = Workbook::new();

    for table in &workbook.tables {
        let worksheet = workbook_writer.add_worksheet();
        worksheet.set_name(&table.sheet_name)?;

        for (col_idx, header) in table.columns.iter().enumerate() {
            worksheet.write_string(0, col_idx as u16, header)?;
        }

        for (row_idx, row) in table.rows.iter().enumerate() {
            for (col_idx, cell) in row.iter().enumerate() {
                if cell.is_empty() {
                    continue;
                }
                worksheet.write_string(
                    (row_idx + 1) as u32,
                    col_idx as u16,
                    fit_cell(cell),
                )?;
            }
        }

        // A table needs at least one data row; header-only sheets stay plain.
        if !table.rows.is_empty() {
            let columns: Vec<TableColumn> = table
                .columns
                .iter()
                .map(|header| TableColumn::new().set_header(header))
                .collect();
            let mut excel_table = Table::new();
            excel_table.set_autofilter(true).set_columns(&columns);
            let col_end = (table.columns.len() as u16).saturating_sub(1);
            worksheet.add_table(0, 0, table.rows.len() as u32, col_end, &excel_table)?;
        }
        debug!(
            sheet = %table.sheet_name,
            rows = table.rows.len(),
            columns = table.columns.len(),
            "sheet written"
        );
    }

    workbook_writer.save(path)?;
    Ok(())
}

fn fit_cell(cell: &str) -> &str {
    match cell.char_indices().nth(MAX_CELL_CHARS) {
        Some((byte_idx, _)) => &cell[..byte_idx],
        None => cell,
    }
}
