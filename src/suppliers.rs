use std::path::Path;

use tracing::{info, instrument};

use crate::error::Result;
use crate::io::flatfile::{self, Loaded};
use crate::model::{Supplier, SupplierDirectory};

/// Reads the `lev*` supplier export. Rows shorter than the fixed layout are
/// skipped.
#[instrument(level = "info", skip_all)]
pub fn read_suppliers(path: Option<&Path>) -> Result<Loaded<Vec<Supplier>>> {
    let suppliers = flatfile::read_optional_records(path, "suppliers")?.map(|rows| {
        rows.iter()
            .filter_map(|row| Supplier::from_row(row))
            .collect::<Vec<_>>()
    });
    if let Loaded::Data(suppliers) = &suppliers {
        info!(suppliers = suppliers.len(), "read supplier records");
    }
    Ok(suppliers)
}

/// Reads the supplier export straight into a number → name directory. A
/// missing file yields an empty directory.
pub fn read_supplier_directory(path: Option<&Path>) -> Result<SupplierDirectory> {
    let suppliers = read_suppliers(path)?.unwrap_or_default();
    Ok(SupplierDirectory::from_suppliers(&suppliers))
}
