//! Spreadsheet loading adapter.
//!
//! Maps a calamine workbook into the core grid model. This is the only
//! place that touches actual spreadsheet files; the library crates stay on
//! the in-memory model.

use std::path::Path;

use anyhow::Context;
use calamine::{open_workbook_auto, Data, Reader};
use valoriza_core::{excel_serial_to_datetime, CellValue, Sheet, Workbook};

/// Load an .xlsx/.xls file into the in-memory workbook model.
pub fn load_workbook(path: &Path) -> anyhow::Result<Workbook> {
    let mut source = open_workbook_auto(path)
        .with_context(|| format!("cannot open workbook {}", path.display()))?;

    let mut workbook = Workbook::new();
    for name in source.sheet_names().to_owned() {
        let range = source
            .worksheet_range(&name)
            .with_context(|| format!("cannot read sheet \"{name}\""))?;

        let mut sheet = Sheet::new(&name);
        let (start_row, start_col) = range.start().unwrap_or((0, 0));
        for (row, col, data) in range.used_cells() {
            let value = cell_from_data(data);
            if !value.is_empty() {
                sheet.set(start_row as usize + row, start_col as usize + col, value);
            }
        }
        tracing::debug!(sheet = %name, rows = sheet.row_count(), "loaded sheet");
        workbook.add_sheet(sheet);
    }
    Ok(workbook)
}

fn cell_from_data(data: &Data) -> CellValue {
    match data {
        Data::Empty | Data::Error(_) => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Number(f64::from(*b)),
        Data::DateTime(dt) => match excel_serial_to_datetime(dt.as_f64()) {
            Some(date) => CellValue::Date(date),
            None => CellValue::Number(dt.as_f64()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scalar_conversions() {
        assert_eq!(cell_from_data(&Data::Float(1.5)), CellValue::Number(1.5));
        assert_eq!(cell_from_data(&Data::Int(7)), CellValue::Number(7.0));
        assert_eq!(
            cell_from_data(&Data::String("RVAL".into())),
            CellValue::Text("RVAL".into())
        );
        assert_eq!(cell_from_data(&Data::Bool(true)), CellValue::Number(1.0));
        assert_eq!(cell_from_data(&Data::Empty), CellValue::Empty);
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = load_workbook(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(err.to_string().contains("cannot open workbook"));
    }

    #[test]
    fn garbage_file_is_an_error() {
        use std::io::Write;
        let mut file = tempfile::NamedTempFile::with_suffix(".xlsx").unwrap();
        file.write_all(b"this is not a spreadsheet").unwrap();
        assert!(load_workbook(file.path()).is_err());
    }
}
