//! In-memory workbook grid.
//!
//! The extractor operates on this model; actual spreadsheet decoding is the
//! job of an outer adapter (the CLI maps calamine output into it). Cells are
//! addressed by 0-based `(row, col)` and reads outside the grid yield
//! [`CellValue::Empty`], so heuristic scans never need bounds checks.

use chrono::{Days, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A typed cell value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Date(NaiveDateTime),
}

impl CellValue {
    /// Forgiving numeric coercion: numbers pass through, text is parsed
    /// after stripping thousands separators, everything else is 0.0.
    /// Malformed cells must never abort an extraction.
    pub fn as_number(&self) -> f64 {
        match self {
            CellValue::Number(n) => *n,
            CellValue::Text(s) => s.replace(',', "").trim().parse().unwrap_or(0.0),
            _ => 0.0,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        CellValue::Number(n)
    }
}

impl From<i64> for CellValue {
    fn from(n: i64) -> Self {
        CellValue::Number(n as f64)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<NaiveDateTime> for CellValue {
    fn from(d: NaiveDateTime) -> Self {
        CellValue::Date(d)
    }
}

/// Convert an Excel serial date (epoch 1899-12-30) to a timestamp.
/// Returns `None` for serials outside chrono's range.
pub fn excel_serial_to_datetime(serial: f64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_days(Days::new(serial as u64))?;
    date.and_hms_opt(0, 0, 0)
}

/// One named 2-D grid of cells.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Sheet {
    name: String,
    rows: Vec<Vec<CellValue>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Set a cell, growing the grid as needed.
    pub fn set(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        if self.rows.len() <= row {
            self.rows.resize_with(row + 1, Vec::new);
        }
        let cells = &mut self.rows[row];
        if cells.len() <= col {
            cells.resize_with(col + 1, CellValue::default);
        }
        cells[col] = value.into();
    }

    /// Cell at `(row, col)`; out-of-grid reads are `Empty`.
    pub fn value(&self, row: usize, col: usize) -> &CellValue {
        static EMPTY: CellValue = CellValue::Empty;
        self.rows
            .get(row)
            .and_then(|cells| cells.get(col))
            .unwrap_or(&EMPTY)
    }

    pub fn text(&self, row: usize, col: usize) -> Option<&str> {
        self.value(row, col).as_text()
    }

    pub fn number(&self, row: usize, col: usize) -> f64 {
        self.value(row, col).as_number()
    }

    pub fn date(&self, row: usize, col: usize) -> Option<NaiveDateTime> {
        self.value(row, col).as_date()
    }

    /// Number of rows in the grid (the scan bound for row walks).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// An ordered collection of named sheets. Read-only input to the extractor.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Workbook {
    sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Builder-style variant of [`Workbook::add_sheet`].
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.sheets.push(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet(name).is_some()
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn number_coercion_strips_separators() {
        assert_eq!(CellValue::Text("1,234,567.89".into()).as_number(), 1_234_567.89);
        assert_eq!(CellValue::Text(" 42 ".into()).as_number(), 42.0);
    }

    #[test]
    fn number_coercion_absorbs_garbage() {
        assert_eq!(CellValue::Text("n/a".into()).as_number(), 0.0);
        assert_eq!(CellValue::Empty.as_number(), 0.0);
        let date = excel_serial_to_datetime(45000.0).unwrap();
        assert_eq!(CellValue::Date(date).as_number(), 0.0);
    }

    #[test]
    fn out_of_grid_reads_are_empty() {
        let sheet = Sheet::new("RVAL");
        assert!(sheet.value(100, 100).is_empty());
        assert_eq!(sheet.number(100, 100), 0.0);
        assert_eq!(sheet.text(100, 100), None);
    }

    #[test]
    fn set_grows_grid() {
        let mut sheet = Sheet::new("RES-COSTO");
        sheet.set(5, 3, 1500.0);
        sheet.set(2, 1, "Proyecto:");
        assert_eq!(sheet.number(5, 3), 1500.0);
        assert_eq!(sheet.text(2, 1), Some("Proyecto:"));
        assert_eq!(sheet.row_count(), 6);
    }

    #[test]
    fn workbook_sheet_lookup() {
        let wb = Workbook::new()
            .with_sheet(Sheet::new("RES-COSTO"))
            .with_sheet(Sheet::new("RVAL"));
        assert!(wb.has_sheet("RVAL"));
        assert!(!wb.has_sheet("CURVA"));
        assert_eq!(wb.sheet_names(), vec!["RES-COSTO", "RVAL"]);
    }

    #[test]
    fn excel_serial_conversion() {
        // 2023-04-14 is serial 45030.
        let dt = excel_serial_to_datetime(45030.0).unwrap();
        assert_eq!(dt.date(), NaiveDate::from_ymd_opt(2023, 4, 14).unwrap());
    }
}
