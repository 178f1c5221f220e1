//! # valoriza-extract
//!
//! Heuristic extractor for weekly cost-valuation workbooks.
//!
//! The source workbooks are manually authored and have no fixed schema, so
//! extraction is a multi-pass scan: marker labels locate the header region,
//! a category fold walks the cost rows, and summary totals are anchored to
//! label text rather than cell addresses. Per-cell parse failures degrade to
//! zero or empty values; only a missing mandatory sheet is fatal.
//!
//! ## Example
//!
//! ```rust
//! use valoriza_core::{Sheet, Workbook};
//! use valoriza_extract::extract;
//!
//! let mut res_costo = Sheet::new("RES-COSTO");
//! res_costo.set(2, 1, "Proyecto:");
//! res_costo.set(2, 2, "OBRA BEETHOVEN");
//!
//! let workbook = Workbook::new()
//!     .with_sheet(res_costo)
//!     .with_sheet(Sheet::new("RVAL"));
//!
//! let now = chrono::NaiveDate::from_ymd_opt(2026, 2, 22)
//!     .unwrap()
//!     .and_hms_opt(0, 0, 0)
//!     .unwrap();
//! let record = extract(&workbook, now).unwrap();
//! assert_eq!(record.short_name, "BEETHOVEN");
//! ```

mod curva;
mod res_costo;
mod rval;

use chrono::NaiveDateTime;
use thiserror::Error;
use valoriza_core::{short_project_name, ProjectRecord, Workbook};

/// Mandatory sheet with the executed-cost breakdown.
pub const SHEET_RES_COSTO: &str = "RES-COSTO";
/// Mandatory sheet with the valuation summary.
pub const SHEET_RVAL: &str = "RVAL";
/// Optional sheet with the monthly progress series.
pub const SHEET_CURVA: &str = "CURVA";

/// Extraction error.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("missing mandatory sheet \"{0}\" in workbook")]
    MissingSheet(String),
}

/// Identity fields scraped from a sheet's header region. Each mandatory
/// sheet contributes what it has; [`extract`] merges them by priority.
#[derive(Clone, Debug, Default)]
pub(crate) struct SheetIdentity {
    pub project_name: String,
    pub author: String,
    pub date: Option<NaiveDateTime>,
}

/// Extract a [`ProjectRecord`] from a workbook.
///
/// `RES-COSTO` and `RVAL` are mandatory; `CURVA` is optional and its absence
/// merely drops the progress series from the record. `extracted_at` is the
/// fallback report date when neither sheet carries one; callers pass the
/// current time so the core itself never touches the clock.
pub fn extract(
    workbook: &Workbook,
    extracted_at: NaiveDateTime,
) -> Result<ProjectRecord, ExtractError> {
    for name in [SHEET_RES_COSTO, SHEET_RVAL] {
        if !workbook.has_sheet(name) {
            return Err(ExtractError::MissingSheet(name.to_string()));
        }
    }

    // Lookups can't fail past the check above.
    let res_sheet = workbook.sheet(SHEET_RES_COSTO).ok_or_else(|| {
        ExtractError::MissingSheet(SHEET_RES_COSTO.to_string())
    })?;
    let rval_sheet = workbook
        .sheet(SHEET_RVAL)
        .ok_or_else(|| ExtractError::MissingSheet(SHEET_RVAL.to_string()))?;

    let (res_costo, res_identity) = res_costo::extract(res_sheet);
    let (rval, rval_identity) = rval::extract(rval_sheet);

    let curva = match workbook.sheet(SHEET_CURVA) {
        Some(sheet) => {
            tracing::debug!("curve sheet found");
            Some(curva::extract(sheet))
        }
        None => {
            tracing::debug!(
                sheets = ?workbook.sheet_names(),
                "no curve sheet; report will have no S-curve page"
            );
            None
        }
    };

    let project_name = first_nonempty(&res_identity.project_name, &rval_identity.project_name)
        .unwrap_or("PROYECTO")
        .to_string();
    let short_name = short_project_name(&project_name);
    let date = res_identity
        .date
        .or(rval_identity.date)
        .unwrap_or(extracted_at);
    let author = first_nonempty(&res_identity.author, &rval_identity.author)
        .unwrap_or("")
        .to_string();

    Ok(ProjectRecord {
        res_costo,
        rval,
        curva,
        project_name,
        short_name,
        date,
        author,
    })
}

/// Probe a workbook's header regions for the project name without running a
/// full extraction. Useful to callers that need a title before deciding what
/// to do with the file. All failures collapse to `None`.
pub fn detect_project_name(workbook: &Workbook) -> Option<String> {
    for (name, header_rows) in [(SHEET_RES_COSTO, 1..8), (SHEET_RVAL, 1..9)] {
        let Some(sheet) = workbook.sheet(name) else {
            continue;
        };
        for row in header_rows {
            let is_marker = sheet
                .text(row, 1)
                .is_some_and(|label| label.contains("Proyecto"));
            if is_marker {
                if let Some(value) = sheet.text(row, 2) {
                    if !value.trim().is_empty() {
                        return Some(value.to_string());
                    }
                }
            }
        }
    }
    None
}

/// Read a date from `value_col` when `label_col` holds a "fecha" marker.
/// Accepts a typed date cell or an Excel serial in the plausible window
/// (2009..2064); anything else is ignored.
pub(crate) fn serial_date_next_to_label(
    sheet: &valoriza_core::Sheet,
    row: usize,
    label_col: usize,
    value_col: usize,
) -> Option<NaiveDateTime> {
    let label = sheet.text(row, label_col)?;
    if !label.to_lowercase().contains("fecha") {
        return None;
    }
    if let Some(date) = sheet.date(row, value_col) {
        return Some(date);
    }
    let serial = sheet.number(row, value_col);
    if serial > 40_000.0 && serial < 60_000.0 {
        valoriza_core::excel_serial_to_datetime(serial)
    } else {
        None
    }
}

fn first_nonempty<'a>(a: &'a str, b: &'a str) -> Option<&'a str> {
    if !a.is_empty() {
        Some(a)
    } else if !b.is_empty() {
        Some(b)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valoriza_core::Sheet;

    fn noon() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2026, 2, 22)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn missing_mandatory_sheet_is_fatal() {
        let workbook = Workbook::new().with_sheet(Sheet::new(SHEET_RES_COSTO));
        let err = extract(&workbook, noon()).unwrap_err();
        assert!(matches!(err, ExtractError::MissingSheet(name) if name == SHEET_RVAL));
    }

    #[test]
    fn missing_curve_sheet_degrades() {
        let workbook = Workbook::new()
            .with_sheet(Sheet::new(SHEET_RES_COSTO))
            .with_sheet(Sheet::new(SHEET_RVAL));
        let record = extract(&workbook, noon()).unwrap();
        assert!(record.curva.is_none());
        assert_eq!(record.project_name, "PROYECTO");
        assert_eq!(record.date, noon());
    }

    #[test]
    fn identity_prefers_res_costo() {
        let mut res = Sheet::new(SHEET_RES_COSTO);
        res.set(3, 1, "Proyecto:");
        res.set(3, 2, "OBRA MARA");
        let mut rv = Sheet::new(SHEET_RVAL);
        rv.set(3, 1, "Proyecto:");
        rv.set(3, 2, "OTRO NOMBRE");
        rv.set(4, 1, "Elaborado por:");
        rv.set(4, 2, "J. Quispe");

        let workbook = Workbook::new().with_sheet(res).with_sheet(rv);
        let record = extract(&workbook, noon()).unwrap();
        assert_eq!(record.project_name, "OBRA MARA");
        assert_eq!(record.short_name, "MARA");
        // Author only present in RVAL, so it fills the gap.
        assert_eq!(record.author, "J. Quispe");
    }

    #[test]
    fn detect_project_name_probes_headers() {
        let mut rv = Sheet::new(SHEET_RVAL);
        rv.set(2, 1, "Proyecto:");
        rv.set(2, 2, "EDIFICIO FRANKLIN");
        let workbook = Workbook::new().with_sheet(rv);
        assert_eq!(
            detect_project_name(&workbook),
            Some("EDIFICIO FRANKLIN".to_string())
        );
        assert_eq!(detect_project_name(&Workbook::new()), None);
    }
}
