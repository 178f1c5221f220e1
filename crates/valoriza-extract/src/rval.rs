//! Valuation-summary sheet scan.
//!
//! Summary amounts sit next to free-text labels whose row varies between
//! workbooks, so every row is scanned and values are anchored to the label
//! text. A label may carry its percentage inline ("GASTOS GENERALES
//! (12.5%)"); the repair pass afterwards keeps amounts and percentages
//! consistent either way.

use once_cell::sync::Lazy;
use regex::Regex;
use valoriza_core::{Sheet, ValuationSummary};

use crate::SheetIdentity;

const COL_PROJECT_LABEL: usize = 1; // B
const COL_PROJECT_VALUE: usize = 2; // C
const COL_HEADER_LABEL: usize = 5; // F
const COL_HEADER_VALUE: usize = 6; // G

/// Label candidates, in probe order.
const LABEL_COLS: [usize; 3] = [2, 1, 3]; // C, B, D
/// Value candidates to the right of a matched label, in probe order.
const VALUE_COLS: [usize; 3] = [6, 5, 7]; // G, F, H

/// Matches a percentage embedded in a label, e.g. "(12.5%)" or "(12.5)".
static EMBEDDED_PCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\(([\d.]+)%?\)").unwrap());

pub(crate) fn extract(sheet: &Sheet) -> (ValuationSummary, SheetIdentity) {
    let mut rval = ValuationSummary::default();
    let mut identity = SheetIdentity::default();

    for row in 1..9 {
        if let Some(label) = sheet.text(row, COL_PROJECT_LABEL) {
            if label.contains("Proyecto") {
                if let Some(value) = sheet.text(row, COL_PROJECT_VALUE) {
                    identity.project_name = value.to_string();
                }
            }
            if label.contains("Elaborado") {
                if let Some(value) = sheet.text(row, COL_PROJECT_VALUE) {
                    identity.author = value.to_string();
                }
            }
        }

        if let Some(date) =
            crate::serial_date_next_to_label(sheet, row, COL_HEADER_LABEL, COL_HEADER_VALUE)
        {
            identity.date = Some(date);
        }

        // Some workbooks put the direct cost in the header block itself.
        let header_cd = sheet
            .text(row, COL_HEADER_LABEL)
            .is_some_and(|label| label.to_uppercase().contains("COSTO DIRECTO"));
        if header_cd {
            rval.costo_directo = sheet.number(row, COL_HEADER_VALUE);
        }
    }

    for row in 9..sheet.row_count() {
        let Some(label) = row_label(sheet, row) else {
            continue;
        };
        let upper = label.trim().to_uppercase();

        // "COSTO DIRECTO" must not be confused with overhead or total rows
        // that mention it; long labels are explanatory notes.
        let is_costo_directo = upper == "COSTO DIRECTO"
            || (upper.contains("COSTO DIRECTO")
                && !upper.contains("GASTOS")
                && !upper.contains("TOTAL")
                && upper.chars().count() < 25);
        if is_costo_directo {
            if let Some(value) = first_positive(sheet, row) {
                rval.costo_directo = value;
            }
        }

        if upper.contains("GASTOS GENERALES") {
            if let Some(value) = first_positive(sheet, row) {
                rval.gastos_generales = value;
            }
            if let Some(pct) = embedded_percent(label) {
                rval.gg_percent = pct;
            }
        }

        if upper.contains("UTILIDAD") && !upper.contains("TOTAL") {
            if let Some(value) = first_positive(sheet, row) {
                rval.utilidad = value;
            }
            if let Some(pct) = embedded_percent(label) {
                rval.util_percent = pct;
            }
        }

        // "VALORIZ" covers the accent variants of "VALORIZACION".
        if upper.contains("TOTAL") && upper.contains("VALORIZ") {
            if let Some(value) = first_positive(sheet, row) {
                rval.total_valorizacion = value;
            }
        }
    }

    rval.reconcile();
    (rval, identity)
}

/// First label-candidate cell with meaningful text (> 3 chars trimmed).
fn row_label(sheet: &Sheet, row: usize) -> Option<&str> {
    LABEL_COLS
        .iter()
        .filter_map(|&col| sheet.text(row, col))
        .find(|text| text.trim().chars().count() > 3)
}

/// First positive number among the value-candidate columns.
fn first_positive(sheet: &Sheet, row: usize) -> Option<f64> {
    VALUE_COLS
        .iter()
        .map(|&col| sheet.number(row, col))
        .find(|&v| v > 0.0)
}

fn embedded_percent(label: &str) -> Option<f64> {
    EMBEDDED_PCT
        .captures(label)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}
