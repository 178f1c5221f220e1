//! Executed-cost sheet scan.
//!
//! The sheet lists cost items grouped under category header rows. Headers
//! are free text, so the walk is a fold over rows: a non-numeric key cell
//! that matches the category vocabulary switches the active category, and
//! numeric key cells (item indices) add their amount column to it.

use valoriza_core::{CellValue, CostBreakdown, Sheet};

use crate::SheetIdentity;

const COL_KEY: usize = 1; // B
const COL_DESC: usize = 2; // C
const COL_AMOUNT: usize = 3; // D
const COL_DATE_LABEL: usize = 5; // F
const COL_DATE: usize = 6; // G

/// Cost category vocabulary. Matched as case-insensitive substrings of the
/// header row text, in this order.
const CATEGORY_MARKERS: [(&str, Category); 6] = [
    ("PERSONAL DE OBRERO", Category::PersonalObrero),
    ("MATERIALES", Category::Materiales),
    ("ALQUILERES", Category::Alquileres),
    ("SUBCONTRATO", Category::Subcontratos),
    ("COSTOS VARIOS", Category::CostosVarios),
    ("COSTO DE OBRA GG", Category::Overhead),
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Category {
    PersonalObrero,
    Materiales,
    Alquileres,
    Subcontratos,
    CostosVarios,
    Overhead,
}

/// Fold state for the category walk.
#[derive(Debug, Default)]
struct ScanState {
    current: Option<Category>,
    costs: CostBreakdown,
}

impl ScanState {
    fn add(&mut self, category: Category, description: &str, amount: f64) {
        match category {
            Category::PersonalObrero => self.costs.personal_obrero += amount,
            Category::Materiales => self.costs.materiales += amount,
            Category::Alquileres => self.costs.alquileres += amount,
            Category::Subcontratos => self.costs.subcontratos += amount,
            Category::CostosVarios => self.costs.costos_varios += amount,
            Category::Overhead => {
                // Staff payroll is a sub-bucket of overhead, split off by a
                // keyword in the item description.
                if description.to_lowercase().contains("staff") {
                    self.costs.planilla_staff += amount;
                } else {
                    self.costs.otros_gg += amount;
                }
            }
        }
    }
}

pub(crate) fn extract(sheet: &Sheet) -> (CostBreakdown, SheetIdentity) {
    let identity = scan_header(sheet);

    let mut state = ScanState::default();
    for row in 9..sheet.row_count() {
        let key = sheet.value(row, COL_KEY);
        let amount = sheet.number(row, COL_AMOUNT);

        // Non-numeric text in the key cell is a category header candidate.
        if let CellValue::Text(label) = key {
            if label.trim().parse::<f64>().is_err() {
                let upper = label.to_uppercase();
                match CATEGORY_MARKERS
                    .iter()
                    .find(|(marker, _)| upper.contains(marker))
                {
                    Some((_, category)) => state.current = Some(*category),
                    None => {
                        // Unrecognized rows keep the active category, so a
                        // mangled header would misattribute what follows.
                        if !label.trim().is_empty() {
                            tracing::warn!(
                                row,
                                label = %label.trim(),
                                current = ?state.current,
                                "unrecognized header row, keeping active category"
                            );
                        }
                    }
                }
                continue;
            }
        }

        if is_item_index(key) && amount != 0.0 {
            if let Some(category) = state.current {
                let description = sheet.text(row, COL_DESC).unwrap_or("");
                state.add(category, description, amount);
            }
        }
    }

    (state.costs, identity)
}

/// A key cell counts as an item index when it is a number, directly typed
/// or as text.
fn is_item_index(cell: &CellValue) -> bool {
    match cell {
        CellValue::Number(_) => true,
        CellValue::Text(s) => s.trim().parse::<f64>().is_ok(),
        _ => false,
    }
}

fn scan_header(sheet: &Sheet) -> SheetIdentity {
    let mut identity = SheetIdentity::default();
    for row in 1..8 {
        if let Some(label) = sheet.text(row, COL_KEY) {
            if label.contains("Proyecto") {
                if let Some(value) = sheet.text(row, COL_DESC) {
                    identity.project_name = value.to_string();
                }
            }
            if label.contains("Elaborado") {
                if let Some(value) = sheet.text(row, COL_DESC) {
                    identity.author = value.to_string();
                }
            }
        }

        if let Some(date) = sheet.date(row, COL_DATE) {
            identity.date = Some(date);
        } else if let Some(date) =
            crate::serial_date_next_to_label(sheet, row, COL_DATE_LABEL, COL_DATE)
        {
            identity.date = Some(date);
        }
    }
    identity
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("RES-COSTO");
        sheet.set(2, 1, "Proyecto:");
        sheet.set(2, 2, "CONDOMINIO ROOSEVELT");
        sheet.set(3, 1, "Elaborado por:");
        sheet.set(3, 2, "M. Torres");

        sheet.set(10, 1, "MATERIALES");
        sheet.set(11, 1, 1.0);
        sheet.set(11, 2, "Cemento");
        sheet.set(11, 3, 60_000.0);
        sheet.set(12, 1, "2"); // item index typed as text
        sheet.set(12, 2, "Fierro");
        sheet.set(12, 3, 40_000.0);

        sheet.set(14, 1, "PERSONAL DE OBRERO");
        sheet.set(15, 1, 1.0);
        sheet.set(15, 3, 50_000.0);

        sheet.set(17, 1, "COSTO DE OBRA GG");
        sheet.set(18, 1, 1.0);
        sheet.set(18, 2, "Planilla Staff obra");
        sheet.set(18, 3, 20_000.0);
        sheet.set(19, 1, 2.0);
        sheet.set(19, 2, "Seguros y fianzas");
        sheet.set(19, 3, 5_000.0);
        sheet
    }

    #[test]
    fn accumulates_items_by_category() {
        let (costs, identity) = extract(&sample_sheet());
        assert_eq!(costs.materiales, 100_000.0);
        assert_eq!(costs.personal_obrero, 50_000.0);
        assert_eq!(costs.total_cd(), 150_000.0);
        assert_eq!(identity.project_name, "CONDOMINIO ROOSEVELT");
        assert_eq!(identity.author, "M. Torres");
    }

    #[test]
    fn staff_keyword_splits_overhead() {
        let (costs, _) = extract(&sample_sheet());
        assert_eq!(costs.planilla_staff, 20_000.0);
        assert_eq!(costs.otros_gg, 5_000.0);
        assert_eq!(costs.total_gg(), 25_000.0);
    }

    #[test]
    fn unrecognized_rows_keep_active_category() {
        let mut sheet = Sheet::new("RES-COSTO");
        sheet.set(10, 1, "MATERIALES");
        sheet.set(11, 1, "(continuacion)"); // stray note row
        sheet.set(12, 1, 1.0);
        sheet.set(12, 3, 1_000.0);
        let (costs, _) = extract(&sheet);
        assert_eq!(costs.materiales, 1_000.0);
    }

    #[test]
    fn items_before_any_category_are_dropped() {
        let mut sheet = Sheet::new("RES-COSTO");
        sheet.set(9, 1, 1.0);
        sheet.set(9, 3, 9_999.0);
        let (costs, _) = extract(&sheet);
        assert_eq!(costs.total_cd(), 0.0);
        assert_eq!(costs.total_gg(), 0.0);
    }

    #[test]
    fn zero_amount_rows_are_skipped() {
        let mut sheet = Sheet::new("RES-COSTO");
        sheet.set(10, 1, "ALQUILERES");
        sheet.set(11, 1, 1.0);
        sheet.set(11, 3, 0.0);
        let (costs, _) = extract(&sheet);
        assert_eq!(costs.alquileres, 0.0);
    }

    #[test]
    fn header_date_cell_read_directly() {
        let mut sheet = sample_sheet();
        let date = chrono::NaiveDate::from_ymd_opt(2026, 2, 20)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        sheet.set(4, 6, date);
        let (_, identity) = extract(&sheet);
        assert_eq!(identity.date, Some(date));
    }

    #[test]
    fn header_serial_date_needs_fecha_label() {
        let mut sheet = sample_sheet();
        sheet.set(4, 5, "Fecha de corte:");
        sheet.set(4, 6, 46_075.0);
        let (_, identity) = extract(&sheet);
        let date = identity.date.expect("serial date");
        assert_eq!(date.date(), chrono::NaiveDate::from_ymd_opt(2026, 2, 22).unwrap());
    }
}
