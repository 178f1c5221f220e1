//! Progress-curve sheet scan.
//!
//! The sheet holds parallel month tables: the contractual group at columns
//! A..E, the executed group at G..K, and optionally a forecast group whose
//! position is found by its header keyword. Rows are read until the grid
//! ends; a TOTAL row captures the grand total and is not part of the series.

use valoriza_core::{CellValue, MonthPoint, ProgressSeries, Sheet};

const PROG_START: usize = 0; // A..E
const EJEC_START: usize = 6; // G..K
const FIRST_DATA_ROW: usize = 5;
const HEADER_SCAN_COLS: usize = 21;

pub(crate) fn extract(sheet: &Sheet) -> ProgressSeries {
    let mut series = ProgressSeries::default();

    // Forecast group is optional; its header keyword marks the start column.
    let plan_start = (0..HEADER_SCAN_COLS).find(|&col| {
        sheet
            .text(0, col)
            .is_some_and(|text| text.to_uppercase().contains("PLANIFICAD"))
    });

    for row in FIRST_DATA_ROW..sheet.row_count() {
        let Some(mes) = month_key(sheet.value(row, PROG_START)) else {
            continue;
        };

        if mes.to_uppercase() == "TOTAL" {
            let first = sheet.number(row, PROG_START + 1);
            series.total = if first != 0.0 {
                first
            } else {
                sheet.number(row, PROG_START + 2)
            };
            continue;
        }

        series.contractual.push(read_point(sheet, row, PROG_START, &mes));

        let ejec_mes = sheet
            .text(row, EJEC_START)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(&mes);
        let ejec = read_point(sheet, row, EJEC_START, ejec_mes);
        let has_executed = ejec.parcial > 0.0 || ejec.acumulado > 0.0;
        series.valorizado.push(ejec);

        if has_executed {
            series.mes_actual = Some(series.contractual.len() - 1);
        }

        if let Some(plan_col) = plan_start {
            let plan_mes = sheet
                .text(row, plan_col)
                .filter(|s| !s.trim().is_empty())
                .unwrap_or(&mes);
            let point = read_point(sheet, row, plan_col, plan_mes);
            series.proyectado.get_or_insert_with(Vec::new).push(point);
        }
    }

    if series.total == 0.0 {
        if let Some(last) = series.contractual.last() {
            series.total = last.acumulado;
        }
    }

    if !series.is_cumulative_monotonic() {
        tracing::warn!("contractual cumulative values decrease; curve data looks inconsistent");
    }

    series
}

/// A month row's key cell: text, or a number rendered as text. Empty and
/// zero cells end up skipped by the caller.
fn month_key(cell: &CellValue) -> Option<String> {
    match cell {
        CellValue::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        CellValue::Number(n) if *n != 0.0 => Some(n.to_string()),
        _ => None,
    }
}

fn read_point(sheet: &Sheet, row: usize, start_col: usize, mes: &str) -> MonthPoint {
    MonthPoint {
        mes: mes.to_string(),
        parcial: sheet.number(row, start_col + 1),
        acumulado: sheet.number(row, start_col + 2),
        parcial_pct: sheet.number(row, start_col + 3),
        acum_pct: sheet.number(row, start_col + 4),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Contractual months plus executed data through October.
    fn sample_sheet() -> Sheet {
        let mut sheet = Sheet::new("CURVA");
        let months = [
            ("INICIO 5/9/2025", 0.0, 0.0, 0.0, 0.0),
            ("SET 2025", 50_000.0, 50_000.0, 0.10, 0.10),
            ("OCT 2025", 100_000.0, 150_000.0, 0.20, 0.30),
            ("NOV 2025", 150_000.0, 300_000.0, 0.30, 0.60),
            ("DIC 2025", 200_000.0, 500_000.0, 0.40, 1.00),
        ];
        for (i, (mes, parcial, acum, ppct, apct)) in months.iter().enumerate() {
            let row = FIRST_DATA_ROW + i;
            sheet.set(row, 0, *mes);
            sheet.set(row, 1, *parcial);
            sheet.set(row, 2, *acum);
            sheet.set(row, 3, *ppct);
            sheet.set(row, 4, *apct);
        }
        // Executed group: data through OCT only.
        let executed = [
            (0.0, 0.0, 0.0, 0.0),
            (45_000.0, 45_000.0, 0.09, 0.09),
            (90_000.0, 135_000.0, 0.18, 0.27),
        ];
        for (i, (parcial, acum, ppct, apct)) in executed.iter().enumerate() {
            let row = FIRST_DATA_ROW + i;
            sheet.set(row, 7, *parcial);
            sheet.set(row, 8, *acum);
            sheet.set(row, 9, *ppct);
            sheet.set(row, 10, *apct);
        }
        sheet.set(FIRST_DATA_ROW + 5, 0, "TOTAL");
        sheet.set(FIRST_DATA_ROW + 5, 1, 500_000.0);
        sheet
    }

    #[test]
    fn parses_parallel_series() {
        let series = extract(&sample_sheet());
        assert_eq!(series.len(), 5);
        assert_eq!(series.valorizado.len(), 5);
        assert_eq!(series.contractual[2].mes, "OCT 2025");
        assert_eq!(series.contractual[2].acumulado, 150_000.0);
        assert_eq!(series.valorizado[2].acum_pct, 0.27);
        assert!(series.proyectado.is_none());
    }

    #[test]
    fn total_row_is_captured_not_appended() {
        let series = extract(&sample_sheet());
        assert_eq!(series.total, 500_000.0);
        assert!(series.contractual.iter().all(|p| p.mes != "TOTAL"));
    }

    #[test]
    fn current_month_is_last_with_executed_data() {
        let series = extract(&sample_sheet());
        assert_eq!(series.mes_actual, Some(2));
    }

    #[test]
    fn no_executed_data_means_no_current_month() {
        let mut sheet = Sheet::new("CURVA");
        sheet.set(5, 0, "SET 2025");
        sheet.set(5, 2, 10_000.0);
        sheet.set(6, 0, "OCT 2025");
        sheet.set(6, 2, 30_000.0);
        let series = extract(&sheet);
        assert_eq!(series.mes_actual, None);
    }

    #[test]
    fn total_falls_back_to_last_cumulative() {
        let mut sheet = Sheet::new("CURVA");
        sheet.set(5, 0, "SET 2025");
        sheet.set(5, 2, 10_000.0);
        sheet.set(6, 0, "OCT 2025");
        sheet.set(6, 2, 30_000.0);
        let series = extract(&sheet);
        assert_eq!(series.total, 30_000.0);
    }

    #[test]
    fn forecast_group_found_by_header() {
        let mut sheet = sample_sheet();
        sheet.set(0, 12, "PLANIFICADO");
        sheet.set(FIRST_DATA_ROW + 1, 13, 48_000.0);
        sheet.set(FIRST_DATA_ROW + 1, 14, 48_000.0);
        sheet.set(FIRST_DATA_ROW + 1, 16, 0.096);
        let series = extract(&sheet);
        let plan = series.proyectado.expect("forecast series");
        assert_eq!(plan.len(), 5);
        assert_eq!(plan[1].acumulado, 48_000.0);
        assert_eq!(plan[1].acum_pct, 0.096);
        // Forecast months fall back to the contractual label.
        assert_eq!(plan[1].mes, "SET 2025");
    }

    #[test]
    fn blank_key_rows_are_skipped() {
        let mut sheet = sample_sheet();
        sheet.set(FIRST_DATA_ROW + 6, 2, 999.0); // values without a month key
        let series = extract(&sheet);
        assert_eq!(series.len(), 5);
    }
}
