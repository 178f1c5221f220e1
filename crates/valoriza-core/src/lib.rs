//! # valoriza-core
//!
//! Core domain model and traits for the valoriza report engine.
//!
//! This crate provides:
//! - Input grid types: `Workbook`, `Sheet`, `CellValue`
//! - Domain records: `CostBreakdown`, `ValuationSummary`, `ProgressSeries`,
//!   `ProjectRecord`
//! - The `Renderer` trait and error types
//!
//! ## Example
//!
//! ```rust
//! use valoriza_core::CostBreakdown;
//!
//! let costs = CostBreakdown {
//!     materiales: 100_000.0,
//!     personal_obrero: 50_000.0,
//!     planilla_staff: 20_000.0,
//!     otros_gg: 5_000.0,
//!     ..CostBreakdown::default()
//! };
//! assert_eq!(costs.total_cd(), 150_000.0);
//! assert_eq!(costs.total_gg(), 25_000.0);
//! ```

pub mod workbook;

pub use workbook::{excel_serial_to_datetime, CellValue, Sheet, Workbook};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Cost Breakdown
// ============================================================================

/// Executed costs scraped from the results sheet, split into the five
/// direct-cost categories plus the two overhead buckets.
///
/// Totals are always recomputed from the constituent fields; the sheet's own
/// total rows are never trusted.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub personal_obrero: f64,
    pub materiales: f64,
    pub alquileres: f64,
    pub subcontratos: f64,
    pub costos_varios: f64,
    pub planilla_staff: f64,
    pub otros_gg: f64,
}

impl CostBreakdown {
    /// Total direct cost: sum of the five execution categories.
    pub fn total_cd(&self) -> f64 {
        self.personal_obrero
            + self.materiales
            + self.alquileres
            + self.subcontratos
            + self.costos_varios
    }

    /// Total overhead: staff payroll plus other general expenses.
    pub fn total_gg(&self) -> f64 {
        self.planilla_staff + self.otros_gg
    }
}

// ============================================================================
// Valuation Summary
// ============================================================================

/// Billed-amount summary scraped from the valuation sheet.
///
/// Amounts and their percentage counterparts are kept mutually consistent by
/// [`ValuationSummary::reconcile`], which must run once after scanning.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationSummary {
    pub costo_directo: f64,
    pub gastos_generales: f64,
    /// Overhead as a percentage of direct cost (e.g. 12.5 for 12.5%).
    pub gg_percent: f64,
    pub utilidad: f64,
    /// Profit as a percentage of direct cost.
    pub util_percent: f64,
    pub total_valorizacion: f64,
}

impl ValuationSummary {
    /// Two-way repair between amounts and percentages.
    ///
    /// Derivation triggers only when the stored value is exactly zero, so a
    /// scraped amount always wins over a scraped percentage and vice versa.
    /// A legitimate 0% entry with a known base amount is rewritten by this
    /// pass; that asymmetry matches the source workbooks' conventions.
    pub fn reconcile(&mut self) {
        if self.costo_directo > 0.0 {
            if self.gastos_generales == 0.0 && self.gg_percent > 0.0 {
                self.gastos_generales = self.costo_directo * (self.gg_percent / 100.0);
            }
            if self.utilidad == 0.0 && self.util_percent > 0.0 {
                self.utilidad = self.costo_directo * (self.util_percent / 100.0);
            }
            if self.gg_percent == 0.0 {
                self.gg_percent = self.gastos_generales / self.costo_directo * 100.0;
            }
            if self.util_percent == 0.0 {
                self.util_percent = self.utilidad / self.costo_directo * 100.0;
            }
        }
    }
}

// ============================================================================
// Progress Series
// ============================================================================

/// One month of cumulative progress in a series.
///
/// Percentages are stored as fractions of 1.0, exactly as they appear in the
/// source cells; display scaling is the renderer's concern.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MonthPoint {
    /// Month label as written in the sheet (e.g. "SET 2025", "INICIO 5/9/2025").
    pub mes: String,
    pub parcial: f64,
    pub acumulado: f64,
    pub parcial_pct: f64,
    pub acum_pct: f64,
}

/// The project's S-curve data: contractual (planned), valorizado (executed)
/// and optionally proyectado (forecast) month series.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSeries {
    pub contractual: Vec<MonthPoint>,
    pub valorizado: Vec<MonthPoint>,
    pub proyectado: Option<Vec<MonthPoint>>,
    /// Index of the last month with nonzero executed data. `None` when the
    /// sheet carries no executed amounts at all.
    pub mes_actual: Option<usize>,
    /// Grand contractual total. Falls back to the last contractual
    /// `acumulado` when the sheet has no TOTAL row.
    pub total: f64,
}

impl ProgressSeries {
    /// Number of months in the series.
    pub fn len(&self) -> usize {
        self.contractual.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contractual.is_empty()
    }

    pub fn has_proyectado(&self) -> bool {
        self.proyectado.as_ref().is_some_and(|p| !p.is_empty())
    }

    /// Last index of the report window: two months past the current month,
    /// clipped to the series length. Without a current month the window
    /// spans the whole series.
    pub fn zoom_end(&self) -> usize {
        let last = self.len().saturating_sub(1);
        match self.mes_actual {
            Some(idx) => (idx + 2).min(last),
            None => last,
        }
    }

    /// Whether cumulative values within the contractual series never
    /// decrease. Scraped curves occasionally violate this; callers treat it
    /// as a warning, not an error.
    pub fn is_cumulative_monotonic(&self) -> bool {
        self.contractual.windows(2).all(|w| {
            w[1].acumulado >= w[0].acumulado && w[1].acum_pct >= w[0].acum_pct
        })
    }
}

// ============================================================================
// Project Record
// ============================================================================

/// Everything extracted from one workbook: the input to the renderer.
///
/// Constructed once per extraction and immutable afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectRecord {
    pub res_costo: CostBreakdown,
    pub rval: ValuationSummary,
    pub curva: Option<ProgressSeries>,
    pub project_name: String,
    pub short_name: String,
    pub date: NaiveDateTime,
    pub author: String,
}

/// Known project codenames, matched against the long project name to derive
/// a short display name. First match wins.
pub const PROJECT_CODENAMES: [&str; 8] = [
    "ALMA MATER",
    "MARA",
    "CENEPA",
    "BEETHOVEN",
    "BIOMEDICAS",
    "BIOMEDIC",
    "FRANKLIN",
    "ROOSEVELT",
];

/// Derive the short display name for a project.
///
/// Matches the long name against [`PROJECT_CODENAMES`] (case-insensitive
/// substring); otherwise truncates to 30 characters. Empty input yields the
/// generic "PROYECTO".
pub fn short_project_name(full_name: &str) -> String {
    let upper = full_name.to_uppercase();
    for code in PROJECT_CODENAMES {
        if upper.contains(code) {
            return code.to_string();
        }
    }
    if full_name.is_empty() {
        "PROYECTO".to_string()
    } else {
        full_name.chars().take(30).collect()
    }
}

// ============================================================================
// Traits
// ============================================================================

/// Output rendering seam: a pure transformation of a [`ProjectRecord`].
pub trait Renderer {
    type Output;

    fn render(&self, record: &ProjectRecord) -> Result<Self::Output, RenderError>;
}

// ============================================================================
// Errors
// ============================================================================

/// Rendering error. The HTML renderer recovers degenerate chart input with
/// placeholders, so in practice this surfaces only from misuse of the seam.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Format error: {0}")]
    Format(String),
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn month(mes: &str, acumulado: f64, acum_pct: f64) -> MonthPoint {
        MonthPoint {
            mes: mes.into(),
            parcial: 0.0,
            acumulado,
            parcial_pct: 0.0,
            acum_pct,
        }
    }

    #[test]
    fn cost_breakdown_totals_recomputed() {
        let costs = CostBreakdown {
            materiales: 100_000.0,
            alquileres: 0.0,
            subcontratos: 0.0,
            costos_varios: 0.0,
            personal_obrero: 50_000.0,
            planilla_staff: 20_000.0,
            otros_gg: 5_000.0,
        };
        assert_eq!(costs.total_cd(), 150_000.0);
        assert_eq!(costs.total_gg(), 25_000.0);
    }

    #[test]
    fn cost_breakdown_empty_totals_zero() {
        let costs = CostBreakdown::default();
        assert_eq!(costs.total_cd(), 0.0);
        assert_eq!(costs.total_gg(), 0.0);
    }

    #[test]
    fn reconcile_derives_percent_from_amount() {
        let mut rval = ValuationSummary {
            costo_directo: 150_000.0,
            gastos_generales: 25_000.0,
            gg_percent: 0.0,
            utilidad: 15_000.0,
            util_percent: 10.0,
            total_valorizacion: 0.0,
        };
        rval.reconcile();
        assert!((rval.gg_percent - 16.666_666).abs() < 0.001);
        assert_eq!(rval.util_percent, 10.0);
    }

    #[test]
    fn reconcile_derives_amount_from_percent() {
        let mut rval = ValuationSummary {
            costo_directo: 200_000.0,
            gg_percent: 12.5,
            util_percent: 8.0,
            ..ValuationSummary::default()
        };
        rval.reconcile();
        assert_eq!(rval.gastos_generales, 25_000.0);
        assert_eq!(rval.utilidad, 16_000.0);
    }

    #[test]
    fn reconcile_scraped_amount_wins_over_percent() {
        // Both present: nothing is derived, consistency is not forced.
        let mut rval = ValuationSummary {
            costo_directo: 100_000.0,
            gastos_generales: 9_000.0,
            gg_percent: 12.0,
            ..ValuationSummary::default()
        };
        rval.reconcile();
        assert_eq!(rval.gastos_generales, 9_000.0);
        assert_eq!(rval.gg_percent, 12.0);
    }

    #[test]
    fn reconcile_without_base_is_a_no_op() {
        let mut rval = ValuationSummary {
            gg_percent: 12.0,
            ..ValuationSummary::default()
        };
        rval.reconcile();
        assert_eq!(rval.gastos_generales, 0.0);
    }

    #[test]
    fn reconcile_overwrites_true_zero_percent() {
        // Known asymmetry: an explicit 0% with a known amount is rewritten.
        let mut rval = ValuationSummary {
            costo_directo: 100_000.0,
            gastos_generales: 8_000.0,
            gg_percent: 0.0,
            ..ValuationSummary::default()
        };
        rval.reconcile();
        assert_eq!(rval.gg_percent, 8.0);
    }

    #[test]
    fn progress_series_zoom_end_clips_to_length() {
        let series = ProgressSeries {
            contractual: vec![
                month("INICIO", 0.0, 0.0),
                month("SET", 10.0, 0.1),
                month("OCT", 30.0, 0.3),
                month("NOV", 60.0, 0.6),
                month("DIC", 100.0, 1.0),
            ],
            mes_actual: Some(1),
            ..ProgressSeries::default()
        };
        assert_eq!(series.zoom_end(), 3);

        let near_end = ProgressSeries {
            mes_actual: Some(4),
            ..series.clone()
        };
        assert_eq!(near_end.zoom_end(), 4);

        let no_current = ProgressSeries {
            mes_actual: None,
            ..series
        };
        assert_eq!(no_current.zoom_end(), 4);
    }

    #[test]
    fn progress_series_monotonicity() {
        let good = ProgressSeries {
            contractual: vec![
                month("SET", 10.0, 0.1),
                month("OCT", 30.0, 0.3),
                month("NOV", 30.0, 0.3),
            ],
            ..ProgressSeries::default()
        };
        assert!(good.is_cumulative_monotonic());

        let bad = ProgressSeries {
            contractual: vec![month("SET", 30.0, 0.3), month("OCT", 10.0, 0.1)],
            ..ProgressSeries::default()
        };
        assert!(!bad.is_cumulative_monotonic());
    }

    #[test]
    fn short_name_matches_codename() {
        assert_eq!(
            short_project_name("EDIFICIO MULTIFAMILIAR BEETHOVEN - ETAPA II"),
            "BEETHOVEN"
        );
        assert_eq!(short_project_name("obra cenepa norte"), "CENEPA");
    }

    #[test]
    fn short_name_truncates_unknown() {
        let long = "REMODELACION INTEGRAL DE OFICINAS ADMINISTRATIVAS";
        let short = short_project_name(long);
        assert_eq!(short.chars().count(), 30);
        assert!(long.starts_with(&short));
    }

    #[test]
    fn short_name_empty_falls_back() {
        assert_eq!(short_project_name(""), "PROYECTO");
    }

    #[test]
    fn has_proyectado_requires_points() {
        let mut series = ProgressSeries::default();
        assert!(!series.has_proyectado());
        series.proyectado = Some(Vec::new());
        assert!(!series.has_proyectado());
        series.proyectado = Some(vec![month("SET", 1.0, 0.01)]);
        assert!(series.has_proyectado());
    }
}
