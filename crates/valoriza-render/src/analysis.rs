//! Comparative metrics computed for the report tables.

use valoriza_core::{ProjectRecord, ValuationSummary};

/// Peruvian sales tax applied to the valuation subtotal.
pub const IGV_RATE: f64 = 0.18;

/// Whether a variance favors the contractor. Zero counts as gain.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VarianceState {
    Gain,
    Loss,
}

impl std::fmt::Display for VarianceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VarianceState::Gain => write!(f, "GANANCIA"),
            VarianceState::Loss => write!(f, "PÉRDIDA"),
        }
    }
}

/// Valorized (billed) amount against the executed (spent) amount for one
/// concept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Comparison {
    pub valorizado: f64,
    pub ejecutado: f64,
}

impl Comparison {
    pub fn new(valorizado: f64, ejecutado: f64) -> Self {
        Self { valorizado, ejecutado }
    }

    pub fn variance(&self) -> f64 {
        self.valorizado - self.ejecutado
    }

    /// Variance relative to the executed amount, guarded against a zero base.
    pub fn variance_pct(&self) -> f64 {
        if self.ejecutado == 0.0 {
            0.0
        } else {
            self.variance() / self.ejecutado * 100.0
        }
    }

    pub fn state(&self) -> VarianceState {
        if self.variance() >= 0.0 {
            VarianceState::Gain
        } else {
            VarianceState::Loss
        }
    }
}

/// The tri-row comparison: direct cost, overhead, and their combined total.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComparativeAnalysis {
    pub costo_directo: Comparison,
    pub gastos_generales: Comparison,
}

impl ComparativeAnalysis {
    pub fn from_record(record: &ProjectRecord) -> Self {
        Self {
            costo_directo: Comparison::new(
                record.rval.costo_directo,
                record.res_costo.total_cd(),
            ),
            gastos_generales: Comparison::new(
                record.rval.gastos_generales,
                record.res_costo.total_gg(),
            ),
        }
    }

    pub fn total(&self) -> Comparison {
        Comparison::new(
            self.costo_directo.valorizado + self.gastos_generales.valorizado,
            self.costo_directo.ejecutado + self.gastos_generales.ejecutado,
        )
    }
}

/// Valuation-cut totals: subtotal, tax and grand total.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ValuationCut {
    pub subtotal: f64,
    pub igv: f64,
    pub total: f64,
}

pub fn valuation_cut(rval: &ValuationSummary) -> ValuationCut {
    let subtotal = rval.costo_directo + rval.gastos_generales + rval.utilidad;
    let igv = subtotal * IGV_RATE;
    ValuationCut {
        subtotal,
        igv,
        total: subtotal + igv,
    }
}
