//! # valoriza-render
//!
//! Report rendering for valoriza.
//!
//! This crate provides:
//! - Comparative analysis metrics (variance, gain/loss, IGV)
//! - The S-curve SVG chart with anti-collision value labels
//! - Standalone two-page HTML assembly with embedded styles
//! - Suggested-filename derivation
//!
//! ## Example
//!
//! ```rust,ignore
//! use valoriza_core::Renderer;
//! use valoriza_render::HtmlReportRenderer;
//!
//! let renderer = HtmlReportRenderer::new();
//! let report = renderer.render(&record)?;
//! std::fs::write(&report.suggested_name, &report.document)?;
//! ```

pub mod analysis;
mod chart;
pub mod format;
pub mod layout;
mod pages;

pub use analysis::{ComparativeAnalysis, Comparison, ValuationCut, VarianceState, IGV_RATE};

use valoriza_core::{ProjectRecord, RenderError, Renderer};

/// A rendered report: the standalone document plus the name the caller
/// should store it under.
#[derive(Clone, Debug)]
pub struct Report {
    pub document: String,
    pub suggested_name: String,
}

/// Color palette for the report. Series colors are shared between the
/// chart, the summary cards and the detail table so the pages read as one
/// piece.
#[derive(Clone, Debug)]
pub struct ReportTheme {
    /// Contractual (planned) series.
    pub contractual_color: String,
    /// Valorized (executed) series.
    pub executed_color: String,
    /// Forecast series.
    pub forecast_color: String,
    /// Deviation bracket and loss values.
    pub danger_color: String,
    /// Current-month band fill.
    pub highlight_fill: String,
    /// Current-month band border.
    pub highlight_border: String,
    /// Current-month label text.
    pub highlight_text: String,
    /// Forecast zone background.
    pub forecast_zone_fill: String,
}

impl Default for ReportTheme {
    fn default() -> Self {
        Self {
            contractual_color: "#2c5aa0".into(),
            executed_color: "#28a745".into(),
            forecast_color: "#e6a817".into(),
            danger_color: "#dc3545".into(),
            highlight_fill: "#fff3cd".into(),
            highlight_border: "#d4a017".into(),
            highlight_text: "#856404".into(),
            forecast_zone_fill: "#f5f7fb".into(),
        }
    }
}

/// Standalone HTML report renderer configuration.
#[derive(Clone, Debug)]
pub struct HtmlReportRenderer {
    /// Chart viewBox width in pixels.
    pub chart_width: u32,
    /// Chart viewBox height in pixels.
    pub chart_height: u32,
    /// Color palette.
    pub theme: ReportTheme,
}

impl Default for HtmlReportRenderer {
    fn default() -> Self {
        Self {
            chart_width: 730,
            chart_height: 420,
            theme: ReportTheme::default(),
        }
    }
}

impl HtmlReportRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure chart dimensions.
    pub fn chart_size(mut self, width: u32, height: u32) -> Self {
        self.chart_width = width;
        self.chart_height = height;
        self
    }

    /// Use a custom palette.
    pub fn theme(mut self, theme: ReportTheme) -> Self {
        self.theme = theme;
        self
    }
}

impl Renderer for HtmlReportRenderer {
    type Output = Report;

    fn render(&self, record: &ProjectRecord) -> Result<Report, RenderError> {
        let mut body = self.page_valuation(record);
        if let Some(curva) = &record.curva {
            body.push_str(&self.page_curve(record, curva));
        }
        Ok(Report {
            document: pages::wrap_standalone(&body),
            suggested_name: pages::suggested_filename(record),
        })
    }
}
