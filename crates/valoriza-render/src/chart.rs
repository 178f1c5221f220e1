//! S-curve chart construction.
//!
//! The chart plots cumulative percentage over the report window: contractual
//! and executed lines with gradient area fills, an optional forecast line,
//! a highlighted current-month band and a forecast zone past it. Value
//! badges at the current month go through the relaxation layout so they
//! never overlap, however close the three series run.

use svg::node::element::{
    Circle, Definitions, Line, LinearGradient, Path, Rectangle, Stop, Text,
};
use svg::Document;
use valoriza_core::{MonthPoint, ProgressSeries};

use crate::format::clean_month_label;
use crate::layout::{spread_badges, ValueBadge, BADGE_MIN_SEP};
use crate::HtmlReportRenderer;

pub(crate) const PLACEHOLDER_INSUFFICIENT: &str = "<p>Datos insuficientes para gráfico</p>";
pub(crate) const PLACEHOLDER_NO_PCT: &str = "<p>Sin datos de porcentaje</p>";

const MARGIN_LEFT: f64 = 50.0;
const MARGIN_RIGHT: f64 = 60.0;
const MARGIN_TOP: f64 = 25.0;
const MARGIN_BOTTOM: f64 = 55.0;
const BADGE_H: f64 = 18.0;

/// One month inside the report window.
pub(crate) struct ZoomPoint<'a> {
    pub prog: &'a MonthPoint,
    pub ejec: Option<&'a MonthPoint>,
    pub plan: Option<&'a MonthPoint>,
    pub is_current: bool,
    pub is_forecast: bool,
}

/// Slice the series down to the report window (see
/// [`ProgressSeries::zoom_end`]) and tag each month's role.
pub(crate) fn zoom_window(series: &ProgressSeries) -> Vec<ZoomPoint<'_>> {
    (0..=series.zoom_end())
        .filter_map(|i| {
            series.contractual.get(i).map(|prog| ZoomPoint {
                prog,
                ejec: series.valorizado.get(i),
                plan: series.proyectado.as_ref().and_then(|p| p.get(i)),
                is_current: series.mes_actual == Some(i),
                is_forecast: series.mes_actual.is_some_and(|m| i > m),
            })
        })
        .collect()
}

/// Vertical axis top: the maximum observed percentage rounded up to the
/// next multiple of 5, plus 2 points of headroom so the highest point never
/// touches the plot edge.
pub(crate) fn y_axis_max(max_pct: f64) -> f64 {
    (max_pct / 5.0).ceil() * 5.0 + 2.0
}

struct PlotPoint {
    x: f64,
    y: f64,
    pct: f64,
}

fn polyline(points: &[PlotPoint]) -> String {
    let mut d = String::new();
    for (i, p) in points.iter().enumerate() {
        let op = if i == 0 { 'M' } else { 'L' };
        d.push_str(&format!("{}{},{} ", op, p.x, p.y));
    }
    d.trim_end().to_string()
}

fn gradient(id: &str, color: &str, top_opacity: f64, bottom_opacity: f64) -> LinearGradient {
    LinearGradient::new()
        .set("id", id)
        .set("x1", 0)
        .set("y1", 0)
        .set("x2", 0)
        .set("y2", 1)
        .add(
            Stop::new()
                .set("offset", "0%")
                .set("stop-color", color)
                .set("stop-opacity", top_opacity),
        )
        .add(
            Stop::new()
                .set("offset", "100%")
                .set("stop-color", color)
                .set("stop-opacity", bottom_opacity),
        )
}

impl HtmlReportRenderer {
    /// Render the S-curve chart for a progress series, or a placeholder
    /// paragraph when the window is too small or carries no percentages.
    pub(crate) fn curve_chart(&self, series: &ProgressSeries) -> String {
        let zoom = zoom_window(series);
        let n = zoom.len();
        if n < 2 {
            return PLACEHOLDER_INSUFFICIENT.to_string();
        }

        let mut max_pct: f64 = 0.0;
        for z in &zoom {
            max_pct = max_pct.max(z.prog.acum_pct * 100.0);
            if let Some(e) = z.ejec {
                max_pct = max_pct.max(e.acum_pct * 100.0);
            }
            if let Some(p) = z.plan {
                max_pct = max_pct.max(p.acum_pct * 100.0);
            }
        }
        let y_max = y_axis_max(max_pct);
        if y_max <= 2.0 {
            return PLACEHOLDER_NO_PCT.to_string();
        }

        let theme = &self.theme;
        let width = f64::from(self.chart_width);
        let height = f64::from(self.chart_height);
        let chart_w = width - MARGIN_LEFT - MARGIN_RIGHT;
        let chart_h = height - MARGIN_TOP - MARGIN_BOTTOM;
        let baseline = MARGIN_TOP + chart_h;
        let x_step = chart_w / (n - 1) as f64;
        let x_pos = |i: usize| MARGIN_LEFT + i as f64 * x_step;
        let y_pos = |pct: f64| MARGIN_TOP + chart_h - (pct / y_max) * chart_h;

        let current = zoom.iter().position(|z| z.is_current);
        let proj_start = zoom.iter().position(|z| z.is_forecast);

        let mut doc = Document::new()
            .set("width", "100%")
            .set("viewBox", format!("0 0 {} {}", self.chart_width, self.chart_height))
            .set("style", "font-family:'Segoe UI',sans-serif")
            .add(
                Definitions::new()
                    .add(gradient("gradProg", &theme.contractual_color, 0.18, 0.02))
                    .add(gradient("gradEjec", &theme.executed_color, 0.12, 0.01)),
            );

        // Current-month band, clipped to the plot area.
        if let Some(ci) = current {
            let rect_x = (x_pos(ci) - x_step / 2.0).max(MARGIN_LEFT);
            let rect_w = (x_pos(ci) + x_step / 2.0).min(MARGIN_LEFT + chart_w) - rect_x;
            doc = doc.add(
                Rectangle::new()
                    .set("x", rect_x)
                    .set("y", MARGIN_TOP)
                    .set("width", rect_w)
                    .set("height", chart_h)
                    .set("fill", theme.highlight_fill.as_str())
                    .set("opacity", 0.45),
            );
        }

        // Forecast zone with its separator and caption.
        if let Some(pi) = proj_start {
            let proj_x = x_pos(pi) - x_step / 2.0;
            doc = doc
                .add(
                    Rectangle::new()
                        .set("x", proj_x)
                        .set("y", MARGIN_TOP)
                        .set("width", MARGIN_LEFT + chart_w - proj_x)
                        .set("height", chart_h)
                        .set("fill", theme.forecast_zone_fill.as_str()),
                )
                .add(
                    Line::new()
                        .set("x1", proj_x)
                        .set("y1", MARGIN_TOP)
                        .set("x2", proj_x)
                        .set("y2", baseline)
                        .set("stroke", "#bbb")
                        .set("stroke-dasharray", "6,3")
                        .set("stroke-width", 1),
                )
                .add(
                    Text::new("PROYECCIÓN")
                        .set("x", (proj_x + MARGIN_LEFT + chart_w) / 2.0)
                        .set("y", MARGIN_TOP + 14.0)
                        .set("text-anchor", "middle")
                        .set("font-size", 10)
                        .set("fill", "#aaa")
                        .set("font-weight", 700)
                        .set("letter-spacing", 1),
                );
        }

        // Grid every 5%, major lines every 10%.
        let mut pct = 0.0;
        while pct <= y_max {
            let y = y_pos(pct);
            let is_major = (pct as i64) % 10 == 0;
            doc = doc
                .add(
                    Line::new()
                        .set("x1", MARGIN_LEFT)
                        .set("y1", y)
                        .set("x2", MARGIN_LEFT + chart_w)
                        .set("y2", y)
                        .set("stroke", if is_major { "#ddd" } else { "#eee" })
                        .set("stroke-width", if is_major { 1.0 } else { 0.5 }),
                )
                .add(
                    Text::new(format!("{}%", pct as i64))
                        .set("x", MARGIN_LEFT - 8.0)
                        .set("y", y + 4.0)
                        .set("text-anchor", "end")
                        .set("font-size", if is_major { 10 } else { 9 })
                        .set("fill", if is_major { "#666" } else { "#aaa" })
                        .set("font-weight", if is_major { 600 } else { 400 }),
                );
            pct += 5.0;
        }

        // Axes.
        doc = doc
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", MARGIN_TOP)
                    .set("x2", MARGIN_LEFT)
                    .set("y2", baseline)
                    .set("stroke", "#ddd")
                    .set("stroke-width", 1),
            )
            .add(
                Line::new()
                    .set("x1", MARGIN_LEFT)
                    .set("y1", baseline)
                    .set("x2", MARGIN_LEFT + chart_w)
                    .set("y2", baseline)
                    .set("stroke", "#bbb")
                    .set("stroke-width", 1),
            );

        // Month labels, split over two lines when the label has two words.
        for (i, z) in zoom.iter().enumerate() {
            let x = x_pos(i);
            let label = clean_month_label(&z.prog.mes);
            let mut parts = label.split_whitespace();
            let color = if Some(i) == current {
                theme.highlight_text.as_str()
            } else if z.is_forecast {
                "#aaa"
            } else {
                "#555"
            };
            let weight = if Some(i) == current { 700 } else { 400 };

            doc = doc.add(
                Line::new()
                    .set("x1", x)
                    .set("y1", baseline)
                    .set("x2", x)
                    .set("y2", baseline + 4.0)
                    .set("stroke", "#bbb"),
            );
            if let Some(first) = parts.next() {
                doc = doc.add(
                    Text::new(first)
                        .set("x", x)
                        .set("y", baseline + 16.0)
                        .set("text-anchor", "middle")
                        .set("font-size", 9.5)
                        .set("fill", color)
                        .set("font-weight", weight),
                );
            }
            if let Some(second) = parts.next() {
                doc = doc.add(
                    Text::new(second)
                        .set("x", x)
                        .set("y", baseline + 27.0)
                        .set("text-anchor", "middle")
                        .set("font-size", 8.5)
                        .set("fill", color)
                        .set("font-weight", weight),
                );
            }
        }

        // Plot points per series. Executed data only exists through the
        // current month; the forecast line skips zero-valued months except
        // the origin.
        let prog_pts: Vec<PlotPoint> = zoom
            .iter()
            .enumerate()
            .map(|(i, z)| {
                let pct = z.prog.acum_pct * 100.0;
                PlotPoint { x: x_pos(i), y: y_pos(pct), pct }
            })
            .collect();

        let ejec_pts: Vec<PlotPoint> = match current {
            Some(ci) => zoom
                .iter()
                .enumerate()
                .take(ci + 1)
                .map(|(i, z)| {
                    let pct = z.ejec.map_or(0.0, |e| e.acum_pct) * 100.0;
                    PlotPoint { x: x_pos(i), y: y_pos(pct), pct }
                })
                .collect(),
            None => Vec::new(),
        };

        let plan_pts: Vec<PlotPoint> = zoom
            .iter()
            .enumerate()
            .filter_map(|(i, z)| {
                let pct = z.plan?.acum_pct * 100.0;
                (pct > 0.0 || i == 0).then(|| PlotPoint {
                    x: x_pos(i),
                    y: y_pos(pct),
                    pct,
                })
            })
            .collect();

        // Area fills; the contractual fill stops at the forecast boundary.
        if prog_pts.len() > 1 {
            let area_end = proj_start.unwrap_or(prog_pts.len()).min(prog_pts.len());
            if area_end > 0 {
                let mut d = format!("M{},{}", prog_pts[0].x, baseline);
                for p in &prog_pts[..area_end] {
                    d.push_str(&format!(" L{},{}", p.x, p.y));
                }
                d.push_str(&format!(" L{},{} Z", prog_pts[area_end - 1].x, baseline));
                doc = doc.add(Path::new().set("d", d).set("fill", "url(#gradProg)"));
            }
        }
        if ejec_pts.len() > 1 {
            let mut d = format!("M{},{}", ejec_pts[0].x, baseline);
            for p in &ejec_pts {
                d.push_str(&format!(" L{},{}", p.x, p.y));
            }
            d.push_str(&format!(
                " L{},{} Z",
                ejec_pts[ejec_pts.len() - 1].x,
                baseline
            ));
            doc = doc.add(Path::new().set("d", d).set("fill", "url(#gradEjec)"));
        }

        // Contractual line: solid up to the forecast boundary, dashed past it.
        if prog_pts.len() > 1 {
            let solid_end = proj_start.unwrap_or(prog_pts.len()).min(prog_pts.len());
            if solid_end > 0 {
                doc = doc.add(
                    Path::new()
                        .set("d", polyline(&prog_pts[..solid_end]))
                        .set("fill", "none")
                        .set("stroke", theme.contractual_color.as_str())
                        .set("stroke-width", 3)
                        .set("stroke-linejoin", "round"),
                );
            }
            if solid_end > 0 && solid_end < prog_pts.len() {
                doc = doc.add(
                    Path::new()
                        .set("d", polyline(&prog_pts[solid_end - 1..]))
                        .set("fill", "none")
                        .set("stroke", theme.contractual_color.as_str())
                        .set("stroke-width", 2.5)
                        .set("stroke-dasharray", "8,5")
                        .set("stroke-linejoin", "round"),
                );
            }
        }

        if ejec_pts.len() > 1 {
            doc = doc.add(
                Path::new()
                    .set("d", polyline(&ejec_pts))
                    .set("fill", "none")
                    .set("stroke", theme.executed_color.as_str())
                    .set("stroke-width", 3)
                    .set("stroke-linejoin", "round"),
            );
        }

        if plan_pts.len() > 1 {
            doc = doc.add(
                Path::new()
                    .set("d", polyline(&plan_pts))
                    .set("fill", "none")
                    .set("stroke", theme.forecast_color.as_str())
                    .set("stroke-width", 2.5)
                    .set("stroke-dasharray", "8,5")
                    .set("stroke-linejoin", "round"),
            );
        }

        // Point markers, with the current month emphasized.
        for (i, p) in prog_pts.iter().enumerate() {
            let is_current = Some(i) == current;
            let mut circle = Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", if is_current { 7.0 } else { 4.5 })
                .set("fill", theme.contractual_color.as_str())
                .set("opacity", if zoom[i].is_forecast { 0.45 } else { 1.0 });
            if is_current {
                circle = circle.set("stroke", "white").set("stroke-width", 3);
            }
            doc = doc.add(circle);
        }
        for (i, p) in ejec_pts.iter().enumerate() {
            let is_current = Some(i) == current;
            let mut circle = Circle::new()
                .set("cx", p.x)
                .set("cy", p.y)
                .set("r", if is_current { 7.0 } else { 4.5 })
                .set("fill", theme.executed_color.as_str());
            if is_current {
                circle = circle.set("stroke", "white").set("stroke-width", 3);
            }
            doc = doc.add(circle);
        }
        for p in &plan_pts {
            doc = doc.add(
                Circle::new()
                    .set("cx", p.x)
                    .set("cy", p.y)
                    .set("r", 4.5)
                    .set("fill", theme.forecast_color.as_str()),
            );
        }

        if let Some(ci) = current {
            doc = self.current_month_annotations(doc, &zoom, ci, x_pos(ci), &y_pos, baseline);
        }

        // Faded percentage labels over the forecast months.
        for (i, z) in zoom.iter().enumerate() {
            if z.is_forecast {
                let p = &prog_pts[i];
                doc = doc
                    .add(
                        Rectangle::new()
                            .set("x", p.x - 22.0)
                            .set("y", p.y - 20.0)
                            .set("width", 44)
                            .set("height", 16)
                            .set("rx", 3)
                            .set("fill", theme.contractual_color.as_str())
                            .set("opacity", 0.25),
                    )
                    .add(
                        Text::new(format!("{:.1}%", p.pct))
                            .set("x", p.x)
                            .set("y", p.y - 9.0)
                            .set("text-anchor", "middle")
                            .set("font-size", 9.5)
                            .set("fill", theme.contractual_color.as_str())
                            .set("opacity", 0.8)
                            .set("font-weight", 600),
                    );
            }
        }

        doc.to_string()
    }

    /// Deviation bracket, value badges and the "HOY" marker at the current
    /// month column.
    fn current_month_annotations(
        &self,
        mut doc: Document,
        zoom: &[ZoomPoint<'_>],
        ci: usize,
        mx: f64,
        y_pos: &dyn Fn(f64) -> f64,
        baseline: f64,
    ) -> Document {
        let theme = &self.theme;
        let prog_pct = zoom[ci].prog.acum_pct * 100.0;
        let ejec_pct = zoom[ci].ejec.map_or(0.0, |e| e.acum_pct) * 100.0;
        let prog_y = y_pos(prog_pct);
        let ejec_y = y_pos(ejec_pct);
        let deviation = prog_pct - ejec_pct;

        // Bracket between the two points whenever they visibly differ. The
        // sign flips: running behind the contractual curve is a minus.
        if deviation.abs() > 0.01 {
            let y1 = prog_y.min(ejec_y);
            let y2 = prog_y.max(ejec_y);
            let bx = mx - 16.0;
            let stem = [(bx, y1, bx, y2), (bx - 5.0, y1, bx + 5.0, y1), (bx - 5.0, y2, bx + 5.0, y2)];
            for (x1, ly1, x2, ly2) in stem {
                doc = doc.add(
                    Line::new()
                        .set("x1", x1)
                        .set("y1", ly1)
                        .set("x2", x2)
                        .set("y2", ly2)
                        .set("stroke", theme.danger_color.as_str())
                        .set("stroke-width", 2.5),
                );
            }
            let badge_y = (y1 + y2) / 2.0;
            let dev_text = format!(
                "{}{:.2}%",
                if deviation > 0.0 { "-" } else { "+" },
                deviation.abs()
            );
            let dev_badge_w = dev_text.chars().count() as f64 * 6.5 + 10.0;
            doc = doc
                .add(
                    Rectangle::new()
                        .set("x", bx - dev_badge_w + 2.0)
                        .set("y", badge_y - 10.0)
                        .set("width", dev_badge_w)
                        .set("height", 20)
                        .set("rx", 4)
                        .set("fill", "#f8d7da")
                        .set("stroke", theme.danger_color.as_str())
                        .set("stroke-width", 1),
                )
                .add(
                    Text::new(dev_text)
                        .set("x", bx - dev_badge_w / 2.0 + 2.0)
                        .set("y", badge_y + 4.0)
                        .set("text-anchor", "middle")
                        .set("font-size", 10)
                        .set("fill", theme.danger_color.as_str())
                        .set("font-weight", 700),
                );
        }

        // Value badges, spread so they never overlap.
        let badge_x = mx + 12.0;
        let badge_w = 52.0;
        let mut badges = vec![
            ValueBadge::new(
                prog_y,
                theme.contractual_color.clone(),
                format!("{:.2}%", prog_pct),
            ),
            ValueBadge::new(
                ejec_y,
                theme.executed_color.clone(),
                format!("{:.2}%", ejec_pct),
            ),
        ];
        if let Some(plan) = zoom[ci].plan {
            let plan_pct = plan.acum_pct * 100.0;
            badges.push(ValueBadge::new(
                y_pos(plan_pct),
                theme.forecast_color.clone(),
                format!("{:.2}%", plan_pct),
            ));
        }
        spread_badges(&mut badges, BADGE_MIN_SEP);

        for b in &badges {
            doc = doc
                .add(
                    Rectangle::new()
                        .set("x", badge_x)
                        .set("y", b.y - 9.0)
                        .set("width", badge_w)
                        .set("height", BADGE_H)
                        .set("rx", 4)
                        .set("fill", b.color.as_str()),
                )
                .add(
                    Text::new(b.text.as_str())
                        .set("x", badge_x + badge_w / 2.0)
                        .set("y", b.y + 4.0)
                        .set("text-anchor", "middle")
                        .set("font-size", 10)
                        .set("fill", "white")
                        .set("font-weight", 700),
                );
        }

        doc.add(
            Rectangle::new()
                .set("x", mx - 16.0)
                .set("y", baseline + 34.0)
                .set("width", 32)
                .set("height", 18)
                .set("rx", 5)
                .set("fill", theme.highlight_fill.as_str())
                .set("stroke", theme.highlight_border.as_str())
                .set("stroke-width", 1.2),
        )
        .add(
            Text::new("HOY")
                .set("x", mx)
                .set("y", baseline + 46.0)
                .set("text-anchor", "middle")
                .set("font-size", 10)
                .set("fill", theme.highlight_text.as_str())
                .set("font-weight", 700),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use valoriza_core::ProgressSeries;

    fn point(mes: &str, acum_pct: f64) -> MonthPoint {
        MonthPoint {
            mes: mes.into(),
            parcial: 0.0,
            acumulado: acum_pct * 500_000.0,
            parcial_pct: 0.0,
            acum_pct,
        }
    }

    fn sample_series() -> ProgressSeries {
        ProgressSeries {
            contractual: vec![
                point("INICIO 5/9/2025", 0.0),
                point("SET 2025", 0.10),
                point("OCT 2025", 0.30),
                point("NOV 2025", 0.60),
                point("DIC 2025", 1.00),
            ],
            valorizado: vec![
                point("INICIO", 0.0),
                point("SET 2025", 0.09),
                point("OCT 2025", 0.27),
                point("NOV 2025", 0.0),
                point("DIC 2025", 0.0),
            ],
            proyectado: None,
            mes_actual: Some(2),
            total: 500_000.0,
        }
    }

    #[test]
    fn y_axis_scale_properties() {
        for max_pct in [0.1, 3.0, 19.9, 20.0, 37.5, 99.0, 100.0] {
            let y_max = y_axis_max(max_pct);
            assert_eq!((y_max - 2.0) % 5.0, 0.0, "rounded to a multiple of 5");
            assert!(y_max >= max_pct + 2.0, "headroom above the data");
        }
        assert_eq!(y_axis_max(20.0), 22.0);
        assert_eq!(y_axis_max(21.0), 27.0);
    }

    #[test]
    fn zoom_window_covers_two_months_past_current() {
        let series = sample_series();
        let zoom = zoom_window(&series);
        assert_eq!(zoom.len(), 5); // current=2, so 0..=4
        assert!(zoom[2].is_current);
        assert!(zoom[3].is_forecast);
        assert!(zoom[4].is_forecast);
    }

    #[test]
    fn zoom_window_without_current_spans_series() {
        let mut series = sample_series();
        series.mes_actual = None;
        let zoom = zoom_window(&series);
        assert_eq!(zoom.len(), 5);
        assert!(zoom.iter().all(|z| !z.is_current && !z.is_forecast));
    }

    #[test]
    fn chart_marks_zones_and_today() {
        let renderer = HtmlReportRenderer::new();
        let svg = renderer.curve_chart(&sample_series());
        assert!(svg.contains("<svg"));
        assert!(svg.contains("PROYECCIÓN"));
        assert!(svg.contains("HOY"));
        assert!(svg.contains("url(#gradProg)"));
        assert!(svg.contains("stroke-dasharray"));
    }

    #[test]
    fn single_point_yields_placeholder() {
        let series = ProgressSeries {
            contractual: vec![point("SET 2025", 0.10)],
            valorizado: vec![point("SET 2025", 0.09)],
            mes_actual: Some(0),
            ..ProgressSeries::default()
        };
        let renderer = HtmlReportRenderer::new();
        assert_eq!(renderer.curve_chart(&series), PLACEHOLDER_INSUFFICIENT);
    }

    #[test]
    fn flat_zero_series_yields_placeholder() {
        let series = ProgressSeries {
            contractual: vec![point("SET 2025", 0.0), point("OCT 2025", 0.0)],
            valorizado: vec![point("SET 2025", 0.0), point("OCT 2025", 0.0)],
            mes_actual: Some(1),
            ..ProgressSeries::default()
        };
        let renderer = HtmlReportRenderer::new();
        assert_eq!(renderer.curve_chart(&series), PLACEHOLDER_NO_PCT);
    }

    #[test]
    fn forecast_line_rendered_when_present() {
        let mut series = sample_series();
        series.proyectado = Some(vec![
            point("INICIO", 0.0),
            point("SET 2025", 0.095),
            point("OCT 2025", 0.28),
            point("NOV 2025", 0.55),
            point("DIC 2025", 0.90),
        ]);
        let renderer = HtmlReportRenderer::new();
        let svg = renderer.curve_chart(&series);
        assert!(svg.contains(&renderer.theme.forecast_color));
    }

    #[test]
    fn no_executed_data_skips_annotations() {
        let mut series = sample_series();
        series.mes_actual = None;
        let renderer = HtmlReportRenderer::new();
        let svg = renderer.curve_chart(&series);
        assert!(!svg.contains("HOY"));
        assert!(!svg.contains("PROYECCIÓN"));
    }
}
