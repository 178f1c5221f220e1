//! Report page assembly.
//!
//! Two A4 pages: the valuation/comparative page (always present) and the
//! S-curve page (only when the workbook supplied a progress series). The
//! document is standalone: all styles embedded, no external assets.

use valoriza_core::{ProgressSeries, ProjectRecord};

use crate::analysis::{valuation_cut, Comparison, ComparativeAnalysis};
use crate::chart::zoom_window;
use crate::format::{
    clean_month_label, fmt_fraction_pct, fmt_money, format_date_long, format_date_short,
    html_escape,
};
use crate::HtmlReportRenderer;

/// Form code carried in the report header and the suggested filename.
const REPORT_CODE: &str = "COS-PR02-FR02";

impl HtmlReportRenderer {
    /// Page 1: valuation cut, executed cost breakdowns and the comparative
    /// analysis.
    pub(crate) fn page_valuation(&self, record: &ProjectRecord) -> String {
        let rc = &record.res_costo;
        let rv = &record.rval;
        let cut = valuation_cut(rv);
        let analysis = ComparativeAnalysis::from_record(record);
        let total = analysis.total();

        let cd_items = [
            ("Costo de Materiales", rc.materiales),
            ("Costo de Alquileres", rc.alquileres),
            ("Costo de Subcontratos", rc.subcontratos),
            ("Costo Varios", rc.costos_varios),
            ("Costo Personal Obrero", rc.personal_obrero),
        ];
        let gg_items = [
            ("Planilla Staff", rc.planilla_staff),
            ("Otros Gastos Generales", rc.otros_gg),
        ];

        let cd_rows: String = cd_items
            .iter()
            .map(|(name, value)| breakdown_row(name, *value, rc.total_cd()))
            .collect();
        let gg_rows: String = gg_items
            .iter()
            .map(|(name, value)| breakdown_row(name, *value, rc.total_gg()))
            .collect();

        let cards = [
            variance_card("COSTO DIRECTO", &analysis.costo_directo),
            variance_card("GASTOS GENERALES", &analysis.gastos_generales),
            variance_card("VARIACIÓN TOTAL", &total),
        ]
        .concat();

        let comp_rows = [
            comparison_row("Costo Directo", &analysis.costo_directo, false),
            comparison_row("Gastos Generales", &analysis.gastos_generales, false),
            comparison_row("TOTAL", &total, true),
        ]
        .concat();

        format!(
            r#"
    <div class="page">
        {header}

        <div class="section-title"><span class="numero">1</span>CORTE DE VALORIZACIÓN</div>
        <table>
            <thead><tr><th>Concepto</th><th class="num">Monto (S/)</th><th class="num">Porcentaje</th></tr></thead>
            <tbody>
                <tr><td>Costo Directo</td><td class="num">{cd}</td><td class="num">100.00%</td></tr>
                <tr><td>Gastos Generales</td><td class="num">{gg}</td><td class="num">{gg_pct:.2}%</td></tr>
                <tr><td>Utilidad</td><td class="num">{util}</td><td class="num">{util_pct:.2}%</td></tr>
                <tr><td>Sub Total</td><td class="num">{subtotal}</td><td class="num">&mdash;</td></tr>
                <tr><td>IGV</td><td class="num">{igv}</td><td class="num">18.00%</td></tr>
                <tr class="total-row"><td><strong>Total Valorización</strong></td><td class="num"><strong>{total_igv}</strong></td><td class="num">&mdash;</td></tr>
            </tbody>
        </table>

        <div class="two-columns">
            <div>
                <div class="section-title"><span class="numero">2</span>GASTOS EJECUTADOS - COSTO DIRECTO</div>
                <table>
                    <thead><tr><th>Concepto</th><th class="num">Monto (S/)</th><th class="num">%</th></tr></thead>
                    <tbody>
                        {cd_rows}
                        <tr class="total-row"><td><strong>TOTAL CD EJECUTADO</strong></td><td class="num"><strong>{total_cd}</strong></td><td class="num"><strong>100.00%</strong></td></tr>
                    </tbody>
                </table>
            </div>
            <div>
                <div class="section-title"><span class="numero">3</span>GASTOS GENERALES EJECUTADOS</div>
                <table>
                    <thead><tr><th>Concepto</th><th class="num">Monto (S/)</th><th class="num">%</th></tr></thead>
                    <tbody>
                        {gg_rows}
                        <tr class="total-row"><td><strong>TOTAL GG EJECUTADOS</strong></td><td class="num"><strong>{total_gg}</strong></td><td class="num"><strong>100.00%</strong></td></tr>
                    </tbody>
                </table>
            </div>
        </div>

        <div class="section-title"><span class="numero">4</span>ANÁLISIS COMPARATIVO - VALORIZACIÓN VS GASTOS EJECUTADOS</div>
        <div class="cards-container">
            {cards}
        </div>
        <table class="tabla-comparativa">
            <thead><tr>
                <th>Concepto</th><th class="num">Valorización (S/)</th><th class="num">Ejecutado (S/)</th>
                <th class="num">Variación (S/)</th><th class="num">Var. (%)</th><th style="text-align:center">Estado</th>
            </tr></thead>
            <tbody>
                {comp_rows}
            </tbody>
        </table>
    </div>"#,
            header = page_header(
                &format!("{REPORT_CODE} REPORTE DE VALORIZACIÓN SEMANAL"),
                "Análisis Comparativo: Valorización vs Gastos Ejecutados",
                record,
            ),
            cd = fmt_money(rv.costo_directo),
            gg = fmt_money(rv.gastos_generales),
            gg_pct = rv.gg_percent,
            util = fmt_money(rv.utilidad),
            util_pct = rv.util_percent,
            subtotal = fmt_money(cut.subtotal),
            igv = fmt_money(cut.igv),
            total_igv = fmt_money(cut.total),
            cd_rows = cd_rows,
            total_cd = fmt_money(rc.total_cd()),
            gg_rows = gg_rows,
            total_gg = fmt_money(rc.total_gg()),
            cards = cards,
            comp_rows = comp_rows,
        )
    }

    /// Page 2: S-curve chart, summary cards and the monthly detail table.
    pub(crate) fn page_curve(&self, record: &ProjectRecord, curva: &ProgressSeries) -> String {
        let theme = &self.theme;
        let zoom = zoom_window(curva);
        let has_plan = curva.has_proyectado();

        // Cards show the current month; with no executed data yet they fall
        // back to the last month on record.
        let card_idx = curva
            .mes_actual
            .unwrap_or_else(|| curva.len().saturating_sub(1));
        let prog_actual = curva.contractual.get(card_idx);
        let ejec_actual = curva.valorizado.get(card_idx);
        let plan_actual = if has_plan {
            curva
                .proyectado
                .as_ref()
                .and_then(|plan| plan.get(card_idx))
        } else {
            None
        };

        let last_zoom_mes = curva
            .contractual
            .get(curva.zoom_end())
            .map(|p| clean_month_label(&p.mes))
            .unwrap_or_default();

        let svg_chart = self.curve_chart(curva);

        let (plan_pct, plan_amt, plan_class, plan_style, plan_label_color, plan_value_color, plan_label) =
            match plan_actual {
                Some(plan) => (
                    fmt_fraction_pct(plan.acum_pct),
                    format!("S/ {}", fmt_money(plan.acumulado)),
                    "plan",
                    "",
                    theme.highlight_text.as_str(),
                    theme.highlight_text.as_str(),
                    "Proyectado Acum.",
                ),
                None => (
                    "N/D".to_string(),
                    "Sin datos".to_string(),
                    "prog",
                    r#" style="opacity:0.5""#,
                    "#666",
                    "#999",
                    "Proyectado",
                ),
            };

        let cards = format!(
            r#"
    <div class="summary-cards-curva">
        <div class="summary-card-curva prog">
            <div class="card-label" style="color:{prog_color}">Contractual Acum.</div>
            <div class="card-pct" style="color:{prog_color}">{prog_pct}</div>
            <div class="card-amt" style="color:{prog_color}">S/ {prog_amt}</div>
        </div>
        <div class="summary-card-curva ejec">
            <div class="card-label" style="color:#155724">Valorizado Acum.</div>
            <div class="card-pct" style="color:#155724">{ejec_pct}</div>
            <div class="card-amt" style="color:#155724">S/ {ejec_amt}</div>
        </div>
        <div class="summary-card-curva {plan_class}"{plan_style}>
            <div class="card-label" style="color:{plan_label_color}">{plan_label}</div>
            <div class="card-pct" style="color:{plan_value_color}">{plan_pct}</div>
            <div class="card-amt" style="color:{plan_value_color}">{plan_amt}</div>
        </div>
    </div>"#,
            prog_color = theme.contractual_color,
            prog_pct = prog_actual.map_or_else(|| "N/D".to_string(), |p| fmt_fraction_pct(p.acum_pct)),
            prog_amt = prog_actual.map_or_else(|| "0.00".to_string(), |p| fmt_money(p.acumulado)),
            ejec_pct = ejec_actual.map_or_else(|| "N/D".to_string(), |p| fmt_fraction_pct(p.acum_pct)),
            ejec_amt = ejec_actual.map_or_else(|| "0.00".to_string(), |p| fmt_money(p.acumulado)),
        );

        let table_rows: String = zoom
            .iter()
            .map(|z| {
                let row_class = if z.is_current {
                    "mes-actual"
                } else if z.is_forecast {
                    "mes-proyeccion"
                } else {
                    ""
                };
                let marker = if z.is_current {
                    format!(r#"<span style="color:{}">&#9679;</span> "#, theme.highlight_border)
                } else {
                    String::new()
                };

                const DASH: &str = r#"<span class="dash">&mdash;</span>"#;
                let (ejec_parcial, ejec_acum_pct, plan_parcial, plan_acum_pct) = if z.is_forecast {
                    (DASH.to_string(), DASH.to_string(), DASH.to_string(), DASH.to_string())
                } else {
                    let (pp, pa) = match z.plan.filter(|_| has_plan) {
                        Some(plan) => (fmt_money(plan.parcial), fmt_fraction_pct(plan.acum_pct)),
                        None => (DASH.to_string(), DASH.to_string()),
                    };
                    (
                        z.ejec.map_or_else(|| DASH.to_string(), |e| fmt_money(e.parcial)),
                        z.ejec.map_or_else(|| DASH.to_string(), |e| fmt_fraction_pct(e.acum_pct)),
                        pp,
                        pa,
                    )
                };

                let highlight = |color: &str| {
                    if z.is_current {
                        format!("color:{color};font-weight:700")
                    } else {
                        String::new()
                    }
                };

                format!(
                    r#"
        <tr class="{row_class}">
            <td>{marker}{mes}</td>
            <td class="num">{prog_parcial}</td>
            <td class="num" style="{prog_style}">{prog_acum_pct}</td>
            <td class="num">{ejec_parcial}</td>
            <td class="num" style="{ejec_style}">{ejec_acum_pct}</td>
            <td class="num">{plan_parcial}</td>
            <td class="num" style="{plan_style}">{plan_acum_pct}</td>
        </tr>"#,
                    mes = clean_month_label(&z.prog.mes),
                    prog_parcial = fmt_money(z.prog.parcial),
                    prog_style = highlight(&theme.contractual_color),
                    prog_acum_pct = fmt_fraction_pct(z.prog.acum_pct),
                    ejec_style = highlight(&theme.executed_color),
                    plan_style = highlight(&theme.forecast_color),
                )
            })
            .collect();

        let mut legend = format!(
            r#"<div class="legend-item"><div class="legend-swatch" style="background:{prog}"></div>Contractual</div><div class="legend-item"><div class="legend-swatch" style="background:{ejec}"></div>Valorizado</div>"#,
            prog = theme.contractual_color,
            ejec = theme.executed_color,
        );
        if has_plan {
            legend.push_str(&format!(
                r#"<div class="legend-item"><div class="legend-swatch" style="background:repeating-linear-gradient(90deg,{c} 0,{c} 4px,transparent 4px,transparent 7px)"></div>Proyectado</div>"#,
                c = theme.forecast_color,
            ));
        }
        legend.push_str(&format!(
            r#"<div class="legend-item"><div class="legend-square" style="background:{fill};border:1px solid {border}"></div>Mes Actual</div><div class="legend-item"><div class="legend-square" style="background:#f0f4fa;border:1px solid #ccc"></div>Proyección</div>"#,
            fill = theme.highlight_fill,
            border = theme.highlight_border,
        ));

        let subtitle = format!(
            "Contractual vs Valorizado{} (CD + GG + Utilidad) &mdash; Zoom: Inicio &rarr; {}",
            if has_plan { "  vs Proyectado" } else { "" },
            last_zoom_mes,
        );

        format!(
            r#"
    <div class="page">
        {header}

        {cards}

        <div class="section-title" style="margin-top:8px">
            <span class="numero">S</span>
            CURVA S - AVANCE ACUMULADO (%) &mdash; ZOOM HASTA {zoom_upper}
        </div>
        <div class="chart-container">
            {svg_chart}
        </div>

        <div class="legend-container">{legend}</div>

        {note}

        <div class="section-title" style="margin-top:8px">
            <span class="numero">T</span>
            DETALLE DE AVANCE MENSUAL (CD + GG + UTILIDAD)
        </div>
        <table class="table-curva">
            <thead>
                <tr>
                    <th rowspan="2" style="border-bottom:2px solid #333">MES</th>
                    <th colspan="2" style="background:#e8edf5;color:{prog_color};text-align:center;border-bottom:2px solid {prog_color}">CONTRACTUAL</th>
                    <th colspan="2" style="background:#d4edda;color:#155724;text-align:center;border-bottom:2px solid {ejec_color}">VALORIZADO</th>
                    <th colspan="2" style="background:{hl_fill};color:{hl_text};text-align:center;border-bottom:2px solid {plan_color}">PROYECTADO</th>
                </tr>
                <tr>
                    <th class="num" style="background:#e8edf5;color:{prog_color};border-bottom:1px solid {prog_color}">Parcial (S/)</th>
                    <th class="num" style="background:#e8edf5;color:{prog_color};border-bottom:1px solid {prog_color}">Acum.(%)</th>
                    <th class="num" style="background:#d4edda;color:#155724;border-bottom:1px solid {ejec_color}">Parcial (S/)</th>
                    <th class="num" style="background:#d4edda;color:#155724;border-bottom:1px solid {ejec_color}">Acum.(%)</th>
                    <th class="num" style="background:{hl_fill};color:{hl_text};border-bottom:1px solid {plan_color}">Parcial (S/)</th>
                    <th class="num" style="background:{hl_fill};color:{hl_text};border-bottom:1px solid {plan_color}">Acum.(%)</th>
                </tr>
            </thead>
            <tbody>
                {table_rows}
            </tbody>
        </table>

        {note_tabla}
    </div>"#,
            header = page_header(
                "CURVA S - AVANCE ACUMULADO DEL PROYECTO",
                &subtitle,
                record,
            ),
            cards = cards,
            zoom_upper = last_zoom_mes.to_uppercase(),
            svg_chart = svg_chart,
            legend = legend,
            note = monthly_note(false),
            note_tabla = monthly_note(true),
            prog_color = theme.contractual_color,
            ejec_color = theme.executed_color,
            plan_color = theme.forecast_color,
            hl_fill = theme.highlight_fill,
            hl_text = theme.highlight_text,
            table_rows = table_rows,
        )
    }
}

fn page_header(title: &str, subtitle: &str, record: &ProjectRecord) -> String {
    format!(
        r#"<div class="header">
            <div class="header-titles">
                <h1>{title}</h1>
                <h2>{subtitle}</h2>
            </div>
            <div class="header-obra">
                <div><span class="header-obra-label">OBRA:</span> <span class="header-obra-value">{obra}</span></div>
                <div class="header-fecha">{fecha}</div>
            </div>
        </div>"#,
        obra = html_escape(&record.short_name),
        fecha = format_date_long(record.date),
    )
}

fn breakdown_row(name: &str, value: f64, total: f64) -> String {
    let pct = if total > 0.0 {
        format!("{:.2}%", value / total * 100.0)
    } else {
        "0.00%".to_string()
    };
    format!(
        r#"<tr><td>{name}</td><td class="num">{}</td><td class="num">{pct}</td></tr>"#,
        fmt_money(value),
    )
}

fn variance_card(title: &str, comparison: &Comparison) -> String {
    let variance = comparison.variance();
    let positive = variance >= 0.0;
    format!(
        r#"
    <div class="card">
        <div class="card-title">{title}</div>
        <div class="card-value {value_class}">{sign}{pct:.2}%</div>
        <div class="card-monto {monto_class}">{monto_sign}S/ {monto}</div>
    </div>"#,
        value_class = if positive { "positivo" } else { "negativo" },
        sign = if positive { "+" } else { "" },
        pct = comparison.variance_pct(),
        monto_class = if positive { "ganancia" } else { "perdida" },
        monto_sign = if positive { "+" } else { "-" },
        monto = fmt_money(variance.abs()),
    )
}

fn comparison_row(concepto: &str, comparison: &Comparison, is_total: bool) -> String {
    let variance = comparison.variance();
    let positive = variance >= 0.0;
    let cls = if positive { "valor-positivo" } else { "valor-negativo" };
    let sign = if positive { "+" } else { "" };
    let estado_cls = if positive { "estado-ganancia" } else { "estado-perdida" };
    let estado = comparison.state();

    let cell = |content: String| {
        if is_total {
            format!("<strong>{content}</strong>")
        } else {
            content
        }
    };
    let row_class = if is_total { r#" class="total-row""# } else { "" };

    format!(
        r#"<tr{row_class}><td>{concepto_cell}</td><td class="num">{val}</td><td class="num">{ejec}</td><td class="num {cls}">{var}</td><td class="num {cls}">{var_pct}</td><td style="text-align:center"><span class="estado-box {estado_cls}">{estado}</span></td></tr>"#,
        concepto_cell = cell(concepto.to_string()),
        val = cell(fmt_money(comparison.valorizado)),
        ejec = cell(fmt_money(comparison.ejecutado)),
        var = cell(format!("{sign}{}", fmt_money(variance))),
        var_pct = cell(format!("{sign}{:.2}%", comparison.variance_pct())),
    )
}

fn monthly_note(for_table: bool) -> String {
    let extra_class = if for_table { " nota-tabla" } else { "" };
    format!(
        r#"<div class="nota-mes-completo{extra_class}">
            <span class="nota-label">Nota:</span> Los montos y porcentajes <span class="nota-bold">Contractuales</span> corresponden a la valorización del <span class="nota-mes">mes completo</span>, no al corte semanal.
        </div>"#
    )
}

/// Deterministic name for the stored report:
/// `COS-PR02-FR02_VAL_SEMANAL_<OBRA>_<DD-Mon-YYYY>.html`.
pub(crate) fn suggested_filename(record: &ProjectRecord) -> String {
    let short = record.short_name.trim();
    let obra = if short.is_empty() {
        "REPORTE".to_string()
    } else {
        short.split_whitespace().collect::<Vec<_>>().join("_")
    };
    format!(
        "{REPORT_CODE}_VAL_SEMANAL_{obra}_{fecha}.html",
        fecha = format_date_short(record.date),
    )
}

/// Wrap the page blocks into a standalone document with embedded styles.
pub(crate) fn wrap_standalone(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{REPORT_CODE} Reporte Valorización Semanal</title>
    <style>
{REPORT_CSS}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

const REPORT_CSS: &str = r#"
        * { margin: 0; padding: 0; box-sizing: border-box; }
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            background: #f0f2f5; margin: 0;
        }

        .page {
            width: 210mm; min-height: 297mm; padding: 10mm 12mm 8mm 12mm;
            margin: 10px auto; background: white;
            box-shadow: 0 2px 12px rgba(0,0,0,0.1);
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            font-size: 12px; color: #333;
            page-break-after: always; overflow: hidden;
        }
        .page:last-child { page-break-after: auto; }

        @media print {
            body { background: white; }
            .page { box-shadow: none; margin: 0; }
            @page { size: A4 portrait; margin: 5mm; }
        }

        /* Header */
        .header {
            display: flex; justify-content: space-between; align-items: flex-start;
            margin-bottom: 8px; padding-bottom: 8px; border-bottom: 2px solid #2c5aa0;
        }
        .header-titles h1 { font-size: 16px; color: #1e4077; margin-bottom: 2px; }
        .header-titles h2 { font-size: 12px; color: #555; font-weight: 400; }
        .header-obra { text-align: right; flex-shrink: 0; }
        .header-obra-label { font-size: 12px; color: #1e4077; font-weight: 400; }
        .header-obra-value { font-size: 18px; font-weight: 700; color: #1e4077; }
        .header-fecha { font-size: 11px; color: #1e4077; margin-top: 3px; font-weight: 700; }

        /* Section titles */
        .section-title {
            background: linear-gradient(90deg, #2c5aa0 0%, #3d6db5 100%);
            color: white; padding: 6px 12px; font-size: 12px; font-weight: 600;
            display: flex; align-items: center; border-radius: 4px 4px 0 0;
            margin-top: 10px;
        }
        .section-title .numero {
            background: white; color: #2c5aa0;
            width: 22px; height: 22px; border-radius: 50%;
            display: flex; align-items: center; justify-content: center;
            margin-right: 10px; font-size: 12px; font-weight: 700;
            flex-shrink: 0;
        }

        /* Tables */
        table {
            width: 100%; border-collapse: collapse; background: white;
            border: 1px solid #ddd; border-top: none;
        }
        th {
            background: #f8f9fa; color: #1e4077; padding: 7px 10px;
            font-weight: 700; font-size: 12px; border-bottom: 2px solid #2c5aa0;
            text-align: left;
        }
        td {
            padding: 7px 10px; border-bottom: 1px solid #eee; font-size: 12px;
        }
        td.num, th.num {
            text-align: right; font-family: 'Consolas', 'Courier New', monospace;
        }
        .total-row { background: #e8f4fd !important; }
        .total-row td {
            font-weight: 700; color: #1e4077;
            border-top: 2px solid #2c5aa0; border-bottom: 2px solid #2c5aa0;
        }

        /* Two-column layout */
        .two-columns {
            display: grid; grid-template-columns: 1fr 1fr;
            gap: 12px; margin-bottom: 8px;
        }
        .two-columns .section-title { margin-top: 0; }

        /* Cards */
        .cards-container {
            display: grid; grid-template-columns: repeat(3, 1fr);
            gap: 12px; margin: 10px 0;
        }
        .card {
            background: linear-gradient(180deg, #ffffff 0%, #f8f9fa 100%);
            border: 1px solid #e0e0e0; border-radius: 8px;
            padding: 12px 10px; text-align: center;
            box-shadow: 0 2px 4px rgba(0,0,0,0.05);
        }
        .card-title { font-size: 11px; color: #666; font-weight: 600; margin-bottom: 6px; text-transform: uppercase; }
        .card-value { font-size: 26px; font-weight: 700; }
        .card-value.positivo { color: #28a745; }
        .card-value.negativo { color: #dc3545; }
        .card-monto {
            font-size: 13px; font-weight: 600; margin-top: 6px;
            padding: 4px 10px; border-radius: 12px; display: inline-block;
        }
        .card-monto.ganancia { background: #d4edda; color: #155724; }
        .card-monto.perdida { background: #f8d7da; color: #721c24; }

        /* Estado boxes */
        .estado-box {
            display: inline-block; padding: 4px 12px; border-radius: 10px;
            font-weight: 700; font-size: 10px;
        }
        .estado-ganancia { background: #d4edda; color: #155724; }
        .estado-perdida { background: #f8d7da; color: #721c24; }
        .valor-positivo { color: #28a745; font-weight: 700; }
        .valor-negativo { color: #dc3545; font-weight: 700; }

        /* Tabla comparativa */
        .tabla-comparativa th, .tabla-comparativa td { text-align: right; font-size: 12px; }
        .tabla-comparativa th:first-child, .tabla-comparativa td:first-child { text-align: left; }
        .tabla-comparativa th:last-child, .tabla-comparativa td:last-child { text-align: center; }

        /* PAGE 2: CURVA S */
        .summary-cards-curva {
            display: grid; grid-template-columns: repeat(3, 1fr);
            gap: 10px; margin: 8px 0;
        }
        .summary-card-curva {
            border-radius: 8px; padding: 10px 8px; text-align: center;
        }
        .summary-card-curva.prog { background: linear-gradient(135deg, #e8edf5, #d5dff0); border: 1px solid #b8c9e2; }
        .summary-card-curva.ejec { background: linear-gradient(135deg, #d4edda, #c3e6cb); border: 1px solid #a3d5b1; }
        .summary-card-curva.plan { background: linear-gradient(135deg, #fff3cd, #ffeaa7); border: 1px solid #e6d590; }
        .summary-card-curva .card-label { font-size: 10px; font-weight: 600; text-transform: uppercase; margin-bottom: 4px; }
        .summary-card-curva .card-pct { font-size: 22px; font-weight: 700; }
        .summary-card-curva .card-amt { font-size: 11px; font-weight: 600; margin-top: 2px; }

        /* Chart container */
        .chart-container {
            background: white; border: 1px solid #ddd;
            border-radius: 0 0 4px 4px; border-top: none;
            padding: 15px 10px 8px 10px;
        }

        /* Curva table */
        .table-curva th { font-size: 11px; padding: 7px 10px; }
        .table-curva td { font-size: 12px; padding: 7px 10px; }
        .table-curva td.num { font-size: 11px; }
        .mes-actual { background: #fff3cd !important; font-weight: 700; }
        .mes-proyeccion { background: #f0f4fa !important; font-style: italic; color: #666; }
        .mes-proyeccion .dash { color: #bbb; }

        /* Legend */
        .legend-container {
            display: flex; justify-content: center; gap: 24px; margin: 10px 0 0 0;
        }
        .legend-item {
            display: flex; align-items: center; gap: 6px;
            font-size: 11px; font-weight: 600;
        }
        .legend-swatch {
            width: 18px; height: 4px; border-radius: 2px;
        }
        .legend-square {
            width: 12px; height: 12px; border-radius: 2px;
        }

        /* Notes */
        .nota-mes-completo {
            text-align: center; font-size: 10px; font-style: italic;
            background: #f8f9fa; border: 1px solid #eee; border-radius: 4px;
            padding: 5px 12px; margin-top: 6px;
        }
        .nota-mes-completo.nota-tabla {
            font-size: 11.5px; padding: 7px 14px; border-color: #ddd;
        }
        .nota-mes-completo .nota-label { color: #2c5aa0; font-weight: 700; }
        .nota-mes-completo .nota-bold { font-weight: 700; color: #2c5aa0; }
        .nota-mes-completo .nota-mes { font-weight: 700; }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use valoriza_core::{CostBreakdown, ValuationSummary};

    fn record() -> ProjectRecord {
        ProjectRecord {
            res_costo: CostBreakdown {
                materiales: 100_000.0,
                personal_obrero: 40_000.0,
                planilla_staff: 20_000.0,
                otros_gg: 7_000.0,
                ..CostBreakdown::default()
            },
            rval: ValuationSummary {
                costo_directo: 150_000.0,
                gastos_generales: 25_000.0,
                gg_percent: 16.67,
                utilidad: 15_000.0,
                util_percent: 10.0,
                total_valorizacion: 190_000.0,
            },
            curva: None,
            project_name: "EDIFICIO BEETHOVEN".into(),
            short_name: "BEETHOVEN".into(),
            date: NaiveDate::from_ymd_opt(2026, 2, 22)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            author: "R. Medina".into(),
        }
    }

    #[test]
    fn filename_replaces_spaces() {
        let mut r = record();
        r.short_name = "ALMA MATER".into();
        assert_eq!(
            suggested_filename(&r),
            "COS-PR02-FR02_VAL_SEMANAL_ALMA_MATER_22-Feb-2026.html"
        );
    }

    #[test]
    fn filename_falls_back_for_empty_name() {
        let mut r = record();
        r.short_name = String::new();
        assert!(suggested_filename(&r).starts_with("COS-PR02-FR02_VAL_SEMANAL_REPORTE_"));
    }

    #[test]
    fn valuation_page_carries_totals_and_states() {
        let renderer = HtmlReportRenderer::new();
        let page = renderer.page_valuation(&record());
        assert!(page.contains("CORTE DE VALORIZACIÓN"));
        assert!(page.contains("224,200.00")); // subtotal 190k + 18% IGV
        assert!(page.contains("GANANCIA"));
        assert!(page.contains("PÉRDIDA")); // GG executed exceeds valorized
        assert!(page.contains("BEETHOVEN"));
        assert!(page.contains("22 de Febrero de 2026"));
    }

    #[test]
    fn comparison_row_total_is_bold() {
        let total = Comparison::new(175_000.0, 167_000.0);
        let row = comparison_row("TOTAL", &total, true);
        assert!(row.contains("total-row"));
        assert!(row.contains("<strong>TOTAL</strong>"));
    }

    #[test]
    fn breakdown_row_guards_zero_total() {
        let row = breakdown_row("Costo Varios", 0.0, 0.0);
        assert!(row.contains("0.00%"));
    }
}
