//! valoriza CLI - Weekly cost-valuation report engine
//!
//! Loads a valuation workbook, runs the heuristic extractor and renders the
//! standalone HTML report.

mod loader;

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use valoriza_core::Renderer;
use valoriza_extract::{detect_project_name, extract};
use valoriza_render::HtmlReportRenderer;

#[derive(Parser)]
#[command(name = "valoriza")]
#[command(author, version, about = "Weekly cost-valuation report engine", long_about = None)]
struct Cli {
    /// Verbose output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the HTML report from a valuation workbook
    Report {
        /// Input workbook path (.xlsx/.xls)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output file (defaults to the report's suggested name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Extract the structured record and print it
    Extract {
        /// Input workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,
    },

    /// Detect the project name inside a workbook
    Detect {
        /// Input workbook path
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("info"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Report { file, output } => {
            let workbook = loader::load_workbook(&file)?;
            let record = extract(&workbook, chrono::Local::now().naive_local())?;
            let report = HtmlReportRenderer::new().render(&record)?;

            let out = output.unwrap_or_else(|| PathBuf::from(&report.suggested_name));
            std::fs::write(&out, &report.document)
                .with_context(|| format!("cannot write report to {}", out.display()))?;
            println!("{}", out.display());
        }
        Commands::Extract { file, format } => {
            let workbook = loader::load_workbook(&file)?;
            let record = extract(&workbook, chrono::Local::now().naive_local())?;
            match format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&record)?),
                "text" => print_summary(&record),
                other => bail!("unknown format \"{other}\" (expected json or text)"),
            }
        }
        Commands::Detect { file } => {
            let workbook = loader::load_workbook(&file)?;
            match detect_project_name(&workbook) {
                Some(name) => println!("{name}"),
                None => bail!("no project name found in {}", file.display()),
            }
        }
    }

    Ok(())
}

fn print_summary(record: &valoriza_core::ProjectRecord) {
    println!("Proyecto:  {} ({})", record.project_name, record.short_name);
    println!("Fecha:     {}", record.date.date());
    if !record.author.is_empty() {
        println!("Elaborado: {}", record.author);
    }
    println!(
        "CD ejecutado: S/ {:.2}   GG ejecutado: S/ {:.2}",
        record.res_costo.total_cd(),
        record.res_costo.total_gg()
    );
    println!(
        "Valorización: CD S/ {:.2}  GG S/ {:.2} ({:.2}%)  Utilidad S/ {:.2} ({:.2}%)",
        record.rval.costo_directo,
        record.rval.gastos_generales,
        record.rval.gg_percent,
        record.rval.utilidad,
        record.rval.util_percent
    );
    match &record.curva {
        Some(curva) => println!(
            "Curva: {} meses, mes actual {}",
            curva.len(),
            curva
                .mes_actual
                .map_or_else(|| "sin valorizado".to_string(), |i| (i + 1).to_string())
        ),
        None => println!("Curva: sin datos"),
    }
}
