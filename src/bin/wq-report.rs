use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wq_regress::cli::{Cli, OutputFormat};
use wq_regress::core::StepwiseTrace;
use wq_regress::data::{LoadSummary, Loader};
use wq_regress::diagnostics::CorrelationReport;
use wq_regress::model::TrendAnalysis;
use wq_regress::session::Session;
use wq_regress::solvers::ModelSummary;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into())
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Serialize)]
struct ResidualSummary {
    mean: f64,
    std_dev: f64,
    lower_band: f64,
    upper_band: f64,
    outliers: Vec<usize>,
}

#[derive(Debug, Serialize)]
struct FormulaSummary {
    year: Option<i32>,
    n: usize,
    mae: f64,
    rmse: f64,
    r_squared: f64,
    r: f64,
}

#[derive(Debug, Serialize)]
struct Report {
    file: String,
    load: LoadSummary,
    correlation: CorrelationReport,
    selected: Vec<String>,
    model: ModelSummary,
    trace: StepwiseTrace,
    residuals: ResidualSummary,
    formula: FormulaSummary,
    trend: Option<TrendAnalysis>,
}

fn build_report(cli: &Cli) -> Result<Report> {
    let loader = if cli.validation {
        Loader::validation()
    } else {
        Loader::new()
    };

    let mut session = Session::new();
    session.set_target(cli.target);
    let load = session
        .load_with(&loader, &cli.file)
        .with_context(|| format!("Failed to load {}", cli.file.display()))?;

    let correlation = session.correlation()?;
    let model = session
        .run_stepwise(&cli.stepwise_options())
        .context("Stepwise regression failed")?;
    let selected = model
        .selected_names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let summary = model.summary();
    let trace = model.trace().clone();

    let residuals = session.residuals()?;
    let comparison = session.formula_comparison(cli.year)?;
    let trend = cli
        .trend
        .map(|parameter| session.trend(parameter, cli.years))
        .transpose()?;

    Ok(Report {
        file: cli.file.display().to_string(),
        load,
        correlation,
        selected,
        model: summary,
        trace,
        residuals: ResidualSummary {
            mean: residuals.mean,
            std_dev: residuals.std_dev,
            lower_band: residuals.lower_band,
            upper_band: residuals.upper_band,
            outliers: residuals.outliers,
        },
        formula: FormulaSummary {
            year: comparison.year,
            n: comparison.evaluation.len(),
            mae: comparison.evaluation.mae,
            rmse: comparison.evaluation.rmse,
            r_squared: comparison.evaluation.r_squared,
            r: comparison.evaluation.r,
        },
        trend,
    })
}

fn print_text(report: &Report) {
    println!("=== {} ===", report.file);
    println!(
        "rows read: {}  incomplete: {}  filtered: {}  kept: {}",
        report.load.rows_read,
        report.load.rows_incomplete,
        report.load.rows_filtered,
        report.load.rows_kept
    );
    println!();

    println!("=== Correlation ===");
    println!("{}", report.correlation);
    println!();

    println!("=== Stepwise selection ===");
    println!("{}", report.trace);
    println!();
    if report.selected.is_empty() {
        println!("selected: (none, intercept only)");
    } else {
        println!("selected: {}", report.selected.join(", "));
    }
    println!("{}", report.model);
    println!();

    println!("=== Residuals ===");
    let r = &report.residuals;
    println!(
        "mean = {:.4}  std = {:.4}  band = [{:.4}, {:.4}]  outside band: {}",
        r.mean,
        r.std_dev,
        r.lower_band,
        r.upper_band,
        r.outliers.len()
    );
    println!();

    println!("=== Formula BOD5 = a·DO + b·COD + c ===");
    let f = &report.formula;
    match f.year {
        Some(year) => println!("year: {}", year),
        None => println!("year: all"),
    }
    println!(
        "n = {}  MAE = {:.4}  RMSE = {:.4}  R² = {:.4}  r = {:.4}",
        f.n, f.mae, f.rmse, f.r_squared, f.r
    );

    if let Some(trend) = &report.trend {
        println!();
        println!("=== Trend: {} ===", trend.parameter);
        println!(
            "slope = {:.4}  direction = {}  quadratic R² = {}",
            trend.slope(),
            trend.direction,
            trend
                .quadratic_r_squared
                .map_or_else(|| "-".to_owned(), |r| format!("{:.4}", r))
        );
        for p in &trend.projections {
            println!(
                "{}: mean {:.2}  min {:.2}  max {:.2}  {}",
                p.year,
                p.mean,
                p.min,
                p.max,
                p.quality.unwrap_or("-")
            );
        }
        println!("projected change: {:+.1}%", trend.projected_change_percent);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let report = build_report(&cli)?;
    match cli.format {
        OutputFormat::Text => print_text(&report),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string_pretty(&report).context("Failed to serialize report")?
            );
        }
    }
    Ok(())
}
