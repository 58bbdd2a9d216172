use log::{info, warn};

use poms_scoring::*;
use snafu::{prelude::*, Snafu};

use serde::Serialize;
use serde_json::json;
use std::fs;

use crate::args::Args;

pub mod charts;
pub mod export;
pub mod io_excel;

#[derive(Debug, Snafu)]
pub enum PomsError {
    #[snafu(display("Error opening workbook {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("Workbook {path} has no data"))]
    EmptyExcel { path: String },
    #[snafu(display("Missing required column {column} in {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error writing CSV output"))]
    CsvWrite { source: csv::Error },
    #[snafu(display("Error writing output file {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error rendering chart {path}: {message}"))]
    Chart { path: String, message: String },
    #[snafu(display("Error serializing the summary"))]
    SerializingSummary { source: serde_json::Error },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type PomsResult<T> = Result<T, PomsError>;

/// The complete outcome of one scoring pass over the raw table.
pub struct Analysis {
    pub results: Vec<ResultRow>,
    pub summary: Vec<ColumnSummary>,
    pub diagnostics: ScoreDiagnostics,
}

/// Scores the raw rows, applies the optional name ordering and aggregates
/// the summary statistics. Pure request/response: everything the outputs
/// need is in the arguments and the returned value.
pub fn analyze(
    raw: &[RawRow],
    name_order: Option<&[String]>,
    rules: &ScoringRules,
) -> Analysis {
    let batch = score_rows(raw, rules);
    let mut results = batch.rows;
    if let Some(order) = name_order {
        results = apply_name_order(results, order, rules.unlisted_order);
    }
    let summary = aggregate(&results);
    Analysis {
        results,
        summary,
        diagnostics: batch.diagnostics,
    }
}

pub fn run_analysis(args: &Args) -> PomsResult<()> {
    let rules = ScoringRules {
        column_match: if args.prefix_match {
            ColumnMatchMode::Prefix
        } else {
            ColumnMatchMode::LeadingNumber
        },
        unlisted_order: parse_unlisted_policy(&args.unlisted)?,
    };

    let raw = io_excel::read_primary(&args.input)?;
    info!("Read {} respondent rows from {}", raw.len(), args.input);

    let name_order = match &args.order {
        Some(path) => {
            let names = io_excel::read_name_order(path)?;
            info!("Read {} names from the order file {}", names.len(), path);
            Some(names)
        }
        None => None,
    };

    let analysis = analyze(&raw, name_order.as_deref(), &rules);

    if !analysis.diagnostics.is_clean() {
        warn!(
            "{} cells had an unrecognized label and {} question columns were missing; all were scored as 0",
            analysis.diagnostics.unknown_labels, analysis.diagnostics.missing_columns
        );
    }

    print_results(&analysis.results);
    print_summary(&analysis.summary);

    if let Some(path) = &args.csv_out {
        let bytes = export::export_csv(&analysis.results)?;
        fs::write(path, bytes).context(WritingOutputSnafu { path: path.as_str() })?;
        info!("Wrote the result table to {}", path);
    }

    if let Some(path) = &args.json_out {
        let js = summary_to_json(analysis.results.len(), &analysis.summary);
        let pretty = serde_json::to_string_pretty(&js).context(SerializingSummarySnafu {})?;
        fs::write(path, pretty).context(WritingOutputSnafu { path: path.as_str() })?;
        info!("Wrote the summary statistics to {}", path);
    }

    if let Some(path) = &args.chart_out {
        let kind = parse_chart_kind(&args.chart_type)?;
        let columns = parse_scales(args.scales.as_deref())?;
        charts::render_chart(path, kind, &columns, &analysis.results)?;
    }

    Ok(())
}

fn parse_unlisted_policy(value: &str) -> PomsResult<UnlistedOrderPolicy> {
    match value {
        "append" => Ok(UnlistedOrderPolicy::AppendLast),
        "drop" => Ok(UnlistedOrderPolicy::Drop),
        x => whatever!("Unknown unlisted policy: {:?} (expected append or drop)", x),
    }
}

pub fn parse_chart_kind(value: &str) -> PomsResult<ChartKind> {
    match value {
        "radar" => Ok(ChartKind::RadarMean),
        "bar" => Ok(ChartKind::BarMean),
        "box" => Ok(ChartKind::BoxIndividual),
        "scatter" => Ok(ChartKind::ScatterIndividual),
        x => whatever!(
            "Unknown chart type: {:?} (expected radar, bar, box or scatter)",
            x
        ),
    }
}

/// Resolves the scale names selected on the command line. Defaults to the
/// TMD pseudo-scale when nothing is selected.
pub fn parse_scales(scales: Option<&[String]>) -> PomsResult<Vec<ScoreColumn>> {
    let names = match scales {
        Some(xs) if !xs.is_empty() => xs,
        _ => return Ok(vec![ScoreColumn::Tmd]),
    };
    names.iter().map(|name| parse_scale(name)).collect()
}

fn parse_scale(name: &str) -> PomsResult<ScoreColumn> {
    let trimmed = name.trim();
    if trimmed.eq_ignore_ascii_case("tmd") {
        return Ok(ScoreColumn::Tmd);
    }
    for &scale in ALL_SCALES.iter() {
        if scale.name() == trimmed || scale.alias().eq_ignore_ascii_case(trimmed) {
            return Ok(ScoreColumn::Subscale(scale));
        }
    }
    whatever!("Unknown scale name: {:?}", trimmed)
}

fn print_results(results: &[ResultRow]) {
    let mut header: Vec<&str> = vec![NAME_COLUMN];
    header.extend(ALL_COLUMNS.iter().map(|c| c.name()));
    println!("{}", header.join("\t"));
    for row in results {
        let mut record: Vec<String> = vec![row.name.clone()];
        record.extend(
            ALL_COLUMNS
                .iter()
                .map(|&column| row.column_score(column).to_string()),
        );
        println!("{}", record.join("\t"));
    }
}

fn print_summary(summary: &[ColumnSummary]) {
    println!();
    println!("scale\tmean\tsd");
    for entry in summary {
        let sd = match entry.sd {
            Some(sd) => format!("{:.2}", sd),
            None => "NA".to_string(),
        };
        println!("{}\t{:.2}\t{}", entry.column.name(), entry.mean, sd);
    }
}

#[derive(Serialize)]
struct SummaryEntry {
    scale: String,
    mean: f64,
    sd: Option<f64>,
}

fn summary_to_json(num_respondents: usize, summary: &[ColumnSummary]) -> serde_json::Value {
    let entries: Vec<SummaryEntry> = summary
        .iter()
        .map(|entry| SummaryEntry {
            scale: entry.column.name().to_string(),
            mean: entry.mean,
            sd: entry.sd,
        })
        .collect();
    json!({ "respondents": num_respondents, "summary": entries })
}
