//! overrun - Report glyphs printed past the text column of book pages
//!
//! Reads page dumps (JSON, one document per file) produced by a PDF or OCR
//! extractor, runs the overflow detector and its false-positive filters, and
//! prints the surviving overflows as text or JSON.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser, ValueEnum};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use overrun_core::{
    CheckOptions, DetectorConfig, Diagnostic, DropReason, FilterId, JsonPageSource,
    OverflowReport, ReportEntry, check_document,
};

/// Output type for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
enum OutputType {
    /// One line per overflow (default)
    #[default]
    Text,
    /// One JSON object per document
    Json,
}

/// Find text that runs past the text column of typeset book pages.
#[derive(Parser, Debug)]
#[command(name = "overrun")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// One or more page dump files (JSON)
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Use debug logging level
    #[arg(short = 'd', long, action = ArgAction::SetTrue)]
    debug: bool,

    // === Detector options ===
    /// TOML configuration file (margins, thresholds, filters)
    #[arg(short = 'c', long)]
    config: Option<PathBuf>,

    /// Overflow threshold in points (overrides the configuration)
    #[arg(long = "overflow-threshold", allow_negative_numbers = true)]
    overflow_threshold: Option<f64>,

    /// Measurement error threshold in points (overrides the configuration)
    #[arg(long = "measurement-threshold", allow_negative_numbers = true)]
    measurement_threshold: Option<f64>,

    /// Comma-separated filter identifiers to run, in order, or "none"
    #[arg(long)]
    filters: Option<String>,

    // === Page selection ===
    /// A comma- or space-separated list of page numbers to check
    #[arg(long = "page-numbers")]
    page_numbers: Option<String>,

    /// The maximum number of pages to check (0 = no limit)
    #[arg(short = 'm', long, default_value = "0")]
    maxpages: usize,

    /// Worker threads (default: available parallelism)
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    // === Output options ===
    /// Path to file where output is written, or "-" for stdout
    #[arg(short = 'o', long, default_value = "-")]
    outfile: String,

    /// Type of output to generate
    #[arg(short = 't', long = "output-type", value_enum, default_value = "text")]
    output_type: OutputType,

    /// Exit with status 2 when any overflow survives the filters
    #[arg(long = "fail-on-overflow", action = ArgAction::SetTrue)]
    fail_on_overflow: bool,
}

/// Parse a filter list: comma-separated identifiers, or "none".
fn parse_filters(s: &str) -> Result<Vec<FilterId>> {
    if s.trim().eq_ignore_ascii_case("none") {
        return Ok(Vec::new());
    }
    s.split(',')
        .filter(|part| !part.trim().is_empty())
        .map(|part| part.parse::<FilterId>().map_err(anyhow::Error::from))
        .collect()
}

/// Parse page numbers separated by commas or whitespace.
fn parse_page_numbers(s: &str) -> Result<Vec<u32>> {
    s.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<u32>()
                .with_context(|| format!("invalid page number: {part}"))
        })
        .collect()
}

/// Build the detector configuration from the file and command line overrides.
fn build_config(args: &Args) -> Result<DetectorConfig> {
    let mut config = match &args.config {
        Some(path) => DetectorConfig::from_path(path)
            .with_context(|| format!("failed to load configuration {}", path.display()))?,
        None => DetectorConfig::default(),
    };

    if let Some(threshold) = args.overflow_threshold {
        config.overflow_threshold_pt = threshold;
    }
    if let Some(threshold) = args.measurement_threshold {
        config.measurement_error_threshold_pt = threshold;
    }
    if let Some(filters) = &args.filters {
        config.enabled_filters = parse_filters(filters)?;
    }

    config.validate()?;
    Ok(config)
}

fn build_options(args: &Args) -> Result<CheckOptions> {
    let page_numbers = match &args.page_numbers {
        Some(s) => {
            let nums = parse_page_numbers(s)?;
            if nums.is_empty() {
                bail!("--page-numbers given without any page number");
            }
            Some(nums)
        }
        None => None,
    };
    Ok(CheckOptions {
        page_numbers,
        maxpages: args.maxpages,
        threads: args.threads,
    })
}

#[derive(Serialize)]
struct JsonReport<'a> {
    document_id: &'a str,
    complete: bool,
    pages_checked: usize,
    overflows: Vec<ReportEntry>,
    dropped: &'a BTreeMap<DropReason, usize>,
    diagnostics: &'a [Diagnostic],
}

fn write_text<W: Write>(writer: &mut W, report: &OverflowReport) -> io::Result<()> {
    let entries = report.all_entries();
    writeln!(
        writer,
        "{}: {} overflow(s) on {} page(s), {} page(s) checked",
        report.document_id(),
        entries.len(),
        report.pages_with_overflows().len(),
        report.pages_checked()
    )?;
    for entry in &entries {
        writeln!(
            writer,
            "  p.{:<4} y={:<4} +{:.2}pt {:<5} {:?} | {}",
            entry.page,
            entry.line_y,
            entry.overflow_amount_pt,
            if entry.in_code_block { "code" } else { "text" },
            entry.rightmost_char,
            entry.line_text
        )?;
    }
    if !report.dropped().is_empty() {
        let dropped = report
            .dropped()
            .iter()
            .map(|(reason, n)| format!("{reason}={n}"))
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "  dropped: {dropped}")?;
    }
    for diagnostic in report.diagnostics() {
        match diagnostic.page {
            Some(page) => writeln!(writer, "  diagnostic (p.{page}): {}", diagnostic.message)?,
            None => writeln!(writer, "  diagnostic: {}", diagnostic.message)?,
        }
    }
    if !report.is_complete() {
        writeln!(writer, "  note: report covers only part of the document")?;
    }
    Ok(())
}

fn write_json<W: Write>(writer: &mut W, report: &OverflowReport) -> Result<()> {
    let json = JsonReport {
        document_id: report.document_id(),
        complete: report.is_complete(),
        pages_checked: report.pages_checked(),
        overflows: report.all_entries(),
        dropped: report.dropped(),
        diagnostics: report.diagnostics(),
    };
    serde_json::to_writer_pretty(&mut *writer, &json)?;
    writeln!(writer)?;
    Ok(())
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Returns the number of overflows found across all files.
fn run(args: &Args) -> Result<usize> {
    let config = build_config(args)?;
    let options = build_options(args)?;

    let mut output: Box<dyn Write> = if args.outfile == "-" {
        Box::new(BufWriter::new(io::stdout()))
    } else {
        let file = File::create(&args.outfile)
            .with_context(|| format!("failed to create output file {}", args.outfile))?;
        Box::new(BufWriter::new(file))
    };

    let mut total = 0;
    for path in &args.files {
        tracing::debug!(file = %path.display(), "checking page dump");
        let source = JsonPageSource::from_path(path)
            .with_context(|| format!("failed to read page dump {}", path.display()))?;
        let report = check_document(&source, &config, &options)
            .with_context(|| format!("failed to check {}", path.display()))?;
        total += report.total_overflows();

        match args.output_type {
            OutputType::Text => write_text(&mut output, &report)?,
            OutputType::Json => write_json(&mut output, &report)?,
        }
    }

    output.flush()?;
    Ok(total)
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(&args) {
        Ok(total) if args.fail_on_overflow && total > 0 => ExitCode::from(2),
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overrun_core::{Glyph, MemoryPageSource, PageData};

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["overrun"];
        argv.extend_from_slice(extra);
        argv.push("book.json");
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn filters_parse_in_order() {
        assert_eq!(
            parse_filters("symbol_only, page-number").unwrap(),
            vec![FilterId::SymbolOnly, FilterId::PageNumber]
        );
        assert!(parse_filters("none").unwrap().is_empty());
        assert!(parse_filters("symbol_only,bogus").is_err());
    }

    #[test]
    fn page_numbers_accept_commas_and_spaces() {
        assert_eq!(parse_page_numbers("3, 5 8").unwrap(), vec![3, 5, 8]);
        assert!(parse_page_numbers("3,x").is_err());
    }

    #[test]
    fn command_line_overrides_defaults() {
        let args = args(&[
            "--overflow-threshold",
            "0.5",
            "--filters",
            "measurement_error",
            "--page-numbers",
            "2,4",
            "-j",
            "2",
        ]);
        let config = build_config(&args).unwrap();
        assert_eq!(config.overflow_threshold_pt, 0.5);
        assert_eq!(config.enabled_filters, vec![FilterId::MeasurementError]);

        let options = build_options(&args).unwrap();
        assert_eq!(options.page_numbers, Some(vec![2, 4]));
        assert_eq!(options.threads, Some(2));
    }

    #[test]
    fn invalid_override_is_rejected() {
        let args = args(&["--measurement-threshold", "-1"]);
        assert!(build_config(&args).is_err());
    }

    #[test]
    fn output_type_defaults_to_text() {
        assert_eq!(args(&[]).output_type, OutputType::Text);
        assert_eq!(args(&["-t", "json"]).output_type, OutputType::Json);
    }

    fn sample_report() -> OverflowReport {
        let page = PageData::new(1, 515.0, 728.0).with_glyphs(vec![
            Glyph::new("o", (480.0, 300.0, 486.0, 309.0)),
            Glyph::new("k", (486.0, 300.0, 492.0, 309.0)),
        ]);
        let source = MemoryPageSource::new("sample", vec![page]);
        check_document(&source, &DetectorConfig::default(), &CheckOptions::default()).unwrap()
    }

    #[test]
    fn text_output_lists_each_overflow() {
        let mut out = Vec::new();
        write_text(&mut out, &sample_report()).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("sample: 1 overflow(s) on 1 page(s), 1 page(s) checked"));
        assert!(text.contains("y=300"));
        assert!(text.contains("| ok"));
    }

    #[test]
    fn json_output_is_valid() {
        let mut out = Vec::new();
        write_json(&mut out, &sample_report()).unwrap();
        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["document_id"], "sample");
        assert_eq!(value["overflows"][0]["rightmost_char"], "k");
        assert_eq!(value["pages_checked"], 1);
    }
}
