mod display;
mod export;

use anyhow::{bail, Context, Result};
use band_core::common::time::Time;
use band_core::{Analyzer, Bar, BandConfig, PriceSeries};
use clap::Parser;
use csv::Reader;
use log::{error, info};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "band_cli", version, about = "Price deltas and regression bands from OHLCV csv files")]
struct Cli {
    /// CSV files, or directories scanned for *.csv
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Smoothing degree, fitted as sqrt(degree)
    #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..=200))]
    degree: Option<u32>,

    /// JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write <symbol>_bands.csv and <symbol>_report.json here
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Re-read inputs and recompute every N seconds
    #[arg(long)]
    refresh_secs: Option<u64>,

    /// Trailing bars shown in the summary table
    #[arg(long, default_value_t = 30)]
    summary_rows: usize,

    /// Repair bars whose high/low do not bound open/close
    #[arg(long)]
    autofix: bool,
}

#[derive(Debug)]
struct CsvRecord {
    time: Time,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let analyzer = Analyzer::new(config)?;

    loop {
        run_once(&cli, &analyzer)?;
        match cli.refresh_secs {
            Some(secs) => {
                info!("Refreshing in {}s", secs);
                std::thread::sleep(Duration::from_secs(secs));
            }
            None => break,
        }
    }

    Ok(())
}

fn load_config(cli: &Cli) -> Result<BandConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading config {}", path.display()))?;
            BandConfig::from_json_str(&text)?
        }
        None => BandConfig::default(),
    };
    if let Some(degree) = cli.degree {
        config.degree = degree;
    }
    if cli.autofix {
        config.autofix = true;
    }
    config.validate()?;
    Ok(config)
}

fn run_once(cli: &Cli, analyzer: &Analyzer) -> Result<()> {
    let files = collect_csv_files(&cli.inputs)?;
    if files.is_empty() {
        bail!("no csv files found in {:?}", cli.inputs);
    }

    // One bad file must not stop the others.
    for path in files {
        info!("Processing file: {:?}", path);
        if let Err(e) = process_csv_file(&path, cli, analyzer) {
            error!("{}: {:#}", path.display(), e);
        }
    }
    Ok(())
}

fn collect_csv_files(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) == Some("csv") {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}

fn process_csv_file(path: &Path, cli: &Cli, analyzer: &Analyzer) -> Result<()> {
    let series = load_series(path, analyzer.config().autofix)?;
    let report = analyzer.analyze(&series)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_report(&report, &series, cli.summary_rows);
    }

    if let Some(dir) = &cli.output_dir {
        std::fs::create_dir_all(dir)?;
        let bands_path = dir.join(format!("{}_bands.csv", series.symbol));
        export::write_bands_csv(&bands_path, &series, &report)?;
        info!("Saved bands to {}", bands_path.display());

        let report_path = dir.join(format!("{}_report.json", series.symbol));
        export::write_report_json(&report_path, &report)?;
        info!("Saved report to {}", report_path.display());
    }

    Ok(())
}

fn load_series(path: &Path, autofix: bool) -> Result<PriceSeries> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let symbol = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string();
    read_series(Reader::from_reader(file), symbol, autofix)
}

fn read_series<R: std::io::Read>(mut rdr: Reader<R>, symbol: String, autofix: bool) -> Result<PriceSeries> {
    let mut bars = Vec::new();

    for (line, result) in rdr.records().enumerate() {
        let record = result?;

        // Parse CSV record
        let csv_record = parse_csv_record(&record).with_context(|| format!("row {}", line + 1))?;

        bars.push(Bar::new(
            csv_record.time,
            csv_record.open,
            csv_record.high,
            csv_record.low,
            csv_record.close,
            csv_record.volume,
            autofix,
        )?);
    }

    Ok(PriceSeries::from_bars(symbol, bars)?)
}

fn parse_csv_record(record: &csv::StringRecord) -> Result<CsvRecord> {
    if record.len() < 6 {
        bail!("expected 6 columns, got {}", record.len());
    }

    Ok(CsvRecord {
        time: Time::from_str(&record[0])?,
        open: record[1].trim().parse()?,
        high: record[2].trim().parse()?,
        low: record[3].trim().parse()?,
        close: record[4].trim().parse()?,
        volume: record[5].trim().parse()?,
    })
}
