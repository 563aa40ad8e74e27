use anyhow::{ensure, Result};
use band_core::{AnalysisReport, PriceSeries};
use std::fs::File;
use std::path::Path;

/// One row per bar: time, close, fitted value, then lower/upper per tier.
pub fn write_bands_csv(path: &Path, series: &PriceSeries, report: &AnalysisReport) -> Result<()> {
    ensure!(
        series.len() == report.regression.fitted_values.len(),
        "series has {} bars but the fit has {} values",
        series.len(),
        report.regression.fitted_values.len()
    );

    let mut wtr = csv::Writer::from_path(path)?;

    let mut header = vec!["time".to_string(), "close".to_string(), "fitted".to_string()];
    for band in &report.bands {
        header.push(format!("lower_{}", band.tier));
        header.push(format!("upper_{}", band.tier));
    }
    wtr.write_record(&header)?;

    for (i, bar) in series.iter().enumerate() {
        let mut row = vec![
            bar.time.to_str(),
            bar.close.to_string(),
            report.regression.fitted_values[i].to_string(),
        ];
        for band in &report.bands {
            row.push(band.lower_curve[i].to_string());
            row.push(band.upper_curve[i].to_string());
        }
        wtr.write_record(&row)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_report_json(path: &Path, report: &AnalysisReport) -> Result<()> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(file, report)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use band_core::common::time::Time;
    use band_core::{Analyzer, Bar, BandConfig};

    fn series(len: usize) -> PriceSeries {
        let start = Time::from_str("2024-01-01").unwrap();
        let bars = (0..len)
            .map(|i| {
                let close = 20.0 + (i as f64 * 0.7).sin();
                Bar::new(start.add_days(i as f64), close, close, close, close, 10.0, false).unwrap()
            })
            .collect();
        PriceSeries::from_bars("EXP", bars).unwrap()
    }

    #[test]
    fn test_write_bands_csv() {
        let series = series(25);
        let report = Analyzer::new(BandConfig::default()).unwrap().analyze(&series).unwrap();
        let dir = std::env::temp_dir().join(format!("band_cli_export_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("EXP_bands.csv");

        write_bands_csv(&path, &series, &report).unwrap();

        let mut rdr = csv::Reader::from_path(&path).unwrap();
        let headers = rdr.headers().unwrap().clone();
        assert_eq!(headers.len(), 3 + 2 * 4);
        assert_eq!(&headers[3], "lower_1");
        assert_eq!(&headers[10], "upper_4");
        let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 25);
        assert_eq!(&rows[0][0], "2024-01-01 00:00:00");

        let json_path = dir.join("EXP_report.json");
        write_report_json(&json_path, &report).unwrap();
        let value: serde_json::Value = serde_json::from_reader(File::open(&json_path).unwrap()).unwrap();
        assert_eq!(value["bar_count"], 25);

        std::fs::remove_dir_all(&dir).ok();
    }
}
