use band_core::{AnalysisReport, PriceSeries};

/// `1234.5` -> `$1,234.50`, `-3.2` -> `-$3.20`
pub fn format_currency(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let sign = if value < 0.0 && fixed != "0.00" { "-" } else { "" };
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{}${}.{}", sign, grouped, frac_part)
}

pub fn format_percent(value: f64) -> String {
    format!("{:+.2}%", value)
}

fn format_optional(value: Option<f64>) -> String {
    value.map(format_currency).unwrap_or_else(|| "n/a".to_string())
}

pub fn print_report(report: &AnalysisReport, series: &PriceSeries, summary_rows: usize) {
    println!(
        "{} ({} bars, {} -> {})",
        report.symbol, report.bar_count, report.first_time, report.last_time
    );
    println!(
        "Close Price {}  {}-bar High {}  {}-bar Low {}",
        format_currency(report.summary.latest_close),
        report.summary.window,
        format_optional(report.summary.high),
        report.summary.window,
        format_optional(report.summary.low),
    );

    for delta in &report.deltas {
        println!(
            "{:>10} Price Difference {:>14} {:>9}",
            delta.horizon_label,
            format_currency(delta.absolute_diff),
            format_percent(delta.percentage_diff)
        );
    }

    let reg = &report.regression;
    println!(
        "Regression order {} (sqrt degree {:.3}), residual std {:.4}",
        reg.fit_order, reg.degree_used, reg.residual_std
    );
    for band in &report.bands {
        let a = &band.annotation;
        println!(
            "  [{:<6}] {:<20} {:>14}   {:<16} {:>14}",
            band.color,
            a.upper_text,
            format_currency(a.upper_y),
            a.lower_text,
            format_currency(a.lower_y)
        );
    }
    if let Some(band) = report.bands.first() {
        println!(
            "Labels at {} (+{:.1} bars)",
            report.annotation_time.to_date_str(),
            band.annotation.x_offset
        );
    }

    println!("Summary");
    println!("{:<20} {:>12} {:>12} {:>12} {:>12} {:>14}", "time", "open", "high", "low", "close", "volume");
    for bar in series.tail(summary_rows) {
        println!(
            "{:<20} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>14.0}",
            bar.time.to_str(),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(12.346), "$12.35");
        assert_eq!(format_currency(999.999), "$1,000.00");
        assert_eq!(format_currency(1234567.891), "$1,234,567.89");
        assert_eq!(format_currency(-3.2), "-$3.20");
        assert_eq!(format_currency(-123456.0), "-$123,456.00");
        assert_eq!(format_currency(-0.001), "$0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(1.234), "+1.23%");
        assert_eq!(format_percent(-0.5), "-0.50%");
        assert_eq!(format_percent(0.0), "+0.00%");
    }
}
