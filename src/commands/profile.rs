use crate::cli::OutputFormat;
use crate::error::Result;
use crate::profile::{FailurePolicy, ProfileReport, Profiler, ProfilerConfig};
use crate::request::Execute;
use crate::target::Target;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use std::io::{self, Write};
use std::time::Duration;

pub fn run<E: Execute>(
    executor: E,
    target: &Target,
    requests: u32,
    policy: FailurePolicy,
    format: OutputFormat,
    quiet: bool,
) -> Result<()> {
    let profiler = Profiler::new(executor, ProfilerConfig { requests, policy })?;

    if !quiet {
        eprintln!("Profiling {} ({} requests)...", target, requests);
    }

    let report = profiler.run(target, |progress| {
        if quiet {
            return;
        }
        if let Some(err) = progress.error {
            eprintln!("\rRequest {} failed: {}", progress.completed, err);
        }
        eprint!("\rRequests: {}/{}", progress.completed, progress.total);
    })?;

    if !quiet {
        eprintln!(
            "\nCompleted in {}",
            humantime::format_duration(truncate_to_millis(report.total_elapsed))
        );
    }

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Text => write_text(&mut out, &report)?,
        OutputFormat::Table => write_table(&mut out, &report)?,
        OutputFormat::Json => write_json(&mut out, &report)?,
        OutputFormat::Csv => write_csv(&mut out, &report)?,
    }
    out.flush()?;

    Ok(())
}

fn truncate_to_millis(d: Duration) -> Duration {
    Duration::from_millis(d.as_millis() as u64)
}

/// Render error codes as `[500 404]`
fn format_codes(codes: &[u16]) -> String {
    let joined = codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    format!("[{}]", joined)
}

fn write_text<W: Write>(out: &mut W, report: &ProfileReport) -> io::Result<()> {
    writeln!(out, "Profile information for: {}", report.host)?;
    writeln!(out, "Number of requests: {}", report.request_count)?;
    writeln!(out, "The fastest time (ms): {}", report.min_latency_ms)?;
    writeln!(out, "The slowest time (ms): {}", report.max_latency_ms)?;
    writeln!(out, "The mean time (ms): {}", report.mean_latency_ms)?;
    writeln!(out, "The median time (ms): {}", report.median_latency_ms)?;
    writeln!(
        out,
        "The percentage of requests that succeeded: {}%",
        report.success_percentage
    )?;
    writeln!(
        out,
        "The error codes returned that weren't a success: {}",
        format_codes(&report.error_codes)
    )?;
    writeln!(
        out,
        "The size in bytes of the smallest response: {}",
        report.min_size
    )?;
    writeln!(
        out,
        "The size in bytes of the largest response: {}",
        report.max_size
    )?;
    if report.failures > 0 {
        writeln!(out, "Requests that failed without a response: {}", report.failures)?;
    }
    Ok(())
}

fn write_table<W: Write>(out: &mut W, report: &ProfileReport) -> io::Result<()> {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Metric", "Value"]);

    let rows: [(&str, String); 11] = [
        ("Host", report.host.clone()),
        ("Requests", report.request_count.to_string()),
        ("Fastest (ms)", report.min_latency_ms.to_string()),
        ("Slowest (ms)", report.max_latency_ms.to_string()),
        ("Mean (ms)", report.mean_latency_ms.to_string()),
        ("Median (ms)", report.median_latency_ms.to_string()),
        ("Success", format!("{:.1}%", report.success_percentage)),
        ("Error codes", format_codes(&report.error_codes)),
        ("Smallest response (bytes)", report.min_size.to_string()),
        ("Largest response (bytes)", report.max_size.to_string()),
        ("Failed requests", report.failures.to_string()),
    ];
    for (metric, value) in rows {
        table.add_row(vec![metric.to_string(), value]);
    }

    writeln!(out, "# Started {}", report.started_at.format("%Y-%m-%d %H:%M:%S UTC"))?;
    writeln!(out, "{table}")
}

fn write_json<W: Write>(out: &mut W, report: &ProfileReport) -> io::Result<()> {
    let latencies = report
        .latencies_ms
        .iter()
        .map(|l| l.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    let codes = report
        .error_codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(out, "{{")?;
    writeln!(
        out,
        "  \"host\": \"{}\",",
        report.host.replace('\\', "\\\\").replace('"', "\\\"")
    )?;
    writeln!(out, "  \"started_at\": \"{}\",", report.started_at.to_rfc3339())?;
    writeln!(out, "  \"requests\": {},", report.request_count)?;
    writeln!(out, "  \"fastest_ms\": {},", report.min_latency_ms)?;
    writeln!(out, "  \"slowest_ms\": {},", report.max_latency_ms)?;
    writeln!(out, "  \"mean_ms\": {},", report.mean_latency_ms)?;
    writeln!(out, "  \"median_ms\": {},", report.median_latency_ms)?;
    writeln!(out, "  \"success_pct\": {},", report.success_percentage)?;
    writeln!(out, "  \"error_codes\": [{}],", codes)?;
    writeln!(out, "  \"smallest_bytes\": {},", report.min_size)?;
    writeln!(out, "  \"largest_bytes\": {},", report.max_size)?;
    writeln!(out, "  \"failures\": {},", report.failures)?;
    writeln!(out, "  \"total_ms\": {},", report.total_elapsed.as_millis())?;
    writeln!(out, "  \"latencies_ms\": [{}]", latencies)?;
    writeln!(out, "}}")
}

fn write_csv<W: Write>(out: &mut W, report: &ProfileReport) -> io::Result<()> {
    writeln!(
        out,
        "host,requests,fastest_ms,slowest_ms,mean_ms,median_ms,success_pct,error_codes,smallest_bytes,largest_bytes"
    )?;
    let codes = report
        .error_codes
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(";");
    writeln!(
        out,
        "{},{},{},{},{},{},{},\"{}\",{},{}",
        report.host,
        report.request_count,
        report.min_latency_ms,
        report.max_latency_ms,
        report.mean_latency_ms,
        report.median_latency_ms,
        report.success_percentage,
        codes,
        report.min_size,
        report.max_size
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn report() -> ProfileReport {
        ProfileReport {
            host: "example.com".to_string(),
            request_count: 5,
            latencies_ms: vec![30, 40, 50, 60, 70],
            min_latency_ms: 30,
            max_latency_ms: 70,
            mean_latency_ms: 50,
            median_latency_ms: 50,
            min_size: 100,
            max_size: 200,
            error_codes: vec![500],
            success_percentage: 80.0,
            failures: 0,
            total_elapsed: Duration::from_millis(250),
            started_at: Utc::now(),
        }
    }

    fn render(f: fn(&mut Vec<u8>, &ProfileReport) -> io::Result<()>, r: &ProfileReport) -> String {
        let mut out = Vec::new();
        f(&mut out, r).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_text_report_order() {
        let text = render(write_text, &report());
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "Profile information for: example.com",
                "Number of requests: 5",
                "The fastest time (ms): 30",
                "The slowest time (ms): 70",
                "The mean time (ms): 50",
                "The median time (ms): 50",
                "The percentage of requests that succeeded: 80%",
                "The error codes returned that weren't a success: [500]",
                "The size in bytes of the smallest response: 100",
                "The size in bytes of the largest response: 200",
            ]
        );
    }

    #[test]
    fn test_text_report_mentions_failures() {
        let mut r = report();
        r.failures = 2;
        let text = render(write_text, &r);
        assert!(text.ends_with("Requests that failed without a response: 2\n"));
    }

    #[test]
    fn test_format_codes() {
        assert_eq!(format_codes(&[]), "[]");
        assert_eq!(format_codes(&[500, 404]), "[500 404]");
    }

    #[test]
    fn test_json_report() {
        let json = render(write_json, &report());
        assert!(json.starts_with("{\n"));
        assert!(json.contains("\"host\": \"example.com\","));
        assert!(json.contains("\"error_codes\": [500],"));
        assert!(json.contains("\"latencies_ms\": [30, 40, 50, 60, 70]\n"));
        assert!(json.trim_end().ends_with('}'));
    }

    #[test]
    fn test_csv_report() {
        let csv = render(write_csv, &report());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "example.com,5,30,70,50,50,80,\"500\",100,200");
    }

    #[test]
    fn test_table_report() {
        let table = render(write_table, &report());
        assert!(table.contains("example.com"));
        assert!(table.contains("80.0%"));
        assert!(table.contains("[500]"));
    }
}
