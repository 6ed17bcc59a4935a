//! Export rendering for analysis results. The caller supplies the
//! timestamp, so export content is reproducible in tests.

use chrono::{DateTime, TimeZone, Utc};
use csv::Writer;
use std::fmt::Write as _;
use tracing::debug;

use crate::error::ExportError;
use crate::types::{AnalysisScope, ExportFile, Report, Sample};

/// Renders the full text export: a header identifying the scope, the
/// collected data as JSON, and the narrative report.
pub fn render_export(
    scope: &AnalysisScope,
    samples: &[Sample],
    report: &Report,
    generated_at: DateTime<Utc>,
) -> Result<String, ExportError> {
    let mut out = String::new();
    let _ = writeln!(out, "# Compressed air analysis export");
    let _ = writeln!(out, "Generated: {}", generated_at.to_rfc3339());
    let _ = writeln!(out, "Network: {}", scope.network_id);
    let _ = writeln!(out, "Asset: {}", scope.asset_id);
    let _ = writeln!(out, "Analysis: {}", scope.kind.label());
    let _ = writeln!(out, "Period: {}", scope.period.label());
    if let Some(range) = scope.date_range {
        let _ = writeln!(out, "Date filter: {} to {}", range.start, range.end);
    }

    let _ = writeln!(out, "\n## Collected data");
    out.push_str(&serde_json::to_string_pretty(samples)?);
    out.push('\n');

    let _ = writeln!(out, "\n## Report");
    out.push_str(&report.to_text());

    Ok(out)
}

/// Packages the export under its conventional file name,
/// `analise-{endpoint}-{period}-{millis}.txt`.
pub fn export_file(
    scope: &AnalysisScope,
    samples: &[Sample],
    report: &Report,
    generated_at: DateTime<Utc>,
) -> Result<ExportFile, ExportError> {
    let name = format!(
        "analise-{}-{}-{}.txt",
        scope.kind.as_endpoint(),
        scope.period.as_endpoint(),
        generated_at.timestamp_millis()
    );
    debug!(%name, "rendering export");
    let content = render_export(scope, samples, report, generated_at)?;
    Ok(ExportFile { name, content })
}

/// Renders raw samples as CSV with human-readable timestamps.
pub fn samples_to_csv(samples: &[Sample]) -> Result<String, ExportError> {
    let mut writer = Writer::from_writer(vec![]);
    writer.write_record(["timestamp", "value"])?;
    for sample in samples {
        let ts = match Utc.timestamp_opt(sample.timestamp, 0).single() {
            Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            None => sample.timestamp.to_string(),
        };
        writer.write_record([ts, sample.value.to_string()])?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| ExportError::CsvBuffer(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| ExportError::CsvBuffer(e.to_string()))
}
