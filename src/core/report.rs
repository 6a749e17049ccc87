use crate::domain::model::BatchReport;
use crate::utils::error::Result;
use serde_json::json;

const TITLE: &str = "HLA Imputation Verification Report";

/// Human-readable verification summary. Batches are listed in id order.
pub fn format_report(report: &BatchReport) -> String {
    let mut lines = vec![
        TITLE.to_string(),
        "=".repeat(45),
        format!("Total sub-batches:    {}", report.total_sub_batches()),
        format!("Complete:             {}", report.complete_sub_batches()),
        format!(
            "Completeness rate:    {}",
            format_rate(report.completeness_rate())
        ),
        String::new(),
    ];

    for (batch_id, units) in &report.batches {
        lines.push(format!("Batch: {}", batch_id));
        for unit in units {
            let status = if unit.is_complete() { "OK" } else { "INCOMPLETE" };
            lines.push(format!(
                "  {}: {}  (HLA markers: {})",
                unit.name, status, unit.marker_count
            ));
        }
    }

    lines.join("\n")
}

/// Fraction in [0, 1] as a percentage with one decimal place.
pub fn format_rate(rate: f64) -> String {
    format!("{:.1}%", rate * 100.0)
}

/// Machine-readable form of the report with its summary figures.
pub fn report_json(report: &BatchReport) -> Result<String> {
    let value = json!({
        "total_sub_batches": report.total_sub_batches(),
        "complete_sub_batches": report.complete_sub_batches(),
        "completeness_rate": report.completeness_rate(),
        "batches": report.batches,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}
