use crate::config::toml_config::GenotypeSettings;
use crate::domain::model::{ClinicalReport, GenotypeCall, ParticipantGenotype};
use crate::utils::error::Result;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

const CSV_HEADER: [&str; 5] = ["participant_id", "allele", "dosage", "call", "r2_score"];

/// Call a genotype from an allele dosage.
///
/// `dosage >= homo_threshold` is homozygous, `dosage > hetero_threshold` is
/// heterozygous and anything else is negative, so a dosage equal to the
/// heterozygous threshold is negative.
pub fn classify_dosage(dosage: f64, homo_threshold: f64, hetero_threshold: f64) -> GenotypeCall {
    if dosage >= homo_threshold {
        GenotypeCall::Homozygous
    } else if dosage > hetero_threshold {
        GenotypeCall::Heterozygous
    } else {
        GenotypeCall::Negative
    }
}

pub struct ClinicalReporter {
    settings: GenotypeSettings,
}

impl ClinicalReporter {
    pub fn new(settings: GenotypeSettings) -> Self {
        Self { settings }
    }

    pub fn classify(&self, dosage: f64) -> GenotypeCall {
        classify_dosage(
            dosage,
            self.settings.homozygous_threshold,
            self.settings.heterozygous_threshold,
        )
    }

    /// Build the report for `allele_column` from a tab-separated dosage file.
    ///
    /// Rows whose dosage does not parse as a number are dropped. If the
    /// allele column is absent from the header every row reads as dosage 0.
    pub fn generate_report(
        &self,
        dosage_path: &Path,
        allele_column: &str,
        r2_scores: Option<&HashMap<String, f64>>,
    ) -> Result<ClinicalReport> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(dosage_path)?;

        let headers = reader.headers()?.clone();
        let sample_idx = headers
            .iter()
            .position(|h| h == self.settings.sample_column);
        let allele_idx = headers.iter().position(|h| h == allele_column);
        if allele_idx.is_none() {
            tracing::warn!(
                "Column {} not found in {}; all dosages default to 0",
                allele_column,
                dosage_path.display()
            );
        }

        let r2 = r2_scores.and_then(|scores| scores.get(allele_column).copied());
        let mut report = ClinicalReport::new(allele_column);
        let mut skipped = 0usize;

        for (row, record) in reader.records().enumerate() {
            let record = record?;
            let participant_id = sample_idx
                .and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
                .to_string();
            let raw = match allele_idx {
                Some(i) => record.get(i),
                None => Some("0"),
            };

            let Some(dosage) = raw.and_then(|v| v.trim().parse::<f64>().ok()) else {
                tracing::debug!("Skipping row {} ({}): unparseable dosage {:?}", row + 1, participant_id, raw);
                skipped += 1;
                continue;
            };

            report.genotypes.push(ParticipantGenotype {
                participant_id,
                allele: allele_column.to_string(),
                dosage,
                call: self.classify(dosage),
                r2_score: r2,
            });
        }

        if skipped > 0 {
            tracing::warn!(
                "⚠️ Skipped {} rows with malformed dosage in {}",
                skipped,
                dosage_path.display()
            );
        }
        tracing::info!(
            "🧬 {}: {} participants, {} carriers",
            allele_column,
            report.total_participants(),
            report.carrier_count()
        );
        Ok(report)
    }
}

/// Read a `marker score` quality file into a marker → r² map. Lines that do
/// not carry a numeric score, such as a header, are skipped.
pub fn load_r2_scores(path: &Path) -> Result<HashMap<String, f64>> {
    let content = fs::read_to_string(path)?;
    let mut scores = HashMap::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        if let (Some(marker), Some(score)) = (fields.next(), fields.next()) {
            if let Ok(score) = score.parse::<f64>() {
                scores.insert(marker.to_string(), score);
            }
        }
    }
    Ok(scores)
}

/// Write the report as CSV. Dosage has four decimals; a missing r² is an
/// empty field.
pub fn export_csv(report: &ClinicalReport, output_path: &Path) -> Result<()> {
    let mut writer = csv::Writer::from_path(output_path)?;
    writer.write_record(CSV_HEADER)?;
    for g in &report.genotypes {
        let dosage = format!("{:.4}", g.dosage);
        let r2 = g.r2_score.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            g.participant_id.as_str(),
            g.allele.as_str(),
            dosage.as_str(),
            g.call.as_str(),
            r2.as_str(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}
