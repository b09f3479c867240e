use anyhow::{Context, Result};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::path::Path;

/// The name of the per-transcript table written into every quantification output directory.
pub const ABUNDANCE_FILE: &str = "abundance.tsv";

/// A row of `abundance.tsv`. Only the estimated read count is needed; the remaining
/// columns (`target_id`, `length`, `eff_length`, `tpm`) are ignored.
#[derive(Debug, Deserialize)]
struct AbundanceRecord {
    est_counts: f64,
}

/// Sums the `est_counts` column of the `abundance.tsv` in a quantification output directory.
///
/// # Errors
///
/// This function will return an error if the file is missing (usually because the
/// quantification tool failed), or if any row lacks a numeric `est_counts` value.
pub fn total_est_counts(outdir: &Path) -> Result<f64> {
    let path = outdir.join(ABUNDANCE_FILE);

    let mut rdr = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .from_path(&path)
        .with_context(|| format!("Unable to read quantification output {}", path.display()))?;

    let mut total = 0.0;
    for (row, record) in rdr.deserialize::<AbundanceRecord>().enumerate() {
        let record = record.with_context(|| {
            format!("Invalid row {} in {}", row + 1, path.display())
        })?;
        total += record.est_counts;
    }

    Ok(total)
}
