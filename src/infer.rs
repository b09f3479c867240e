use crate::quant::QuantRunner;
use crate::samples::{default_output_path, SampleSheet};
use crate::strand::{classify, Strand, StrandCounts};
use crate::subsample::subsample_reads;
use crate::summary::{RunSummary, SampleSummary};

use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Everything needed to infer the strandedness of a batch of samples.
pub struct InferOptions {
    pub samples: String,
    pub output: Option<String>,
    pub summary: Option<String>,
    pub num_reads: usize,
    pub tmp_dir: Option<String>,
    pub quant: QuantRunner,
}

impl InferOptions {
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => PathBuf::from(output),
            None => default_output_path(&self.samples),
        }
    }

    /// Creates a fresh scratch directory for one sample. It is deleted when dropped.
    fn scratch_dir(&self) -> Result<TempDir> {
        let dir = match &self.tmp_dir {
            Some(parent) => tempfile::Builder::new()
                .prefix("strandcheck")
                .tempdir_in(parent),
            None => tempfile::Builder::new().prefix("strandcheck").tempdir(),
        };
        dir.context("Unable to create a temporary directory")
    }
}

/// Infers the strandedness of a single pair of FASTQ files.
///
/// The first `num_reads` reads of each mate are copied into a scratch directory, which is
/// then quantified under every strand assumption. The scratch directory is removed before
/// returning, whether or not inference succeeded.
pub fn infer_strand(fq1: &str, fq2: &str, opts: &InferOptions) -> Result<(Strand, StrandCounts)> {
    info!("Inferring strand from {fq1}, {fq2}");

    let workdir = opts.scratch_dir()?;
    let sub1 = workdir.path().join("test_1.fq");
    let sub2 = workdir.path().join("test_2.fq");

    subsample_reads(Path::new(fq1), &sub1, opts.num_reads)?;
    subsample_reads(Path::new(fq2), &sub2, opts.num_reads)?;

    let counts = opts.quant.run_all(&sub1, &sub2, workdir.path())?;
    debug!(
        "est_counts: unstranded={} forward={} reverse={}",
        counts.unstranded, counts.forward, counts.reverse
    );

    let strand = classify(&counts)?;

    workdir
        .close()
        .context("Unable to remove the temporary directory")?;

    Ok((strand, counts))
}

/// Infers the strandedness of every sample in the sheet, in order, and writes the sheet
/// back out with a `strand` column. Any failure aborts the whole batch.
pub fn run(opts: &InferOptions) -> Result<()> {
    let sheet = SampleSheet::from_path(&opts.samples)?;
    info!("Loaded {} samples from {}", sheet.len(), opts.samples);

    let mut strands = Vec::with_capacity(sheet.len());
    let mut summary = RunSummary::new(&opts.quant.index, opts.num_reads);

    for (i, sample) in sheet.samples().enumerate() {
        let (strand, counts) = infer_strand(sample.fq1, sample.fq2, opts)
            .with_context(|| format!("Failed on sample {} ({}, {})", i + 1, sample.fq1, sample.fq2))?;
        info!("{} -> {}", sample.fq1, strand);

        strands.push(strand);
        summary.samples.push(SampleSummary {
            fq1: sample.fq1.to_string(),
            fq2: sample.fq2.to_string(),
            counts,
            strand,
        });
    }

    let output = opts.output_path();
    let file = File::create(&output)
        .with_context(|| format!("Unable to create {}", output.display()))?;
    sheet.write_with_strands(BufWriter::new(file), &strands)?;
    info!("Wrote {}", output.display());

    if let Some(path) = &opts.summary {
        summary.write(path)?;
        info!("Wrote summary to {path}");
    }

    let mut tally = BTreeMap::new();
    for strand in strands {
        *tally.entry(strand).or_insert(0usize) += 1;
    }
    for (strand, count) in tally {
        info!("  {strand}: {count}");
    }

    Ok(())
}
