use crate::strand::{Strand, StrandCounts};
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;

/// A record of a whole run, written as JSON when `--summary` is given. Keeping the raw
/// count totals alongside each label makes borderline calls easy to review.
#[derive(Serialize)]
pub struct RunSummary {
    pub version: String,
    pub run_date: String,
    pub index: String,
    pub num_reads: usize,
    pub samples: Vec<SampleSummary>,
}

#[derive(Serialize)]
pub struct SampleSummary {
    pub fq1: String,
    pub fq2: String,
    #[serde(flatten)]
    pub counts: StrandCounts,
    pub strand: Strand,
}

impl RunSummary {
    pub fn new(index: &str, num_reads: usize) -> Self {
        RunSummary {
            version: crate::cli::VERSION.to_string(),
            run_date: format!("{:?}", chrono::offset::Local::now()),
            index: index.to_string(),
            num_reads,
            samples: Vec::new(),
        }
    }

    pub fn write(&self, path: &str) -> Result<()> {
        let file = File::create(path).with_context(|| format!("Unable to create {path}"))?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)
            .context("Could not serialize summary")?;
        Ok(())
    }
}
