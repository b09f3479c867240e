use crate::abundance::total_est_counts;
use crate::strand::StrandCounts;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// The library orientation assumed by a single quantification run.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Strandedness {
    Unstranded,
    /// first read maps to the transcript strand (`--fr-stranded`)
    Forward,
    /// first read maps to the opposite strand (`--rf-stranded`)
    Reverse,
}

impl Strandedness {
    pub const ALL: [Strandedness; 3] = [
        Strandedness::Unstranded,
        Strandedness::Forward,
        Strandedness::Reverse,
    ];

    /// The command line flag passed to the quantification tool, if any.
    pub fn flag(&self) -> Option<&'static str> {
        match self {
            Strandedness::Unstranded => None,
            Strandedness::Forward => Some("--fr-stranded"),
            Strandedness::Reverse => Some("--rf-stranded"),
        }
    }

    /// The name of the output directory for this run, within the sample's scratch directory.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Strandedness::Unstranded => "un",
            Strandedness::Forward => "fr",
            Strandedness::Reverse => "rf",
        }
    }
}

/// Invokes an external pseudo-alignment tool with a kallisto-compatible `quant` subcommand.
pub struct QuantRunner {
    pub program: String,
    pub index: String,
    pub threads: usize,
}

impl QuantRunner {
    fn command(&self, strandedness: Strandedness, fq1: &Path, fq2: &Path, outdir: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("quant")
            .arg("-i")
            .arg(&self.index)
            .arg("-t")
            .arg(self.threads.to_string())
            .arg("-o")
            .arg(outdir);

        if let Some(flag) = strandedness.flag() {
            cmd.arg(flag);
        }

        cmd.arg(fq1).arg(fq2);
        cmd
    }

    /// Runs a single quantification, writing into `outdir`. The tool's output streams are
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program could not be started. A non-zero exit status is
    /// logged and otherwise left to surface as a missing `abundance.tsv`.
    pub fn run(
        &self,
        strandedness: Strandedness,
        fq1: &Path,
        fq2: &Path,
        outdir: &Path,
    ) -> Result<()> {
        let mut cmd = self.command(strandedness, fq1, fq2, outdir);
        debug!("Running {:?}", cmd);

        let status = cmd
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .with_context(|| format!("Unable to execute `{}`", self.program))?;

        if !status.success() {
            warn!(
                "{} quantification ({}) exited with {}",
                self.program,
                strandedness.dir_name(),
                status
            );
        }

        Ok(())
    }

    /// Runs the unstranded, forward and reverse quantifications into subdirectories of
    /// `workdir`, and returns the total estimated counts of each.
    pub fn run_all(&self, fq1: &Path, fq2: &Path, workdir: &Path) -> Result<StrandCounts> {
        let mut totals = [0.0; 3];

        for (total, strandedness) in totals.iter_mut().zip(Strandedness::ALL) {
            let outdir: PathBuf = workdir.join(strandedness.dir_name());
            self.run(strandedness, fq1, fq2, &outdir)?;
            *total = total_est_counts(&outdir)?;
        }

        let [unstranded, forward, reverse] = totals;
        Ok(StrandCounts {
            unstranded,
            forward,
            reverse,
        })
    }
}
