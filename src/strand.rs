use serde::Serialize;
use thiserror::Error;

/// The ratio of reverse to forward counts below which a library is called `stranded`.
const STRANDED_MAX_RATIO: f64 = 0.3;

/// The minimum fold difference used by every other comparison in `classify`.
const MIN_FOLD: f64 = 3.0;

/// The inferred strandedness of a library.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strand {
    Stranded,
    Reverse,
    Unstranded,
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Strand::Stranded => "stranded",
            Strand::Reverse => "reverse",
            Strand::Unstranded => "unstranded",
        })
    }
}

/// Summed `est_counts` from the three quantification runs of a sample.
///
/// # Fields
///
/// * `unstranded` - total from the run without a strand flag
/// * `forward` - total from the `--fr-stranded` run
/// * `reverse` - total from the `--rf-stranded` run
#[derive(Copy, Clone, Debug, PartialEq, Serialize)]
pub struct StrandCounts {
    pub unstranded: f64,
    pub forward: f64,
    pub reverse: f64,
}

#[derive(Error, Debug, PartialEq)]
pub enum StrandError {
    #[error("the {run} quantification assigned no reads, so strand ratios are undefined")]
    ZeroCount { run: &'static str },
}

/// Labels a sample from its count totals. The first matching rule wins:
///
/// 1. `reverse / forward < 0.3` and `unstranded / reverse > 3` gives `Stranded`
/// 2. `reverse / forward > 3` and `unstranded / forward > 3` gives `Reverse`
/// 3. anything else gives `Unstranded`
///
/// # Errors
///
/// Returns `StrandError::ZeroCount` if the forward or reverse total is zero, since
/// at least one of the ratios above would then be undefined.
pub fn classify(counts: &StrandCounts) -> Result<Strand, StrandError> {
    if counts.forward == 0.0 {
        return Err(StrandError::ZeroCount { run: "forward-stranded" });
    }
    if counts.reverse == 0.0 {
        return Err(StrandError::ZeroCount { run: "reverse-stranded" });
    }

    let rev_over_fwd = counts.reverse / counts.forward;

    let strand = if rev_over_fwd < STRANDED_MAX_RATIO
        && counts.unstranded / counts.reverse > MIN_FOLD
    {
        Strand::Stranded
    } else if rev_over_fwd > MIN_FOLD && counts.unstranded / counts.forward > MIN_FOLD {
        Strand::Reverse
    } else {
        Strand::Unstranded
    };

    Ok(strand)
}
