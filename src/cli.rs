use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::Parser;

use crate::subsample::LINES_PER_RECORD;

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
🧬 strandcheck version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   infer the strandedness of paired-end RNA-seq libraries";

/// Number of read pairs subsampled from each sample when `--num-reads` is not given.
pub const DEFAULT_NUM_READS: usize = 50_000;

/// Number of threads handed to the quantification tool when `--threads` is not given.
pub const DEFAULT_THREADS: usize = 2;

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser, Debug)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    styles = STYLES
)]
pub struct Cli {
    /// the quantification index file
    #[arg(short, long)]
    pub index: String,

    /// the number of reads to subsample from each mate
    #[arg(
        short = 'n',
        long,
        default_value_t = DEFAULT_NUM_READS,
        value_parser = parse_positive
    )]
    pub num_reads: usize,

    /// the number of threads used by the quantification tool
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_THREADS,
        value_parser = parse_positive
    )]
    pub threads: usize,

    /// the output .csv. by default, this is the sample sheet path with
    /// `.csv` replaced by `.stranded.csv`
    #[arg(short, long, verbatim_doc_comment)]
    pub output: Option<String>,

    /// the quantification executable. it is invoked as:
    ///     <quant-bin> quant -i INDEX -t THREADS -o OUTDIR [--fr-stranded|--rf-stranded] FQ1 FQ2
    #[arg(long, default_value = "kallisto", verbatim_doc_comment)]
    pub quant_bin: String,

    /// directory in which per-sample scratch directories are created
    #[arg(long)]
    pub tmp_dir: Option<String>,

    /// write a JSON summary of the count totals for every sample
    #[arg(long)]
    pub summary: Option<String>,

    /// a .csv sample sheet with `fq1` and `fq2` columns
    pub samples: String,
}

/// Error type for parsing a strictly positive count.
#[derive(Debug)]
pub struct ParseCountErr(String);

impl std::fmt::Display for ParseCountErr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid count: {}", self.0)
    }
}

impl std::error::Error for ParseCountErr {}

fn parse_positive(arg: &str) -> Result<usize, ParseCountErr> {
    // accept scientific notation as well, e.g. `5e4`
    let value = match arg.trim().parse::<usize>() {
        Ok(v) => v,
        Err(_) => {
            let float = arg.trim().parse::<f64>().map_err(|_| {
                ParseCountErr(indoc::formatdoc! {"
                Expected a positive whole number, got '{arg}'. For example:
                  -n 50000
                  -n 5e4
                "})
            })?;

            if float.fract() != 0.0 || float < 0.0 || float >= usize::MAX as f64 {
                return Err(ParseCountErr(format!(
                    "'{arg}' is not a whole number"
                )));
            }
            float as usize
        }
    };

    if value == 0 {
        return Err(ParseCountErr(String::from("must be at least 1")));
    }
    if value > usize::MAX / LINES_PER_RECORD {
        return Err(ParseCountErr(format!("'{arg}' is too large")));
    }

    Ok(value)
}
