extern crate env_logger;
#[macro_use]
extern crate log;

use anyhow::Result;
use clap::Parser;

mod abundance;
mod cli;
mod infer;
mod quant;
mod samples;
mod strand;
mod subsample;
mod summary;

use cli::Cli;
use infer::InferOptions;
use quant::QuantRunner;

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("strandcheck v{}", cli::VERSION);
    info!(
        "Using index {} with {} reads per mate and {} threads",
        cli.index, cli.num_reads, cli.threads
    );

    let opts = InferOptions {
        samples: cli.samples,
        output: cli.output,
        summary: cli.summary,
        num_reads: cli.num_reads,
        tmp_dir: cli.tmp_dir,
        quant: QuantRunner {
            program: cli.quant_bin,
            index: cli.index,
            threads: cli.threads,
        },
    };

    infer::run(&opts)?;

    info!("Completed successfully.");
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
