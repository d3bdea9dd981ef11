mod frame;
mod process;
mod simulate;

use std::io::stderr;

use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use ecclab::fletcher::{CheckOrder, FletcherConfig, InitialSums};
use ecclab::Algorithm;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SumsArg {
    Zero,
    One,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OrderArg {
    #[value(name = "sum2-sum1")]
    Sum2Sum1,
    #[value(name = "sum1-sum2")]
    Sum1Sum2,
}

#[derive(Args, Debug)]
struct AlgorithmArgs {
    /// Algorithm name: crc32, fletcher, fletcher16 or hamming.
    #[arg(short, long)]
    algorithm: String,

    /// Fletcher block size in bits (8, 16 or 32). Required for fletcher.
    #[arg(short, long)]
    block_size: Option<u32>,

    /// Initial value of both Fletcher sums.
    #[arg(long, default_value = "zero")]
    initial_sums: SumsArg,

    /// Order the Fletcher sums are written in the check region.
    #[arg(long, default_value = "sum2-sum1")]
    order: OrderArg,
}

impl AlgorithmArgs {
    fn resolve(&self) -> Result<Algorithm> {
        let initial_sums = match self.initial_sums {
            SumsArg::Zero => InitialSums::Zero,
            SumsArg::One => InitialSums::One,
        };
        let order = match self.order {
            OrderArg::Sum2Sum1 => CheckOrder::Sum2Sum1,
            OrderArg::Sum1Sum2 => CheckOrder::Sum1Sum2,
        };
        let conventions_set =
            initial_sums != InitialSums::default() || order != CheckOrder::default();

        match Algorithm::from_name(&self.algorithm, self.block_size)? {
            Algorithm::Fletcher(config) => Ok(Algorithm::Fletcher(
                FletcherConfig::builder()
                    .block_size(config.block_size)
                    .initial_sums(initial_sums)
                    .order(order)
                    .build(),
            )),
            alg if conventions_set => {
                bail!("--initial-sums and --order only apply to fletcher, not {alg}")
            }
            alg => Ok(alg),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a payload into a frame.
    ///
    /// The frame is written to stdout as a single line of 0/1 text. Payloads that
    /// are not a whole number of bytes (crc32) or blocks (fletcher) are padded with
    /// trailing zeros.
    Encode {
        #[command(flatten)]
        algorithm: AlgorithmArgs,

        /// Treat the input as ASCII text rather than 0/1 bits.
        #[arg(short, long, action)]
        text: bool,

        /// Payload bits, text, or a file containing them. Reads stdin if omitted
        /// or `-`.
        input: Option<String>,
    },
    /// Check, and where possible correct, a received frame.
    Decode {
        #[command(flatten)]
        algorithm: AlgorithmArgs,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: frame::Format,

        /// Frame bits or a file containing them. Reads stdin if omitted or `-`.
        input: Option<String>,
    },
    /// Decode JSON requests read from stdin, one per line.
    ///
    /// Each request has the form {"algo": "hamming", "trama": "1011001", "NumMensaje": 1}
    /// and fletcher requests also need "block_size". One JSON response is written
    /// to stdout per request.
    Process,
    /// Measure how each algorithm copes with random bit flips.
    ///
    /// Random lowercase messages are encoded, every bit of each frame is flipped
    /// with the given probability, and the decoded results are tallied per
    /// algorithm and noise level.
    Simulate {
        /// Algorithms to simulate.
        #[arg(
            short,
            long,
            value_delimiter = ',',
            value_name = "csv",
            default_value = "crc32,fletcher,fletcher16,hamming"
        )]
        algorithms: Vec<String>,

        /// Block size used for fletcher.
        #[arg(short, long, default_value_t = 16)]
        block_size: u32,

        /// Number of messages per algorithm and noise level.
        #[arg(short, long, default_value_t = 1000)]
        messages: usize,

        /// Characters per message.
        #[arg(short, long, default_value_t = 8)]
        length: usize,

        /// Per-bit flip probabilities.
        #[arg(
            short,
            long,
            value_delimiter = ',',
            value_name = "csv",
            default_value = "0,0.001,0.01,0.05"
        )]
        noise: Vec<f64>,

        /// Seed for reproducible runs. A random seed is used and logged if omitted.
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: frame::Format,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(stderr)
        .with_ansi(false)
        .without_time()
        .with_env_filter(
            EnvFilter::try_from_env("ECCLAB_LOG").unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    debug!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Commands::Encode {
            algorithm,
            text,
            input,
        } => frame::encode(algorithm.resolve()?, input.as_deref(), *text),
        Commands::Decode {
            algorithm,
            format,
            input,
        } => frame::decode(algorithm.resolve()?, input.as_deref(), format),
        Commands::Process => process::process_stdin(),
        Commands::Simulate {
            algorithms,
            block_size,
            messages,
            length,
            noise,
            seed,
            format,
        } => {
            let algorithms = algorithms
                .iter()
                .map(|name| Algorithm::from_name(name, Some(*block_size)))
                .collect::<ecclab::Result<Vec<_>>>()?;
            let seed = seed.unwrap_or_else(rand::random);
            let opts = simulate::Options {
                algorithms,
                messages: *messages,
                length: *length,
                noise: noise.clone(),
                seed,
            };
            simulate::simulate(&opts, format)
        }
    }
}
