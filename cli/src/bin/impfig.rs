use clap::Parser;
use impfig::FigureConfig;
use impfig_cli::pipeline::{self, OutputConfig};
use std::path::PathBuf;
#[macro_use]
extern crate log;

#[derive(Parser, Debug)]
#[command(name = "impfig")]
#[command(version = "0.1")]
#[command(about = "Render the missing-data panels of an imputation methods figure.")]
#[command(author, long_about = None)]
struct Args {
    /// TOML profile. Fields not listed keep their default values.
    #[arg(short, long)]
    profile: Option<PathBuf>,
    /// Path to the text panels.
    #[arg(short, long, default_value = "formatted.txt")]
    output: PathBuf,
    /// Dump the whole figure as JSON to this path.
    #[arg(long)]
    dump: Option<PathBuf>,
    /// Number of threads.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,
    /// Debug mode.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
    pipeline::set_threads(args.threads);
    let config = match args.profile.as_ref() {
        Some(path) => pipeline::load_profile(path),
        None => Ok(FigureConfig::default()),
    };
    let out = OutputConfig {
        output: args.output,
        dump: args.dump,
    };
    if let Err(why) = config.and_then(|config| pipeline::run_pipeline(&config, &out)) {
        error!("{:?}", why);
        eprintln!("{}", why);
        std::process::exit(1);
    }
}
