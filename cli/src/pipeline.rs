//! Pipeline -- the whole pipeline of the figure.
//!
//! This module simulates the genotypes, renders the four panels, and flushes them to the disk.
use impfig::errors::Result;
use impfig::{Figure, FigureConfig};
use log::*;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

/// Where the results go.
#[derive(Clone, Debug)]
pub struct OutputConfig {
    /// The path to the text panels.
    pub output: PathBuf,
    /// If given, the whole figure is dumped here as JSON.
    pub dump: Option<PathBuf>,
}

pub fn load_profile(path: &Path) -> Result<FigureConfig> {
    debug!("Opening {:?}", path);
    let mut rdr = std::fs::File::open(path).map(std::io::BufReader::new)?;
    let mut file = String::new();
    rdr.read_to_string(&mut file)?;
    Ok(toml::from_str(&file)?)
}

/// Generate the figure, then write the panels, the optional dump, and the summary.
/// Nothing is written when the figure can not be generated.
pub fn run_pipeline(config: &FigureConfig, out: &OutputConfig) -> Result<Figure> {
    debug!("CONFIG\t{:?}", config);
    let figure = Figure::generate(config)?;
    let mut wtr = std::fs::File::create(&out.output).map(BufWriter::new)?;
    wtr.write_all(figure.render().as_bytes())?;
    wtr.flush()?;
    info!("PANEL\t{:?}", out.output);
    if let Some(path) = out.dump.as_ref() {
        log(&figure, path)?;
    }
    let stdout = std::io::stdout();
    let mut stdout = BufWriter::new(stdout.lock());
    for line in figure.summary() {
        writeln!(stdout, "{line}")?;
    }
    stdout.flush()?;
    Ok(figure)
}

fn log(figure: &Figure, path: &Path) -> Result<()> {
    let mut wtr = std::fs::File::create(path).map(BufWriter::new)?;
    serde_json::ser::to_writer(&mut wtr, figure)?;
    wtr.flush()?;
    debug!("DUMP\t{:?}", path);
    Ok(())
}

pub fn set_threads(threads: usize) {
    debug!("Set Threads\t{}", threads);
    if let Err(why) = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
    {
        debug!("{:?} The global pool was already set up.", why);
    }
}
