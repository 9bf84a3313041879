// ----------------------------------- CLI -----------------------------------
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "mlem", about = "Maximum Likelihood Expectation Maximization")]
pub struct Cli {

    /// Reconstruction configuration file (TOML)
    pub config_file: PathBuf,

    /// Override the number of iterations given in the config file
    #[clap(short, long)]
    pub iterations: Option<usize>,

    /// Override the number of OSEM subsets given in the config file
    #[clap(short, long)]
    pub subsets: Option<usize>,

    /// Override the output file pattern given in the config file
    #[clap(short, long)]
    pub out_files: Option<String>,

    /// Report contrast recovery of the hot/cold disc phantom after each iteration
    #[clap(long)]
    pub crcs: bool,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub num_threads: usize,
}

// --------------------------------------------------------------------------------

fn main() -> Result<(), Box<dyn Error>> {

    env_logger::init();
    let args = Cli::parse();

    let mut config = read_config_file(&args.config_file)?;
    if let Some(n) = args.iterations { config.iterations = n }
    if let Some(n) = args.subsets    { config.subsets    = n }
    if let Some(p) = &args.out_files { config.output.pattern = p.clone() }

    // Set the maximum number of threads used by rayon for parallel iteration
    match rayon::ThreadPoolBuilder::new().num_threads(args.num_threads).build_global() {
        Err(e) => println!("{}", e),
        Ok(_)  => println!("Using up to {} threads.", args.num_threads),
    }

    let mut progress = Progress::new();

    progress.start("Building system matrix");
    let geometry = config.geometry()?;
    let mut model = geometry.system_matrix()?;
    progress.done();

    progress.start(&format!("Reading sinogram {:?}", config.input.data));
    let acquired = ProjectionData::from_raw_file(&config.input.data, geometry.shape())?;
    if let Some(path) = &config.input.background {
        model = model.with_background(ProjectionData::from_raw_file(path, geometry.shape())?)?;
    }
    let initial = match &config.input.initial {
        Some(path) => Image::from_raw_file(path, geometry.grid())?,
        None       => Image::ones(geometry.grid()),
    };
    progress.done_with_message(&format!("Read {} counts", group_digits(acquired.total().round())));

    let phantom = args.crcs.then(|| Phantom::hot_cold_discs(geometry.grid()));
    let mut report = Report::new(&config, &model, &acquired, phantom)?;

    if config.subsets == 1 {
        let images = Mlem::new(&acquired, &model, &initial)?
            .iterations()
            .take(config.iterations);
        for (n, image) in images.enumerate() {
            report.iteration(n, &image?)?;
        }
    } else {
        let subsets = model.subsets(config.subsets)?;
        let mut osem = Osem::new(&acquired, &subsets, &initial)?;
        for n in 0..config.iterations {
            osem.step()?;
            report.iteration(n, osem.estimate())?;
        }
    }
    report.finish();
    progress.done_with_message("Reconstruction finished");
    Ok(())
}

/// Per-iteration output: progress bar, data fidelity, image files
struct Report<'a> {
    bar: ProgressBar,
    model: &'a SparseSystemMatrix,
    acquired: &'a ProjectionData,
    pattern: String,
    every: usize,
    last: usize,
    phantom: Option<Phantom>,
}

impl<'a> Report<'a> {

    fn new(
        config  : &Config,
        model   : &'a SparseSystemMatrix,
        acquired: &'a ProjectionData,
        phantom : Option<Phantom>,
    ) -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(config.iterations as u64);
        bar.set_style(ProgressStyle::default_bar()
                      .template("[{elapsed_precise}] {wide_bar} {pos}/{len} ({eta_precise})")?);
        Ok(Self {
            bar, model, acquired, phantom,
            pattern: config.output.pattern.clone(),
            every: config.output.every,
            last: config.iterations,
        })
    }

    fn iteration(&mut self, n: usize, image: &Image) -> Result<(), Box<dyn Error>> {
        let done = n + 1;
        let projected = self.model.forward(image.clone())?;
        let likelihood = poisson_log_likelihood(self.acquired, &projected)?;
        let mut line = format!("Iteration {done:3}   log-likelihood {likelihood:14.6e}");

        if let Some(phantom) = &self.phantom {
            if let Some(crcs) = phantom.crcs(image) {
                line.push_str("   CRCs:");
                for crc in crcs { line.push_str(&format!(" {crc:6.2}")) }
            }
        }

        if done % self.every == 0 || done == self.last {
            let path = PathBuf::from(format!("{}_{:02}.raw", self.pattern, done));
            image.write_to_raw_file(&path)?;
            line.push_str(&format!("   -> {}", path.display()));
        }
        self.bar.println(line);
        self.bar.inc(1);
        Ok(())
    }

    fn finish(&self) { self.bar.finish_and_clear() }
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::{
    error::Error,
    path::PathBuf,
};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};

use emrecon::{
    AcquisitionModel, Image, Mlem, ProjectionData, SparseSystemMatrix,
    config::mlem::{Config, read_config_file},
    fom::poisson_log_likelihood,
    osem::Osem,
    phantom::Phantom,
    utils::{group_digits, timing::Progress},
};
