// ----------------------------------- CLI -----------------------------------
#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "simulate", about = "Simulate a sinogram of the hot/cold disc phantom")]
pub struct Cli {

    /// Reconstruction configuration file (TOML): the sinogram is written to
    /// the file given as `input.data`
    pub config_file: PathBuf,

    /// Where to write the true activity image
    #[clap(short, long, default_value = "data/in/phantom.raw")]
    pub truth: PathBuf,

    /// Scale the expected counts by this factor, before adding noise
    #[clap(long, default_value = "1.0")]
    pub scale: f32,

    /// Write expected counts rather than Poisson samples
    #[clap(long)]
    pub no_noise: bool,

    /// Random number generator seed
    #[clap(long, default_value = "0")]
    pub seed: u64,
}

fn main() -> Result<(), Box<dyn Error>> {

    env_logger::init();
    let Cli { config_file, truth, scale, no_noise, seed } = Cli::parse();
    let config = read_config_file(&config_file)?;

    let mut progress = Progress::new();

    progress.start("Building system matrix");
    let geometry = config.geometry()?;
    let model = geometry.system_matrix()?;
    progress.done();

    let phantom = Phantom::hot_cold_discs(geometry.grid()).render(geometry.grid());
    phantom.write_to_raw_file(&truth)?;
    progress.done_with_message(&format!("Wrote phantom to {:?}", truth));

    let noise = if no_noise { Noise::Off } else { Noise::Poisson };
    let mut rng = StdRng::seed_from_u64(seed);
    let data = acquire(&model, &phantom, scale, noise, &mut rng)?;
    data.write_to_raw_file(&config.input.data)?;
    progress.done_with_message(&format!("Wrote {} counts to {:?}",
                                        group_digits(data.total().round()), config.input.data));
    Ok(())
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::{
    error::Error,
    path::PathBuf,
};

use clap::Parser;
use rand::{SeedableRng, rngs::StdRng};

use emrecon::{
    config::mlem::read_config_file,
    phantom::Phantom,
    simulate::{acquire, Noise},
    utils::{group_digits, timing::Progress},
};
