#[derive(clap::Parser, Debug, Clone)]
#[clap(name = "make_sensitivity_image", about = "Create sensitivity image by back-projecting uniform data")]
pub struct Cli {

    /// Reconstruction configuration file (TOML) describing image and sinogram
    pub config_file: PathBuf,

    /// Where to write the resulting sensitivity image
    #[clap(short, long, default_value = "sensitivity.raw")]
    pub output: PathBuf,

    /// Number of OSEM subsets: write one sensitivity image per subset
    #[clap(short, long, default_value = "1")]
    pub subsets: usize,

    /// Maximum number of rayon threads
    #[clap(short = 'j', long, default_value = "4")]
    pub n_threads: usize,
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::path::PathBuf;
