//! Configuration file parser for MLEM / OSEM reconstructions

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::{
    Error, Result,
    types::Lengthf32,
    grid::{ImageGrid, SinogramShape},
    projector::ParallelBeam,
};

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {

    /// Number of MLEM or OSEM iterations to perform
    pub iterations: usize,

    /// Number of OSEM subsets per iteration
    #[serde(default = "default_subsets")]
    pub subsets: usize,

    pub image: ImageConfig,

    pub sinogram: SinogramConfig,

    pub input: Input,

    #[serde(default)]
    pub output: Output,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ImageConfig {
    /// Number of voxels in each dimension
    pub n: (usize, usize, usize),
    /// Full widths in mm
    pub size: (Lengthf32, Lengthf32, Lengthf32),
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SinogramConfig {
    pub views: usize,
    /// Radial bins per view; by default enough to cover the image diagonal
    pub bins: Option<usize>,
    /// Radial bin width in mm; by default the voxel width
    pub bin_width: Option<Lengthf32>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Input {
    /// Acquired sinogram, raw little-endian `f32`
    pub data: PathBuf,
    /// Starting image; uniform ones if absent
    pub initial: Option<PathBuf>,
    /// Additive background sinogram (scatters, randoms)
    pub background: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Output {
    /// Images are written to `<pattern>_<iteration>.raw`
    #[serde(default = "default_pattern")]
    pub pattern: String,
    /// Write every n-th iteration
    #[serde(default = "default_every")]
    pub every: usize,
}

impl Default for Output {
    fn default() -> Self { Self { pattern: default_pattern(), every: default_every() } }
}

fn default_subsets() -> usize { 1 }
fn default_every  () -> usize { 1 }
fn default_pattern() -> String { "data/out/mlem".into() }

impl ImageConfig {
    pub fn grid(&self) -> Result<ImageGrid> { ImageGrid::new(self.size, self.n) }
}

impl SinogramConfig {
    pub fn geometry(&self, grid: ImageGrid) -> Result<ParallelBeam> {
        let covering = ParallelBeam::covering(grid, self.views)?.shape();
        let bin_width = self.bin_width.unwrap_or(covering.bin_width);
        let bins = self.bins.unwrap_or_else(|| {
            // Keep covering the diagonal when only the width changes
            (covering.bins as Lengthf32 * covering.bin_width / bin_width).ceil() as usize
        });
        ParallelBeam::new(grid, SinogramShape::new(self.views, bins, grid.n[2], bin_width)?)
    }
}

impl Config {
    pub fn geometry(&self) -> Result<ParallelBeam> {
        self.sinogram.geometry(self.image.grid()?)
    }
}

pub fn read_config_file(path: &Path) -> Result<Config> {
    let config = fs::read_to_string(path)
        .map_err(|source| Error::ReadFile { path: path.to_path_buf(), source })?;
    parse_config(&config)
}

pub fn parse_config(text: &str) -> Result<Config> {
    let config: Config = toml::from_str(text)?;
    if config.subsets == 0 || config.subsets > config.sinogram.views {
        return Err(Error::Geometry(format!(
            "subsets must lie in 1..={} (the number of views), got {}",
            config.sinogram.views, config.subsets
        )));
    }
    if config.output.every == 0 {
        return Err(Error::Geometry("output.every must be at least 1".into()));
    }
    Ok(config)
}
