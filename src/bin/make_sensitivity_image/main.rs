mod cli;
use cli::*;

fn main() -> Result<(), Box<dyn Error>> {

    env_logger::init();
    let Cli { config_file, output, subsets, n_threads } = Cli::parse();
    let config = read_config_file(&config_file)?;

    let mut progress = Progress::new();

    let pool = rayon::ThreadPoolBuilder::new().num_threads(n_threads).build()?;

    progress.start("Building system matrix");
    let geometry = config.geometry()?;
    let model = pool.install(|| geometry.system_matrix())?;
    progress.done();

    // Only the shape of the data matters
    let data = ProjectionData::zeros(geometry.shape());

    if subsets == 1 {
        let sensitivity = pool.install(|| sensitivity_image(&data, &model))?;
        sensitivity.write_to_raw_file(&output)?;
        progress.done_with_message(&format!("Wrote sensitivity image to {:?}", output));
    } else {
        for (k, subset) in model.subsets(subsets)?.iter().enumerate() {
            let sensitivity = pool.install(|| sensitivity_image(&data, subset))?;
            let path = subset_path(&output, k);
            sensitivity.write_to_raw_file(&path)?;
            progress.done_with_message(&format!("Wrote subset {k} sensitivity image to {:?}", path));
        }
    }
    Ok(())
}

/// `dir/name.raw` -> `dir/name_<k>.raw`
fn subset_path(output: &Path, k: usize) -> PathBuf {
    let stem = output.file_stem().map_or("sensitivity".into(), |s| s.to_string_lossy());
    let name = match output.extension() {
        Some(ext) => format!("{stem}_{k}.{}", ext.to_string_lossy()),
        None      => format!("{stem}_{k}"),
    };
    output.with_file_name(name)
}

// ----- Imports -----------------------------------------------------------------------------------------
use std::{
    error::Error,
    path::{Path, PathBuf},
};

use clap::Parser;

use emrecon::{
    ProjectionData,
    config::mlem::read_config_file,
    mlem::sensitivity_image,
    utils::timing::Progress,
};
