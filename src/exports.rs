pub use crate::error::{Error, Result};
pub use crate::types::{Intensityf32, Lengthf32, Weightf32, Ratiof32};
pub use crate::index::{BoxDim_u, Index1_u, Index3_u};
pub use crate::grid::{ImageGrid, SinogramShape};
pub use crate::field::{Field, nan_to_num};
pub use crate::image::{Image, ImageData};
pub use crate::projection::{ProjectionData, SinogramData};
pub use crate::acquisition::{AcquisitionModel, DenseModel};
pub use crate::system_matrix::{SparseSystemMatrix, SystemMatrixRow};
pub use crate::projector::ParallelBeam;
pub use crate::mlem::{Mlem, reconstruct};
