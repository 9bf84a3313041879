mod exports;
pub use exports::*;

pub mod error;
pub mod types;
pub mod index;
pub mod grid;
pub mod field;
pub mod image;
pub mod projection;
pub mod acquisition;
pub mod system_matrix;
pub mod projector;
pub mod mlem;
pub mod osem;
pub mod fom;
pub mod phantom;
pub mod simulate;
pub mod io;
pub mod config;
pub mod utils;
