/// Quantities which are simply type aliases for `f32`, but where we still want
/// some clues in the source as to what they represent.

pub type Lengthf32    = f32;
pub type Weightf32    = f32;
pub type Ratiof32     = f32;
pub type Intensityf32 = f32;

/// Accumulator type for sums over whole images or sinograms, where `f32`
/// loses too much precision
pub type Sumf64 = f64;
