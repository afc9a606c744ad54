/// Quantities which are simply type aliases for `f32` rather than having an
/// implementation as a `uom` `Quantity`.
///
/// The voxel-space algorithms mix world lengths, voxel counts and scanner
/// intensities in tight loops; there we use plain `f32`s, but still want some
/// clues in the source as to what they represent.

pub type Lengthf32    = f32; // millimetres, world space
pub type Ratiof32     = f32;
pub type Weightf32    = f32;
pub type Intensityf32 = f32; // CT Hounsfield units, MRI signal, or alpha
