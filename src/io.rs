//! Reading volumes and lookup tables from disk

pub mod raw;
pub mod volume;
pub mod lut;
