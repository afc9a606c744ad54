mod exports;
pub use exports::*;

pub mod error;
pub mod index;
pub mod grid;
pub mod raycast;
pub mod refine;
pub mod atlas;
pub mod slice;
pub mod chain;
pub mod electrode;
pub mod export;
pub mod config;
pub mod io;
pub mod utils;
