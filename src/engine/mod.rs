//! Adapter around the external stem-separation engine.

pub mod separator;

pub use separator::{Separator, StemPaths};
