//! Decoding, event building, clustering and histogramming for the FE-I4
//! readout chip family (flavors A and B).

pub mod clusterizer;
pub mod format;
pub mod histogram;
pub mod interpret;
pub mod parser;

pub use self::clusterizer::{Clusterizer, SeedTieBreak};
pub use self::format::*;
pub use self::histogram::Histogram;
pub use self::interpret::Interpreter;
