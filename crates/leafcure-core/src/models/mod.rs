//! Domain models for the leafcure system.

mod record;
mod resolution;

pub use record::*;
pub use resolution::*;
