//! Physical model relations for single-lens microlensing.
//!
//! Models are implemented as small, pure functions so that fitting code can
//! stay generic.

pub mod model;
pub mod photometry;

pub use model::*;
pub use photometry::*;
