//! Default implementations of the capabilities `cast-core` consumes.
//!
//! The wider server normally injects its own formula tables and geodata; these
//! stand-ins keep a standalone runtime playable.
mod formulas;
mod rng;
mod world;

pub use formulas::{StandardDrain, StandardFormulas};
pub use rng::ThreadRandom;
pub use world::OpenField;
