pub mod command;
pub mod curve;
pub mod editor;
pub mod error;
pub mod interaction;
pub mod math;
pub mod operations;
pub mod surface;

#[cfg(test)]
mod testing;

pub use error::{Result, SurfmarkError};
