//! Field, value and style types shared by every stage of the engine.

mod field;
mod style;
mod value;

pub use field::*;
pub use style::*;
pub use value::*;
