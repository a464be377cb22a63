//! swatch-api-core: socket values, resolved colors and the coercions between them.

pub mod blend;
pub mod coercion;
pub mod json;
pub mod value;

pub use value::{Color, Value};
