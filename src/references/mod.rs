//! Reference extraction over arbitrary nested content records.

mod extract;
mod shape;

pub use extract::{extract_record_references, extract_references};
pub use shape::{FileFields, Shape, classify};
