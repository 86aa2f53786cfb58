//! Core types and traits for the code security scanner.
//!
//! The job record's serde form is the wire shape returned by `/results/:id`.

mod dto;
mod job;
mod traits;

pub use dto::*;
pub use job::*;
pub use traits::*;
