//! Pipeline conversions module
//!
//! Orchestrates decoding a bracket, reconstructing radiance and encoding the result.

mod bracket_to_hdr;

#[cfg(test)]
mod tests;

pub use bracket_to_hdr::{BracketInput, BracketToHdrPipeline};
