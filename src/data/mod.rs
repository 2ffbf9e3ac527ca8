//! Dataset loading and encoding
//!
//! Turns a raw student-performance CSV (mixed numeric, yes/no, ordinal,
//! and nominal columns) into a fully numeric table ready for training.

pub mod encoder;
pub mod loader;

pub use encoder::{DatasetEncoder, PrepareSummary};
