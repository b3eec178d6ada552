//! This crate provides interfaces and data structures for reading and writing
//! data in accordance to the DICOM standard, at different layers of
//! abstraction.
//!
//! For the time being, all APIs are based on synchronous I/O.
#![recursion_limit = "72"]

pub mod dataset;
pub mod error;
pub mod stateful;
mod util;

pub use dataset::{DataSetReader, DataSetWriter};
pub use error::{Error, Result};
pub use stateful::{StatefulDecode, StatefulDecoder};
