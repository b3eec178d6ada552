//! Stateful decoding and encoding of DICOM data sets.
//!
//! The types in this module keep track of the running state needed to
//! correctly interpret or produce a stream of DICOM content: the active
//! transfer syntax, the current text codec (as dictated by a prior
//! `SpecificCharacterSet` element), and the stream position.

pub mod decode;
pub mod encode;

pub use self::decode::{DynStatefulDecoder, StatefulDecode, StatefulDecoder};
pub use self::encode::{DynStatefulEncoder, StatefulEncoder};
