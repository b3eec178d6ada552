//! Root module for built-in pixel data adapters.
//!
//! Decoding a compressed imaging codec (JPEG, JPEG 2000, JPEG-LS, JPEG XL,
//! RLE) into pixels is outside the scope of this crate: the registry only
//! needs to know which transfer syntaxes require encapsulated, item-based
//! pixel data encoding, not how to turn the compressed fragments into an
//! image. [`uncompressed`] is the one adapter that is pure byte reshuffling
//! and has no codec dependency of its own.

pub mod uncompressed;
