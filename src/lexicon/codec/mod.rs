//! Codec layer for byte, compression and text operations.
//!
//! This module provides the pure data transformations used by the format
//! parsers and the lookup engine.
//!
//! # Submodules
//!
//! - [`bytes`][]: Big/little-endian integer decoding and hex helpers
//! - [`compression`][]: gzip/dictzip detection and sibling decompression
//! - [`text`][]: Payload text recovery and headword normalization

pub mod bytes;
pub mod compression;
pub mod text;
