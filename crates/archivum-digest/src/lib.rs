//! Digest primitives for evidence record validation.
//!
//! This crate provides:
//! - The supported [`DigestAlgorithm`]s and their OID / XML URI names
//! - [`MessageDigest`], a digest value tagged with its algorithm, including
//!   the distinguished empty sentinel
//! - [`DigestCalculator`], a streaming hash accumulator
//! - The unsigned byte-wise ordering used when folding hash trees

mod algorithm;
mod calculator;
mod compare;
mod error;
mod message_digest;

pub use algorithm::DigestAlgorithm;
pub use calculator::DigestCalculator;
pub use compare::{compare_unsigned, sort_unsigned};
pub use error::{DigestError, Result};
pub use message_digest::MessageDigest;
