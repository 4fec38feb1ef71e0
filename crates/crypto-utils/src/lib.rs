//! # crypto-utils
//!
//! Secure random generation for the token deployer: ephemeral key seeds and
//! opaque record identifiers.

pub mod random;

pub use random::{random_bytes, random_bytes_fixed, random_id};
