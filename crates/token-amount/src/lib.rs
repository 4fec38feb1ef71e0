//! Exact conversion between human-readable decimal token amounts and integer
//! base units.
//!
//! Both chain builders share this crate. Floating point is never involved:
//! amounts are parsed digit-by-digit into a 256-bit unsigned integer, so a
//! supply of `"1000000.000000000000000001"` with 18 decimals is represented
//! exactly.

pub mod codec;
pub mod error;

pub use alloy_primitives::U256;
pub use codec::{format_units, to_base_units, MAX_DECIMALS};
pub use error::AmountError;
