//! stexls version information.
//!
//! One constant shared by the CLI banner and the cache blob header, so a blob written by another
//! build is never mistaken for a current one.
//!
//! ## Notes
//!
//! - The value is taken from Cargo metadata (`CARGO_PKG_VERSION`) at compile time.
//! - Prefer this constant over repeating `env!("CARGO_PKG_VERSION")` in multiple places.

/// The stexls version string (for example, `0.1.0`).
pub const STEXLS_VERSION: &str = env!("CARGO_PKG_VERSION");
