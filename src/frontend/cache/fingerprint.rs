//! Content fingerprints.
//!
//! Fast, non-cryptographic 64-bit hashes used to decide whether work can be reused. Stable within
//! one build of `stexls`; blobs from another build are rejected by their header anyway.

use std::fmt;
use std::hash::{Hash, Hasher};

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

/// A 64-bit content hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Fingerprint(u64);

impl Fingerprint {
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Hash any hashable value.
    pub fn of<T: Hash + ?Sized>(value: &T) -> Self {
        let mut hasher = FxHasher::default();
        value.hash(&mut hasher);
        Self(hasher.finish())
    }

    /// Format as a fixed-width hex string.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.0)
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Incremental fingerprint over a sequence of values.
#[derive(Default)]
pub struct FingerprintBuilder {
    hasher: FxHasher,
}

impl FingerprintBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<T: Hash + ?Sized>(&mut self, value: &T) -> &mut Self {
        value.hash(&mut self.hasher);
        self
    }

    pub fn finish(&self) -> Fingerprint {
        Fingerprint(self.hasher.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_content_equal_fingerprint() {
        assert_eq!(Fingerprint::of("abc"), Fingerprint::of("abc"));
        assert_ne!(Fingerprint::of("abc"), Fingerprint::of("abd"));
    }

    #[test]
    fn test_builder_is_order_sensitive() {
        let ab = FingerprintBuilder::new().add("a").add("b").finish();
        let ba = FingerprintBuilder::new().add("b").add("a").finish();
        assert_ne!(ab, ba);
    }

    #[test]
    fn test_hex_is_fixed_width() {
        assert_eq!(Fingerprint::new(0xab).to_hex(), "00000000000000ab");
        assert_eq!(Fingerprint::new(0xab).to_string(), "00000000000000ab");
    }
}
