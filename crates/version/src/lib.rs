//! Dotted numeric version identifiers.
//!
//! A [`Version`] is an immutable tuple of two to four non-negative integers
//! (`major.minor[.build[.revision]]`). Update packages are named after their
//! version, so this type is both the lookup key of a package repository and
//! the identity a caller sees when choosing what to install.
//!
//! Ordering is componentwise. A version that stops early sorts before any
//! version that extends it, so `1.0 < 1.0.0 < 1.0.0.0`, and those three are
//! distinct values.
//!
//! ```
//! use renew_version::Version;
//!
//! let installed: Version = "1.2".parse().unwrap();
//! let available: Version = "1.2.1".parse().unwrap();
//! assert!(available > installed);
//! assert_eq!(available.to_string(), "1.2.1");
//! ```

mod construct;
pub mod error;
#[cfg(feature = "serde")]
mod serde;

use std::cmp::Ordering;

pub(crate) const MIN_COMPONENTS: usize = 2;
pub(crate) const MAX_COMPONENTS: usize = 4;
/// Largest value a single component may hold.
pub const MAX_COMPONENT: u32 = i32::MAX as u32;

/// A package version.
///
/// Unused trailing slots are always zero, so the derived equality and hash
/// agree with the componentwise [`Ord`] implementation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Version {
    parts: [u32; MAX_COMPONENTS],
    len: u8,
}

impl Version {
    /// Create a two-component version (`major.minor`).
    #[must_use]
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { parts: [major, minor, 0, 0], len: 2 }
    }

    /// Extend a two-component version with a build number.
    ///
    /// Replaces any build number and drops any revision already present.
    #[must_use]
    pub const fn with_build(self, build: u32) -> Self {
        Self { parts: [self.parts[0], self.parts[1], build, 0], len: 3 }
    }

    /// Extend a version with a revision number, adding a zero build number
    /// if there isn't one yet.
    #[must_use]
    pub const fn with_revision(self, revision: u32) -> Self {
        Self { parts: [self.parts[0], self.parts[1], self.parts[2], revision], len: 4 }
    }

    pub const fn major(&self) -> u32 {
        self.parts[0]
    }

    pub const fn minor(&self) -> u32 {
        self.parts[1]
    }

    pub const fn build(&self) -> Option<u32> {
        if self.len > 2 { Some(self.parts[2]) } else { None }
    }

    pub const fn revision(&self) -> Option<u32> {
        if self.len > 3 { Some(self.parts[3]) } else { None }
    }

    /// The components exactly as parsed or constructed.
    pub fn components(&self) -> &[u32] {
        &self.parts[..usize::from(self.len)]
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        // Slice ordering is lexicographic and treats a strict prefix as
        // smaller, which is exactly the "missing component sorts first" rule.
        self.components().cmp(other.components())
    }
}
impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
