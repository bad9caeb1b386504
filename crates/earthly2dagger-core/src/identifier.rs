//! Identifier management using string interning for efficient string storage and comparison
//!
//! This module provides the [`Id`] type used for target, argument and
//! variable names throughout the translator.

use std::{
    fmt,
    sync::{Mutex, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for efficient identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn with_interner<T>(f: impl FnOnce(&mut DefaultStringInterner) -> T) -> T {
    let mut interner = INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&mut interner)
}

/// Efficient identifier type using string interning
///
/// Two `Id`s compare equal exactly when they were created from the same
/// string, and copying an `Id` is free.
///
/// # Examples
///
/// ```
/// use earthly2dagger_core::identifier::Id;
///
/// let target = Id::new("build");
/// let arg = Id::new("MULTI_WORD");
///
/// assert_eq!(target, "build");
/// assert_ne!(target, arg);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(with_interner(|interner| interner.get_or_intern(name)))
    }

    /// Returns the interned string as an owned `String`.
    pub fn as_string(&self) -> String {
        with_interner(|interner| interner.resolve(self.0).unwrap_or_default().to_string())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

impl std::str::FromStr for Id {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        with_interner(|interner| interner.resolve(self.0) == Some(other))
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("build");
        let id2 = Id::new("build");
        let id3 = Id::new("test");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "build");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("test-expose-port");
        assert_eq!(format!("{}", id), "test-expose-port");
        assert_eq!(id.as_string(), "test-expose-port");
    }

    #[test]
    fn test_from_trait() {
        let id1: Id = "MULTI_WORD".into();
        let id2 = Id::new("MULTI_WORD");

        assert_eq!(id1, id2);
        assert_eq!(id1, "MULTI_WORD");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str() {
        let id = Id::new("alpine");

        assert!(id == "alpine");
        assert!(id != "ubuntu");

        let empty = Id::new("");
        assert!(empty == "");
        assert!(empty != "non-empty");
    }
}
