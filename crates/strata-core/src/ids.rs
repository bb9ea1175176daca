//! Key newtypes for the entities Strata works with.
//!
//! Categories and content items carry numeric keys; groups and users carry
//! opaque string keys. All keys are totally ordered so that batches keyed by
//! them iterate deterministically.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Key of a content category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryKey(u32);

impl CategoryKey {
    /// Creates a category key.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::CategoryKey;
    ///
    /// let key = CategoryKey::new(7);
    /// assert_eq!(key.value(), 7);
    /// ```
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for CategoryKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Key of a content item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentKey(u32);

impl ContentKey {
    /// Creates a content key.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Returns the numeric value.
    pub const fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for ContentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ContentKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

/// Key of a user group.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Creates a group key.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_core::GroupKey;
    ///
    /// let key = GroupKey::new("editors");
    /// assert_eq!(key.as_str(), "editors");
    /// ```
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GroupKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for GroupKey {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for GroupKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Key of a user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserKey(String);

impl UserKey {
    /// Creates a user key.
    pub fn new<S: Into<String>>(key: S) -> Self {
        Self(key.into())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserKey {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_category_key_ordering() {
        let mut keys = vec![CategoryKey::new(3), CategoryKey::new(1), CategoryKey::new(2)];
        keys.sort();
        assert_eq!(
            keys,
            vec![CategoryKey::new(1), CategoryKey::new(2), CategoryKey::new(3)]
        );
    }

    #[test]
    fn test_content_key_display() {
        assert_eq!(ContentKey::new(1001).to_string(), "1001");
    }

    #[test]
    fn test_group_key_from_str() {
        let key = GroupKey::from("editors");
        assert_eq!(key.as_str(), "editors");
        assert_eq!(key.to_string(), "editors");
    }

    #[test]
    fn test_keys_serialize_transparently() {
        let json = serde_json::to_string(&CategoryKey::new(12)).unwrap();
        assert_eq!(json, "12");
        let json = serde_json::to_string(&GroupKey::new("G1")).unwrap();
        assert_eq!(json, "\"G1\"");
    }

    proptest! {
        #[test]
        fn test_group_key_preserves_input(s in "\\PC+") {
            let key = GroupKey::new(s.clone());
            prop_assert_eq!(key.as_str(), s.as_str());
        }

        #[test]
        fn test_category_key_order_matches_value(a in any::<u32>(), b in any::<u32>()) {
            prop_assert_eq!(CategoryKey::new(a).cmp(&CategoryKey::new(b)), a.cmp(&b));
        }
    }
}
