//! Category access types and permission sets.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use strata_core::{Error, Result};

/// One permission a group can hold on a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryAccessType {
    /// Read published content in the category.
    Read,
    /// Browse the category in the admin console.
    AdminBrowse,
    /// Create content in the category.
    Create,
    /// Approve content in the category.
    Approve,
    /// Administrate the category, including its access list.
    Administrate,
}

impl CategoryAccessType {
    /// Every access type, in bit order.
    pub const ALL: [CategoryAccessType; 5] = [
        CategoryAccessType::Read,
        CategoryAccessType::AdminBrowse,
        CategoryAccessType::Create,
        CategoryAccessType::Approve,
        CategoryAccessType::Administrate,
    ];

    const fn bit(self) -> u8 {
        match self {
            CategoryAccessType::Read => 1,
            CategoryAccessType::AdminBrowse => 1 << 1,
            CategoryAccessType::Create => 1 << 2,
            CategoryAccessType::Approve => 1 << 3,
            CategoryAccessType::Administrate => 1 << 4,
        }
    }

    /// Snake-case name, as used in configuration and serialization.
    pub const fn as_str(self) -> &'static str {
        match self {
            CategoryAccessType::Read => "read",
            CategoryAccessType::AdminBrowse => "admin_browse",
            CategoryAccessType::Create => "create",
            CategoryAccessType::Approve => "approve",
            CategoryAccessType::Administrate => "administrate",
        }
    }
}

impl fmt::Display for CategoryAccessType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryAccessType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        CategoryAccessType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| Error::config(format!("Unknown category access type '{name}'")))
    }
}

/// Set of [`CategoryAccessType`]s held by one group on one category.
///
/// Serialized as a list of access-type names.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "Vec<CategoryAccessType>", from = "Vec<CategoryAccessType>")]
pub struct AccessRights(u8);

impl AccessRights {
    /// No access.
    pub const NONE: AccessRights = AccessRights(0);

    /// Build a set from access types.
    ///
    /// # Examples
    ///
    /// ```
    /// use strata_acl::{AccessRights, CategoryAccessType};
    ///
    /// let rights = AccessRights::of(&[CategoryAccessType::Read]);
    /// assert!(rights.contains(CategoryAccessType::Read));
    /// assert!(!rights.contains(CategoryAccessType::Approve));
    /// ```
    pub fn of(types: &[CategoryAccessType]) -> Self {
        types.iter().fold(Self::NONE, |rights, t| rights.with(*t))
    }

    /// This set plus `access`.
    pub const fn with(self, access: CategoryAccessType) -> Self {
        Self(self.0 | access.bit())
    }

    /// This set minus `access`.
    pub const fn without(self, access: CategoryAccessType) -> Self {
        Self(self.0 & !access.bit())
    }

    /// Whether `access` is in the set.
    pub const fn contains(self, access: CategoryAccessType) -> bool {
        self.0 & access.bit() != 0
    }

    /// Whether the set is empty.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Raw bits.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Access types in the set, in bit order.
    pub fn iter(self) -> impl Iterator<Item = CategoryAccessType> {
        CategoryAccessType::ALL
            .into_iter()
            .filter(move |t| self.contains(*t))
    }
}

impl From<Vec<CategoryAccessType>> for AccessRights {
    fn from(types: Vec<CategoryAccessType>) -> Self {
        Self::of(&types)
    }
}

impl From<AccessRights> for Vec<CategoryAccessType> {
    fn from(rights: AccessRights) -> Self {
        rights.iter().collect()
    }
}

/// Parses a comma-separated list, e.g. `"read, admin_browse"`.
impl FromStr for AccessRights {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        s.split(',')
            .filter(|part| !part.trim().is_empty())
            .try_fold(Self::NONE, |rights, part| {
                Ok(rights.with(part.parse::<CategoryAccessType>()?))
            })
    }
}

impl fmt::Display for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.iter().map(CategoryAccessType::as_str).collect();
        f.write_str(&names.join(", "))
    }
}

impl fmt::Debug for AccessRights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_with_and_without() {
        let rights = AccessRights::NONE
            .with(CategoryAccessType::Read)
            .with(CategoryAccessType::Approve)
            .without(CategoryAccessType::Read);

        assert!(!rights.contains(CategoryAccessType::Read));
        assert!(rights.contains(CategoryAccessType::Approve));
        assert!(!rights.is_empty());
    }

    #[test]
    fn test_parse_list() {
        let rights: AccessRights = "read, admin_browse".parse().unwrap();
        assert_eq!(
            rights,
            AccessRights::of(&[CategoryAccessType::Read, CategoryAccessType::AdminBrowse])
        );
        assert_eq!(rights.to_string(), "read, admin_browse");
    }

    #[test]
    fn test_parse_empty_is_none() {
        let rights: AccessRights = "".parse().unwrap();
        assert!(rights.is_empty());
    }

    #[test]
    fn test_parse_unknown_type() {
        let err = "read, publish".parse::<AccessRights>().unwrap_err();
        assert!(err.to_string().contains("publish"));
    }

    #[test]
    fn test_parse_is_case_insensitive() {
        let access: CategoryAccessType = " Administrate ".parse().unwrap();
        assert_eq!(access, CategoryAccessType::Administrate);
    }

    #[test]
    fn test_serializes_as_names() {
        let rights = AccessRights::of(&[CategoryAccessType::Create, CategoryAccessType::Read]);
        let json = serde_json::to_string(&rights).unwrap();
        assert_eq!(json, r#"["read","create"]"#);

        let back: AccessRights = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rights);
    }

    #[test]
    fn test_iter_in_bit_order() {
        let rights = AccessRights::of(&[
            CategoryAccessType::Administrate,
            CategoryAccessType::Read,
        ]);
        let types: Vec<_> = rights.iter().collect();
        assert_eq!(
            types,
            vec![CategoryAccessType::Read, CategoryAccessType::Administrate]
        );
    }
}
