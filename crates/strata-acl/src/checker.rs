//! Authorization gate for category access-list changes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use strata_core::{Error, GroupKey, Result, UserKey};

use crate::access::CategoryAccessType;
use crate::category::Category;

/// The authenticated user requesting a change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User key.
    pub user: UserKey,
    /// Groups the user is a member of, directly or indirectly.
    #[serde(default)]
    pub groups: BTreeSet<GroupKey>,
    /// Enterprise administrators may update any category.
    #[serde(default)]
    pub enterprise_admin: bool,
}

impl Actor {
    /// An actor without group memberships.
    pub fn new(user: impl Into<UserKey>) -> Self {
        Self {
            user: user.into(),
            groups: BTreeSet::new(),
            enterprise_admin: false,
        }
    }

    /// An enterprise administrator.
    pub fn admin(user: impl Into<UserKey>) -> Self {
        Self {
            enterprise_admin: true,
            ..Self::new(user)
        }
    }

    /// Add a group membership.
    pub fn member_of(mut self, group: impl Into<GroupKey>) -> Self {
        self.groups.insert(group.into());
        self
    }
}

/// Decides whether an actor may update a category's access list.
pub trait CategoryAccessChecker: Send + Sync {
    /// Fails with [`Error::AccessDenied`] when `actor` may not update `category`.
    fn check_access_to_update(&self, actor: &Actor, category: &Category) -> Result<()>;
}

/// Check every category, stopping at the first refusal.
///
/// Runs before any category is mutated, so a refusal leaves the whole batch
/// untouched.
pub fn check_all<'a, I>(
    checker: &dyn CategoryAccessChecker,
    actor: &Actor,
    categories: I,
) -> Result<()>
where
    I: IntoIterator<Item = &'a Category>,
{
    for category in categories {
        checker.check_access_to_update(actor, category)?;
    }
    Ok(())
}

/// Grants updates to enterprise administrators and to members of any group
/// holding [`CategoryAccessType::Administrate`] on the category itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct AdministrateAccessChecker;

impl CategoryAccessChecker for AdministrateAccessChecker {
    fn check_access_to_update(&self, actor: &Actor, category: &Category) -> Result<()> {
        if actor.enterprise_admin {
            return Ok(());
        }

        let administrates = actor.groups.iter().any(|group| {
            category
                .rights_for(group)
                .is_some_and(|rights| rights.contains(CategoryAccessType::Administrate))
        });

        if administrates {
            Ok(())
        } else {
            log::debug!(
                "{} lacks administrate access on category {}",
                actor.user,
                category.key()
            );
            Err(Error::access_denied(&actor.user, category.key()))
        }
    }
}
