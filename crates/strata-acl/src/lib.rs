//! # strata-acl
//!
//! Category access control for Strata.
//!
//! This crate changes the access lists of content categories and keeps the
//! search index in step:
//! - Access types and rights sets
//! - Categories, groups and access entries
//! - Authorization of updaters
//! - Three-way deltas (remove, add, modify) and full synchronization
//! - Index intent registration through `strata-index`
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use strata_acl::{
//!     Actor, AdministrateAccessChecker, Category, CategoryAccessControl,
//!     CategoryAclProcessor, CategoryStore, Group, MemoryStore, ModifyCategoryAclCommand,
//! };
//! use strata_core::{CategoryKey, ContentKey, GroupKey};
//! use strata_index::{DirectCommitter, IndexTransactionService, MemoryIndex};
//!
//! let store = Arc::new(MemoryStore::new());
//! store.insert_group(Group::new("G1", "Readers"))?;
//! store.insert_category(Category::new(CategoryKey::new(1), "News"))?;
//! store.insert_content(ContentKey::new(10), "Elections", CategoryKey::new(1))?;
//!
//! let committer = Arc::new(DirectCommitter::new(MemoryIndex::new()));
//! let processor = CategoryAclProcessor::with_store(
//!     Arc::new(AdministrateAccessChecker),
//!     store.clone(),
//!     IndexTransactionService::new(committer),
//! );
//!
//! let mut command = ModifyCategoryAclCommand::new(Actor::admin("admin"));
//! command
//!     .add_category(CategoryKey::new(1))
//!     .add_to_be_added(CategoryAccessControl::new("G1", "read".parse()?))
//!     .include_content();
//!
//! let summary = processor.modify(&command)?;
//! assert_eq!(summary.intents, 2);
//! assert!(store
//!     .find_category_by_key(CategoryKey::new(1))?
//!     .has_access_for_group(&GroupKey::new("G1")));
//! # Ok::<(), strata_core::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod access;
pub mod category;
pub mod checker;
pub mod command;
pub mod mutator;
pub mod processor;
pub mod store;

pub use access::{AccessRights, CategoryAccessType};
pub use category::{Category, CategoryAccess, CategoryAccessControl, Group};
pub use checker::{Actor, AdministrateAccessChecker, CategoryAccessChecker, check_all};
pub use command::{
    AccessControlDelta, ModifyCategoryAclCommand, SynchronizeCategoryAclCommand, TransactionScope,
};
pub use mutator::{AclMutator, CategoryBatch};
pub use processor::{AclChangeSummary, CategoryAclProcessor};
pub use store::{CategoryStore, ContentStore, GroupStore, MemoryStore};
pub use strata_core::{Error, Result};
