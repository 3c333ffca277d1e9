//! Git operations abstraction layer
//!
//! This module provides a trait-based abstraction over the Git operations
//! a version bump performs and its undo reverses, allowing for a real
//! repository and a mock implementation for testing.
//!
//! # Overview
//!
//! The primary abstraction is the [Repository] trait. The concrete implementations include:
//!
//! - [repository::Git2Repository]: A real implementation using the `git2` crate
//! - [mock::MockRepository]: An in-memory implementation for testing
//!
//! Code that may run outside a repository takes `Option<&dyn Repository>`;
//! `None` means no repository was discovered.
//!
//! ```rust
//! # use bumpcalver::git::Repository;
//! # fn example(repo: &dyn Repository) -> bumpcalver::Result<()> {
//! if repo.tag_exists("2024.12.07-001")? {
//!     repo.delete_tag("2024.12.07-001")?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod mock;
pub mod repository;

pub use mock::MockRepository;
pub use repository::Git2Repository;

use crate::error::Result;
use std::path::PathBuf;

/// Common git operation trait for abstraction
///
/// ## Error Handling
///
/// All methods return [crate::error::Result<T>]; `git2` failures surface as
/// [crate::error::BumpCalverError::Git].
///
/// ## Implementations
///
/// - [Git2Repository](repository::Git2Repository): Real Git implementation using the `git2` crate
/// - [MockRepository](mock::MockRepository): Test implementation recording every mutation
pub trait Repository {
    /// Full hash of the commit HEAD points to.
    ///
    /// # Returns
    /// * `Ok(String)` - 40-character hex object id
    /// * `Err` - If HEAD is unborn or cannot be resolved
    fn head_commit_hash(&self) -> Result<String>;

    /// Whether `refs/tags/<name>` exists.
    fn tag_exists(&self, name: &str) -> Result<bool>;

    /// Create a lightweight tag on HEAD.
    ///
    /// # Returns
    /// * `Ok(())` - Success
    /// * `Err` - If the tag already exists or HEAD cannot be resolved
    fn create_tag(&self, name: &str) -> Result<()>;

    /// Delete a tag by name.
    fn delete_tag(&self, name: &str) -> Result<()>;

    /// Stage the given files and commit them on top of HEAD.
    ///
    /// # Arguments
    /// * `paths` - Files inside the working tree (absolute or relative to it)
    /// * `message` - Commit message
    ///
    /// # Returns
    /// * `Ok(String)` - Hash of the new commit
    /// * `Err` - If a path lies outside the working tree or the commit fails
    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<String>;

    /// Move HEAD to its first parent, keeping index and working tree (`reset --soft HEAD~1`).
    fn reset_soft_to_parent(&self) -> Result<()>;
}
