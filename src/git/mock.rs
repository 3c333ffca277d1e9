use crate::error::{BumpCalverError, Result};
use crate::git::Repository;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Mock repository for testing without actual git operations
///
/// Commits are a stack of hashes (last is HEAD) and tags a set of names.
/// Each mutating call is appended to [MockRepository::calls] so tests can
/// assert on what was attempted, including calls that were made to fail.
pub struct MockRepository {
    commits: RefCell<Vec<String>>,
    tags: RefCell<BTreeSet<String>>,
    calls: RefCell<Vec<String>>,
    next_commit: Cell<u32>,
    fail_tag_delete: Cell<bool>,
    fail_reset: Cell<bool>,
    fail_commit: Cell<bool>,
    fail_tag_check: Cell<bool>,
}

impl MockRepository {
    /// Create a new empty mock repository
    pub fn new() -> Self {
        MockRepository {
            commits: RefCell::new(Vec::new()),
            tags: RefCell::new(BTreeSet::new()),
            calls: RefCell::new(Vec::new()),
            next_commit: Cell::new(1),
            fail_tag_delete: Cell::new(false),
            fail_reset: Cell::new(false),
            fail_commit: Cell::new(false),
            fail_tag_check: Cell::new(false),
        }
    }

    /// Push a commit with the given hash; it becomes HEAD
    pub fn add_commit(&self, hash: impl Into<String>) {
        self.commits.borrow_mut().push(hash.into());
    }

    /// Add a tag
    pub fn add_tag(&self, name: impl Into<String>) {
        self.tags.borrow_mut().insert(name.into());
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.borrow().contains(name)
    }

    pub fn head(&self) -> Option<String> {
        self.commits.borrow().last().cloned()
    }

    /// Mutating calls made so far, e.g. `"delete_tag 2024.12.07"`
    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn fail_tag_delete(&self, fail: bool) {
        self.fail_tag_delete.set(fail);
    }

    pub fn fail_reset(&self, fail: bool) {
        self.fail_reset.set(fail);
    }

    pub fn fail_commit(&self, fail: bool) {
        self.fail_commit.set(fail);
    }

    pub fn fail_tag_check(&self, fail: bool) {
        self.fail_tag_check.set(fail);
    }

    fn record(&self, call: String) {
        self.calls.borrow_mut().push(call);
    }

    fn failure(message: &str) -> BumpCalverError {
        BumpCalverError::Git(git2::Error::from_str(message))
    }
}

impl Default for MockRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository for MockRepository {
    fn head_commit_hash(&self) -> Result<String> {
        self.head()
            .ok_or_else(|| Self::failure("reference 'refs/heads/main' not found"))
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        if self.fail_tag_check.get() {
            return Err(Self::failure("cannot list tags"));
        }
        Ok(self.has_tag(name))
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        self.record(format!("create_tag {}", name));
        if self.head().is_none() {
            return Err(Self::failure("cannot tag an unborn branch"));
        }
        if !self.tags.borrow_mut().insert(name.to_string()) {
            return Err(Self::failure("tag already exists"));
        }
        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.record(format!("delete_tag {}", name));
        if self.fail_tag_delete.get() || !self.tags.borrow_mut().remove(name) {
            return Err(Self::failure("cannot delete tag"));
        }
        Ok(())
    }

    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<String> {
        self.record(format!("commit {} file(s): {}", paths.len(), message));
        if self.fail_commit.get() {
            return Err(Self::failure("cannot commit"));
        }
        let number = self.next_commit.get();
        self.next_commit.set(number + 1);
        let hash = format!("{:040x}", number);
        self.add_commit(hash.clone());
        Ok(hash)
    }

    fn reset_soft_to_parent(&self) -> Result<()> {
        self.record("reset_soft_to_parent".to_string());
        if self.fail_reset.get() {
            return Err(Self::failure("cannot reset"));
        }
        let mut commits = self.commits.borrow_mut();
        if commits.len() < 2 {
            return Err(Self::failure("HEAD has no parent"));
        }
        commits.pop();
        Ok(())
    }
}
