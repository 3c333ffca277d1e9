use crate::error::{BumpCalverError, Result};
use git2::{Commit, ErrorCode, ObjectType, Repository as Git2Repo, ResetType};
use std::path::{Path, PathBuf};

/// Wrapper around git2::Repository with our trait interface
pub struct Git2Repository {
    repo: Git2Repo,
}

impl Git2Repository {
    /// Open or discover a git repository
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let repo = Git2Repo::discover(path)?;

        Ok(Git2Repository { repo })
    }

    /// Discover the repository containing `path`, or `None` when there is none.
    pub fn discover(path: &Path) -> Option<Self> {
        Git2Repo::discover(path).ok().map(Git2Repository::from_git2)
    }

    /// Create from existing git2::Repository
    pub fn from_git2(repo: Git2Repo) -> Self {
        Git2Repository { repo }
    }

    fn head_commit(&self) -> Result<Commit<'_>> {
        Ok(self.repo.head()?.peel_to_commit()?)
    }

    /// HEAD commit, or `None` on a branch with no commits yet.
    fn head_commit_if_born(&self) -> Result<Option<Commit<'_>>> {
        match self.repo.head() {
            Ok(head) => Ok(Some(head.peel_to_commit()?)),
            Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Path of `path` relative to the working tree root.
    fn relative_to_workdir(&self, path: &Path) -> Result<PathBuf> {
        let workdir = self.repo.workdir().ok_or_else(|| {
            BumpCalverError::Git(git2::Error::from_str("Repository has no working tree"))
        })?;

        if path.is_relative() {
            return Ok(path.to_path_buf());
        }

        let workdir = workdir.canonicalize()?;
        let absolute = path.canonicalize()?;
        absolute
            .strip_prefix(&workdir)
            .map(Path::to_path_buf)
            .map_err(|_| {
                BumpCalverError::Git(git2::Error::from_str(&format!(
                    "{} is outside the repository",
                    path.display()
                )))
            })
    }
}

impl super::Repository for Git2Repository {
    fn head_commit_hash(&self) -> Result<String> {
        Ok(self.head_commit()?.id().to_string())
    }

    fn tag_exists(&self, name: &str) -> Result<bool> {
        let reference_name = format!("refs/tags/{}", name);

        match self.repo.find_reference(&reference_name) {
            Ok(_) => Ok(true),
            Err(e) if e.code() == ErrorCode::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn create_tag(&self, name: &str) -> Result<()> {
        let target = self.repo.head()?.peel(ObjectType::Commit)?;

        self.repo.tag_lightweight(name, &target, false)?;

        Ok(())
    }

    fn delete_tag(&self, name: &str) -> Result<()> {
        self.repo.tag_delete(name)?;

        Ok(())
    }

    fn commit_paths(&self, paths: &[PathBuf], message: &str) -> Result<String> {
        let mut index = self.repo.index()?;
        for path in paths {
            let relative = self.relative_to_workdir(path)?;
            index.add_path(&relative)?;
        }
        index.write()?;

        let tree = self.repo.find_tree(index.write_tree()?)?;
        let signature = self.repo.signature()?;
        let parent = self.head_commit_if_born()?;
        let parents: Vec<&Commit<'_>> = parent.iter().collect();

        let oid = self.repo.commit(
            Some("HEAD"),
            &signature,
            &signature,
            message,
            &tree,
            &parents,
        )?;

        Ok(oid.to_string())
    }

    fn reset_soft_to_parent(&self) -> Result<()> {
        let head = self.head_commit()?;
        let parent = head.parent(0)?;

        self.repo.reset(parent.as_object(), ResetType::Soft, None)?;

        Ok(())
    }
}
