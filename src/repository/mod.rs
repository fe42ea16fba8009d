//! Remote and local locations of dependencies and working copy consistency
//!
//! - `credentials`: Per-run credential cache and providers
//! - `git`: [`VersionControl`] implementation backed by git2

pub mod credentials;
pub mod git;

pub use credentials::{CredentialCache, CredentialProvider, Credentials, NonInteractive, PasswordPrompt};
pub use git::GitVcs;

use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use url::Url;

use crate::dependency::Dependency;
use crate::error::{Error, Result};
use crate::ext::PathExt;

/// What a local working copy says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingCopyInfo {
    pub url: String,
    pub revision: Option<String>,
}

/// What the remote says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteInfo {
    pub url: String,
    pub head: Option<String>,
}

/// Version control operations needed to bring dependencies onto disk.
pub trait VersionControl {
    /// Inspects an existing working copy.
    fn working_copy(&self, path: &Path) -> Result<WorkingCopyInfo>;

    /// Checks that `url` is reachable with `credentials`.
    fn remote_info(&self, url: &str, credentials: &Credentials) -> Result<RemoteInfo>;

    /// Fetches `url` into `dest`, at `rev` when given.
    fn checkout(
        &self,
        url: &str,
        rev: Option<&str>,
        dest: &Path,
        credentials: &Credentials,
    ) -> Result<()>;
}

/// Outcome of a successful [`DependencyRepository::sync`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A matching working copy was already present.
    Existing,
    CheckedOut,
}

/// Full checkout URL for a dependency.
///
/// Bitbucket hosts keep the URL path and get `bitbucket_username` injected; every other host
/// gets `path` and `subpath` appended to the URL path.
///
/// # Examples
/// ```
/// use hdlmanifest::repository::remote_path;
///
/// let url = remote_path("https://git.example.org/hdl", "library/cpu", Some("trunk"), None).unwrap();
/// assert_eq!(url, "https://git.example.org/hdl/library/cpu/trunk");
/// ```
pub fn remote_path(
    url: &str,
    path: &str,
    subpath: Option<&str>,
    bitbucket_username: Option<&str>,
) -> Result<String> {
    let mut parsed = Url::parse(url)?;
    parsed.set_query(None);
    parsed.set_fragment(None);

    let is_bitbucket = parsed.host_str().is_some_and(|host| host.contains("bitbucket"));
    if is_bitbucket {
        debug!("Processing a bitbucket URL: {url}");
        if let Some(username) = bitbucket_username.filter(|u| !u.is_empty()) {
            parsed.set_username(username).map_err(|_| {
                Error::ConfigValidation(format!("cannot set username on URL '{url}'"))
            })?;
        }
    } else {
        let joined = posix_join(&[parsed.path(), path, subpath.unwrap_or_default()]);
        parsed.set_path(&joined);
    }

    Ok(parsed.to_string())
}

/// Local working copy location: `repo_root/path`.
pub fn local_path(repo_root: &Path, path: &str) -> PathBuf {
    repo_root.join(path)
}

/// Joins URL path parts with `/`. Empty parts are skipped; an absolute part restarts the path.
fn posix_join(parts: &[&str]) -> String {
    let mut joined = String::new();
    for part in parts.iter().filter(|p| !p.is_empty()) {
        if part.starts_with('/') {
            joined = part.to_string();
        } else {
            if !joined.is_empty() && !joined.ends_with('/') {
                joined.push('/');
            }
            joined.push_str(part);
        }
    }
    joined
}

/// Brings dependencies onto disk through a [`VersionControl`] collaborator.
pub struct DependencyRepository<'a> {
    vcs: &'a dyn VersionControl,
    credentials: &'a mut CredentialCache,
    checkout_enabled: bool,
}

impl<'a> DependencyRepository<'a> {
    pub fn new(
        vcs: &'a dyn VersionControl,
        credentials: &'a mut CredentialCache,
        checkout_enabled: bool,
    ) -> Self {
        Self { vcs, credentials, checkout_enabled }
    }

    /// Validates an existing working copy or checks the dependency out.
    ///
    /// An existing working copy must record `remote_path` as its remote; it is never rewritten.
    pub fn sync(&mut self, dependency: &Dependency) -> Result<SyncOutcome> {
        let local = &dependency.local_path;

        if local.exists() {
            let info = self.vcs.working_copy(local).map_err(|e| Error::WorkingCopy {
                path: local.display_string(),
                reason: e.to_string(),
            })?;
            if !same_url(&info.url, &dependency.remote_path) {
                return Err(Error::WorkingCopyMismatch {
                    path: local.display_string(),
                    expected: dependency.remote_path.clone(),
                    found: info.url,
                });
            }
            warn!(
                "Working copy for '{}' already exists at '{}' and may require updating",
                dependency.name,
                local.display()
            );
            return Ok(SyncOutcome::Existing);
        }

        if !self.checkout_enabled {
            return Err(Error::LocalPathMissing {
                name: dependency.name.clone(),
                path: local.display_string(),
            });
        }

        let checkout_error = |e: Error| Error::Checkout {
            url: dependency.remote_path.clone(),
            path: local.display_string(),
            reason: e.to_string(),
        };

        let credentials = self.credentials.get(&dependency.url)?;
        let remote = self.vcs.remote_info(&dependency.remote_path, credentials).map_err(checkout_error)?;
        debug!("Remote '{}' head: {:?}", remote.url, remote.head);

        info!("Checking out '{}' into '{}'", dependency.remote_path, local.display());
        self.vcs
            .checkout(&dependency.remote_path, dependency.remote_rev.as_deref(), local, credentials)
            .map_err(checkout_error)?;
        Ok(SyncOutcome::CheckedOut)
    }
}

fn same_url(a: &str, b: &str) -> bool {
    a.trim_end_matches('/') == b.trim_end_matches('/')
}
