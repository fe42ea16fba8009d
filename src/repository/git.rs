use git2::build::{CheckoutBuilder, RepoBuilder};
use git2::{Cred, CredentialType, Direction, FetchOptions, Remote, RemoteCallbacks, Repository};
use log::debug;
use std::path::Path;

use super::{Credentials, RemoteInfo, VersionControl, WorkingCopyInfo};
use crate::error::{Error, Result};
use crate::ext::PathExt;

/// Git working copies, with `origin` as the recorded remote.
#[derive(Debug, Default, Clone, Copy)]
pub struct GitVcs;

impl VersionControl for GitVcs {
    fn working_copy(&self, path: &Path) -> Result<WorkingCopyInfo> {
        let repo = Repository::open(path)?;
        let remote = repo.find_remote("origin")?;
        let url = remote.url().map(str::to_string).ok_or_else(|| Error::WorkingCopy {
            path: path.display_string(),
            reason: "origin URL is not valid UTF-8".into(),
        })?;
        let revision = repo.head().ok().and_then(|head| head.target()).map(|oid| oid.to_string());
        debug!("Working copy '{}' tracks '{url}' at {revision:?}", path.display());
        Ok(WorkingCopyInfo { url, revision })
    }

    fn remote_info(&self, url: &str, credentials: &Credentials) -> Result<RemoteInfo> {
        let mut remote = Remote::create_detached(url)?;
        let connection =
            remote.connect_auth(Direction::Fetch, Some(callbacks(credentials)), None)?;
        let head = connection.list()?.first().map(|h| h.oid().to_string());
        Ok(RemoteInfo { url: url.to_string(), head })
    }

    fn checkout(
        &self,
        url: &str,
        rev: Option<&str>,
        dest: &Path,
        credentials: &Credentials,
    ) -> Result<()> {
        let mut fetch_opts = FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks(credentials));

        debug!("Cloning '{url}' to '{}'", dest.display());
        let repo = RepoBuilder::new().fetch_options(fetch_opts).clone(url, dest)?;

        if let Some(rev) = rev {
            let object = repo.revparse_single(rev)?;
            let commit = object.peel_to_commit()?;
            repo.checkout_tree(commit.as_object(), Some(CheckoutBuilder::new().force()))?;
            repo.set_head_detached(commit.id())?;
            debug!("Detached '{}' at {rev} ({})", dest.display(), commit.id());
        }
        Ok(())
    }
}

fn callbacks(credentials: &Credentials) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        let username =
            credentials.username.as_deref().or(username_from_url).unwrap_or("git");
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(password) = &credentials.password {
                return Cred::userpass_plaintext(username, password);
            }
        }
        if allowed_types.contains(CredentialType::SSH_KEY) {
            return Cred::ssh_key_from_agent(username);
        }
        Cred::default()
    });
    callbacks
}
