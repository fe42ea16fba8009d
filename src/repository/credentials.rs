use dialoguer::Password;
use log::debug;
use std::collections::HashMap;

use crate::error::Result;

/// Username and password handed to the VCS collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Source of credentials for a repository URL.
pub trait CredentialProvider {
    fn credentials(&self, url: &str, username: Option<&str>) -> Result<Credentials>;
}

/// Asks for a password on the terminal.
pub struct PasswordPrompt;

impl CredentialProvider for PasswordPrompt {
    fn credentials(&self, url: &str, username: Option<&str>) -> Result<Credentials> {
        let prompt = match username {
            Some(user) => format!("Password for {user}@{url}"),
            None => format!("Password for {url}"),
        };
        let password = Password::new().with_prompt(prompt).allow_empty_password(true).interact()?;
        Ok(Credentials {
            username: username.map(str::to_string),
            password: Some(password).filter(|p| !p.is_empty()),
        })
    }
}

/// Never prompts; relies on agents or anonymous access.
pub struct NonInteractive;

impl CredentialProvider for NonInteractive {
    fn credentials(&self, _url: &str, username: Option<&str>) -> Result<Credentials> {
        Ok(Credentials { username: username.map(str::to_string), password: None })
    }
}

/// Credentials per root URL, asked for at most once per run and never persisted.
pub struct CredentialCache {
    provider: Box<dyn CredentialProvider>,
    username: Option<String>,
    cache: HashMap<String, Credentials>,
}

impl CredentialCache {
    pub fn new(provider: Box<dyn CredentialProvider>, username: Option<String>) -> Self {
        Self { provider, username: username.filter(|u| !u.is_empty()), cache: HashMap::new() }
    }

    pub fn get(&mut self, url: &str) -> Result<&Credentials> {
        if !self.cache.contains_key(url) {
            debug!("No credentials cached for URL: {url}");
            let credentials = self.provider.credentials(url, self.username.as_deref())?;
            self.cache.insert(url.to_string(), credentials);
        } else {
            debug!("Credentials already cached for URL: {url}");
        }
        Ok(&self.cache[url])
    }
}
