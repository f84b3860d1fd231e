//! OAuth credential lifecycle: load, refresh, re-authorize, persist.

#![allow(async_fn_in_trait)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::KcalError;

/// Application identity from the Google Cloud console download.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientSecret {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Deserialize)]
struct ClientSecretFile {
    installed: Option<ClientSecret>,
    web: Option<ClientSecret>,
}

impl ClientSecret {
    pub fn load(path: &Path) -> Result<ClientSecret> {
        if !path.exists() {
            return Err(KcalError::ClientSecretMissing(path.to_path_buf()).into());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read client secret from {}", path.display()))?;

        let file: ClientSecretFile =
            serde_json::from_str(&contents).map_err(|e| KcalError::ClientSecretInvalid {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        file.installed
            .or(file.web)
            .ok_or_else(|| {
                KcalError::ClientSecretInvalid {
                    path: path.to_path_buf(),
                    reason: "expected an \"installed\" or \"web\" client".to_string(),
                }
                .into()
            })
    }
}

/// Access/refresh token pair with its expiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

impl Credential {
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    pub fn can_refresh(&self) -> bool {
        !self.refresh_token.is_empty()
    }
}

/// The file a credential is persisted to.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CredentialStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<Option<Credential>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read token from {}", self.path.display()))?;

        match serde_json::from_str(&contents) {
            Ok(credential) => Ok(Some(credential)),
            Err(e) => {
                // An unreadable token is as good as none; the consent flow replaces it
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt token file");
                Ok(None)
            }
        }
    }

    pub fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let contents =
            serde_json::to_string_pretty(credential).context("Failed to serialize token")?;

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write token to {}", self.path.display()))?;

        // Owner-only, the file holds OAuth tokens
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }
}

/// Talks to the identity provider.
pub trait Authorizer {
    /// Run the interactive consent flow and return a fresh credential
    async fn authorize(&self, secret: &ClientSecret, scopes: &[String]) -> Result<Credential>;

    /// Exchange the refresh token for a new access token
    async fn refresh(&self, secret: &ClientSecret, credential: &Credential) -> Result<Credential>;
}

/// Hands out a valid credential, persisting it whenever it changes.
pub struct CredentialManager<A> {
    secret: ClientSecret,
    store: CredentialStore,
    scopes: Vec<String>,
    authorizer: A,
}

impl<A: Authorizer> CredentialManager<A> {
    /// Fails right away when the client secret file is missing or malformed.
    pub fn new(
        client_secret_path: &Path,
        store: CredentialStore,
        scopes: Vec<String>,
        authorizer: A,
    ) -> Result<Self> {
        let secret = ClientSecret::load(client_secret_path)?;

        Ok(CredentialManager {
            secret,
            store,
            scopes,
            authorizer,
        })
    }

    pub async fn obtain(&self) -> Result<Credential> {
        let credential = match self.store.load()? {
            Some(credential) if !credential.is_expired() => return Ok(credential),
            Some(credential) if credential.can_refresh() => {
                tracing::debug!("access token expired, refreshing");
                match self.authorizer.refresh(&self.secret, &credential).await {
                    Ok(refreshed) => refreshed,
                    Err(e) => {
                        tracing::warn!(error = %format!("{:#}", e), "token refresh failed, re-authorizing");
                        self.authorizer.authorize(&self.secret, &self.scopes).await?
                    }
                }
            }
            _ => self.authorizer.authorize(&self.secret, &self.scopes).await?,
        };

        self.store.save(&credential)?;
        Ok(credential)
    }
}
