//! Client credentials per environment and OAuth2 token acquisition
//!
//! Credentials are stored in `keys.yaml` next to the main config. The client
//! secret is kept base64 encoded, which only keeps it from being read over a
//! shoulder; the file itself is written with owner-only permissions.

use crate::config::config_dir;
use crate::constants::KEYS_FILE;
use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// OAuth2 client credentials for one environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    pub client_id: String,
    pub client_secret: String,
}

impl Credential {
    /// `Authorization` header value for HTTP basic auth with these credentials
    pub fn basic_auth_value(&self) -> String {
        let token = base64::encode_config(
            format!("{}:{}", self.client_id, self.client_secret),
            base64::STANDARD,
        );
        format!("Basic {token}")
    }
}

/// On-disk form of a [`Credential`]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoredCredential {
    pub environment: String,
    pub client_id: String,
    /// base64 of the client secret
    pub client_secret: String,
}

impl StoredCredential {
    pub fn new(environment: &str, credential: &Credential) -> Self {
        StoredCredential {
            environment: environment.to_string(),
            client_id: credential.client_id.clone(),
            client_secret: base64::encode(&credential.client_secret),
        }
    }

    pub fn decode(&self) -> Result<Credential> {
        let secret = base64::decode(&self.client_secret)
            .with_context(|| format!("decoding client secret for '{}'", self.environment))?;
        Ok(Credential {
            client_id: self.client_id.clone(),
            client_secret: String::from_utf8(secret)
                .with_context(|| format!("client secret for '{}' is not UTF-8", self.environment))?,
        })
    }
}

/// Contents of `keys.yaml`
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyStore {
    #[serde(default)]
    pub keys: Vec<StoredCredential>,
}

impl KeyStore {
    pub fn path() -> PathBuf {
        config_dir().join(KEYS_FILE)
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(KeyStore::default());
        }
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading credentials {}", path.display()))?;
        let store: KeyStore = serde_yaml::from_str(&data)
            .with_context(|| format!("parsing credentials {}", path.display()))?;
        Ok(store)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_yaml::to_string(self)?;
        fs::write(path, data)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }
        Ok(())
    }

    /// Insert or replace the credentials of an environment
    pub fn set(&mut self, environment: &str, credential: &Credential) {
        self.keys.retain(|k| k.environment != environment);
        self.keys.push(StoredCredential::new(environment, credential));
    }

    /// Returns whether credentials were removed
    pub fn remove(&mut self, environment: &str) -> bool {
        let before = self.keys.len();
        self.keys.retain(|k| k.environment != environment);
        self.keys.len() != before
    }

    pub fn get(&self, environment: &str) -> Result<Credential> {
        self.keys
            .iter()
            .find(|k| k.environment == environment)
            .ok_or_else(|| {
                anyhow!("not logged in to '{environment}'. Run 'apictl login {environment}' first")
            })?
            .decode()
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Obtain an access token with the client credentials grant
pub async fn fetch_access_token(
    http: &Client,
    token_endpoint: &str,
    credential: &Credential,
    scopes: &[&str],
) -> Result<String> {
    debug!("Requesting access token from {token_endpoint}");
    let scope = scopes.join(" ");
    let resp = http
        .post(token_endpoint)
        .header(AUTHORIZATION, HeaderValue::from_str(&credential.basic_auth_value())?)
        .header(ACCEPT, HeaderValue::from_static("application/json"))
        .form(&[("grant_type", "client_credentials"), ("scope", scope.as_str())])
        .send()
        .await
        .with_context(|| format!("cannot reach token endpoint {token_endpoint}"))?;

    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        anyhow::bail!("token request failed with {status}: {body}");
    }
    let token: TokenResponse = resp.json().await.context("decoding token response")?;
    if let Some(expires_in) = token.expires_in {
        info!("Obtained access token valid for {expires_in}s");
    }
    Ok(token.access_token)
}
