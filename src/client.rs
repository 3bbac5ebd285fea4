use crate::config::EnvironmentConfig;
use anyhow::{Context, Result};
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION},
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

/// Build the HTTP client shared by token and API calls
pub fn http_client(insecure: bool) -> Result<Client> {
    let client = Client::builder()
        .danger_accept_invalid_certs(insecure)
        .build()?;
    Ok(client)
}

/// Summary of an API as returned by the publisher listing
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ApiInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub context: String,
    pub version: String,
    #[serde(default)]
    pub provider: String,
    #[serde(default)]
    pub life_cycle_status: String,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiList {
    #[serde(default)]
    pub count: u32,
    #[serde(default)]
    pub list: Vec<ApiInfo>,
}

/// Result of an accepted import request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportOutcome {
    Imported,
    /// Some subscriptions were skipped because their APIs or tiers are missing
    PartiallyImported,
}

#[derive(Debug, Clone, Default)]
pub struct ImportApiOptions {
    pub preserve_provider: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ImportAppOptions {
    pub owner: Option<String>,
    pub preserve_owner: bool,
    pub skip_subscriptions: bool,
    pub skip_keys: bool,
    pub update: bool,
}

pub struct ApimClient {
    pub name: String,
    pub publisher_url: String,
    pub admin_url: String,
    pub client: Client,
}

impl ApimClient {
    pub fn new(env: &EnvironmentConfig, access_token: &str, insecure: bool) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let hv = HeaderValue::from_str(&format!("Bearer {access_token}"))?;
        headers.insert(AUTHORIZATION, hv);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(insecure)
            .build()?;
        Ok(ApimClient {
            name: env.name.clone(),
            publisher_url: env.publisher_endpoint().trim_end_matches('/').to_string(),
            admin_url: env.admin_endpoint().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// List APIs visible to the publisher, optionally filtered by a search query
    pub async fn list_apis(&self, query: Option<&str>, limit: u32) -> Result<ApiList> {
        let url = format!("{}/apis", self.publisher_url);
        let mut params = vec![("limit", limit.to_string())];
        if let Some(q) = query {
            params.push(("query", q.to_string()));
        }
        debug!("Listing APIs from {url}");
        let resp = self
            .client
            .get(&url)
            .query(&params)
            .send()
            .await
            .with_context(|| format!("cannot reach {url}"))?
            .error_for_status()?;
        Ok(resp.json().await?)
    }

    /// Upload an API archive, with optional deployment parameters as JSON
    pub async fn import_api(
        &self,
        archive: &Path,
        options: &ImportApiOptions,
        params: Option<String>,
    ) -> Result<ImportOutcome> {
        let url = format!("{}/apis/import", self.publisher_url);
        let mut form = Form::new().part("file", archive_part(archive)?);
        if let Some(params) = params {
            form = form.part(
                "params",
                Part::text(params)
                    .file_name("params.json")
                    .mime_str("application/json")?,
            );
        }
        info!("Importing API archive {} to {}", archive.display(), self.name);
        let resp = self
            .client
            .post(&url)
            .query(&[
                ("preserveProvider", options.preserve_provider.to_string()),
                ("overwrite", options.overwrite.to_string()),
            ])
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("cannot reach {url}"))?;
        import_outcome(resp).await
    }

    /// Upload an application archive through the admin API
    pub async fn import_application(
        &self,
        archive: &Path,
        options: &ImportAppOptions,
    ) -> Result<ImportOutcome> {
        let url = format!("{}/import/applications", self.admin_url);
        let form = Form::new().part("file", archive_part(archive)?);
        info!("Importing application archive {} to {}", archive.display(), self.name);
        let resp = self
            .client
            .post(&url)
            .query(&[
                ("appOwner", options.owner.clone().unwrap_or_default()),
                ("preserveOwner", options.preserve_owner.to_string()),
                ("skipSubscriptions", options.skip_subscriptions.to_string()),
                ("skipApplicationKeys", options.skip_keys.to_string()),
                ("update", options.update.to_string()),
            ])
            .multipart(form)
            .send()
            .await
            .with_context(|| format!("cannot reach {url}"))?;
        import_outcome(resp).await
    }

    /// Download an application archive
    pub async fn export_application(
        &self,
        name: &str,
        owner: &str,
        with_keys: bool,
    ) -> Result<bytes::Bytes> {
        let url = format!("{}/export/applications", self.admin_url);
        debug!("Exporting application {name} of {owner} from {url}");
        let resp = self
            .client
            .get(&url)
            .header(ACCEPT, HeaderValue::from_static("application/zip"))
            .query(&[
                ("appName", name.to_string()),
                ("appOwner", owner.to_string()),
                ("withKeys", with_keys.to_string()),
            ])
            .send()
            .await
            .with_context(|| format!("cannot reach {url}"))?
            .error_for_status()?;
        Ok(resp.bytes().await?)
    }
}

fn archive_part(path: &Path) -> Result<Part> {
    let data = std::fs::read(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "archive.zip".to_string());
    Ok(Part::bytes(data)
        .file_name(file_name)
        .mime_str("application/zip")?)
}

async fn import_outcome(resp: Response) -> Result<ImportOutcome> {
    match resp.status() {
        StatusCode::OK | StatusCode::CREATED => Ok(ImportOutcome::Imported),
        StatusCode::MULTI_STATUS => Ok(ImportOutcome::PartiallyImported),
        StatusCode::UNAUTHORIZED => {
            anyhow::bail!("invalid credentials or you may not have enough permission")
        }
        StatusCode::FORBIDDEN => {
            anyhow::bail!("invalid owner: cross tenant imports are not allowed")
        }
        status => {
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("import failed with {status}: {body}")
        }
    }
}
