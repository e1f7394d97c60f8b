//! Content store backed by the GitHub repository contents API.

use crate::config::{Committer, VfsConfig, ACCEPT_HEADER, API_VERSION, USER_AGENT};
use crate::error::{Error, Result};
use crate::storage::store::ContentStore;
use crate::storage::types::{DeleteRequest, ObjectMetadata, PutRequest, RemoteEntry, RemoteObject};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Response, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

const API_VERSION_HEADER: &str = "x-github-api-version";

/// A GET on the contents endpoint answers with a listing for directories
/// and a single object otherwise.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ContentsResponse {
    Listing(Vec<RemoteEntry>),
    Item(ObjectMetadata),
}

#[derive(Debug, Deserialize)]
struct WriteResponse {
    content: ObjectMetadata,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

#[derive(Debug, Serialize)]
struct PutBody<'a> {
    message: &'a str,
    content: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    committer: &'a Committer,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct DeleteBody<'a> {
    message: &'a str,
    sha: &'a str,
    committer: &'a Committer,
    #[serde(skip_serializing_if = "Option::is_none")]
    branch: Option<&'a str>,
}

/// HTTP adapter for `/repos/{owner}/{repo}/contents/{path}`.
#[derive(Debug, Clone)]
pub struct GitHubContents {
    client: reqwest::Client,
    api_url: Url,
    owner: String,
    repo: String,
    branch: Option<String>,
}

impl GitHubContents {
    /// Build a client for the repository named in `config`.
    pub fn new(config: &VfsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HEADER));
        headers.insert(API_VERSION_HEADER, HeaderValue::from_static(API_VERSION));

        if config.auth_token.is_empty() {
            warn!("no auth token configured, using anonymous access");
        } else {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", config.auth_token))
                .map_err(|_| {
                    Error::InvalidConfig("auth token contains invalid characters".to_string())
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            api_url: Url::parse(&config.api_url)?,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
        })
    }

    /// URL of the object at `path`, one percent-encoded segment per component.
    fn object_url(&self, path: &str) -> Result<Url> {
        let mut url = self.api_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::InvalidConfig("API URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["repos", self.owner.as_str(), self.repo.as_str(), "contents"])
            .extend(path.split('/').filter(|s| !s.is_empty()));
        Ok(url)
    }

    /// Turn a non-success response into an error.
    async fn into_error(path: &str, response: Response) -> Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        status_error(path, status, &body)
    }
}

/// Map a failed status to the error taxonomy.
fn status_error(path: &str, status: StatusCode, body: &str) -> Error {
    let message = serde_json::from_str::<ApiMessage>(body)
        .map(|m| m.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    match status {
        StatusCode::NOT_FOUND => Error::NotFound(path.to_string()),
        StatusCode::CONFLICT => Error::Conflict {
            path: path.to_string(),
            reason: message,
        },
        StatusCode::UNPROCESSABLE_ENTITY if message.contains("sha") => Error::Conflict {
            path: path.to_string(),
            reason: message,
        },
        _ => Error::Api {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl ContentStore for GitHubContents {
    async fn get(&self, path: &str) -> Result<Option<RemoteObject>> {
        let mut request = self.client.get(self.object_url(path)?);
        if let Some(branch) = &self.branch {
            request = request.query(&[("ref", branch)]);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(path, %status, "GET contents");

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Self::into_error(path, response).await);
        }

        let object = match response.json::<ContentsResponse>().await? {
            ContentsResponse::Listing(entries) => RemoteObject::Directory(entries),
            ContentsResponse::Item(meta) => RemoteObject::File(meta),
        };
        Ok(Some(object))
    }

    async fn put(&self, request: PutRequest<'_>) -> Result<ObjectMetadata> {
        let body = PutBody {
            message: request.message,
            content: request.content,
            sha: request.sha,
            committer: request.committer,
            branch: self.branch.as_deref(),
        };

        let response = self
            .client
            .put(self.object_url(request.path)?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        debug!(path = request.path, %status, update = request.sha.is_some(), "PUT contents");

        if !status.is_success() {
            return Err(Self::into_error(request.path, response).await);
        }
        Ok(response.json::<WriteResponse>().await?.content)
    }

    async fn delete(&self, request: DeleteRequest<'_>) -> Result<()> {
        let body = DeleteBody {
            message: request.message,
            sha: request.sha,
            committer: request.committer,
            branch: self.branch.as_deref(),
        };

        let response = self
            .client
            .delete(self.object_url(request.path)?)
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        debug!(path = request.path, %status, "DELETE contents");

        if !status.is_success() {
            return Err(Self::into_error(request.path, response).await);
        }
        Ok(())
    }
}
