//! Backend collaborators of the review session and their HTTP implementation.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::Decision,
    error::ErrorBody,
    protocol::{
        DecisionRequest, FolderPickerResponse, FolderRequest, FolderResponse, MoleculeQuery,
        MoleculeResponse, DECISION_ROUTE, FOLDER_PICKER_ROUTE, FOLDER_ROUTE, MOLECULE_ROUTE,
    },
};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

pub use reqwest::StatusCode;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const FOLDER_FALLBACK: Fallback = Fallback::StatusText("Failed to load folder");
const PICKER_FALLBACK: Fallback = Fallback::StatusText("Failed to open folder picker");
const MOLECULE_FALLBACK: Fallback = Fallback::Message("Unable to load molecule");
const DECISION_FALLBACK: Fallback = Fallback::StatusText("Failed to save decision");

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid server url '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{detail}")]
    Status { status: StatusCode, detail: String },
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

/// Lists review folders and resolves folder-picker selections.
#[async_trait]
pub trait FolderSource: Send + Sync {
    async fn list_folder(&self, folder: &str) -> Result<FolderResponse>;
    async fn pick_folder(&self) -> Result<String>;
}

/// Supplies raw structure content for a file path.
#[async_trait]
pub trait MoleculeSource: Send + Sync {
    async fn fetch_molecule(&self, path: &str) -> Result<MoleculeResponse>;
}

/// Durably records reviewer decisions.
#[async_trait]
pub trait DecisionSink: Send + Sync {
    async fn submit_decision(&self, path: &str, decision: Decision) -> Result<()>;
}

pub trait ReviewBackend: FolderSource + MoleculeSource + DecisionSink {}

impl<T> ReviewBackend for T where T: FolderSource + MoleculeSource + DecisionSink {}

#[derive(Debug, Clone)]
pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(server_url: &str, timeout: Duration) -> Result<Self> {
        let base_url = parse_base_url(server_url)?;
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        self.base_url
            .join(route)
            .map_err(|source| ClientError::InvalidUrl {
                url: format!("{}{route}", self.base_url),
                source,
            })
    }
}

fn parse_base_url(server_url: &str) -> Result<Url> {
    let trimmed = server_url.trim();
    let normalized = if trimmed.ends_with('/') {
        trimmed.to_string()
    } else {
        format!("{trimmed}/")
    };
    Url::parse(&normalized).map_err(|source| ClientError::InvalidUrl {
        url: server_url.to_string(),
        source,
    })
}

/// What a rejected request reports when the backend gives no usable `detail`.
#[derive(Debug, Clone, Copy)]
enum Fallback {
    /// Status text for bodies that are not error bodies, else the message.
    StatusText(&'static str),
    /// Always the message.
    Message(&'static str),
}

impl Fallback {
    fn message(self) -> &'static str {
        match self {
            Fallback::StatusText(message) | Fallback::Message(message) => message,
        }
    }
}

/// Turns a non-2xx response into `ClientError::Status`, preferring the
/// backend's `detail` over `fallback`.
async fn check_status(response: Response, fallback: Fallback) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    let detail = match (ErrorBody::detail_from_slice(&body), fallback) {
        (Ok(Some(detail)), _) => detail,
        (Err(_), Fallback::StatusText(message)) => {
            status.canonical_reason().unwrap_or(message).to_string()
        }
        (_, fallback) => fallback.message().to_string(),
    };
    warn!(status = status.as_u16(), %detail, "backend request rejected");
    Err(ClientError::Status { status, detail })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
}

#[async_trait]
impl FolderSource for HttpBackend {
    async fn list_folder(&self, folder: &str) -> Result<FolderResponse> {
        debug!(%folder, "listing folder");
        let response = self
            .http
            .post(self.endpoint(FOLDER_ROUTE)?)
            .json(&FolderRequest {
                folder: folder.to_string(),
            })
            .send()
            .await?;
        let response = check_status(response, FOLDER_FALLBACK).await?;
        decode(response).await
    }

    async fn pick_folder(&self) -> Result<String> {
        debug!("opening folder picker");
        let response = self.http.get(self.endpoint(FOLDER_PICKER_ROUTE)?).send().await?;
        let response = check_status(response, PICKER_FALLBACK).await?;
        let picked: FolderPickerResponse = decode(response).await?;
        Ok(picked.folder)
    }
}

#[async_trait]
impl MoleculeSource for HttpBackend {
    async fn fetch_molecule(&self, path: &str) -> Result<MoleculeResponse> {
        debug!(%path, "fetching molecule");
        let response = self
            .http
            .get(self.endpoint(MOLECULE_ROUTE)?)
            .query(&MoleculeQuery {
                path: path.to_string(),
            })
            .send()
            .await?;
        let response = check_status(response, MOLECULE_FALLBACK).await?;
        decode(response).await
    }
}

#[async_trait]
impl DecisionSink for HttpBackend {
    async fn submit_decision(&self, path: &str, decision: Decision) -> Result<()> {
        debug!(%path, %decision, "submitting decision");
        let response = self
            .http
            .post(self.endpoint(DECISION_ROUTE)?)
            .json(&DecisionRequest {
                path: path.to_string(),
                decision,
            })
            .send()
            .await?;
        check_status(response, DECISION_FALLBACK).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
