// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Client for the declaration persistence service.
//!
//! The wizard reads candidate source declarations, counterparties and
//! declaration details from the service and writes submissions to it. Every
//! failure here is recoverable: the caller keeps its draft and may retry.

use eudr_declare::SubmissionPayload;
use eudr_declare_domain::{
    Counterparty, CounterpartyRole, DeclarationStatus, DeclarationType, SourceDeclaration,
    SourceItem,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::future::Future;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors talking to the persistence service.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// The request could not be sent or no response arrived.
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The service answered with a non-success status.
    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    /// The response body did not have the expected shape.
    #[error("Unexpected response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

impl CollaboratorError {
    /// Returns true if resending the same request may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Status { status, .. } => *status >= 500 || *status == 408 || *status == 429,
            Self::Decode { .. } => false,
        }
    }

    /// Returns true if the service reported the record as missing.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Status { status: 404, .. })
    }
}

/// The service's acknowledgement of a stored submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredDeclaration {
    /// Identifier assigned by the service.
    #[serde(alias = "_id", alias = "declarationId")]
    pub id: String,
}

/// A stored declaration as returned by the detail lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationDetail {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(default)]
    pub declaration_type: Option<DeclarationType>,
    #[serde(default)]
    pub status: Option<DeclarationStatus>,
    #[serde(default)]
    pub items: Vec<SourceItem>,
}

/// A directory entry; the role comes from the list it was fetched from.
#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(alias = "_id")]
    id: String,
    name: String,
    #[serde(default)]
    country: String,
}

/// Operations the wizard needs from the persistence service.
pub trait DeclarationBackend: Send + Sync + 'static {
    /// Stores a submission.
    fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<StoredDeclaration, CollaboratorError>> + Send;

    /// Lists approved inbound declarations that an outbound one may be derived from.
    fn list_source_candidates(
        &self,
    ) -> impl Future<Output = Result<Vec<SourceDeclaration>, CollaboratorError>> + Send;

    /// Lists customers or suppliers.
    fn list_counterparties(
        &self,
        role: CounterpartyRole,
    ) -> impl Future<Output = Result<Vec<Counterparty>, CollaboratorError>> + Send;

    /// Fetches one declaration.
    fn get_declaration(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<DeclarationDetail, CollaboratorError>> + Send;
}

/// `DeclarationBackend` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpDeclarationBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpDeclarationBackend {
    /// Creates a client for the service at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        url: String,
        request: reqwest::RequestBuilder,
    ) -> Result<T, CollaboratorError> {
        debug!(%url, "Calling persistence service");
        let response: reqwest::Response = match request.send().await {
            Ok(response) => response,
            Err(source) => return Err(CollaboratorError::Transport { url, source }),
        };

        let status: reqwest::StatusCode = response.status();
        if !status.is_success() {
            let body: String = response.text().await.unwrap_or_default();
            warn!(%url, status = status.as_u16(), "Persistence service refused request");
            return Err(CollaboratorError::Status {
                url,
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|source| CollaboratorError::Decode { url, source })
    }
}

impl DeclarationBackend for HttpDeclarationBackend {
    async fn submit(
        &self,
        payload: &SubmissionPayload,
    ) -> Result<StoredDeclaration, CollaboratorError> {
        let url: String = self.url("/declarations");
        let request: reqwest::RequestBuilder = self.client.post(&url).json(payload);
        self.send(url, request).await
    }

    async fn list_source_candidates(&self) -> Result<Vec<SourceDeclaration>, CollaboratorError> {
        let url: String = self.url("/declarations");
        let request: reqwest::RequestBuilder = self
            .client
            .get(&url)
            .query(&[("status", "approved"), ("type", "inbound")]);
        self.send(url, request).await
    }

    async fn list_counterparties(
        &self,
        role: CounterpartyRole,
    ) -> Result<Vec<Counterparty>, CollaboratorError> {
        let path: &str = match role {
            CounterpartyRole::Customer => "/customers",
            CounterpartyRole::Supplier => "/suppliers",
        };
        let url: String = self.url(path);
        let request: reqwest::RequestBuilder = self.client.get(&url);
        let entries: Vec<DirectoryEntry> = self.send(url, request).await?;
        Ok(entries
            .into_iter()
            .map(|entry| Counterparty {
                id: entry.id,
                name: entry.name,
                country: entry.country,
                role,
            })
            .collect())
    }

    async fn get_declaration(&self, id: &str) -> Result<DeclarationDetail, CollaboratorError> {
        let url: String = self.url(&format!("/declarations/{id}"));
        let request: reqwest::RequestBuilder = self.client.get(&url);
        self.send(url, request).await
    }
}
