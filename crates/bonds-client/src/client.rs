//! HTTP client for the bonds API.

use crate::error::Error;
use crate::types::*;
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use std::time::Duration;


/// Header carrying the API key.
pub const API_KEY_HEADER: &str = "X-API-Key";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the API (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
    /// API key sent with every request.
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(30),
            api_key: None,
        }
    }
}

/// HTTP client for the bonds API.
#[derive(Debug, Clone)]
pub struct BondsClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl BondsClient {
    /// Creates a new client with the given configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, Error> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    /// Creates a new client with default configuration.
    ///
    /// # Errors
    /// Returns error if the HTTP client cannot be built.
    pub fn with_base_url(base_url: &str) -> Result<Self, Error> {
        Self::new(ClientConfig {
            base_url: base_url.to_string(),
            ..Default::default()
        })
    }

    /// Returns a copy of this client that authenticates with `api_key`.
    #[must_use]
    pub fn with_api_key(&self, api_key: &str) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            api_key: Some(api_key.to_string()),
        }
    }

    /// Base URL without trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn bonds_url(&self) -> String {
        format!("{}/api/v1/bonds", self.base_url)
    }

    fn bond_url(&self, isin: &str) -> String {
        format!("{}/api/v1/bonds/{}", self.base_url, isin)
    }

    fn statistics_url(&self, user_id: i64) -> String {
        format!("{}/api/v1/bonds/user/{}", self.base_url, user_id)
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.header(API_KEY_HEADER, key),
            None => request,
        }
    }

    // ========================================================================
    // Health
    // ========================================================================

    /// Performs a health check.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn health_check(&self) -> Result<HealthResponse, Error> {
        let url = format!("{}/health", self.base_url);
        let resp = self.client.get(&url).send().await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Bonds
    // ========================================================================

    /// Lists the caller's bonds.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn list_bonds(&self) -> Result<Vec<BondResponse>, Error> {
        let resp = self
            .authorized(self.client.get(self.bonds_url()))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Creates a bond owned by the caller.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_bond(&self, request: &CreateBondRequest) -> Result<BondResponse, Error> {
        self.create_bond_raw(request).await
    }

    /// Creates a bond from an arbitrary JSON body.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn create_bond_raw<B: Serialize + ?Sized>(
        &self,
        body: &B,
    ) -> Result<BondResponse, Error> {
        let resp = self
            .authorized(self.client.post(self.bonds_url()))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Gets a bond by ISIN.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_bond(&self, isin: &str) -> Result<BondResponse, Error> {
        let resp = self
            .authorized(self.client.get(self.bond_url(isin)))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Updates some attributes of a bond.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_bond(
        &self,
        isin: &str,
        request: &UpdateBondRequest,
    ) -> Result<BondResponse, Error> {
        self.update_bond_raw(isin, request).await
    }

    /// Updates a bond from an arbitrary JSON body.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn update_bond_raw<B: Serialize + ?Sized>(
        &self,
        isin: &str,
        body: &B,
    ) -> Result<BondResponse, Error> {
        let resp = self
            .authorized(self.client.patch(self.bond_url(isin)))
            .json(body)
            .send()
            .await?;
        self.handle_response(resp).await
    }

    /// Deletes a bond.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn delete_bond(&self, isin: &str) -> Result<DeleteBondResponse, Error> {
        let resp = self
            .authorized(self.client.delete(self.bond_url(isin)))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    // ========================================================================
    // Statistics
    // ========================================================================

    /// Gets aggregate statistics over a user's bonds.
    ///
    /// # Errors
    /// Returns error if the request fails.
    pub async fn get_user_statistics(
        &self,
        user_id: i64,
    ) -> Result<UserStatisticsResponse, Error> {
        let resp = self
            .authorized(self.client.get(self.statistics_url(user_id)))
            .send()
            .await?;
        self.handle_response(resp).await
    }

    async fn handle_response<T: serde::de::DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let text = resp.text().await?;

        if status.is_success() {
            Ok(serde_json::from_str(&text)?)
        } else {
            let message = serde_json::from_str::<ErrorResponse>(&text)
                .map(|body| body.error)
                .unwrap_or(text);
            if status.as_u16() == 404 {
                Err(Error::NotFound(message))
            } else {
                Err(Error::Api {
                    status: status.as_u16(),
                    message,
                })
            }
        }
    }
}
