use std::time::Duration;

use reqwest::header::COOKIE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::errors::{CoreResult, ServiceLayerError};
use crate::types::{LoginPayload, LoginResponse, ODataCollection};

/// Name of the cookie carrying the Service Layer session id
const SESSION_COOKIE: &str = "B1SESSION";

/// Client for the SAP Business One Service Layer
#[derive(Debug, Clone)]
pub struct ServiceLayerClient {
    client: Client,
    base_url: String,
}

impl ServiceLayerClient {
    /// Create a new Service Layer client from the gateway configuration
    pub fn new(config: &GatewayConfig) -> CoreResult<Self> {
        if config.server.accept_invalid_certs {
            warn!("TLS certificate verification for the Service Layer is disabled");
        }

        let client = Client::builder()
            .danger_accept_invalid_certs(config.server.accept_invalid_certs)
            .timeout(Duration::from_secs(config.server.request_timeout_secs))
            .build()
            .map_err(|e| {
                ServiceLayerError::ConfigError(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self::with_client(client, &config.service_layer_url))
    }

    /// Wrap an existing reqwest client
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn session_cookie(session_id: &str) -> String {
        format!("{}={}", SESSION_COOKIE, session_id)
    }

    /// Turn a non-2xx response into `HttpError`, keeping the body as the message
    async fn check_status(response: Response) -> CoreResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.map_err(|e| {
            ServiceLayerError::RequestError(format!("Failed to read error response: {}", e))
        })?;

        Err(ServiceLayerError::HttpError {
            status_code: status.as_u16(),
            message: body,
        })
    }

    /// Authenticate against `POST /Login`
    pub async fn login(&self, payload: &LoginPayload) -> CoreResult<LoginResponse> {
        debug!(user = %payload.user_name, company_db = %payload.company_db, "Logging in to Service Layer");

        let response = self
            .client
            .post(self.url("Login"))
            .json(payload)
            .send()
            .await
            .map_err(|e| ServiceLayerError::RequestError(format!("Failed to send request: {}", e)))?;

        let response = Self::check_status(response).await?;

        response
            .json::<LoginResponse>()
            .await
            .map_err(|e| ServiceLayerError::ParsingError(format!("Failed to parse login response: {}", e)))
    }

    /// Fetch an OData collection, e.g. `Items?$top=50`, returning its `value` array
    pub async fn get_collection<T: DeserializeOwned>(
        &self,
        session_id: &str,
        query: &str,
    ) -> CoreResult<Vec<T>> {
        let response = self
            .client
            .get(self.url(query))
            .header(COOKIE, Self::session_cookie(session_id))
            .send()
            .await
            .map_err(|e| ServiceLayerError::RequestError(format!("Failed to send request: {}", e)))?;

        let response = Self::check_status(response).await?;

        let collection = response
            .json::<ODataCollection<T>>()
            .await
            .map_err(|e| ServiceLayerError::ParsingError(format!("Failed to parse collection: {}", e)))?;

        Ok(collection.value)
    }

    /// `GET /{entity}/$count`
    pub async fn count(&self, session_id: &str, entity: &str) -> CoreResult<u64> {
        let response = self
            .client
            .get(self.url(&format!("{}/$count", entity)))
            .header(COOKIE, Self::session_cookie(session_id))
            .send()
            .await
            .map_err(|e| ServiceLayerError::RequestError(format!("Failed to send request: {}", e)))?;

        let response = Self::check_status(response).await?;

        let body = response.text().await.map_err(|e| {
            ServiceLayerError::RequestError(format!("Failed to read count response: {}", e))
        })?;

        parse_count(&body)
    }
}

/// The `$count` endpoint answers with a bare integer, sometimes with a BOM or whitespace
fn parse_count(body: &str) -> CoreResult<u64> {
    body.trim_start_matches('\u{feff}')
        .trim()
        .parse::<u64>()
        .map_err(|e| ServiceLayerError::ParsingError(format!("Invalid count {:?}: {}", body, e)))
}
