//! HTTP implementation of the vehicle API

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::api::{AuthApi, VehicleDataApi};
use super::models::{
    ChargeState, ClimateState, DriveState, GuiSettings, TokenResponse, VehicleConfig, VehicleData,
    VehicleState, VehicleSummary,
};
use crate::error::{ApiError, ApiResult};
use crate::session::Credential;

/// Default owner API base URL
pub const API_BASE_URL: &str = "https://owner-api.teslamotors.com";

/// Client-side ceiling, well under the upstream polling limits
const RATE_LIMIT_PER_SECOND: u32 = 5;

/// OAuth application credentials sent with every token request
#[derive(Debug, Clone)]
pub struct ClientCredentials {
    pub client_id: String,
    pub client_secret: String,
}

/// Standard `{"response": ...}` wrapper around every data payload
#[derive(Deserialize)]
struct Envelope<T> {
    response: T,
}

/// Body of a POST to the token endpoint
#[derive(Serialize)]
#[serde(tag = "grant_type", rename_all = "snake_case")]
enum TokenRequest<'a> {
    Password {
        client_id: &'a str,
        client_secret: &'a str,
        email: &'a str,
        password: &'a str,
    },
    RefreshToken {
        client_id: &'a str,
        client_secret: &'a str,
        refresh_token: &'a str,
    },
}

/// Vehicle API client.
///
/// Stateless with respect to credentials: data calls take the access token
/// as an argument, so the session layer stays the only owner of it.
pub struct VehicleClient {
    http: HttpClient,
    base_url: String,
    credentials: ClientCredentials,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl VehicleClient {
    /// Create a new client against the default API host
    pub fn new(credentials: ClientCredentials) -> ApiResult<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!("fleetop/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(NonZeroU32::new(RATE_LIMIT_PER_SECOND).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            http,
            base_url: API_BASE_URL.to_string(),
            credentials,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
        })
    }

    /// Point the client at another host (staging or a local mock)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Authenticated GET returning the unwrapped `response` payload
    async fn get<T: DeserializeOwned>(&self, access_token: &str, path: &str) -> ApiResult<T> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if response.status() != StatusCode::OK {
            return Err(error_for_status(response).await);
        }

        let envelope = response
            .json::<Envelope<T>>()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        Ok(envelope.response)
    }

    async fn data_request<T: DeserializeOwned>(
        &self,
        access_token: &str,
        vehicle_id: &str,
        group: &str,
    ) -> ApiResult<T> {
        let path = format!("/api/1/vehicles/{}/data_request/{}", vehicle_id, group);
        self.get(access_token, &path).await
    }

    /// POST to the token endpoint and build a credential from the reply
    async fn request_token(&self, body: &TokenRequest<'_>) -> ApiResult<Credential> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/oauth/token", self.base_url);
        let response = self.http.post(&url).json(body).send().await?;

        match response.status() {
            StatusCode::OK => {}
            // Token endpoints answer a bad grant with 400 or 401
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(ApiError::Unauthorized);
            }
            _ => return Err(error_for_status(response).await),
        }

        let received_at = Utc::now();
        let token = response.json::<TokenResponse>().await.map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse token response: {}", e))
        })?;

        token
            .into_credential(received_at)
            .map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

/// Map a non-200 response onto the error taxonomy
async fn error_for_status(response: Response) -> ApiError {
    let status = response.status();
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::FORBIDDEN => ApiError::Forbidden,
        StatusCode::NOT_FOUND => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Resource not found".to_string());
            ApiError::NotFound(msg)
        }
        StatusCode::REQUEST_TIMEOUT => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| "vehicle did not respond".to_string());
            ApiError::VehicleUnavailable(msg)
        }
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            ApiError::RateLimit(Duration::from_secs(retry_after))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| "Bad request".to_string());
            ApiError::BadRequest(msg)
        }
        status if status.is_server_error() => {
            let msg = response
                .text()
                .await
                .unwrap_or_else(|_| format!("Server error: {}", status));
            ApiError::ServerError(msg)
        }
        _ => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
    }
}

#[async_trait]
impl AuthApi for VehicleClient {
    async fn authenticate(&self, email: &str, password: &str) -> ApiResult<Credential> {
        self.request_token(&TokenRequest::Password {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            email,
            password,
        })
        .await
    }

    async fn refresh(&self, refresh_token: &str) -> ApiResult<Credential> {
        self.request_token(&TokenRequest::RefreshToken {
            client_id: &self.credentials.client_id,
            client_secret: &self.credentials.client_secret,
            refresh_token,
        })
        .await
    }
}

#[async_trait]
impl VehicleDataApi for VehicleClient {
    async fn list_vehicles(&self, access_token: &str) -> ApiResult<Vec<VehicleSummary>> {
        self.get(access_token, "/api/1/vehicles").await
    }

    async fn drive_state(&self, access_token: &str, vehicle_id: &str) -> ApiResult<DriveState> {
        self.data_request(access_token, vehicle_id, "drive_state")
            .await
    }

    async fn charge_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<ChargeState> {
        self.data_request(access_token, vehicle_id, "charge_state")
            .await
    }

    async fn climate_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<ClimateState> {
        self.data_request(access_token, vehicle_id, "climate_state")
            .await
    }

    async fn vehicle_state(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleState> {
        self.data_request(access_token, vehicle_id, "vehicle_state")
            .await
    }

    async fn gui_settings(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<GuiSettings> {
        self.data_request(access_token, vehicle_id, "gui_settings")
            .await
    }

    async fn vehicle_config(
        &self,
        access_token: &str,
        vehicle_id: &str,
    ) -> ApiResult<VehicleConfig> {
        self.data_request(access_token, vehicle_id, "vehicle_config")
            .await
    }

    async fn vehicle_data(&self, access_token: &str, vehicle_id: &str) -> ApiResult<VehicleData> {
        let path = format!("/api/1/vehicles/{}/vehicle_data", vehicle_id);
        self.get(access_token, &path).await
    }
}
