//! # Auth API Gateway
//!
//! Login, registration and token renewal against `{api_base_url}/auth`. Each
//! call answers with a [`Session`] that the caller hands to the session store.

use async_trait::async_trait;
use reqwest::{Client, Url};
use shared::{AuthResponse, LoginRequest, RegisterRequest};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::domain::models::session::Session;
use crate::error::TrackerError;
use crate::io::api::{endpoint_url, read_envelope, TOKEN_HEADER};
use crate::io::mappers::user_mapper::UserMapper;

/// Endpoint paths under `{api_base_url}/auth`
pub mod routes {
    pub const LOGIN: &str = "/login";
    pub const CREATE_USER: &str = "/createUser";
    pub const RENEW_TOKEN: &str = "/renewToken/";
}

#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<Session, TrackerError>;

    /// Create an account and log it in
    async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session, TrackerError>;

    /// Exchange a still-valid token for a fresh session
    async fn renew_token(&self, token: &str) -> Result<Session, TrackerError>;
}

/// [`AuthGateway`] over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpAuthGateway {
    client: Client,
    base_url: String,
}

impl HttpAuthGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, api_base_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/auth", api_base_url.trim_end_matches('/')),
        }
    }

    fn url(&self, route: &str) -> Result<Url, TrackerError> {
        endpoint_url(&self.base_url, route, None)
    }

    fn into_session(envelope: AuthResponse) -> Result<Session, TrackerError> {
        if !envelope.ok {
            warn!("Auth API refused request: {}", envelope.message);
            return Err(TrackerError::rejected(envelope.message));
        }
        let (Some(token), Some(user)) = (envelope.token, envelope.user) else {
            return Err(TrackerError::MalformedPayload(
                "Auth response is missing the token or the user".to_string(),
            ));
        };
        let user = UserMapper::to_domain(user).map_err(|e| TrackerError::MalformedPayload(format!("{:#}", e)))?;
        Ok(Session::new(user, token))
    }
}

#[async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<Session, TrackerError> {
        let url = self.url(routes::LOGIN)?;
        debug!("POST {}", url);
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        Self::into_session(read_envelope(response).await?)
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session, TrackerError> {
        let url = self.url(routes::CREATE_USER)?;
        debug!("POST {}", url);
        let body = RegisterRequest {
            username: username.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let response = self.client.post(url).json(&body).send().await?;
        Self::into_session(read_envelope(response).await?)
    }

    async fn renew_token(&self, token: &str) -> Result<Session, TrackerError> {
        let url = self.url(routes::RENEW_TOKEN)?;
        debug!("GET {}", url);
        let response = self.client.get(url).header(TOKEN_HEADER, token).send().await?;
        Self::into_session(read_envelope(response).await?)
    }
}
