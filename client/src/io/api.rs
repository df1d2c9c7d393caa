//! # Pets API Gateway
//!
//! The [`ApiGateway`] trait is the seam between the stores and the pets API.
//! It speaks domain types; [`HttpApiGateway`] is the production implementation
//! that maps them to the JSON envelopes defined in the `shared` crate.
//!
//! ## Envelopes
//!
//! Every endpoint answers `{ok, message, ...}`. An `ok: false` answer becomes
//! [`TrackerError::Rejected`] whatever the HTTP status was, so callers handle
//! "not authorized" and "not found" the same way as any other refusal.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use shared::{DeletePetResponse, LinkUserRequest, MultiplePetsResponse, SinglePetResponse};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::domain::models::pet::{BathRecord, Pet, PetDraft};
use crate::error::TrackerError;
use crate::io::mappers::pet_mapper::PetMapper;

/// Header carrying the session's bearer token
pub const TOKEN_HEADER: &str = "x-token";

/// Endpoint paths under `{api_base_url}/pets`
pub mod routes {
    pub const CREATE_PET: &str = "/createPet";
    pub const GET_PUBLIC_PETS: &str = "/getPublicPets";
    pub const GET_PET_BY_ID: &str = "/getPetById/";
    pub const GET_LINKED_PETS_BY_USER: &str = "/getLinkedPetsByUser/";
    pub const UPDATE_PET: &str = "/updatePet/";
    pub const LINK_USER: &str = "/linkUser/";
    pub const LINK_PUBLIC_PET_TO_USER: &str = "/linkPublicPetToUser/";
    pub const DELETE_PET: &str = "/deletePet/";
    pub const REGISTER_BATH: &str = "/registerBath/";
}

/// A pet returned by a successful call, with the server's message
#[derive(Debug, Clone, PartialEq)]
pub struct PetResult {
    pub pet: Pet,
    pub success_message: String,
}

/// Operations the stores need from the pets API.
///
/// `token` is the session's bearer token, `None` for anonymous calls.
#[async_trait]
pub trait ApiGateway: Send + Sync {
    async fn create_pet(&self, token: Option<&str>, draft: &PetDraft) -> Result<PetResult, TrackerError>;

    async fn get_public_pets(&self) -> Result<Vec<Pet>, TrackerError>;

    async fn get_pet_by_id(&self, token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError>;

    async fn get_linked_pets(&self, token: Option<&str>, user_id: &str) -> Result<Vec<Pet>, TrackerError>;

    async fn update_pet(
        &self,
        token: Option<&str>,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<PetResult, TrackerError>;

    async fn link_user(
        &self,
        token: Option<&str>,
        pet_id: &str,
        request: &LinkUserRequest,
    ) -> Result<PetResult, TrackerError>;

    /// Link the token's user to a public pet
    async fn link_public_pet(&self, token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError>;

    /// Delete a pet, returning the server's message
    async fn delete_pet(&self, token: Option<&str>, pet_id: &str) -> Result<String, TrackerError>;

    async fn register_bath(
        &self,
        token: Option<&str>,
        pet_id: &str,
        bath: &BathRecord,
    ) -> Result<PetResult, TrackerError>;
}

pub(crate) fn endpoint_url(base_url: &str, route: &str, id: Option<&str>) -> Result<Url, TrackerError> {
    let mut url = Url::parse(&format!("{}{}", base_url, route))
        .map_err(|e| TrackerError::Network(format!("Invalid API URL {}{}: {}", base_url, route, e)))?;
    if let Some(id) = id {
        url.path_segments_mut()
            .map_err(|_| TrackerError::Network(format!("API URL {} cannot take a path", base_url)))?
            .pop_if_empty()
            .push(id);
    }
    Ok(url)
}

/// Decode a JSON envelope. An unreadable body is a payload problem on a
/// success status and a network problem otherwise.
pub(crate) async fn read_envelope<T: DeserializeOwned>(response: Response) -> Result<T, TrackerError> {
    let status = response.status();
    let body = response.text().await?;
    serde_json::from_str::<T>(&body).map_err(|e| {
        if status.is_success() {
            TrackerError::MalformedPayload(format!("Failed to parse response: {}", e))
        } else {
            TrackerError::Network(format!("Server error {}: {}", status, body))
        }
    })
}

/// [`ApiGateway`] over HTTP with JSON bodies
#[derive(Clone)]
pub struct HttpApiGateway {
    client: Client,
    base_url: String,
}

impl HttpApiGateway {
    pub fn new(config: &ClientConfig) -> Result<Self, TrackerError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, &config.api_base_url))
    }

    pub fn with_client(client: Client, api_base_url: &str) -> Self {
        Self {
            client,
            base_url: format!("{}/pets", api_base_url.trim_end_matches('/')),
        }
    }

    /// Endpoint URL with `id` appended as a single, percent-encoded path segment
    fn url(&self, route: &str, id: Option<&str>) -> Result<Url, TrackerError> {
        endpoint_url(&self.base_url, route, id)
    }

    fn authorized(builder: RequestBuilder, token: Option<&str>) -> RequestBuilder {
        match token {
            Some(token) => builder.header(TOKEN_HEADER, token),
            None => builder,
        }
    }

    async fn send_single(&self, builder: RequestBuilder) -> Result<PetResult, TrackerError> {
        let envelope: SinglePetResponse = read_envelope(builder.send().await?).await?;
        if !envelope.ok {
            warn!("Pets API refused request: {}", envelope.message);
            return Err(TrackerError::rejected(envelope.message));
        }
        let dto = envelope
            .pet
            .ok_or_else(|| TrackerError::MalformedPayload("Response is missing the pet".to_string()))?;
        let pet = PetMapper::to_domain(dto).map_err(|e| TrackerError::MalformedPayload(format!("{:#}", e)))?;
        Ok(PetResult {
            pet,
            success_message: envelope.message,
        })
    }

    async fn send_list(&self, builder: RequestBuilder) -> Result<Vec<Pet>, TrackerError> {
        let envelope: MultiplePetsResponse = read_envelope(builder.send().await?).await?;
        if !envelope.ok {
            warn!("Pets API refused request: {}", envelope.message);
            return Err(TrackerError::rejected(envelope.message));
        }
        PetMapper::to_domain_list(envelope.pets).map_err(|e| TrackerError::MalformedPayload(format!("{:#}", e)))
    }
}

#[async_trait]
impl ApiGateway for HttpApiGateway {
    async fn create_pet(&self, token: Option<&str>, draft: &PetDraft) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::CREATE_PET, None)?;
        debug!("POST {}", url);
        let builder = self.client.post(url).json(&PetMapper::draft_to_dto(draft));
        self.send_single(Self::authorized(builder, token)).await
    }

    async fn get_public_pets(&self) -> Result<Vec<Pet>, TrackerError> {
        let url = self.url(routes::GET_PUBLIC_PETS, None)?;
        debug!("GET {}", url);
        self.send_list(self.client.get(url)).await
    }

    async fn get_pet_by_id(&self, token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::GET_PET_BY_ID, Some(pet_id))?;
        debug!("GET {}", url);
        self.send_single(Self::authorized(self.client.get(url), token)).await
    }

    async fn get_linked_pets(&self, token: Option<&str>, user_id: &str) -> Result<Vec<Pet>, TrackerError> {
        let url = self.url(routes::GET_LINKED_PETS_BY_USER, Some(user_id))?;
        debug!("GET {}", url);
        self.send_list(Self::authorized(self.client.get(url), token)).await
    }

    async fn update_pet(
        &self,
        token: Option<&str>,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::UPDATE_PET, Some(pet_id))?;
        debug!("PUT {}", url);
        let builder = self.client.put(url).json(&PetMapper::draft_to_dto(draft));
        self.send_single(Self::authorized(builder, token)).await
    }

    async fn link_user(
        &self,
        token: Option<&str>,
        pet_id: &str,
        request: &LinkUserRequest,
    ) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::LINK_USER, Some(pet_id))?;
        debug!("PUT {}", url);
        let builder = self.client.put(url).json(request);
        self.send_single(Self::authorized(builder, token)).await
    }

    async fn link_public_pet(&self, token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::LINK_PUBLIC_PET_TO_USER, Some(pet_id))?;
        debug!("PUT {}", url);
        self.send_single(Self::authorized(self.client.put(url), token)).await
    }

    async fn delete_pet(&self, token: Option<&str>, pet_id: &str) -> Result<String, TrackerError> {
        let url = self.url(routes::DELETE_PET, Some(pet_id))?;
        debug!("DELETE {}", url);
        let response = Self::authorized(self.client.delete(url), token).send().await?;
        let envelope: DeletePetResponse = read_envelope(response).await?;
        if envelope.ok {
            Ok(envelope.message)
        } else {
            warn!("Pets API refused to delete pet {}: {}", pet_id, envelope.message);
            Err(TrackerError::rejected(envelope.message))
        }
    }

    async fn register_bath(
        &self,
        token: Option<&str>,
        pet_id: &str,
        bath: &BathRecord,
    ) -> Result<PetResult, TrackerError> {
        let url = self.url(routes::REGISTER_BATH, Some(pet_id))?;
        debug!("POST {}", url);
        let builder = self.client.post(url).json(&PetMapper::bath_to_dto(bath));
        self.send_single(Self::authorized(builder, token)).await
    }
}
