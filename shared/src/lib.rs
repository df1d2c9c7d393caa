use serde::{Deserialize, Serialize};

/// Pet document as exchanged with the pets API.
///
/// Field names follow the server's camelCase JSON with a Mongo-style `_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Server identifier, absent on creation requests
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub pet_name: String,
    /// Days between baths
    pub bath_periodicity: i64,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub linked_users: Vec<LinkedUser>,
    /// Bath history in insertion order (not necessarily sorted by date)
    #[serde(default)]
    pub registered_baths: Vec<PetBath>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_url: Option<String>,
    #[serde(default)]
    pub bathers: Vec<String>,
    #[serde(default)]
    pub shampoos: Vec<String>,
    #[serde(default)]
    pub bath_types: Vec<String>,
}

/// A user linked to a pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedUser {
    /// Identifier of the linked user
    pub user: String,
}

/// A single registered bath
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PetBath {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Timestamp of the bath (RFC 3339)
    pub date: String,
    pub bather: String,
    pub shampoo: String,
    pub bath_type: String,
}

/// Authenticated user as returned by the auth API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    /// Account creation timestamp (RFC 3339)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

/// Response envelope for endpoints returning a single pet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SinglePetResponse {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pet: Option<Pet>,
}

/// Response envelope for endpoints returning a list of pets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiplePetsResponse {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub pets: Vec<Pet>,
}

/// Response envelope for pet deletion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletePetResponse {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
}

/// Request body for linking another user to a pet
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Response envelope for login, registration and token renewal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthResponse {
    pub ok: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// Request body for `/auth/login`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `/auth/createUser`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl Pet {
    /// Check whether a user id appears in the linked users list
    pub fn is_linked_to(&self, user_id: &str) -> bool {
        self.linked_users.iter().any(|linked| linked.user == user_id)
    }
}
