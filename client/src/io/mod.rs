//! # IO Module
//!
//! Boundary between the domain and the remote API: the [`api::ApiGateway`] and
//! [`auth::AuthGateway`] seams with their HTTP implementations, and the mappers
//! converting wire DTOs from the `shared` crate into domain models.

pub mod api;
pub mod auth;
pub mod mappers;
