//! # Bath Tracker Client
//!
//! Client-side state engine for the pet bath tracker.
//!
//! The crate is organised in layers, the same way the rest of the workspace is:
//!
//! ```text
//! State Layer (PetStore, SessionStore, Authenticator, subscriptions)
//!     ↓
//! IO Layer (ApiGateway, AuthGateway, HTTP clients, DTO mappers)
//!     ↓
//! Domain Layer (models, bath history, authorization, validation)
//! ```
//!
//! Views never derive the selected pet on their own; they subscribe to the
//! [`PetStore`] and render whatever snapshot it publishes.

pub mod config;
pub mod domain;
pub mod error;
pub mod io;
pub mod state;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::ClientConfig;
pub use domain::*;
pub use error::TrackerError;
pub use io::api::{ApiGateway, HttpApiGateway, PetResult};
pub use io::auth::{AuthGateway, HttpAuthGateway};
pub use state::*;
