//! # State Module
//!
//! Reactive client state. Each store owns its data behind a lock, exposes
//! cloneable snapshots for reading, and notifies subscribers synchronously
//! after every change.
//!
//! - **session_store**: authenticated user and bearer token
//! - **authenticator**: login, registration and token renewal feeding the session store
//! - **pet_store**: selected pet, selected bath, linked and public pets
//! - **subscribers**: subscription registry shared by both stores

pub mod authenticator;
pub mod pet_store;
pub mod session_store;
pub mod subscribers;

pub use authenticator::Authenticator;
pub use pet_store::{PetStore, PetStoreSnapshot, SelectedPet, Selection, StoreOutcome};
pub use session_store::SessionStore;
pub use subscribers::Subscription;
