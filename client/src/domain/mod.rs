//! # Domain Module
//!
//! Business rules for pets and their bath history. Nothing in here performs IO;
//! every function is a pure computation over already-fetched data, with the
//! current time passed in explicitly through a [`Clock`].
//!
//! ## Module Organization
//!
//! - **models**: Pet, BathRecord, PetDraft, User and Session
//! - **bath_history**: latest bath lookup and schedule snapshot computation
//! - **authorization**: read/write checks and display decoration
//! - **validation**: form checks that run before anything reaches the network
//! - **clock**: source of "now" for schedule computation
//!
//! ## Business Rules
//!
//! - Bath periodicity is a positive number of days
//! - A pet without baths is scheduled from "now"
//! - Editing requires an explicit link between the user and the pet
//! - Public pets are readable by anyone

pub mod authorization;
pub mod bath_history;
pub mod clock;
pub mod models;
pub mod validation;

pub use authorization::{decorate_for_display, decorate_with_placeholder, is_authorized, Access, DisplayPet};
pub use bath_history::{compute_latest, compute_schedule, ScheduleSnapshot};
pub use clock::{Clock, SystemClock};
pub use models::pet::{BathRecord, Pet, PetDraft, DEFAULT_PLACEHOLDER_IMAGE, MAX_BATH_PERIODICITY_DAYS};
pub use models::session::{Session, User};
pub use validation::{
    split_list, validate_bath, validate_credentials, validate_link_request, validate_pet_draft, validate_registration,
    ValidationError,
};
