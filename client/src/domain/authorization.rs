//! # Authorization
//!
//! Decides what the current user may do with an already-fetched pet. These
//! checks only gate UI affordances; the API enforces the authoritative rule.

use crate::domain::models::pet::{Pet, DEFAULT_PLACEHOLDER_IMAGE};

/// Kind of access being checked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Viewing the pet and its history
    Read,
    /// Editing the pet, registering or deleting baths, linking users
    Write,
}

/// A pet prepared for rendering
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayPet {
    pub pet: Pet,
    /// Image to show, the placeholder when the pet has none
    pub image_url: String,
    pub is_editable_by_current_user: bool,
}

impl DisplayPet {
    pub fn id(&self) -> &str {
        &self.pet.id
    }
}

/// Check whether `user_id` has `access` to `pet`.
///
/// Write access requires the user to be linked to the pet. Read access is
/// also granted for public pets, including to anonymous viewers.
pub fn is_authorized(pet: &Pet, user_id: Option<&str>, access: Access) -> bool {
    let linked = user_id.map_or(false, |id| !id.is_empty() && pet.is_linked_to(id));
    match access {
        Access::Write => linked,
        Access::Read => linked || pet.is_public,
    }
}

/// Decorate a pet for display using the default placeholder image
pub fn decorate_for_display(pet: &Pet, user_id: Option<&str>) -> DisplayPet {
    decorate_with_placeholder(pet, user_id, DEFAULT_PLACEHOLDER_IMAGE)
}

/// Decorate a pet for display, substituting `placeholder` when the pet has no image.
pub fn decorate_with_placeholder(pet: &Pet, user_id: Option<&str>, placeholder: &str) -> DisplayPet {
    let image_url = match pet.image_url.as_deref() {
        Some(url) if !url.trim().is_empty() => url.to_string(),
        _ => placeholder.to_string(),
    };

    DisplayPet {
        pet: pet.clone(),
        image_url,
        is_editable_by_current_user: is_authorized(pet, user_id, Access::Write),
    }
}
