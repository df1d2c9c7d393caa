//! Form validation that runs before any request is sent.
use shared::LinkUserRequest;

use crate::domain::models::pet::{BathRecord, Pet, PetDraft, MAX_BATH_PERIODICITY_DAYS};

/// Minimum length of a pet name after trimming
pub const MIN_PET_NAME_LEN: usize = 2;

/// Accepted username lengths, as enforced by the auth API
pub const USERNAME_LEN: std::ops::RangeInclusive<usize> = 4..=16;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Pet name must have at least {} characters", MIN_PET_NAME_LEN)]
    PetNameTooShort,
    #[error("Bath periodicity must be at least one day")]
    NonPositivePeriodicity,
    #[error("Bath periodicity cannot exceed {} days", MAX_BATH_PERIODICITY_DAYS)]
    PeriodicityTooLong,
    #[error("At least one bather is required")]
    MissingBathers,
    #[error("{0} cannot be empty")]
    EmptyField(&'static str),
    #[error("{field} '{value}' is not one of the pet's options")]
    UnknownOption { field: &'static str, value: String },
    #[error("The pet has no registered baths to repeat")]
    NoBathHistory,
    #[error("Bath {0} does not belong to the selected pet")]
    UnknownBath(String),
    #[error("A user id or email is required to link a user")]
    MissingLinkTarget,
    #[error("Username must have between 4 and 16 characters")]
    InvalidUsername,
    #[error("'{0}' is not a valid email address")]
    InvalidEmail(String),
    #[error("Password cannot be empty")]
    MissingPassword,
}

/// Validate a pet before creating or updating it
pub fn validate_pet_draft(draft: &PetDraft) -> Result<(), ValidationError> {
    if draft.name.trim().chars().count() < MIN_PET_NAME_LEN {
        return Err(ValidationError::PetNameTooShort);
    }
    if draft.bath_periodicity == 0 {
        return Err(ValidationError::NonPositivePeriodicity);
    }
    if draft.bath_periodicity > MAX_BATH_PERIODICITY_DAYS {
        return Err(ValidationError::PeriodicityTooLong);
    }
    if draft.bathers.iter().all(|bather| bather.trim().is_empty()) {
        return Err(ValidationError::MissingBathers);
    }
    Ok(())
}

/// Validate a bath against the options the pet declares.
///
/// An empty option list accepts any non-empty value.
pub fn validate_bath(pet: &Pet, bath: &BathRecord) -> Result<(), ValidationError> {
    check_option("Bather", &bath.bather, &pet.bathers)?;
    check_option("Shampoo", &bath.shampoo, &pet.shampoos)?;
    check_option("Bath type", &bath.bath_type, &pet.bath_types)?;
    Ok(())
}

pub fn validate_link_request(request: &LinkUserRequest) -> Result<(), ValidationError> {
    let has_target = [&request.user_id, &request.email]
        .iter()
        .any(|field| field.as_deref().map_or(false, |v| !v.trim().is_empty()));
    if has_target {
        Ok(())
    } else {
        Err(ValidationError::MissingLinkTarget)
    }
}

/// Validate login credentials before they are sent
pub fn validate_credentials(email: &str, password: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    let looks_like_email = email
        .split_once('@')
        .map_or(false, |(user, domain)| !user.is_empty() && domain.contains('.'));
    if !looks_like_email {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }
    if password.is_empty() {
        return Err(ValidationError::MissingPassword);
    }
    Ok(())
}

/// Validate a new account before it is sent
pub fn validate_registration(username: &str, email: &str, password: &str) -> Result<(), ValidationError> {
    if !USERNAME_LEN.contains(&username.trim().chars().count()) {
        return Err(ValidationError::InvalidUsername);
    }
    validate_credentials(email, password)
}

fn check_option(field: &'static str, value: &str, options: &[String]) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField(field));
    }
    if !options.is_empty() && !options.iter().any(|option| option == value) {
        return Err(ValidationError::UnknownOption {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Split a comma-separated form field into trimmed, non-empty entries
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}
