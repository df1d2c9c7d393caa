//! client/src/io/mappers/user_mapper.rs

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use shared::User as SharedUser;

use crate::domain::models::session::User as DomainUser;

/// Mapper to convert user DTOs returned by the auth API into domain users.
pub struct UserMapper;

impl UserMapper {
    pub fn to_domain(dto: SharedUser) -> Result<DomainUser> {
        let creation_date = dto
            .creation_date
            .as_deref()
            .map(|date| {
                DateTime::parse_from_rfc3339(date)
                    .map(|parsed| parsed.with_timezone(&Utc))
                    .with_context(|| format!("Failed to parse creation date of user {}", dto.id))
            })
            .transpose()?;

        Ok(DomainUser {
            id: dto.id,
            username: dto.username,
            email: dto.email,
            role: dto.role,
            creation_date,
        })
    }
}
