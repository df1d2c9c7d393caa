//! client/src/io/mappers/pet_mapper.rs

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use shared::{Pet as SharedPet, PetBath as SharedPetBath};

use crate::domain::models::pet::{BathRecord, Pet as DomainPet, PetDraft, MAX_BATH_PERIODICITY_DAYS};

/// Mapper to convert between shared Pet DTOs and domain Pet models.
pub struct PetMapper;

impl PetMapper {
    /// Converts a shared Pet DTO to a domain Pet, enforcing domain invariants.
    pub fn to_domain(dto: SharedPet) -> Result<DomainPet> {
        let id = match dto.id {
            Some(id) if !id.is_empty() => id,
            _ => bail!("Pet '{}' has no identifier", dto.pet_name),
        };
        let bath_periodicity = match u32::try_from(dto.bath_periodicity) {
            Ok(days) if (1..=MAX_BATH_PERIODICITY_DAYS).contains(&days) => days,
            _ => bail!(
                "Pet {} has invalid bath periodicity {}",
                id,
                dto.bath_periodicity
            ),
        };

        let baths = dto
            .registered_baths
            .into_iter()
            .map(Self::bath_to_domain)
            .collect::<Result<Vec<_>>>()
            .with_context(|| format!("Failed to map bath history of pet {}", id))?;

        Ok(DomainPet {
            id,
            name: dto.pet_name,
            bath_periodicity,
            is_public: dto.is_public,
            linked_users: dto.linked_users.into_iter().map(|linked| linked.user).collect(),
            baths,
            image_url: dto.img_url,
            bathers: dto.bathers,
            shampoos: dto.shampoos,
            bath_types: dto.bath_types,
        })
    }

    /// Converts a list of DTOs, failing on the first invalid pet.
    pub fn to_domain_list(dtos: Vec<SharedPet>) -> Result<Vec<DomainPet>> {
        dtos.into_iter().map(Self::to_domain).collect()
    }

    /// Body for create and update requests. Never carries an identifier.
    pub fn draft_to_dto(draft: &PetDraft) -> SharedPet {
        SharedPet {
            id: None,
            pet_name: draft.name.trim().to_string(),
            bath_periodicity: i64::from(draft.bath_periodicity),
            is_public: draft.is_public,
            linked_users: Vec::new(),
            registered_baths: draft.baths.iter().map(Self::bath_to_dto).collect(),
            img_url: draft.image_url.clone().filter(|url| !url.trim().is_empty()),
            bathers: draft.bathers.clone(),
            shampoos: draft.shampoos.clone(),
            bath_types: draft.bath_types.clone(),
        }
    }

    pub fn bath_to_domain(dto: SharedPetBath) -> Result<BathRecord> {
        let date = DateTime::parse_from_rfc3339(&dto.date)
            .with_context(|| format!("Failed to parse bath date '{}'", dto.date))?
            .with_timezone(&Utc);

        Ok(BathRecord {
            id: dto.id,
            date,
            bather: dto.bather,
            shampoo: dto.shampoo,
            bath_type: dto.bath_type,
        })
    }

    pub fn bath_to_dto(domain: &BathRecord) -> SharedPetBath {
        SharedPetBath {
            id: domain.id.clone(),
            date: domain.date.to_rfc3339_opts(SecondsFormat::Millis, true),
            bather: domain.bather.clone(),
            shampoo: domain.shampoo.clone(),
            bath_type: domain.bath_type.clone(),
        }
    }
}
