//! Domain model for a pet and its embedded bath history.
use chrono::{DateTime, Utc};

/// Image shown for pets that have no picture of their own
pub const DEFAULT_PLACEHOLDER_IMAGE: &str = "assets/images/unknownPet.jpg";

/// Longest accepted bath periodicity, in days
pub const MAX_BATH_PERIODICITY_DAYS: u32 = 3650;

/// A single bathing event. Owned by value by its [`Pet`].
#[derive(Debug, Clone, PartialEq)]
pub struct BathRecord {
    /// Server identifier, `None` until the bath has been registered
    pub id: Option<String>,
    pub date: DateTime<Utc>,
    pub bather: String,
    pub shampoo: String,
    pub bath_type: String,
}

impl BathRecord {
    /// Create a bath that has not been persisted yet
    pub fn new(
        date: DateTime<Utc>,
        bather: impl Into<String>,
        shampoo: impl Into<String>,
        bath_type: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            date,
            bather: bather.into(),
            shampoo: shampoo.into(),
            bath_type: bath_type.into(),
        }
    }

    /// Build a new, unpersisted bath that repeats `previous` on another date.
    pub fn repeat_of(previous: &BathRecord, date: DateTime<Utc>) -> Self {
        Self::new(
            date,
            previous.bather.clone(),
            previous.shampoo.clone(),
            previous.bath_type.clone(),
        )
    }
}

/// A tracked pet
#[derive(Debug, Clone, PartialEq)]
pub struct Pet {
    pub id: String,
    pub name: String,
    /// Days between baths, in `1..=MAX_BATH_PERIODICITY_DAYS`
    pub bath_periodicity: u32,
    pub is_public: bool,
    /// Ids of the users allowed to edit this pet
    pub linked_users: Vec<String>,
    /// Bath history in insertion order
    pub baths: Vec<BathRecord>,
    pub image_url: Option<String>,
    pub bathers: Vec<String>,
    pub shampoos: Vec<String>,
    pub bath_types: Vec<String>,
}

impl Pet {
    pub fn is_linked_to(&self, user_id: &str) -> bool {
        self.linked_users.iter().any(|linked| linked == user_id)
    }

    /// Most recently inserted bath, regardless of its date
    pub fn last_inserted_bath(&self) -> Option<&BathRecord> {
        self.baths.last()
    }

    /// Copy of this pet with the bath `bath_id` removed from its history
    pub fn without_bath(&self, bath_id: &str) -> Pet {
        Pet {
            baths: self
                .baths
                .iter()
                .filter(|bath| bath.id.as_deref() != Some(bath_id))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

/// Editable fields of a pet, used for create and update requests.
///
/// Carries no identifier: the target pet is always named separately.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PetDraft {
    pub name: String,
    pub bath_periodicity: u32,
    pub is_public: bool,
    pub image_url: Option<String>,
    pub bathers: Vec<String>,
    pub shampoos: Vec<String>,
    pub bath_types: Vec<String>,
    pub baths: Vec<BathRecord>,
}

impl PetDraft {
    /// Draft holding every editable field of an existing pet
    pub fn from_pet(pet: &Pet) -> Self {
        Self {
            name: pet.name.clone(),
            bath_periodicity: pet.bath_periodicity,
            is_public: pet.is_public,
            image_url: pet.image_url.clone(),
            bathers: pet.bathers.clone(),
            shampoos: pet.shampoos.clone(),
            bath_types: pet.bath_types.clone(),
            baths: pet.baths.clone(),
        }
    }
}
