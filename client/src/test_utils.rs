//! Test utilities shared by the unit tests: fixtures, a controllable clock
//! and in-memory pets and auth APIs.
//!
//! The in-memory gateways derive the caller's user id from the token, so tests
//! build tokens with [`token_for`].

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use shared::LinkUserRequest;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use crate::domain::clock::Clock;
use crate::domain::models::pet::{BathRecord, Pet, PetDraft};
use crate::domain::models::session::{Session, User};
use crate::error::TrackerError;
use crate::io::api::{ApiGateway, PetResult};
use crate::io::auth::AuthGateway;

const TOKEN_PREFIX: &str = "token:";

pub(crate) fn sample_pet(id: &str, bath_periodicity: u32) -> Pet {
    Pet {
        id: id.to_string(),
        name: format!("Pet {}", id),
        bath_periodicity,
        is_public: false,
        linked_users: Vec::new(),
        baths: Vec::new(),
        image_url: None,
        bathers: vec!["Ana".to_string(), "Luis".to_string()],
        shampoos: vec!["Oatmeal".to_string(), "Neutral".to_string()],
        bath_types: vec!["Full".to_string(), "Dry".to_string()],
    }
}

pub(crate) fn bath_on(date: DateTime<Utc>) -> BathRecord {
    BathRecord::new(date, "Ana", "Oatmeal", "Full")
}

pub(crate) fn sample_user(id: &str) -> User {
    User {
        id: id.to_string(),
        username: format!("user-{}", id),
        email: format!("{}@example.com", id),
        role: "USER_ROLE".to_string(),
        creation_date: None,
    }
}

pub(crate) fn token_for(user_id: &str) -> String {
    format!("{}{}", TOKEN_PREFIX, user_id)
}

/// Clock that only moves when told to
pub(crate) struct FixedClock {
    now: Mutex<DateTime<Utc>>,
}

impl FixedClock {
    pub(crate) fn new(now: DateTime<Utc>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub(crate) fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap();
        *now = *now + by;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

/// Pauses `get_linked_pets` until released
struct Hold {
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

/// In-memory pets API with the same authorization rules as the server
pub(crate) struct InMemoryGateway {
    pets: Mutex<Vec<Pet>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    next_id: AtomicU64,
    hold: Mutex<Option<Hold>>,
}

impl InMemoryGateway {
    pub(crate) fn new() -> Self {
        Self {
            pets: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
            hold: Mutex::new(None),
        }
    }

    pub(crate) fn insert(&self, pet: Pet) {
        self.pets.lock().unwrap().push(pet);
    }

    pub(crate) fn remove(&self, pet_id: &str) {
        self.pets.lock().unwrap().retain(|p| p.id != pet_id);
    }

    pub(crate) fn rename(&self, pet_id: &str, name: &str) {
        let mut pets = self.pets.lock().unwrap();
        if let Some(pet) = pets.iter_mut().find(|p| p.id == pet_id) {
            pet.name = name.to_string();
        }
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Calls received so far, as `operation` or `operation:pet_id`
    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Make the next `get_linked_pets` wait. Returns (entered, release).
    pub(crate) fn hold_linked_pets(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.hold.lock().unwrap() = Some(Hold {
            entered: entered.clone(),
            release: release.clone(),
        });
        (entered, release)
    }

    fn record(&self, call: String) -> Result<(), TrackerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TrackerError::Network("connection refused".to_string()));
        }
        self.calls.lock().unwrap().push(call);
        Ok(())
    }

    fn caller(token: Option<&str>) -> Result<String, TrackerError> {
        token
            .and_then(|t| t.strip_prefix(TOKEN_PREFIX))
            .map(str::to_string)
            .ok_or_else(|| TrackerError::rejected("Token required"))
    }

    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn with_linked_pet<F>(&self, token: Option<&str>, pet_id: &str, change: F) -> Result<PetResult, TrackerError>
    where
        F: FnOnce(&mut Pet),
    {
        let caller = Self::caller(token)?;
        let mut pets = self.pets.lock().unwrap();
        let pet = pets
            .iter_mut()
            .find(|p| p.id == pet_id)
            .ok_or_else(|| TrackerError::rejected("Pet not found"))?;
        if !pet.is_linked_to(&caller) {
            return Err(TrackerError::rejected("Not authorized"));
        }
        change(pet);
        Ok(PetResult {
            pet: pet.clone(),
            success_message: "Pet updated".to_string(),
        })
    }

    fn assign_bath_ids(&self, baths: &mut [BathRecord]) {
        for bath in baths.iter_mut().filter(|b| b.id.is_none()) {
            bath.id = Some(self.next_id("bath"));
        }
    }
}

#[async_trait]
impl ApiGateway for InMemoryGateway {
    async fn create_pet(&self, token: Option<&str>, draft: &PetDraft) -> Result<PetResult, TrackerError> {
        self.record("create_pet".to_string())?;
        let caller = Self::caller(token)?;
        let mut baths = draft.baths.clone();
        self.assign_bath_ids(&mut baths);

        let pet = Pet {
            id: self.next_id("pet"),
            name: draft.name.trim().to_string(),
            bath_periodicity: draft.bath_periodicity,
            is_public: draft.is_public,
            linked_users: vec![caller],
            baths,
            image_url: draft.image_url.clone(),
            bathers: draft.bathers.clone(),
            shampoos: draft.shampoos.clone(),
            bath_types: draft.bath_types.clone(),
        };
        self.insert(pet.clone());
        Ok(PetResult {
            pet,
            success_message: "Pet created".to_string(),
        })
    }

    async fn get_public_pets(&self) -> Result<Vec<Pet>, TrackerError> {
        self.record("get_public_pets".to_string())?;
        Ok(self.pets.lock().unwrap().iter().filter(|p| p.is_public).cloned().collect())
    }

    async fn get_pet_by_id(&self, _token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError> {
        self.record(format!("get_pet_by_id:{}", pet_id))?;
        let pets = self.pets.lock().unwrap();
        let pet = pets
            .iter()
            .find(|p| p.id == pet_id)
            .cloned()
            .ok_or_else(|| TrackerError::rejected("Pet not found"))?;
        Ok(PetResult {
            pet,
            success_message: String::new(),
        })
    }

    async fn get_linked_pets(&self, _token: Option<&str>, user_id: &str) -> Result<Vec<Pet>, TrackerError> {
        self.record("get_linked_pets".to_string())?;
        let hold = self.hold.lock().unwrap().take();
        if let Some(hold) = hold {
            hold.entered.notify_one();
            hold.release.notified().await;
        }
        Ok(self
            .pets
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.is_linked_to(user_id))
            .cloned()
            .collect())
    }

    async fn update_pet(
        &self,
        token: Option<&str>,
        pet_id: &str,
        draft: &PetDraft,
    ) -> Result<PetResult, TrackerError> {
        self.record(format!("update_pet:{}", pet_id))?;
        let mut baths = draft.baths.clone();
        self.assign_bath_ids(&mut baths);
        self.with_linked_pet(token, pet_id, |pet| {
            pet.name = draft.name.trim().to_string();
            pet.bath_periodicity = draft.bath_periodicity;
            pet.is_public = draft.is_public;
            pet.image_url = draft.image_url.clone();
            pet.bathers = draft.bathers.clone();
            pet.shampoos = draft.shampoos.clone();
            pet.bath_types = draft.bath_types.clone();
            pet.baths = baths;
        })
    }

    async fn link_user(
        &self,
        token: Option<&str>,
        pet_id: &str,
        request: &LinkUserRequest,
    ) -> Result<PetResult, TrackerError> {
        self.record(format!("link_user:{}", pet_id))?;
        let user_id = request
            .user_id
            .clone()
            .ok_or_else(|| TrackerError::rejected("User not found"))?;
        self.with_linked_pet(token, pet_id, |pet| {
            if !pet.is_linked_to(&user_id) {
                pet.linked_users.push(user_id);
            }
        })
    }

    async fn link_public_pet(&self, token: Option<&str>, pet_id: &str) -> Result<PetResult, TrackerError> {
        self.record(format!("link_public_pet:{}", pet_id))?;
        let caller = Self::caller(token)?;
        let mut pets = self.pets.lock().unwrap();
        let pet = pets
            .iter_mut()
            .find(|p| p.id == pet_id && p.is_public)
            .ok_or_else(|| TrackerError::rejected("Public pet not found"))?;
        if !pet.is_linked_to(&caller) {
            pet.linked_users.push(caller);
        }
        Ok(PetResult {
            pet: pet.clone(),
            success_message: "Pet linked".to_string(),
        })
    }

    async fn delete_pet(&self, token: Option<&str>, pet_id: &str) -> Result<String, TrackerError> {
        self.record(format!("delete_pet:{}", pet_id))?;
        self.with_linked_pet(token, pet_id, |_| {})?;
        self.pets.lock().unwrap().retain(|p| p.id != pet_id);
        Ok("Pet deleted".to_string())
    }

    async fn register_bath(
        &self,
        token: Option<&str>,
        pet_id: &str,
        bath: &BathRecord,
    ) -> Result<PetResult, TrackerError> {
        self.record(format!("register_bath:{}", pet_id))?;
        let stored = BathRecord {
            id: Some(self.next_id("bath")),
            ..bath.clone()
        };
        self.with_linked_pet(token, pet_id, |pet| pet.baths.push(stored))
    }
}

/// In-memory auth API. Issues [`token_for`] tokens and renews only tokens of
/// known users.
pub(crate) struct InMemoryAuthGateway {
    accounts: Mutex<Vec<(User, String)>>,
    calls: Mutex<Vec<String>>,
    offline: AtomicBool,
    next_id: AtomicU64,
}

impl InMemoryAuthGateway {
    pub(crate) fn new() -> Self {
        Self {
            accounts: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            next_id: AtomicU64::new(1),
        }
    }

    pub(crate) fn add_user(&self, user: User, password: &str) {
        self.accounts.lock().unwrap().push((user, password.to_string()));
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> Result<(), TrackerError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(TrackerError::Network("connection refused".to_string()));
        }
        self.calls.lock().unwrap().push(call.to_string());
        Ok(())
    }

    fn session_for(user: &User) -> Session {
        Session::new(user.clone(), token_for(&user.id))
    }
}

#[async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn login(&self, email: &str, password: &str) -> Result<Session, TrackerError> {
        self.record("login")?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(user, stored)| user.email == email && stored == password)
            .map(|(user, _)| Self::session_for(user))
            .ok_or_else(|| TrackerError::rejected("Invalid credentials"))
    }

    async fn register(&self, username: &str, email: &str, password: &str) -> Result<Session, TrackerError> {
        self.record("register")?;
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.iter().any(|(user, _)| user.email == email) {
            return Err(TrackerError::rejected("Email already registered"));
        }
        let user = User {
            id: format!("user-{}", self.next_id.fetch_add(1, Ordering::SeqCst)),
            username: username.to_string(),
            email: email.to_string(),
            role: "USER_ROLE".to_string(),
            creation_date: None,
        };
        accounts.push((user.clone(), password.to_string()));
        Ok(Self::session_for(&user))
    }

    async fn renew_token(&self, token: &str) -> Result<Session, TrackerError> {
        self.record("renew_token")?;
        let user_id = token
            .strip_prefix(TOKEN_PREFIX)
            .ok_or_else(|| TrackerError::rejected("Invalid token"))?;
        self.accounts
            .lock()
            .unwrap()
            .iter()
            .find(|(user, _)| user.id == user_id)
            .map(|(user, _)| Self::session_for(user))
            .ok_or_else(|| TrackerError::rejected("Invalid token"))
    }
}
