//! # Pet Store
//!
//! Single owner of the pet selection shared by every view.
//!
//! ## States
//!
//! - `Unselected` until the store is initialized
//! - `Selected(pet)` afterwards; never more than one pet at a time
//!
//! ## Transitions
//!
//! - `session_identity_changed(user)`: fetch the user's linked pets, or fall
//!   back to the seed pet when nobody is logged in
//! - `linked_pets_changed(pets)`: keep the current selection if it is one of
//!   `pets` (and not the seed pet), else select the first pet, else the seed pet
//! - `selection_requested(pet)`: select the pet directly
//! - `delete_succeeded`: refetch linked pets and reselect
//!
//! Every selection carries a fresh [`ScheduleSnapshot`], computed before
//! subscribers are notified.
//!
//! ## Stale Responses
//!
//! Each selection-changing request takes a generation number when it is
//! issued. A response is applied only if no newer selection-changing request
//! was issued in the meantime; otherwise it is dropped and the call reports
//! `applied: false`. Failed requests never modify state.

use shared::LinkUserRequest;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

use crate::config::ClientConfig;
use crate::domain::authorization::{decorate_with_placeholder, DisplayPet};
use crate::domain::bath_history::{compute_schedule, ScheduleSnapshot};
use crate::domain::clock::{Clock, SystemClock};
use crate::domain::models::pet::{BathRecord, Pet, PetDraft};
use crate::domain::models::session::User;
use crate::domain::validation::{validate_bath, validate_link_request, validate_pet_draft, ValidationError};
use crate::error::TrackerError;
use crate::io::api::{ApiGateway, PetResult};
use crate::state::session_store::SessionStore;
use crate::state::subscribers::{Subscribers, Subscription};

/// The selected pet together with its schedule at selection time
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedPet {
    pub pet: DisplayPet,
    pub schedule: ScheduleSnapshot,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum Selection {
    #[default]
    Unselected,
    Selected(SelectedPet),
}

/// Everything a view can render, published to subscribers after each change
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PetStoreSnapshot {
    /// Incremented on every change; lets subscribers on other threads drop
    /// notifications that arrive out of order
    pub revision: u64,
    pub selection: Selection,
    /// Bath being edited, always one of the selected pet's baths
    pub selected_bath: Option<BathRecord>,
    pub linked_pets: Vec<DisplayPet>,
    pub public_pets: Vec<DisplayPet>,
}

impl PetStoreSnapshot {
    pub fn selected(&self) -> Option<&SelectedPet> {
        match &self.selection {
            Selection::Selected(selected) => Some(selected),
            Selection::Unselected => None,
        }
    }

    pub fn selected_pet_id(&self) -> Option<&str> {
        self.selected().map(|selected| selected.pet.id())
    }
}

/// Result of a store operation that reached the API
#[derive(Debug, Clone, PartialEq)]
pub struct StoreOutcome {
    /// Message returned by the API, for presentation
    pub message: String,
    /// False when a newer request superseded this one and nothing changed
    pub applied: bool,
}

impl StoreOutcome {
    fn new(message: impl Into<String>, applied: bool) -> Self {
        Self {
            message: message.into(),
            applied,
        }
    }
}

enum LinkedDecision {
    Keep,
    Replaced,
    Seed,
}

struct StoreState {
    snapshot: PetStoreSnapshot,
    generation: u64,
}

/// Shared handle to the pet selection state. Cloning is cheap.
#[derive(Clone)]
pub struct PetStore {
    inner: Arc<PetStoreInner>,
}

struct PetStoreInner {
    config: ClientConfig,
    gateway: Arc<dyn ApiGateway>,
    session: SessionStore,
    clock: Arc<dyn Clock>,
    state: Mutex<StoreState>,
    subscribers: Arc<Subscribers<PetStoreSnapshot>>,
}

impl PetStore {
    pub fn new(config: ClientConfig, gateway: Arc<dyn ApiGateway>, session: SessionStore) -> Self {
        Self::with_clock(config, gateway, session, Arc::new(SystemClock))
    }

    pub fn with_clock(
        config: ClientConfig,
        gateway: Arc<dyn ApiGateway>,
        session: SessionStore,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(PetStoreInner {
                config,
                gateway,
                session,
                clock,
                state: Mutex::new(StoreState {
                    snapshot: PetStoreSnapshot::default(),
                    generation: 0,
                }),
                subscribers: Subscribers::new(),
            }),
        }
    }

    pub fn snapshot(&self) -> PetStoreSnapshot {
        self.lock().snapshot.clone()
    }

    pub fn selected(&self) -> Option<SelectedPet> {
        self.lock().snapshot.selected().cloned()
    }

    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PetStoreSnapshot) + Send + Sync + 'static,
    {
        self.inner.subscribers.subscribe(callback)
    }

    /// Select the initial pet for whoever is in the session right now
    pub async fn initialize(&self) -> Result<StoreOutcome, TrackerError> {
        self.session_identity_changed(self.inner.session.current_user()).await
    }

    /// Drive `session_identity_changed` from the session store.
    ///
    /// Each identity change takes its request generation and token inside the
    /// session callback, then runs on a task spawned on the current tokio
    /// runtime, so a later change always supersedes an earlier one however the
    /// tasks are scheduled. Dropping the returned subscription stops following.
    pub fn follow_session(&self) -> Result<Subscription, TrackerError> {
        let handle = tokio::runtime::Handle::try_current().map_err(|e| TrackerError::Runtime(e.to_string()))?;
        let weak = Arc::downgrade(&self.inner);

        Ok(self.inner.session.subscribe(move |user| {
            let Some(inner) = weak.upgrade() else {
                return;
            };
            let store = PetStore { inner };
            let ticket = store.begin_request();
            let token = store.inner.session.token();
            let user = user.clone();
            handle.spawn(async move {
                if let Err(e) = store.identity_changed(ticket, user, token).await {
                    warn!("Failed to refresh pets after session change: {}", e);
                }
            });
        }))
    }

    pub async fn session_identity_changed(&self, user: Option<User>) -> Result<StoreOutcome, TrackerError> {
        let ticket = self.begin_request();
        let token = self.inner.session.token();
        self.identity_changed(ticket, user, token).await
    }

    async fn identity_changed(
        &self,
        ticket: u64,
        user: Option<User>,
        token: Option<String>,
    ) -> Result<StoreOutcome, TrackerError> {
        match user {
            Some(user) => {
                info!("🔄 Fetching pets linked to user {}", user.id);
                let pets = self.inner.gateway.get_linked_pets(token.as_deref(), &user.id).await?;
                self.apply_linked_pets(ticket, Some(&user.id), pets, String::new()).await
            }
            None => {
                info!("No user in session, falling back to seed pet");
                self.apply_linked_pets(ticket, None, Vec::new(), String::new()).await
            }
        }
    }

    /// Apply a new list of pets linked to the current user
    pub async fn linked_pets_changed(&self, pets: Vec<Pet>) -> Result<StoreOutcome, TrackerError> {
        let ticket = self.begin_request();
        let viewer = self.inner.session.user_id();
        self.apply_linked_pets(ticket, viewer.as_deref(), pets, String::new()).await
    }

    /// Select `pet` directly, superseding any request still in flight
    pub fn selection_requested(&self, pet: Pet) {
        let ticket = self.begin_request();
        let viewer = self.inner.session.user_id();
        self.apply_selection(ticket, viewer.as_deref(), &pet, String::new());
    }

    /// Re-fetch linked pets after a deletion and pick a new selection
    pub async fn delete_succeeded(&self, message: String) -> Result<StoreOutcome, TrackerError> {
        let ticket = self.begin_request();
        match self.inner.session.user_id() {
            Some(user_id) => {
                let token = self.inner.session.token();
                let pets = self.inner.gateway.get_linked_pets(token.as_deref(), &user_id).await?;
                self.apply_linked_pets(ticket, Some(&user_id), pets, message).await
            }
            None => self.apply_linked_pets(ticket, None, Vec::new(), message).await,
        }
    }

    /// Re-fetch the pets linked to the current user, if any
    pub async fn refresh_linked_pets(&self) -> Result<StoreOutcome, TrackerError> {
        match self.inner.session.current_user() {
            Some(user) => self.session_identity_changed(Some(user)).await,
            None => Ok(StoreOutcome::new("No user in session", false)),
        }
    }

    pub async fn create_pet(&self, draft: PetDraft) -> Result<StoreOutcome, TrackerError> {
        validate_pet_draft(&draft)?;
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.create_pet(token.as_deref(), &draft).await?;
        info!("🐾 Created pet {} ({})", result.pet.name, result.pet.id);

        let outcome = self.select_result(ticket, result);
        self.refresh_linked_after_write().await;
        Ok(outcome)
    }

    /// Update a pet; `pet_id` defaults to the selected pet
    pub async fn update_pet(&self, pet_id: Option<&str>, draft: PetDraft) -> Result<StoreOutcome, TrackerError> {
        validate_pet_draft(&draft)?;
        let pet_id = self.target_pet_id(pet_id)?;
        self.submit_update(&pet_id, draft).await
    }

    /// Link another user to a pet; `pet_id` defaults to the selected pet
    pub async fn link_user(
        &self,
        pet_id: Option<&str>,
        request: LinkUserRequest,
    ) -> Result<StoreOutcome, TrackerError> {
        validate_link_request(&request)?;
        let pet_id = self.target_pet_id(pet_id)?;
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.link_user(token.as_deref(), &pet_id, &request).await?;
        info!("🔗 Linked user to pet {}", pet_id);

        let outcome = self.select_result(ticket, result);
        self.refresh_linked_after_write().await;
        Ok(outcome)
    }

    /// Link the current user to a public pet
    pub async fn link_public_pet(&self, pet_id: &str) -> Result<StoreOutcome, TrackerError> {
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.link_public_pet(token.as_deref(), pet_id).await?;
        info!("🔗 Linked current user to public pet {}", pet_id);

        let outcome = self.select_result(ticket, result);
        self.refresh_linked_after_write().await;
        Ok(outcome)
    }

    /// Delete a pet; `pet_id` defaults to the selected pet
    pub async fn delete_pet(&self, pet_id: Option<&str>) -> Result<StoreOutcome, TrackerError> {
        let pet_id = self.target_pet_id(pet_id)?;
        let token = self.inner.session.token();

        let message = self.inner.gateway.delete_pet(token.as_deref(), &pet_id).await?;
        info!("🗑️ Deleted pet {}", pet_id);

        self.delete_succeeded(message).await
    }

    /// Register a bath for the selected pet
    pub async fn register_bath(&self, bath: BathRecord) -> Result<StoreOutcome, TrackerError> {
        let pet = self.selected_pet()?;
        validate_bath(&pet, &bath)?;
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.register_bath(token.as_deref(), &pet.id, &bath).await?;
        info!("🛁 Registered bath for pet {} on {}", pet.id, bath.date);

        Ok(self.select_result(ticket, result))
    }

    /// Register a bath now, repeating the selected pet's last inserted bath
    pub async fn register_repeat_bath(&self) -> Result<StoreOutcome, TrackerError> {
        let pet = self.selected_pet()?;
        let last = pet.last_inserted_bath().ok_or(ValidationError::NoBathHistory)?;
        let bath = BathRecord::repeat_of(last, self.inner.clock.now());
        self.register_bath(bath).await
    }

    /// Remove a bath from the selected pet's history
    pub async fn delete_bath(&self, bath_id: &str) -> Result<StoreOutcome, TrackerError> {
        let pet = self.selected_pet()?;
        let trimmed = pet.without_bath(bath_id);
        if trimmed.baths.len() == pet.baths.len() {
            return Err(ValidationError::UnknownBath(bath_id.to_string()).into());
        }
        self.submit_update(&pet.id, PetDraft::from_pet(&trimmed)).await
    }

    /// Pick one of the selected pet's baths for editing
    pub fn select_bath(&self, bath_id: &str) -> Result<(), TrackerError> {
        let pet = self.selected_pet()?;
        let bath = pet
            .baths
            .iter()
            .find(|bath| bath.id.as_deref() == Some(bath_id))
            .cloned()
            .ok_or_else(|| ValidationError::UnknownBath(bath_id.to_string()))?;

        self.commit(None, |snapshot| snapshot.selected_bath = Some(bath));
        Ok(())
    }

    pub fn clear_selected_bath(&self) {
        self.commit(None, |snapshot| snapshot.selected_bath = None);
    }

    /// Fetch public pets, decorated for an anonymous viewer
    pub async fn fetch_public_pets(&self) -> Result<Vec<DisplayPet>, TrackerError> {
        let pets = self.inner.gateway.get_public_pets().await?;
        let decorated: Vec<DisplayPet> = pets.iter().map(|pet| self.decorate(pet, None)).collect();
        debug!("Fetched {} public pets", decorated.len());

        let published = decorated.clone();
        self.commit(None, move |snapshot| snapshot.public_pets = published);
        Ok(decorated)
    }

    /// Re-fetch the selected pet from the API
    pub async fn refresh_selected(&self) -> Result<StoreOutcome, TrackerError> {
        let pet_id = self.target_pet_id(None)?;
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.get_pet_by_id(token.as_deref(), &pet_id).await?;
        Ok(self.select_result(ticket, result))
    }

    /// Recompute the selected pet's schedule against the clock
    pub fn refresh_schedule(&self) {
        let now = self.inner.clock.now();
        self.commit(None, |snapshot| {
            if let Selection::Selected(selected) = &mut snapshot.selection {
                selected.schedule = compute_schedule(&selected.pet.pet, now);
            }
        });
    }

    async fn submit_update(&self, pet_id: &str, draft: PetDraft) -> Result<StoreOutcome, TrackerError> {
        let ticket = self.begin_request();
        let token = self.inner.session.token();

        let result = self.inner.gateway.update_pet(token.as_deref(), pet_id, &draft).await?;
        info!("✏️ Updated pet {}", pet_id);

        let outcome = self.select_result(ticket, result);
        self.refresh_linked_after_write().await;
        Ok(outcome)
    }

    async fn refresh_linked_after_write(&self) {
        if let Err(e) = self.refresh_linked_pets().await {
            warn!("Failed to refresh linked pets: {}", e);
        }
    }

    /// Apply a linked-pets list and pick the selection in a single commit.
    ///
    /// The seed pet is fetched up front when `pets` is empty, so a failed
    /// fetch leaves the state untouched.
    async fn apply_linked_pets(
        &self,
        ticket: u64,
        viewer: Option<&str>,
        pets: Vec<Pet>,
        message: String,
    ) -> Result<StoreOutcome, TrackerError> {
        let seed = if pets.is_empty() {
            Some(self.fetch_seed().await?)
        } else {
            None
        };
        let seed_id = self.inner.config.seed_pet_id.as_str();
        let now = self.inner.clock.now();
        let mut decision = LinkedDecision::Keep;

        let applied = self.commit(Some(ticket), |snapshot| {
            snapshot.linked_pets = pets.iter().map(|pet| self.decorate(pet, viewer)).collect();

            let keep = snapshot
                .selected_pet_id()
                .map_or(false, |id| id != seed_id && pets.iter().any(|pet| pet.id == id));

            if keep {
                decision = LinkedDecision::Keep;
            } else if let Some(first) = pets.first() {
                self.select_into(snapshot, first, viewer, now);
                decision = LinkedDecision::Replaced;
            } else if let Some(seed) = &seed {
                self.select_into(snapshot, &seed.pet, viewer, now);
                decision = LinkedDecision::Seed;
            }
        });

        if !applied {
            return Ok(self.superseded(ticket, message));
        }

        match decision {
            LinkedDecision::Keep => debug!("Keeping current selection, {} linked pets", pets.len()),
            LinkedDecision::Replaced => info!("Selected first linked pet out of {}", pets.len()),
            LinkedDecision::Seed => info!("🌱 No linked pets, selected seed pet {}", seed_id),
        }
        Ok(StoreOutcome::new(message, true))
    }

    async fn fetch_seed(&self) -> Result<PetResult, TrackerError> {
        let token = self.inner.session.token();
        self.inner
            .gateway
            .get_pet_by_id(token.as_deref(), &self.inner.config.seed_pet_id)
            .await
    }

    fn select_result(&self, ticket: u64, result: PetResult) -> StoreOutcome {
        let viewer = self.inner.session.user_id();
        self.apply_selection(ticket, viewer.as_deref(), &result.pet, result.success_message)
    }

    fn apply_selection(&self, ticket: u64, viewer: Option<&str>, pet: &Pet, message: String) -> StoreOutcome {
        let now = self.inner.clock.now();
        if self.commit(Some(ticket), |snapshot| self.select_into(snapshot, pet, viewer, now)) {
            StoreOutcome::new(message, true)
        } else {
            self.superseded(ticket, message)
        }
    }

    fn select_into(
        &self,
        snapshot: &mut PetStoreSnapshot,
        pet: &Pet,
        viewer: Option<&str>,
        now: chrono::DateTime<chrono::Utc>,
    ) {
        let bath_still_present = snapshot.selected_bath.as_ref().map_or(false, |selected| {
            selected.id.is_some() && pet.baths.iter().any(|bath| bath.id == selected.id)
        });
        if !bath_still_present || snapshot.selected_pet_id() != Some(pet.id.as_str()) {
            snapshot.selected_bath = None;
        }

        snapshot.selection = Selection::Selected(SelectedPet {
            pet: self.decorate(pet, viewer),
            schedule: compute_schedule(pet, now),
        });
    }

    fn decorate(&self, pet: &Pet, viewer: Option<&str>) -> DisplayPet {
        decorate_with_placeholder(pet, viewer, &self.inner.config.placeholder_image)
    }

    fn superseded(&self, ticket: u64, message: String) -> StoreOutcome {
        debug!("Discarding response for request {}, a newer request was issued", ticket);
        StoreOutcome::new(message, false)
    }

    fn selected_pet(&self) -> Result<Pet, TrackerError> {
        self.lock()
            .snapshot
            .selected()
            .map(|selected| selected.pet.pet.clone())
            .ok_or(TrackerError::NoSelection)
    }

    fn target_pet_id(&self, pet_id: Option<&str>) -> Result<String, TrackerError> {
        match pet_id {
            Some(id) if !id.is_empty() => Ok(id.to_string()),
            _ => self
                .lock()
                .snapshot
                .selected_pet_id()
                .map(str::to_string)
                .ok_or(TrackerError::NoSelection),
        }
    }

    fn begin_request(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.generation
    }

    /// Apply `mutate` and notify subscribers, unless `ticket` has been superseded
    fn commit<F>(&self, ticket: Option<u64>, mutate: F) -> bool
    where
        F: FnOnce(&mut PetStoreSnapshot),
    {
        let published = {
            let mut state = self.lock();
            if let Some(ticket) = ticket {
                if state.generation != ticket {
                    return false;
                }
            }
            mutate(&mut state.snapshot);
            state.snapshot.revision += 1;
            state.snapshot.clone()
        };

        self.inner.subscribers.notify(&published);
        true
    }

    fn lock(&self) -> MutexGuard<'_, StoreState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
