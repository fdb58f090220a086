//! The session facade.
//!
//! A [`Session`] owns the single logical actor's state: the pin state
//! machine, the note store handle, the geocode client, and the
//! recent-search list. All mutation goes through `&mut self`, so the
//! borrow checker enforces the single-writer rule; network completions
//! are applied one at a time as the async operations resolve.

use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use loci_core::defaults::{CIRCLE_POINTS, ENV_OWNER_ID};
use loci_core::{
    ChangeFeed, Coordinates, GeoPin, NewNote, Note, NoteBackend, NoteValidator,
    RecentSearchEntry, Result, SearchResult, SearchSuggestion, SyncEvent, Verdict,
};
use loci_geocode::{GeocodeClient, RecentSearches};
use loci_moderation::validator_from_env;
use loci_spatial::{circle_polygon, nearby_outcome, NearbyOutcome};
use loci_store::{HttpNoteBackend, NoteStore, SyncChannel, SyncHandle};

use crate::machine::{PinMachine, PinState};

/// One user's pin, notes, search, and sync state.
pub struct Session {
    machine: PinMachine,
    store: NoteStore,
    feed: Arc<dyn ChangeFeed>,
    validator: Arc<dyn NoteValidator>,
    geocoder: GeocodeClient,
    recents: RecentSearches,
    owner_id: String,
    sync: Option<SyncHandle>,
}

impl Session {
    /// Wire a session over explicit parts.
    ///
    /// The backend serves both as the note collection and as the change
    /// feed for the sync channel.
    pub fn new<B>(
        backend: Arc<B>,
        validator: Arc<dyn NoteValidator>,
        geocoder: GeocodeClient,
        recents: RecentSearches,
        owner_id: impl Into<String>,
    ) -> Self
    where
        B: NoteBackend + ChangeFeed + 'static,
    {
        Self {
            machine: PinMachine::new(),
            store: NoteStore::new(backend.clone()),
            feed: backend,
            validator,
            geocoder,
            recents,
            owner_id: owner_id.into(),
            sync: None,
        }
    }

    /// Create a session wired from environment variables.
    ///
    /// Uses the HTTP note backend, the configured moderation strategy,
    /// the geocoder client, and the persisted recent-searches list. The
    /// owner id comes from `LOCI_OWNER_ID` or is generated per session.
    pub async fn from_env() -> Self {
        let owner_id = std::env::var(ENV_OWNER_ID)
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        info!(owner_id = %owner_id, "Initializing session");

        Self::new(
            Arc::new(HttpNoteBackend::from_env()),
            validator_from_env(),
            GeocodeClient::from_env(),
            RecentSearches::load_default().await,
            owner_id,
        )
    }

    /// The owner id stamped on notes this session creates.
    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// The current pin state, for the embedding UI.
    pub fn state(&self) -> &PinState {
        self.machine.state()
    }

    // ---- pin state machine -------------------------------------------------

    /// Drop the pin at the given coordinates, replacing any prior pin.
    pub fn drop_pin(&mut self, latitude: f64, longitude: f64) -> Result<GeoPin> {
        let coordinates = Coordinates::new(latitude, longitude)?;
        Ok(self.machine.drop_pin(coordinates))
    }

    /// Attach the embedder's marker handle to the active pin.
    pub fn attach_marker(&mut self, marker_ref: impl Into<String>) -> Result<()> {
        self.machine.attach_marker(marker_ref)
    }

    /// Open the note composer for the dropped pin.
    pub fn start_note(&mut self) -> Result<()> {
        self.machine.start_note()
    }

    /// Discard the active pin and any draft. Also the Escape handler.
    pub fn cancel(&mut self) {
        self.machine.cancel()
    }

    /// Validate and persist the composed note for the active pin.
    ///
    /// Runs the moderation gate, then the store create, then a reload so
    /// the note is queryable immediately rather than when the push
    /// notification lands. A completion whose draft was cancelled or
    /// replaced while the calls were in flight is discarded.
    #[instrument(skip(self, text), fields(subsystem = "engine", op = "save_note"))]
    pub async fn save_note(&mut self, text: &str) -> Result<Note> {
        let (generation, pin) = self.machine.begin_save(text)?;

        if let Verdict::Rejected(rejection) = self.validator.validate(text).await {
            debug!(stage = ?rejection.stage, "Save rejected by moderation");
            self.machine.fail_save(generation, &rejection.reason);
            return Err(rejection.into());
        }

        let draft = NewNote::new(
            Some(text.trim().to_string()),
            pin.coordinates,
            self.owner_id.clone(),
        );
        match self.store.create(draft).await {
            Ok(note) => {
                if self.machine.complete_save(generation) {
                    if let Err(e) = self.store.load_all().await {
                        warn!(error = %e, "Reload after save failed");
                    }
                }
                info!(note_id = %note.id, "Note saved");
                Ok(note)
            }
            Err(e) => {
                self.machine.fail_save(generation, &e.to_string());
                Err(e)
            }
        }
    }

    // ---- notes and spatial queries -----------------------------------------

    /// Reload the note cache from the backend.
    pub async fn refresh_notes(&self) -> Result<usize> {
        self.store.load_all().await
    }

    /// Snapshot of the cached notes.
    pub async fn notes(&self) -> Arc<Vec<Note>> {
        self.store.notes().await
    }

    /// Delete a note: optimistic removal with reload rollback on failure.
    pub async fn delete_note(&self, id: Uuid) -> Result<()> {
        self.store.delete(id).await
    }

    /// Notes within `radius_km` of the active pin, closest first.
    ///
    /// Without an active pin this is [`NearbyOutcome::NoPinSelected`],
    /// which is a different answer than an empty result list.
    pub async fn nearby(&self, radius_km: f64) -> NearbyOutcome {
        let notes = self.store.notes().await;
        let center = self.machine.active_pin().map(|pin| pin.coordinates);
        nearby_outcome(&notes, center, radius_km)
    }

    /// Display ring around the active pin, `None` without one.
    pub fn pin_circle(&self, radius_meters: f64) -> Result<Option<Vec<Coordinates>>> {
        match self.machine.active_pin() {
            None => Ok(None),
            Some(pin) => Ok(Some(circle_polygon(
                pin.coordinates,
                radius_meters,
                CIRCLE_POINTS,
            )?)),
        }
    }

    // ---- location search ---------------------------------------------------

    /// Full location search, recorded in the recent-searches list.
    ///
    /// The top result's name becomes the recent label with the full
    /// display name as sublabel; a search with no results records the
    /// raw query so it can be retried from the recents list.
    pub async fn search(&mut self, query: &str) -> Vec<SearchResult> {
        let results = self.geocoder.search(query).await;
        match results.first() {
            Some(top) => self.recents.add(&top.name, Some(&top.display_name)).await,
            None => self.recents.add(query, None).await,
        }
        results
    }

    /// Typeahead suggestions. Not recorded in recents.
    ///
    /// Calls the provider directly; a UI driving this per keystroke
    /// should wrap the calls in [`loci_geocode::Debouncer`] so only the
    /// newest query resolves.
    pub async fn suggestions(&self, query: &str) -> Vec<SearchSuggestion> {
        self.geocoder.suggestions(query).await
    }

    /// Reverse geocode the active pin, `None` without one.
    pub async fn describe_pin(&self) -> Option<String> {
        let pin = self.machine.active_pin()?;
        Some(self.geocoder.reverse(pin.coordinates).await)
    }

    /// Recent searches for display, newest first.
    pub fn recent_searches(&self) -> &[RecentSearchEntry] {
        self.recents.recent()
    }

    /// Clear the recent-searches list.
    pub async fn clear_recent_searches(&mut self) {
        self.recents.clear().await
    }

    // ---- realtime sync -----------------------------------------------------

    /// Start the realtime sync channel for this session's store.
    ///
    /// Returns a receiver of channel lifecycle and change events.
    /// Calling this while a channel is already running hands out
    /// another receiver for the running one.
    pub fn start_sync(&mut self) -> broadcast::Receiver<SyncEvent> {
        if let Some(handle) = &self.sync {
            return handle.events();
        }
        info!("Starting realtime sync");
        let channel = SyncChannel::new(self.store.clone(), self.feed.clone());
        // Subscribe before the task starts, or the receiver could miss
        // the initial Connected event.
        let events = channel.events();
        self.sync = Some(channel.start());
        events
    }

    /// Stop the sync channel and wait for its task to exit.
    pub async fn stop_sync(&mut self) -> Result<()> {
        if let Some(handle) = self.sync.take() {
            info!("Stopping realtime sync");
            handle.shutdown().await?;
        }
        Ok(())
    }

    /// Whether the sync channel is currently running.
    pub fn sync_running(&self) -> bool {
        self.sync.is_some()
    }
}
